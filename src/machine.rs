use crate::dfa::{Dfa, StateSet};

/// Runtime that drives a DFA across text, one character at a time.
///
/// A machine is cheap to create and holds no state beyond the current DFA
/// state, so each match call uses a fresh one.
#[derive(Debug)]
pub struct Machine<'a> {
    dfa: &'a Dfa,
    current: StateSet,
    consumed: usize,
}

impl<'a> Machine<'a> {
    pub fn new(dfa: &'a Dfa) -> Self {
        Self {
            dfa,
            current: dfa.start().clone(),
            consumed: 0,
        }
    }

    pub fn step(&mut self, ch: char) {
        self.current = self.dfa.transition(&self.current, ch);
        self.consumed += 1;
    }

    /// Acceptance is only reported once at least one character was consumed.
    pub fn is_accepting(&self) -> bool {
        self.consumed > 0 && self.dfa.is_accepting(&self.current)
    }

    /// No further input can lead to acceptance.
    pub fn is_dead(&self) -> bool {
        self.current.is_empty()
    }

    /// Number of characters consumed so far.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Whole-text match: feed every character and test the final state.
    pub fn is_match(mut self, text: &str) -> bool {
        for ch in text.chars() {
            self.step(ch);
            if self.is_dead() {
                return false;
            }
        }
        self.is_accepting()
    }

    /// Prefix match: the length, in characters, of the shortest accepted prefix.
    pub fn looking_at(mut self, text: &str) -> Option<usize> {
        for ch in text.chars() {
            self.step(ch);
            if self.is_accepting() {
                return Some(self.consumed);
            }
            if self.is_dead() {
                return None;
            }
        }
        None
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parser::parse;
    use crate::thompson;

    fn compile(pattern: &str) -> Dfa {
        Dfa::new(thompson::build(&parse(pattern).unwrap()))
    }

    #[test]
    fn concat() {
        let dfa = compile("abc");
        assert!(Machine::new(&dfa).is_match("abc"));
        assert!(!Machine::new(&dfa).is_match("ab"));
        assert!(!Machine::new(&dfa).is_match("abcd"));
        assert!(!Machine::new(&dfa).is_match(""));
    }

    #[test]
    fn union() {
        let dfa = compile("ab(cd|ef|g)h");
        assert!(Machine::new(&dfa).is_match("abcdh"));
        assert!(Machine::new(&dfa).is_match("abgh"));
        assert!(!Machine::new(&dfa).is_match("abh"));
        assert!(!Machine::new(&dfa).is_match(""));
    }

    #[test]
    fn star() {
        let dfa = compile("a*b");
        assert!(Machine::new(&dfa).is_match("b"));
        assert!(Machine::new(&dfa).is_match("ab"));
        assert!(Machine::new(&dfa).is_match("aab"));
        assert!(!Machine::new(&dfa).is_match("xb"));
        assert!(!Machine::new(&dfa).is_match(""));
    }

    #[test]
    fn empty_input_never_matches() {
        let dfa = compile("a*");
        assert!(Machine::new(&dfa).is_match("aaa"));
        assert!(!Machine::new(&dfa).is_match(""));
        assert_eq!(Machine::new(&dfa).looking_at(""), None);
    }

    #[test]
    fn dot() {
        let dfa = compile("a.b");
        assert!(Machine::new(&dfa).is_match("axb"));
        assert!(Machine::new(&dfa).is_match("a\u{3042}b"));
        assert!(!Machine::new(&dfa).is_match("ab"));
    }

    #[test]
    fn looking_at() {
        let dfa = compile("ab+");
        assert_eq!(Machine::new(&dfa).looking_at("abbx"), Some(2));
        assert_eq!(Machine::new(&dfa).looking_at("ab"), Some(2));
        assert_eq!(Machine::new(&dfa).looking_at("a"), None);
        assert_eq!(Machine::new(&dfa).looking_at("xab"), None);

        // Earliest acceptance, not longest.
        let dfa = compile("a*");
        assert_eq!(Machine::new(&dfa).looking_at("aaa"), Some(1));
    }

    #[test]
    fn step_by_step() {
        let dfa = compile("ab");
        let mut machine = Machine::new(&dfa);
        assert!(!machine.is_accepting());
        machine.step('a');
        assert!(!machine.is_accepting());
        machine.step('b');
        assert!(machine.is_accepting());
        assert_eq!(machine.consumed(), 2);
        machine.step('b');
        assert!(machine.is_dead());
    }
}
