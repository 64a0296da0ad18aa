use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::RwLock;
use tracing::trace;

use crate::id::StateId;
use crate::nfa::Nfa;

/// A DFA state: the set of NFA states that are live at the same time.
///
/// Members are kept sorted and unique, so two sets with the same members are
/// the same value no matter how they were collected.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StateSet(Arc<[StateId]>);

impl StateSet {
    pub fn iter(&self) -> impl Iterator<Item = StateId> + '_ {
        self.0.iter().copied()
    }

    pub fn contains(&self, state: StateId) -> bool {
        self.0.binary_search(&state).is_ok()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// The dead state: no transition can leave it.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<BTreeSet<StateId>> for StateSet {
    fn from(states: BTreeSet<StateId>) -> Self {
        Self(states.into_iter().collect())
    }
}

impl FromIterator<StateId> for StateSet {
    fn from_iter<I: IntoIterator<Item = StateId>>(iter: I) -> Self {
        let mut states: Vec<_> = iter.into_iter().collect();
        states.sort_unstable();
        states.dedup();
        Self(states.into())
    }
}

impl fmt::Display for StateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let states: Vec<_> = self.0.iter().map(StateId::to_string).collect();
        write!(f, "[{}]", states.join(", "))
    }
}

/// Deterministic automaton derived lazily from an NFA by subset construction.
///
/// Transitions are computed on first use and memoized. The cache only grows.
/// It sits behind a lock, so one `Dfa` can be driven from several threads.
pub struct Dfa {
    nfa: Nfa,
    start: StateSet,
    cache: RwLock<AHashMap<(StateSet, char), StateSet>>,
}

impl Dfa {
    pub fn new(nfa: Nfa) -> Self {
        let start = StateSet::from(nfa.epsilon_closure([nfa.start()]));
        Self {
            nfa,
            start,
            cache: RwLock::new(AHashMap::new()),
        }
    }

    pub fn nfa(&self) -> &Nfa {
        &self.nfa
    }

    pub fn start(&self) -> &StateSet {
        &self.start
    }

    /// True if any NFA accept state is live in `states`.
    pub fn is_accepting(&self, states: &StateSet) -> bool {
        states.iter().any(|s| self.nfa.is_accept(s))
    }

    pub fn transition(&self, from: &StateSet, ch: char) -> StateSet {
        let key = (from.clone(), ch);
        if let Some(next) = self.cache.read().get(&key) {
            return next.clone();
        }

        let next = StateSet::from(
            self.nfa
                .epsilon_closure(from.iter().flat_map(|s| self.nfa.transitions(s, ch))),
        );
        trace!(%from, ?ch, to = %next, "dfa transition computed");

        self.cache.write().entry(key).or_insert(next).clone()
    }

    /// Number of memoized transitions.
    pub fn cached_transitions(&self) -> usize {
        self.cache.read().len()
    }
}

impl fmt::Debug for Dfa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dfa")
            .field("start", &self.start)
            .field("accepts", self.nfa.accepts())
            .field("cached_transitions", &self.cached_transitions())
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parser::parse;
    use crate::thompson;

    fn dfa(pattern: &str) -> Dfa {
        Dfa::new(thompson::build(&parse(pattern).unwrap()))
    }

    fn run(dfa: &Dfa, text: &str) -> StateSet {
        text.chars()
            .fold(dfa.start().clone(), |states, ch| dfa.transition(&states, ch))
    }

    #[test]
    fn canonical_state_set() {
        let dfa = dfa("a");
        let ids: Vec<_> = dfa.start().iter().collect();
        let id = ids[0];

        let forward: StateSet = [id, id].into_iter().collect();
        let backward = StateSet::from(BTreeSet::from([id]));
        assert_eq!(forward, backward);
        assert_eq!(forward.len(), 1);
        assert!(forward.contains(id));
    }

    #[test]
    fn same_set_two_ways_hits_same_cache_entry() {
        let dfa = dfa("(a|b)*c");
        let start = dfa.start().clone();
        let mut members: Vec<_> = start.iter().collect();

        let sorted: StateSet = members.iter().copied().collect();
        members.reverse();
        let reversed: StateSet = members.into_iter().collect();
        assert_eq!(sorted, reversed);

        let x = dfa.transition(&sorted, 'c');
        assert_eq!(dfa.cached_transitions(), 1);
        let y = dfa.transition(&reversed, 'c');
        assert_eq!(dfa.cached_transitions(), 1);
        assert_eq!(x, y);

        // Different histories that end in the same DFA state.
        let ab = run(&dfa, "ab");
        let bb = run(&dfa, "bb");
        assert_eq!(ab, bb);
        let before = dfa.cached_transitions();
        dfa.transition(&ab, 'c');
        dfa.transition(&bb, 'c');
        assert_eq!(dfa.cached_transitions(), before + 1);
    }

    #[test]
    fn accepting() {
        let dfa = dfa("ab*");
        assert!(!dfa.is_accepting(dfa.start()));
        assert!(dfa.is_accepting(&run(&dfa, "a")));
        assert!(dfa.is_accepting(&run(&dfa, "abb")));
        assert!(!dfa.is_accepting(&run(&dfa, "b")));
    }

    #[test]
    fn dead_state_is_sticky() {
        let dfa = dfa("ab");
        let dead = run(&dfa, "x");
        assert!(dead.is_empty());
        assert!(dfa.transition(&dead, 'a').is_empty());
        assert!(run(&dfa, "xab").is_empty());
    }

    #[test]
    fn cache_does_not_change_results() {
        let dfa = dfa("(a|b)+c");
        let first = run(&dfa, "abac");
        let cached = dfa.cached_transitions();
        let second = run(&dfa, "abac");
        assert_eq!(first, second);
        assert_eq!(dfa.cached_transitions(), cached);
        assert!(dfa.is_accepting(&second));
    }

    #[test]
    fn display() {
        let set: StateSet = BTreeSet::new().into();
        assert_eq!(set.to_string(), "[]");
        let dfa = dfa("a*");
        assert_eq!(dfa.start().to_string(), "[1, 3]");
    }
}
