use std::fmt;
use std::sync::Arc;

use ahash::AHashSet;

use crate::escape;

/// Label of an automaton edge.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbol {
    Literal(char),
    Klass(Arc<[char]>),
    NegatedKlass(Arc<[char]>),
    Dot,
    /// Consumes no input. Never matches a character.
    Epsilon,
}

impl Symbol {
    pub fn matches(&self, ch: char) -> bool {
        match self {
            Symbol::Literal(c) => *c == ch,
            Symbol::Klass(members) => members.contains(&ch),
            Symbol::NegatedKlass(members) => !members.contains(&ch),
            Symbol::Dot => true,
            Symbol::Epsilon => false,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (negated, members) = match self {
            Symbol::Literal(c) => return f.write_str(&escape::char_literal(*c)),
            Symbol::Dot => return f.write_str("(dot)"),
            Symbol::Epsilon => return f.write_str("(epsilon)"),
            Symbol::Klass(members) => (false, members),
            Symbol::NegatedKlass(members) => (true, members),
        };
        f.write_str("[")?;
        if negated {
            f.write_str("^")?;
        }
        for &c in members.iter() {
            f.write_str(&escape::escaped_char(c))?;
        }
        f.write_str("]")
    }
}

/// Per-compile pool of class member sets.
///
/// Members are stored sorted and deduplicated, so classes that list the same
/// characters in a different order or with repeats share one allocation and
/// compare equal.
#[derive(Debug, Default)]
pub struct Interner {
    classes: AHashSet<Arc<[char]>>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn klass(&mut self, members: &[char]) -> Symbol {
        Symbol::Klass(self.members(members))
    }

    pub fn negated_klass(&mut self, members: &[char]) -> Symbol {
        Symbol::NegatedKlass(self.members(members))
    }

    fn members(&mut self, members: &[char]) -> Arc<[char]> {
        let mut canonical = members.to_vec();
        canonical.sort_unstable();
        canonical.dedup();

        if let Some(existing) = self.classes.get(canonical.as_slice()) {
            return Arc::clone(existing);
        }
        let members: Arc<[char]> = canonical.into();
        self.classes.insert(Arc::clone(&members));
        members
    }

    /// Number of distinct member sets seen.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
