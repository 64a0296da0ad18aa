use std::fmt;

/// Identifier of an NFA state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateId(u64);

impl StateId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Issues state ids in strictly increasing order, starting at 1. Ids are never reused.
#[derive(Debug, Default)]
pub struct IdFactory {
    last: u64,
}

impl IdFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> StateId {
        self.last += 1;
        StateId(self.last)
    }

    /// Number of ids issued so far.
    pub fn issued(&self) -> u64 {
        self.last
    }
}
