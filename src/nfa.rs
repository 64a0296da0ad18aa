use std::collections::BTreeSet;
use std::fmt;

use crate::id::StateId;
use crate::paths::Paths;
use crate::symbol::Symbol;

/// A partially built automaton: an entry state, its accept states and the edges between them.
#[derive(Debug)]
pub struct Fragment {
    pub start: StateId,
    pub accepts: Vec<StateId>,
    pub paths: Paths,
}

impl Fragment {
    pub fn new(start: StateId, accepts: Vec<StateId>) -> Self {
        Self {
            start,
            accepts,
            paths: Paths::new(),
        }
    }

    pub fn connect(&mut self, from: StateId, by: Symbol, to: StateId) {
        self.paths.connect(from, by, to);
    }

    pub fn connect_epsilon(&mut self, from: StateId, to: StateId) {
        self.paths.connect_epsilon(from, to);
    }

    /// Take over the edges of `other`.
    pub fn include(&mut self, other: Paths) {
        self.paths.include(other);
    }

    pub fn build(self) -> Nfa {
        Nfa {
            start: self.start,
            accepts: self.accepts.into_iter().collect(),
            paths: self.paths,
        }
    }
}

/// Nondeterministic finite automaton. Immutable once built.
#[derive(Debug)]
pub struct Nfa {
    start: StateId,
    accepts: BTreeSet<StateId>,
    paths: Paths,
}

impl Nfa {
    pub fn start(&self) -> StateId {
        self.start
    }

    pub fn accepts(&self) -> &BTreeSet<StateId> {
        &self.accepts
    }

    pub fn is_accept(&self, state: StateId) -> bool {
        self.accepts.contains(&state)
    }

    pub fn paths(&self) -> &Paths {
        &self.paths
    }

    /// States reached from `from` by consuming `ch`.
    pub fn transitions(&self, from: StateId, ch: char) -> impl Iterator<Item = StateId> + '_ {
        self.paths.targets(from, ch)
    }

    /// Every state reachable from `seeds` through zero or more epsilon edges, seeds included.
    pub fn epsilon_closure(&self, seeds: impl IntoIterator<Item = StateId>) -> BTreeSet<StateId> {
        let mut visited = BTreeSet::new();
        let mut todo: Vec<StateId> = seeds.into_iter().collect();
        while let Some(state) = todo.pop() {
            if !visited.insert(state) {
                continue;
            }
            todo.extend(
                self.paths
                    .epsilon(state)
                    .iter()
                    .filter(|next| !visited.contains(*next)),
            );
        }
        visited
    }
}

impl fmt::Display for Nfa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let accepts: Vec<_> = self.accepts.iter().map(StateId::to_string).collect();
        writeln!(f, "from: {}", self.start)?;
        writeln!(f, "accepts: [{}]", accepts.join(", "))?;
        writeln!(f, "transitions:")?;
        write!(f, "{}", self.paths)
    }
}
