use std::collections::hash_map::Entry;
use std::fmt;
use std::mem;

use ahash::{AHashMap, AHashSet};

use crate::id::StateId;
use crate::symbol::Symbol;

/// Edge table of an automaton under construction.
///
/// Edges are keyed by `(from, symbol)`. Adding an edge for a key that already
/// exists adds the destination rather than replacing the old ones. Epsilon
/// edges live in their own map and are never returned for an input character.
///
/// Literal edges are found by a direct key lookup. Dot and class edges are
/// indexed per source state so that [`Paths::targets`] never scans the whole
/// table.
#[derive(Debug, Default, Clone)]
pub struct Paths {
    edges: AHashMap<(StateId, Symbol), Vec<StateId>>,
    epsilons: AHashMap<StateId, Vec<StateId>>,
    dots: AHashSet<StateId>,
    classes: AHashMap<StateId, Vec<Symbol>>,
}

fn push_unique(dests: &mut Vec<StateId>, to: StateId) {
    if !dests.contains(&to) {
        dests.push(to);
    }
}

impl Paths {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&mut self, from: StateId, by: Symbol, to: StateId) {
        match by {
            Symbol::Epsilon => return self.connect_epsilon(from, to),
            Symbol::Dot => {
                self.dots.insert(from);
            }
            Symbol::Klass(_) | Symbol::NegatedKlass(_) => {
                if !self.edges.contains_key(&(from, by.clone())) {
                    self.classes.entry(from).or_default().push(by.clone());
                }
            }
            Symbol::Literal(_) => {}
        }
        push_unique(self.edges.entry((from, by)).or_default(), to);
    }

    pub fn connect_epsilon(&mut self, from: StateId, to: StateId) {
        push_unique(self.epsilons.entry(from).or_default(), to);
    }

    /// Destinations of the edges leaving `from` labeled exactly `by`.
    pub fn get(&self, from: StateId, by: &Symbol) -> &[StateId] {
        if *by == Symbol::Epsilon {
            return self.epsilon(from);
        }
        self.edges
            .get(&(from, by.clone()))
            .map_or(&[][..], Vec::as_slice)
    }

    pub fn epsilon(&self, from: StateId) -> &[StateId] {
        self.epsilons.get(&from).map_or(&[][..], Vec::as_slice)
    }

    /// Destinations reachable from `from` by consuming `ch`: the literal edge,
    /// any dot edge, and every class edge whose class accepts `ch`.
    pub fn targets(&self, from: StateId, ch: char) -> impl Iterator<Item = StateId> + '_ {
        let literal = self.get(from, &Symbol::Literal(ch));
        let dot = if self.dots.contains(&from) {
            self.get(from, &Symbol::Dot)
        } else {
            &[][..]
        };
        let classes = self
            .classes
            .get(&from)
            .into_iter()
            .flatten()
            .filter(move |by| by.matches(ch))
            .flat_map(move |by| self.get(from, by));

        literal.iter().chain(dot).chain(classes).copied()
    }

    /// Take over every edge of `other`.
    ///
    /// The smaller table is moved into the larger one, so building a whole
    /// automaton by repeated merges touches each edge a logarithmic number of
    /// times at most.
    pub fn include(&mut self, mut other: Paths) {
        if other.len() > self.len() {
            mem::swap(self, &mut other);
        }
        for (key, dests) in other.edges {
            match self.edges.entry(key) {
                Entry::Occupied(mut entry) => {
                    for to in dests {
                        push_unique(entry.get_mut(), to);
                    }
                }
                Entry::Vacant(entry) => {
                    let (from, by) = entry.key();
                    match by {
                        Symbol::Dot => {
                            self.dots.insert(*from);
                        }
                        Symbol::Klass(_) | Symbol::NegatedKlass(_) => {
                            self.classes.entry(*from).or_default().push(by.clone());
                        }
                        Symbol::Literal(_) | Symbol::Epsilon => {}
                    }
                    entry.insert(dests);
                }
            }
        }
        for (from, dests) in other.epsilons {
            match self.epsilons.entry(from) {
                Entry::Occupied(mut entry) => {
                    for to in dests {
                        push_unique(entry.get_mut(), to);
                    }
                }
                Entry::Vacant(entry) => {
                    entry.insert(dests);
                }
            }
        }
    }

    /// Number of `(from, symbol)` keys, epsilon keys included.
    pub fn len(&self) -> usize {
        self.edges.len() + self.epsilons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty() && self.epsilons.is_empty()
    }

    fn sorted(&self) -> Vec<(StateId, Symbol, &[StateId])> {
        let mut entries: Vec<_> = self
            .edges
            .iter()
            .map(|((from, by), dests)| (*from, by.clone(), dests.as_slice()))
            .chain(
                self.epsilons
                    .iter()
                    .map(|(from, dests)| (*from, Symbol::Epsilon, dests.as_slice())),
            )
            .collect();
        entries.sort_by(|a, b| (a.0, &a.1).cmp(&(b.0, &b.1)));
        entries
    }
}

/// One line per edge key, ordered by source state then symbol.
impl fmt::Display for Paths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (from, by, dests)) in self.sorted().into_iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            let mut dests = dests.to_vec();
            dests.sort_unstable();
            let dests: Vec<_> = dests.iter().map(StateId::to_string).collect();
            write!(
                f,
                "(from: {from}, by: {by}, accepts: [{}])",
                dests.join(", ")
            )?;
        }
        Ok(())
    }
}
