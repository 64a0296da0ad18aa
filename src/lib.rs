//! A small regular expression engine.
//!
//! Patterns are scanned, parsed into a syntax tree, turned into an NFA by
//! Thompson's construction and matched through a DFA whose states are built
//! lazily by subset construction.
//!
//! Supported syntax: literals, `.`, `[...]` and `[^...]` classes with ranges,
//! `|`, `*`, `+`, grouping with `(...)` and `\` escapes. Only whole-text and
//! prefix matching are offered.

use std::fmt;
use std::str::FromStr;

use tracing::{debug, trace};

pub mod dfa;
pub mod escape;
pub mod id;
pub mod lexer;
pub mod machine;
pub mod nfa;
pub mod parser;
pub mod paths;
pub mod symbol;
pub mod thompson;

pub use lexer::Token;
pub use parser::{Ast, ParseError};

use dfa::Dfa;
use machine::Machine;

/// A compiled pattern.
///
/// Compiling is all-or-nothing: either the whole pipeline succeeds or a
/// [`ParseError`] is returned. Matching never fails.
pub struct Regex {
    pattern: String,
    ast: Ast,
    dfa: Dfa,
}

impl Regex {
    pub fn new(pattern: &str) -> Result<Self, ParseError> {
        let ast = parser::parse(pattern)?;
        trace!("syntax tree:\n{ast}");
        let nfa = thompson::build(&ast);
        trace!("nfa:\n{nfa}");
        let dfa = Dfa::new(nfa);
        debug!(
            pattern = %escape::string_literal(pattern),
            start = %dfa.start(),
            "compiled pattern"
        );

        Ok(Self {
            pattern: pattern.to_string(),
            ast,
            dfa,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// True if the whole of `text` matches.
    pub fn is_match(&self, text: &str) -> bool {
        Machine::new(&self.dfa).is_match(text)
    }

    /// Length in characters of the shortest non-empty prefix of `text` that matches.
    pub fn looking_at(&self, text: &str) -> Option<usize> {
        Machine::new(&self.dfa).looking_at(text)
    }

    pub fn matcher<'r, 't>(&'r self, text: &'t str) -> Matcher<'r, 't> {
        Matcher {
            regex: self,
            text,
            end: None,
        }
    }

    /// Human readable dump of the pattern, its syntax tree and its automaton.
    pub fn inspect(&self) -> String {
        format!(
            "pattern: {}\ntree:\n{}\n{}",
            escape::string_literal(&self.pattern),
            self.ast,
            self.dfa.nfa()
        )
    }
}

impl FromStr for Regex {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for Regex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}

impl fmt::Debug for Regex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Regex").field(&self.pattern).finish()
    }
}

/// Runs one pattern against one text and remembers where the last match ended.
#[derive(Debug)]
pub struct Matcher<'r, 't> {
    regex: &'r Regex,
    text: &'t str,
    end: Option<usize>,
}

impl<'r, 't> Matcher<'r, 't> {
    pub fn matches(&mut self) -> bool {
        let matched = self.regex.is_match(self.text);
        self.end = matched.then(|| self.text.chars().count());
        matched
    }

    pub fn looking_at(&mut self) -> bool {
        self.end = self.regex.looking_at(self.text);
        self.end.is_some()
    }

    /// Start of the last match. Matches are anchored, so this is always 0.
    pub fn start(&self) -> Option<usize> {
        self.end.map(|_| 0)
    }

    /// End of the last match, in characters.
    pub fn end(&self) -> Option<usize> {
        self.end
    }

    /// Text of the last match. Matches always start at the beginning of the text.
    pub fn as_str(&self) -> Option<&'t str> {
        let end = self.end?;
        let text: &'t str = self.text;
        Some(match text.char_indices().nth(end) {
            Some((offset, _)) => &text[..offset],
            None => text,
        })
    }
}
