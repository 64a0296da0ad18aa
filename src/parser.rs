use std::fmt;
use std::mem;
use std::sync::Arc;

use thiserror::Error;

use crate::escape;
use crate::lexer::{Lexer, Token};

/// Highest code point a class range is expanded to.
const RANGE_MAX: u32 = 127;

/// Stand-in for an empty sequence, e.g. the pattern `""` or the right side of `a|`.
pub const EMPTY: char = '\0';

#[derive(Debug, PartialEq, Eq)]
pub enum Ast {
    Char(char),
    Klass(Vec<char>),
    NegatedKlass(Vec<char>),
    Dot,
    Concat(Arc<Ast>, Arc<Ast>),
    Union(Arc<Ast>, Arc<Ast>),
    Star(Arc<Ast>),
}

impl Ast {
    pub fn concat(lhs: Ast, rhs: Ast) -> Self {
        Ast::Concat(Arc::new(lhs), Arc::new(rhs))
    }

    pub fn union(lhs: Ast, rhs: Ast) -> Self {
        Ast::Union(Arc::new(lhs), Arc::new(rhs))
    }

    pub fn star(e: Ast) -> Self {
        Ast::Star(Arc::new(e))
    }

    /// `e+` is `e e*`, with both occurrences sharing the same subtree.
    pub fn plus(e: Ast) -> Self {
        let e = Arc::new(e);
        Ast::Concat(Arc::clone(&e), Arc::new(Ast::Star(e)))
    }

    fn is_leaf(&self) -> bool {
        !matches!(self, Ast::Concat(..) | Ast::Union(..) | Ast::Star(_))
    }

    /// Move the children out onto `into`, leaving `leaf` in their place.
    fn detach_children(&mut self, into: &mut Vec<Arc<Ast>>, leaf: &Arc<Ast>) {
        match self {
            Ast::Concat(lhs, rhs) | Ast::Union(lhs, rhs) => {
                into.push(mem::replace(lhs, Arc::clone(leaf)));
                into.push(mem::replace(rhs, Arc::clone(leaf)));
            }
            Ast::Star(e) => into.push(mem::replace(e, Arc::clone(leaf))),
            Ast::Char(_) | Ast::Klass(_) | Ast::NegatedKlass(_) | Ast::Dot => {}
        }
    }
}

/// Trees can be as deep as the pattern is long, so they are torn down with
/// an explicit stack instead of one native frame per level. A subtree shared
/// by `+` is only detached by its last owner.
impl Drop for Ast {
    fn drop(&mut self) {
        let shallow = match self {
            Ast::Concat(lhs, rhs) | Ast::Union(lhs, rhs) => lhs.is_leaf() && rhs.is_leaf(),
            Ast::Star(e) => e.is_leaf(),
            _ => true,
        };
        if shallow {
            return;
        }

        let leaf = Arc::new(Ast::Dot);
        let mut pending = Vec::new();
        self.detach_children(&mut pending, &leaf);
        while let Some(mut child) = pending.pop() {
            if let Some(node) = Arc::get_mut(&mut child) {
                node.detach_children(&mut pending, &leaf);
            }
        }
    }
}

/// Work list entry for printing a tree without recursion.
enum Piece<'a> {
    Node(&'a Ast, usize),
    Text(&'static str),
}

/// Tab-indented tree, one node per line.
impl fmt::Display for Ast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut pending = vec![Piece::Node(self, 0)];
        while let Some(piece) = pending.pop() {
            let (ast, depth) = match piece {
                Piece::Text(text) => {
                    f.write_str(text)?;
                    continue;
                }
                Piece::Node(ast, depth) => (ast, depth),
            };
            if depth > 0 {
                writeln!(f)?;
            }
            for _ in 0..depth {
                f.write_str("\t")?;
            }
            match ast {
                Ast::Char(c) => write!(f, "Char({})", escape::char_literal(*c))?,
                Ast::Klass(members) => {
                    write!(f, "Klass({})", escape::string_literal_chars(members))?
                }
                Ast::NegatedKlass(members) => {
                    write!(f, "NegatedKlass({})", escape::string_literal_chars(members))?
                }
                Ast::Dot => f.write_str("Dot")?,
                Ast::Concat(lhs, rhs) | Ast::Union(lhs, rhs) => {
                    let name = if matches!(ast, Ast::Concat(..)) {
                        "Concat("
                    } else {
                        "Union("
                    };
                    f.write_str(name)?;
                    pending.extend([
                        Piece::Text(")"),
                        Piece::Node(rhs.as_ref(), depth + 1),
                        Piece::Text(","),
                        Piece::Node(lhs.as_ref(), depth + 1),
                    ]);
                }
                Ast::Star(e) => {
                    f.write_str("Star(")?;
                    pending.extend([Piece::Text(")"), Piece::Node(e.as_ref(), depth + 1)]);
                }
            }
        }
        Ok(())
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("unterminated character class")]
    UnterminatedClass,
    #[error("invalid token {found}, expected {expected}")]
    InvalidToken { expected: Token, found: Token },
}

/// Construct an AST for the Union operator.
fn union_ast(mut operands: Vec<Ast>) -> Option<Ast> {
    let mut ast = operands.pop()?;
    // Union is right associative: a|b|c is a|(b|c).
    while let Some(operand) = operands.pop() {
        ast = Ast::union(operand, ast);
    }
    Some(ast)
}

/// Construct an AST for a run of concatenated operands.
fn concat_ast(mut operands: Vec<Ast>) -> Option<Ast> {
    let mut ast = operands.pop()?;
    while let Some(operand) = operands.pop() {
        ast = Ast::concat(operand, ast);
    }
    Some(ast)
}

/// Append the members strictly after `start` up to `end`, never past `RANGE_MAX`.
/// `start` itself is already a member when this is called.
fn expand_range(members: &mut Vec<char>, start: char, end: char) {
    let from = start as u32 + 1;
    if from > end as u32 || from > RANGE_MAX {
        return;
    }
    let to = (end as u32).min(RANGE_MAX);
    members.extend((from..=to).filter_map(char::from_u32));
}

/// Recursive descent parser with a single token of lookahead.
///
/// ```txt
/// subexpr := seq ( '|' subexpr )?
/// seq     := subseq | ε
/// subseq  := star subseq?
/// star    := factor ( '*' | '+' )?
/// factor  := '(' subexpr ')' | '.' | '[' klass ']' | CHAR
/// klass   := '^'? ( CHAR | CHAR '-' CHAR )*
/// ```
#[derive(Debug)]
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    curr: Token,
}

impl<'a> Parser<'a> {
    pub fn new(pattern: &'a str) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(pattern);
        let curr = lexer.scan()?;
        Ok(Self { lexer, curr })
    }

    pub fn parse(mut self) -> Result<Ast, ParseError> {
        let ast = self.subexpr()?;
        self.expect(Token::Eof)?;
        Ok(ast)
    }

    fn next(&mut self) -> Result<(), ParseError> {
        self.curr = self.lexer.scan()?;
        Ok(())
    }

    fn expect(&mut self, expected: Token) -> Result<(), ParseError> {
        if self.curr != expected {
            return Err(ParseError::InvalidToken {
                expected,
                found: self.curr,
            });
        }
        self.next()
    }

    fn starts_factor(&self) -> bool {
        matches!(
            self.curr,
            Token::LParen | Token::Char(_) | Token::Dot | Token::LBracket
        )
    }

    fn subexpr(&mut self) -> Result<Ast, ParseError> {
        let mut operands = vec![self.seq()?];
        while self.curr == Token::Union {
            self.next()?;
            operands.push(self.seq()?);
        }
        Ok(union_ast(operands).unwrap_or(Ast::Char(EMPTY)))
    }

    fn seq(&mut self) -> Result<Ast, ParseError> {
        let mut operands = Vec::new();
        while self.starts_factor() {
            operands.push(self.star()?);
        }
        Ok(concat_ast(operands).unwrap_or(Ast::Char(EMPTY)))
    }

    fn star(&mut self) -> Result<Ast, ParseError> {
        let factor = self.factor()?;
        match self.curr {
            Token::Star => {
                self.next()?;
                Ok(Ast::star(factor))
            }
            Token::Plus => {
                self.next()?;
                Ok(Ast::plus(factor))
            }
            _ => Ok(factor),
        }
    }

    fn factor(&mut self) -> Result<Ast, ParseError> {
        match self.curr {
            Token::LParen => {
                self.next()?;
                let ast = self.subexpr()?;
                self.expect(Token::RParen)?;
                Ok(ast)
            }
            Token::Dot => {
                self.next()?;
                Ok(Ast::Dot)
            }
            Token::LBracket => {
                self.next()?;
                self.klass()
            }
            Token::Char(c) => {
                self.next()?;
                Ok(Ast::Char(c))
            }
            found => Err(ParseError::InvalidToken {
                expected: Token::LParen,
                found,
            }),
        }
    }

    fn klass(&mut self) -> Result<Ast, ParseError> {
        let negated = self.curr == Token::Caret;
        if negated {
            self.next()?;
        }

        let mut members = Vec::new();
        // Last single member, the only thing a `-` can extend into a range.
        let mut last = None;
        loop {
            match self.curr {
                Token::RBracket => {
                    self.next()?;
                    break;
                }
                Token::Char(c) => {
                    members.push(c);
                    last = Some(c);
                    self.next()?;
                }
                Token::Hyphen => {
                    self.next()?;
                    match (last.take(), self.curr) {
                        (Some(start), Token::Char(end)) => {
                            expand_range(&mut members, start, end);
                            self.next()?;
                        }
                        // Not a range: the `-` is a member and the current token is
                        // handled by the next iteration.
                        _ => members.push('-'),
                    }
                }
                found => {
                    return Err(ParseError::InvalidToken {
                        expected: Token::RBracket,
                        found,
                    })
                }
            }
        }

        if negated {
            Ok(Ast::NegatedKlass(members))
        } else {
            Ok(Ast::Klass(members))
        }
    }
}

/// Parse a regular expression pattern into an abstract syntax tree (AST).
pub fn parse(pattern: &str) -> Result<Ast, ParseError> {
    Parser::new(pattern)?.parse()
}

#[cfg(test)]
mod test {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn concat_union() {
        let ast = Ast::concat(Ast::Char('a'), Ast::concat(Ast::Char('b'), Ast::Char('c')));
        assert_eq!(parse("abc").unwrap(), ast);

        let ast = Ast::union(Ast::Char('a'), Ast::union(Ast::Char('b'), Ast::Char('c')));
        assert_eq!(parse("a|b|c").unwrap(), ast);

        let ast = Ast::union(
            Ast::concat(Ast::Char('x'), Ast::Char('y')),
            Ast::Char('b'),
        );
        assert_eq!(parse("xy|b").unwrap(), ast);
    }

    #[test]
    fn empty_sequence() {
        assert_eq!(parse("").unwrap(), Ast::Char(EMPTY));
        assert_eq!(parse("()").unwrap(), Ast::Char(EMPTY));
        assert_eq!(
            parse("a|").unwrap(),
            Ast::union(Ast::Char('a'), Ast::Char(EMPTY))
        );
        assert_eq!(
            parse("|b").unwrap(),
            Ast::union(Ast::Char(EMPTY), Ast::Char('b'))
        );
    }

    #[test]
    fn parenthesis() {
        let ast = Ast::concat(
            Ast::Char('a'),
            Ast::union(
                Ast::concat(Ast::Char('c'), Ast::Char('d')),
                Ast::Char('e'),
            ),
        );
        assert_eq!(parse("a(cd|e)").unwrap(), ast);

        // Error
        assert_eq!(
            parse("(ab"),
            Err(ParseError::InvalidToken {
                expected: Token::RParen,
                found: Token::Eof
            })
        );
        assert_eq!(
            parse("ab)"),
            Err(ParseError::InvalidToken {
                expected: Token::Eof,
                found: Token::RParen
            })
        );
    }

    #[test]
    fn star_plus() {
        assert_eq!(
            parse("ab*").unwrap(),
            Ast::concat(Ast::Char('a'), Ast::star(Ast::Char('b')))
        );
        assert_eq!(
            parse("a+").unwrap(),
            Ast::concat(Ast::Char('a'), Ast::star(Ast::Char('a')))
        );

        // Plus shares one subtree between both occurrences.
        let ast = parse("(ab)+").unwrap();
        let Ast::Concat(lhs, rhs) = &ast else {
            panic!("expected concat");
        };
        let Ast::Star(inner) = rhs.as_ref() else {
            panic!("expected star");
        };
        assert!(Arc::ptr_eq(lhs, inner));

        // Only one postfix operator per factor.
        assert_eq!(
            parse("a**"),
            Err(ParseError::InvalidToken {
                expected: Token::Eof,
                found: Token::Star
            })
        );
        assert!(parse("*a").is_err());
    }

    #[test]
    fn dot_and_caret() {
        assert_eq!(parse("a.").unwrap(), Ast::concat(Ast::Char('a'), Ast::Dot));
        assert_eq!(
            parse("^a"),
            Err(ParseError::InvalidToken {
                expected: Token::Eof,
                found: Token::Caret
            })
        );
    }

    #[test]
    fn klass() {
        assert_eq!(parse("[abc]").unwrap(), Ast::Klass(chars("abc")));
        assert_eq!(parse("[b-e]").unwrap(), Ast::Klass(chars("bcde")));
        assert_eq!(parse("[^b-d]").unwrap(), Ast::NegatedKlass(chars("bcd")));
        assert_eq!(parse("[a-c0-2]").unwrap(), Ast::Klass(chars("abc012")));
        assert_eq!(parse("[]").unwrap(), Ast::Klass(vec![]));
        assert_eq!(parse("[^]").unwrap(), Ast::NegatedKlass(vec![]));
        assert_eq!(parse("[a^]").unwrap(), Ast::Klass(chars("a^")));
        assert_eq!(parse(r"[\]\-]").unwrap(), Ast::Klass(chars("]-")));
        assert_eq!(parse("[.*|]").unwrap(), Ast::Klass(chars(".*|")));
    }

    #[test]
    fn klass_hyphen() {
        // No preceding member.
        assert_eq!(parse("[-a]").unwrap(), Ast::Klass(chars("-a")));
        // Nothing to range into.
        assert_eq!(parse("[a-]").unwrap(), Ast::Klass(chars("a-")));
        // A range cannot be the start of another range.
        assert_eq!(parse("[a-c-e]").unwrap(), Ast::Klass(chars("abc-e")));
    }

    #[test]
    fn klass_range_limits() {
        // Inverted range contributes nothing.
        assert_eq!(parse("[z-a]").unwrap(), Ast::Klass(chars("z")));
        // Capped at code point 127.
        assert_eq!(
            parse("[~-\u{100}]").unwrap(),
            Ast::Klass(vec!['~', '\u{7f}'])
        );
        // Starting above 127 contributes nothing but the start.
        assert_eq!(
            parse("[\u{e9}-\u{ff}]").unwrap(),
            Ast::Klass(vec!['\u{e9}'])
        );
    }

    #[test]
    fn klass_errors() {
        assert_eq!(parse("[ab"), Err(ParseError::UnterminatedClass));
        assert_eq!(parse("a[^"), Err(ParseError::UnterminatedClass));
    }

    #[test]
    fn display() {
        let ast = parse("a(b|.)*").unwrap();
        assert_eq!(
            ast.to_string(),
            "Concat(\n\tChar('a'),\n\tStar(\n\t\tUnion(\n\t\t\tChar('b'),\n\t\t\tDot)))"
        );
        assert_eq!(parse("[^\n]").unwrap().to_string(), "NegatedKlass(\"\\n\")");
    }

    #[test]
    fn long_patterns() {
        let ast = parse(&"a".repeat(100_000)).unwrap();
        assert!(matches!(ast, Ast::Concat(..)));
        drop(ast);

        let ast = parse(&["ab"; 10_000].join("|")).unwrap();
        assert!(matches!(ast, Ast::Union(..)));

        let nested = format!("{}a{}", "(".repeat(200), ")".repeat(200));
        assert_eq!(parse(&nested).unwrap(), Ast::Char('a'));
    }

    #[test]
    fn deep_trees_drop_and_print() {
        // Every level shares its operand between both halves of the `+`.
        let mut ast = Ast::Char('a');
        for _ in 0..100_000 {
            ast = Ast::plus(ast);
        }
        drop(ast);

        let mut ast = Ast::Char('a');
        for _ in 0..1_000 {
            ast = Ast::star(ast);
        }
        let printed = ast.to_string();
        assert_eq!(printed.lines().count(), 1_001);
        assert!(printed.ends_with(&format!("Char('a'){}", ")".repeat(1_000))));
    }
}
