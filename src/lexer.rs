use std::fmt;
use std::str::Chars;

use crate::parser::ParseError;

/// Lexical unit of a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Char(char),
    Union,
    Star,
    Plus,
    Dot,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Caret,
    Hyphen,
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Char(c) => write!(f, "CHAR({c})"),
            Token::Union => f.write_str("UNION"),
            Token::Star => f.write_str("STAR"),
            Token::Plus => f.write_str("PLUS"),
            Token::Dot => f.write_str("DOT"),
            Token::LParen => f.write_str("LPAREN"),
            Token::RParen => f.write_str("RPAREN"),
            Token::LBracket => f.write_str("LBRACKET"),
            Token::RBracket => f.write_str("RBRACKET"),
            Token::Caret => f.write_str("CARET"),
            Token::Hyphen => f.write_str("HYPHEN"),
            Token::Eof => f.write_str("EOF"),
        }
    }
}

/// Scanner that turns a pattern into tokens one at a time.
///
/// Inside `[...]` the scanner switches to class mode, where `-` is a range
/// operator, `^` is a negation marker (first position only) and every other
/// operator character is an ordinary member.
#[derive(Debug)]
pub struct Lexer<'a> {
    chars: Chars<'a>,
    in_class: bool,
    // True right after `[`, where `^` means negation.
    class_start: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(pattern: &'a str) -> Self {
        Self {
            chars: pattern.chars(),
            in_class: false,
            class_start: false,
        }
    }

    /// Return the next token. Once the pattern is exhausted this keeps returning `Token::Eof`.
    pub fn scan(&mut self) -> Result<Token, ParseError> {
        let Some(c) = self.chars.next() else {
            if self.in_class {
                return Err(ParseError::UnterminatedClass);
            }
            return Ok(Token::Eof);
        };

        if self.in_class {
            Ok(self.class_token(c))
        } else {
            Ok(self.token(c))
        }
    }

    fn token(&mut self, c: char) -> Token {
        match c {
            '\\' => self.escaped(),
            '.' => Token::Dot,
            '|' => Token::Union,
            '*' => Token::Star,
            '+' => Token::Plus,
            '(' => Token::LParen,
            ')' => Token::RParen,
            '^' => Token::Caret,
            '[' => {
                self.in_class = true;
                self.class_start = true;
                Token::LBracket
            }
            _ => Token::Char(c),
        }
    }

    fn class_token(&mut self, c: char) -> Token {
        let first = std::mem::take(&mut self.class_start);
        match c {
            '\\' => self.escaped(),
            ']' => {
                self.in_class = false;
                Token::RBracket
            }
            '-' => Token::Hyphen,
            '^' if first => Token::Caret,
            _ => Token::Char(c),
        }
    }

    /// The character after `\` is always a literal. A lone trailing `\` stands for itself.
    fn escaped(&mut self) -> Token {
        Token::Char(self.chars.next().unwrap_or('\\'))
    }
}
