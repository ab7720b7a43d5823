//! Splits one input line into alphanumeric tokens.
//!
//! Every maximal run of ASCII letters and digits is a token; anything else
//! (spaces, `=`, `+`, punctuation) only separates tokens. The one separator
//! that carries meaning is `-`: a token whose closest preceding non-blank
//! character is `-` is marked as negated.

use std::fmt::{self, Display};

/// The lexical class of a token, decided by its first character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Starts with a letter (`A1`, `b12`).
    Name,
    /// Starts with a digit (`42`).
    Number,
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// A token borrowed from the input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token<'a> {
    pub value: &'a str,
    pub kind: TokenKind,
    pub negated: bool,
    pub start: usize,
    pub end: usize,
}

impl Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.negated { "-" } else { "" };
        write!(f, "<{} {}{}>", self.kind, sign, self.value)
    }
}

/// Iterator over the tokens of a single line.
#[derive(Debug, Clone)]
pub struct Tokenizer<'a> {
    line: &'a str,
    offset: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(line: &'a str) -> Self {
        Self { line, offset: 0 }
    }

    /// The unconsumed remainder of the line.
    pub fn remainder(&self) -> &'a str {
        &self.line[self.offset..]
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.line.as_bytes();
        let mut negated = false;
        let mut pos = self.offset;
        while pos < bytes.len() && !bytes[pos].is_ascii_alphanumeric() {
            match bytes[pos] {
                b'-' => negated = true,
                b' ' | b'\t' | b'\r' => {}
                _ => negated = false,
            }
            pos += 1;
        }
        if pos == bytes.len() {
            self.offset = pos;
            return None;
        }

        let start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_alphanumeric() {
            pos += 1;
        }
        self.offset = pos;

        let kind = if bytes[start].is_ascii_digit() {
            TokenKind::Number
        } else {
            TokenKind::Name
        };
        Some(Token {
            value: &self.line[start..pos],
            kind,
            negated,
            start,
            end: pos,
        })
    }
}
