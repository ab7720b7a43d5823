//! Turns input lines into [`CellDefinition`]s.
//!
//! Grammar, one definition per line:
//!
//! ```text
//! <cell> <sep> <integer>
//! <cell> <sep> <cell> { <sep> <cell> }
//! ```
//!
//! `<sep>` is any run of non-alphanumeric characters. A right-hand cell (or
//! literal) whose closest preceding non-blank separator is `-` is negated.
//! Lines without any token are ignored; lines that start a definition but
//! cannot finish it are reported and skipped, never fatal.

use std::io::BufRead;

use linsheet_common::{CellDefinition, CellId, CellIdError, Term};
use thiserror::Error;

use crate::tokenizer::{Token, TokenKind, Tokenizer};

/// What went wrong on a single line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("invalid cell name {name:?}: {source}")]
    InvalidCell { name: String, source: CellIdError },
    #[error("definition of {0} has no right-hand side")]
    MissingDefinition(CellId),
    #[error("literal {0:?} does not fit in a 64-bit integer")]
    InvalidLiteral(String),
    #[error("unexpected {kind} token {value:?} after {target}")]
    UnexpectedToken {
        target: CellId,
        kind: TokenKind,
        value: String,
    },
}

/// A line-level parse failure. The line is skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {kind}")]
pub struct ParseError {
    /// 1-based line number.
    pub line: usize,
    pub kind: ParseErrorKind,
}

/// Everything recovered from one input source.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ParsedSource {
    pub definitions: Vec<CellDefinition>,
    pub errors: Vec<ParseError>,
}

impl ParsedSource {
    fn push_line(&mut self, line_no: usize, line: &str) {
        match parse_line(line) {
            Ok(Some(definition)) => self.definitions.push(definition),
            Ok(None) => {}
            Err(kind) => self.errors.push(ParseError {
                line: line_no,
                kind,
            }),
        }
    }
}

fn cell_of(token: &Token<'_>) -> Result<CellId, ParseErrorKind> {
    token
        .value
        .parse()
        .map_err(|source| ParseErrorKind::InvalidCell {
            name: token.value.to_string(),
            source,
        })
}

/// Parse a single line. `Ok(None)` means the line carried no token at all.
pub fn parse_line(line: &str) -> Result<Option<CellDefinition>, ParseErrorKind> {
    let mut tokens = Tokenizer::new(line);
    let Some(head) = tokens.next() else {
        return Ok(None);
    };
    let target = cell_of(&head)?;

    let first = tokens
        .next()
        .ok_or(ParseErrorKind::MissingDefinition(target))?;

    if first.kind == TokenKind::Number {
        let magnitude: i64 = first
            .value
            .parse()
            .map_err(|_| ParseErrorKind::InvalidLiteral(first.value.to_string()))?;
        if let Some(extra) = tokens.next() {
            return Err(ParseErrorKind::UnexpectedToken {
                target,
                kind: extra.kind,
                value: extra.value.to_string(),
            });
        }
        let value = if first.negated { -magnitude } else { magnitude };
        return Ok(Some(CellDefinition::literal(target, value)));
    }

    let mut terms = Vec::new();
    for token in std::iter::once(first).chain(tokens) {
        if token.kind != TokenKind::Name {
            return Err(ParseErrorKind::UnexpectedToken {
                target,
                kind: token.kind,
                value: token.value.to_string(),
            });
        }
        let cell = cell_of(&token)?;
        terms.push(if token.negated {
            Term::minus(cell)
        } else {
            Term::plus(cell)
        });
    }
    Ok(Some(CellDefinition::formula(target, terms)))
}

/// Parse a whole in-memory source, collecting definitions and per-line errors.
pub fn parse_source(source: &str) -> ParsedSource {
    let mut parsed = ParsedSource::default();
    for (idx, line) in source.lines().enumerate() {
        parsed.push_line(idx + 1, line);
    }
    parsed
}

/// Parse from a buffered reader. Only I/O failures are returned as errors.
pub fn parse_reader<R: BufRead>(reader: R) -> std::io::Result<ParsedSource> {
    let mut parsed = ParsedSource::default();
    for (idx, line) in reader.lines().enumerate() {
        parsed.push_line(idx + 1, &line?);
    }
    Ok(parsed)
}
