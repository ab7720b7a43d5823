pub mod parser;
pub mod tokenizer;

pub use parser::{ParseError, ParseErrorKind, ParsedSource, parse_line, parse_reader, parse_source};
pub use tokenizer::{Token, TokenKind, Tokenizer};

// Re-export common types
pub use linsheet_common::{CellDefinition, CellId, CellIdError, Definition, Term};
