//! Tokenizer error type: every failure carries the
//! offending `{line, column, character}` in addition to a `purc_core`
//! error kind.

use purc_core::PurcErrorKind;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct TokenizerError {
    pub kind: PurcErrorKind,
    pub line: usize,
    pub column: usize,
    pub character: Option<char>,
    pub message: String,
}

impl TokenizerError {
    pub fn new(kind: PurcErrorKind, line: usize, column: usize, character: Option<char>, message: impl Into<String>) -> Self {
        Self {
            kind,
            line,
            column,
            character,
            message: message.into(),
        }
    }
}

impl fmt::Display for TokenizerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.character {
            Some(c) => write!(f, "{} at {}:{} (near '{}'): {}", self.kind, self.line, self.column, c, self.message),
            None => write!(f, "{} at {}:{}: {}", self.kind, self.line, self.column, self.message),
        }
    }
}

impl std::error::Error for TokenizerError {}

pub type Result<T> = std::result::Result<T, TokenizerError>;
