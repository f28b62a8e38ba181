use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReadErrorKind {
    #[error("unexpected {found}, expected {expected}")]
    UnexpectedToken {
        found: String,
        expected: &'static str,
    },
    #[error("unexpected end of input, expected {0}")]
    UnexpectedEnd(&'static str),
    #[error("invalid integer literal '{0}'")]
    InvalidInteger(String),
    #[error("unknown symbol '{0}'")]
    UnknownSymbol(char),
    #[error("'{0}' is used without a 'num' declaration")]
    Undeclared(String),
}

/// A malformed straight-line program, located by line number.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("line {line}: {kind}")]
pub struct ReadError {
    pub line: usize,
    pub kind: ReadErrorKind,
}
impl ReadError {
    pub fn new(line: usize, kind: ReadErrorKind) -> Self {
        Self { line, kind }
    }
}
