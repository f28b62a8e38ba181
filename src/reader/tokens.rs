//! Tokens, as produced by the lexer.
use std::fmt::{self, Display};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub line: usize,
    pub kind: TokenKind,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Keyword(Keyword),
    Identifier(String),
    Integer(i64),
    Symbol(Symbol),
    /// A `;` or a line break.
    Terminator,
}
impl Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TokenKind::Keyword(keyword) => write!(f, "'{}'", keyword),
            TokenKind::Identifier(id) => write!(f, "'{}'", id),
            TokenKind::Integer(value) => write!(f, "'{}'", value),
            TokenKind::Symbol(symbol) => write!(f, "'{}'", symbol),
            TokenKind::Terminator => f.write_str("end of statement"),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Keyword {
    NumberRegister,
    Num,
    Return,
}
impl Keyword {
    pub fn from_word(word: &str) -> Option<Self> {
        match word {
            "NumberRegister" => Some(Keyword::NumberRegister),
            "num" => Some(Keyword::Num),
            "return" => Some(Keyword::Return),
            _ => None,
        }
    }
}
impl Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Keyword::NumberRegister => "NumberRegister",
            Keyword::Num => "num",
            Keyword::Return => "return",
        })
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Symbol {
    Assign,
    Plus,
    Minus,
    Asterisk,
    Slash,
    Comma,
}
impl Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Symbol::Assign => "=",
            Symbol::Plus => "+",
            Symbol::Minus => "-",
            Symbol::Asterisk => "*",
            Symbol::Slash => "/",
            Symbol::Comma => ",",
        })
    }
}
