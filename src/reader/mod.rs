//! Reader for the textual form of straight-line programs:
//!
//! ```text
//! NumberRegister 2;
//! num a, b, c;
//! a = b + c;   // also `x = y` and `x = - y`
//! return a;
//! ```
//!
//! Statements end at a `;` or a line break. Integer literals may carry a
//! leading `#`.
mod char_ext;
mod char_lexer;
mod error;
mod lexer;
mod parser;
mod tokens;

pub use error::{ReadError, ReadErrorKind};

use crate::{codegen::StraightLine, config::RegisterCapacity, error::BackendError};

/// Read a straight-line program. A `NumberRegister` directive in the source
/// takes precedence over `default_capacity`.
pub fn read(
    source: &str,
    default_capacity: RegisterCapacity,
) -> Result<StraightLine, BackendError> {
    let tokens = lexer::lex(source)?;
    parser::parse(tokens, default_capacity)
}
