use thiserror::Error;

use crate::{listing::Position, reader::ReadError};

/// Any fault that aborts a back end pass. The back end assumes validated input,
/// so every one of these is fatal: there is no partial output and no recovery.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BackendError {
    #[error("undefined identifier: '{0}'")]
    UndefinedIdentifier(String),
    #[error("unknown enum member: '{0}'")]
    UnknownEnumMember(String),
    #[error("type mismatch in {construct}: expected {expected}, found '{found}'")]
    TypeMismatch {
        construct: &'static str,
        expected: &'static str,
        found: String,
    },
    #[error("'break' outside of a loop or switch")]
    BreakOutsideLoop,
    #[error("register capacity must be positive, got {0}")]
    InvalidRegisterCount(usize),
    #[error("line {0}: '{1}' is a control flow instruction and cannot be register-allocated")]
    ControlFlow(Position, String),
    #[error("no register can be freed to hold '{0}'")]
    NoEvictionCandidate(String),
    #[error(transparent)]
    Read(#[from] ReadError),
}

impl BackendError {
    pub fn type_mismatch<S: ToString>(
        construct: &'static str,
        expected: &'static str,
        found: S,
    ) -> Self {
        Self::TypeMismatch {
            construct,
            expected,
            found: found.to_string(),
        }
    }
}
