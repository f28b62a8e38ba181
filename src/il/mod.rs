//! Intermediate code generation.

mod generator;
mod label_generator;
mod name_generator;
mod tac;

pub use generator::{generate, GenMode};
pub use tac::*;
