//! Type-checked syntax tree handed over by the semantic pass.
mod type_spec;
pub mod typed;

pub use type_spec::*;
