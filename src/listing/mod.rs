//! Generic logic for code listings (TAC, straight-line programs, target code).

mod generic_listing;
mod position;

pub use generic_listing::*;
pub use position::*;
