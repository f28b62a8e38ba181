//! Assignment of variables to registers.

mod allocator;
mod register_file;

pub use allocator::RegisterAllocator;
pub use register_file::RegisterFile;
