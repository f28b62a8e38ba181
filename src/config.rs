//! Back end configuration.
use std::fmt::{self, Display, Formatter};

use crate::error::BackendError;

/// Register file size used when neither the program nor the caller picks one.
pub const DEFAULT_REGISTER_COUNT: usize = 256;

/// The number of registers available to the allocator. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterCapacity(usize);
impl RegisterCapacity {
    pub fn new(count: usize) -> Result<Self, BackendError> {
        if count == 0 {
            return Err(BackendError::InvalidRegisterCount(count));
        }
        Ok(Self(count))
    }

    pub fn get(self) -> usize {
        self.0
    }
}
impl Default for RegisterCapacity {
    fn default() -> Self {
        Self(DEFAULT_REGISTER_COUNT)
    }
}
impl Display for RegisterCapacity {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_registers_is_rejected() {
        assert_eq!(
            Err(BackendError::InvalidRegisterCount(0)),
            RegisterCapacity::new(0)
        );
    }

    #[test]
    fn default_capacity_is_256() {
        assert_eq!(256, RegisterCapacity::default().get());
    }
}
