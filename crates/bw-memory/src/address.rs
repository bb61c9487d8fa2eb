//! Address value type

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::UNMAPPED;
use crate::memory_type::MemoryType;

/// An offset within one memory space
///
/// A negative offset means no mapping exists. That is an ordinary outcome of
/// resolution, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AddressInfo {
    pub address: i32,
    pub memory_type: MemoryType,
}

impl AddressInfo {
    /// Address at `offset`; offsets beyond `i32::MAX` cannot be represented
    /// and come back unmapped.
    pub fn new(offset: u32, memory_type: MemoryType) -> Self {
        Self {
            address: i32::try_from(offset).unwrap_or(UNMAPPED),
            memory_type,
        }
    }

    /// The "no mapping" sentinel for a space
    pub const fn unmapped(memory_type: MemoryType) -> Self {
        Self {
            address: UNMAPPED,
            memory_type,
        }
    }

    #[inline]
    pub fn is_mapped(&self) -> bool {
        self.address >= 0
    }

    /// Offset if mapped
    #[inline]
    pub fn offset(&self) -> Option<u32> {
        u32::try_from(self.address).ok()
    }
}

impl fmt::Display for AddressInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.offset() {
            Some(offset) => write!(f, "{}:${:04X}", self.memory_type, offset),
            None => write!(f, "{}:unmapped", self.memory_type),
        }
    }
}
