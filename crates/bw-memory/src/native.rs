//! Native emulation core boundary
//!
//! The emulation core owns all banking and mapping state. Everything here is a
//! read of a value that may change between any two calls; callers re-query
//! instead of holding on to results.

use std::sync::Arc;

use bw_core::error::CoreError;

use crate::address::AddressInfo;
use crate::memory_type::{CpuType, MemoryType};

/// Live memory and mapping queries served by the emulation core
///
/// Every method fails with [`CoreError::NotInitialized`] when no program is
/// loaded. Addresses that no bank exposes come back with a negative offset.
pub trait NativeCore: Send + Sync {
    /// Absolute address currently backing a relative one
    fn absolute_address(&self, relative: AddressInfo) -> Result<AddressInfo, CoreError>;

    /// Canonical relative address through which `cpu_type` currently sees an absolute one
    fn relative_address(
        &self,
        absolute: AddressInfo,
        cpu_type: CpuType,
    ) -> Result<AddressInfo, CoreError>;

    /// Size of a memory space in bytes, zero when the program has none
    fn memory_size(&self, memory_type: MemoryType) -> Result<u32, CoreError>;

    fn set_memory_value(
        &self,
        memory_type: MemoryType,
        offset: u32,
        value: u8,
    ) -> Result<(), CoreError>;

    /// Snapshot of a whole memory space
    fn memory_state(&self, memory_type: MemoryType) -> Result<Vec<u8>, CoreError>;

    fn set_memory_state(&self, memory_type: MemoryType, data: &[u8]) -> Result<(), CoreError>;
}

impl<T: NativeCore + ?Sized> NativeCore for Arc<T> {
    fn absolute_address(&self, relative: AddressInfo) -> Result<AddressInfo, CoreError> {
        (**self).absolute_address(relative)
    }

    fn relative_address(
        &self,
        absolute: AddressInfo,
        cpu_type: CpuType,
    ) -> Result<AddressInfo, CoreError> {
        (**self).relative_address(absolute, cpu_type)
    }

    fn memory_size(&self, memory_type: MemoryType) -> Result<u32, CoreError> {
        (**self).memory_size(memory_type)
    }

    fn set_memory_value(
        &self,
        memory_type: MemoryType,
        offset: u32,
        value: u8,
    ) -> Result<(), CoreError> {
        (**self).set_memory_value(memory_type, offset, value)
    }

    fn memory_state(&self, memory_type: MemoryType) -> Result<Vec<u8>, CoreError> {
        (**self).memory_state(memory_type)
    }

    fn set_memory_state(&self, memory_type: MemoryType, data: &[u8]) -> Result<(), CoreError> {
        (**self).set_memory_state(memory_type, data)
    }
}

/// Asynchronous notifications raised by the emulation thread
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsoleNotification {
    /// A video frame finished rendering
    PpuFrameDone,
    /// Execution paused (breakpoint, step, or user request)
    CodeBreak,
    /// A program was loaded; memory sizes and mappings changed
    GameLoaded,
}

/// Consumer of core notifications
///
/// Handlers re-read live state after each notification. Resolution results
/// computed before the notification must be treated as stale.
pub trait NotificationHandler {
    fn process_notification(&mut self, notification: ConsoleNotification);
}
