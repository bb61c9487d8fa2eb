//! Relative/absolute address resolution
//!
//! The resolver never caches. Bank switches can happen between any two calls,
//! so each query goes back to the native core for the current mapping.

use std::sync::Arc;

use bw_core::error::CoreError;
use bw_core::resolver_trace;

use crate::address::AddressInfo;
use crate::memory_type::{CpuType, MemoryType};
use crate::native::NativeCore;

/// Converts addresses between coexisting memory spaces
#[derive(Clone)]
pub struct AddressResolver {
    core: Arc<dyn NativeCore>,
}

impl AddressResolver {
    /// Create a resolver over a native core
    pub fn new(core: Arc<dyn NativeCore>) -> Self {
        Self { core }
    }

    /// The native core queried by this resolver
    pub fn core(&self) -> &Arc<dyn NativeCore> {
        &self.core
    }

    /// Absolute address currently backing `relative`
    ///
    /// Addresses already in an absolute space are returned unchanged.
    pub fn absolute_address(&self, relative: AddressInfo) -> Result<AddressInfo, CoreError> {
        if !relative.memory_type.is_relative_memory() {
            return Ok(relative);
        }
        if !relative.is_mapped() {
            return Ok(relative);
        }

        let absolute = self.core.absolute_address(relative)?;
        resolver_trace!("{} -> {}", relative, absolute);
        if absolute.is_mapped() {
            Ok(absolute)
        } else {
            Ok(AddressInfo::unmapped(absolute.memory_type))
        }
    }

    /// Relative address through which `cpu_type` currently sees `absolute`
    ///
    /// Returns the unmapped sentinel in `cpu_type`'s space when no active bank
    /// exposes the byte, or when the byte lives in video memory.
    pub fn relative_address(
        &self,
        absolute: AddressInfo,
        cpu_type: CpuType,
    ) -> Result<AddressInfo, CoreError> {
        let cpu_memory = cpu_type.memory_type();
        if absolute.memory_type == cpu_memory {
            return Ok(absolute);
        }
        if !absolute.is_mapped()
            || absolute.memory_type.is_ppu_memory()
            || absolute.memory_type.is_relative_memory()
        {
            return Ok(AddressInfo::unmapped(cpu_memory));
        }

        let relative = self.core.relative_address(absolute, cpu_type)?;
        resolver_trace!("{} -> {} ({})", absolute, relative, cpu_type);
        if relative.is_mapped() {
            Ok(relative)
        } else {
            Ok(AddressInfo::unmapped(cpu_memory))
        }
    }

    /// Relative address in the space of the CPU that owns `absolute`
    pub fn owner_relative_address(&self, absolute: AddressInfo) -> Result<AddressInfo, CoreError> {
        match absolute.memory_type.to_cpu_type() {
            Some(cpu_type) => self.relative_address(absolute, cpu_type),
            None => Ok(AddressInfo::unmapped(absolute.memory_type)),
        }
    }

    /// Absolute key under which a label for `address` in `memory_type` is filed
    ///
    /// Relative addresses resolve first. `None` means no label can be attached
    /// right now: the byte is unmapped or its space does not support labels.
    pub fn label_address(
        &self,
        memory_type: MemoryType,
        address: u32,
    ) -> Result<Option<AddressInfo>, CoreError> {
        let addr = AddressInfo::new(address, memory_type);
        let key = if memory_type.is_relative_memory() {
            self.absolute_address(addr)?
        } else {
            addr
        };
        Ok((key.is_mapped() && key.memory_type.supports_labels()).then_some(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{BankTarget, BankedCore, SimLayout};

    fn nes_resolver() -> (Arc<BankedCore>, AddressResolver) {
        let core = Arc::new(BankedCore::new());
        core.load(SimLayout::nes(0x8000, 0x2000));
        let resolver = AddressResolver::new(core.clone());
        (core, resolver)
    }

    #[test]
    fn test_absolute_passthrough() {
        let (_core, resolver) = nes_resolver();
        let abs = AddressInfo::new(0x10, MemoryType::NesPrgRom);
        assert_eq!(resolver.absolute_address(abs).unwrap(), abs);
    }

    #[test]
    fn test_not_initialized_is_error() {
        let resolver = AddressResolver::new(Arc::new(BankedCore::new()));
        let rel = AddressInfo::new(0x8000, MemoryType::NesMemory);
        assert_eq!(
            resolver.absolute_address(rel),
            Err(CoreError::NotInitialized)
        );
    }

    #[test]
    fn test_ppu_never_resolves_to_cpu() {
        let (_core, resolver) = nes_resolver();
        let chr = AddressInfo::new(0x10, MemoryType::NesChrRam);
        let rel = resolver.relative_address(chr, CpuType::Nes).unwrap();
        assert!(!rel.is_mapped());
        assert_eq!(rel.memory_type, MemoryType::NesMemory);
        assert!(!resolver.owner_relative_address(chr).unwrap().is_mapped());
    }

    #[test]
    fn test_label_address_resolves_relative() {
        let (core, resolver) = nes_resolver();
        core.map_window(
            CpuType::Nes,
            4,
            Some(BankTarget::new(MemoryType::NesPrgRom, 0x2000)),
        )
        .unwrap();

        let key = resolver
            .label_address(MemoryType::NesMemory, 0x8005)
            .unwrap();
        assert_eq!(key, Some(AddressInfo::new(0x2005, MemoryType::NesPrgRom)));

        core.map_window(CpuType::Nes, 4, None).unwrap();
        assert_eq!(
            resolver.label_address(MemoryType::NesMemory, 0x8005).unwrap(),
            None
        );
    }

    #[test]
    fn test_label_address_rejects_ppu() {
        let (_core, resolver) = nes_resolver();
        assert_eq!(
            resolver.label_address(MemoryType::NesPaletteRam, 0).unwrap(),
            None
        );
        assert!(resolver
            .label_address(MemoryType::NesWorkRam, 0x10)
            .unwrap()
            .is_some());
    }
}
