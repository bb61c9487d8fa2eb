//! In-process banked core
//!
//! A small stand-in for the native emulation core, used by tests and tooling.
//! Each CPU space is split into equally sized windows and every window either
//! exposes a slice of an absolute memory or nothing. A target smaller than
//! its window is mirrored through it.

use std::collections::HashMap;

use bw_core::error::CoreError;
use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::{Mutex, RwLock};

use crate::address::AddressInfo;
use crate::constants::*;
use crate::memory_type::{CpuType, MemoryType};
use crate::native::{ConsoleNotification, NativeCore};

/// Where a CPU window currently points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BankTarget {
    pub memory_type: MemoryType,
    pub offset: u32,
}

impl BankTarget {
    pub fn new(memory_type: MemoryType, offset: u32) -> Self {
        Self {
            memory_type,
            offset,
        }
    }
}

#[derive(Debug, Clone)]
struct CpuLayout {
    space_size: u32,
    window_size: u32,
    windows: Vec<Option<BankTarget>>,
}

/// Memory sizes and initial bank mapping for a simulated program
#[derive(Debug, Clone, Default)]
pub struct SimLayout {
    memories: Vec<(MemoryType, u32)>,
    cpus: HashMap<CpuType, CpuLayout>,
}

impl SimLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an absolute memory of `size` bytes
    pub fn with_memory(mut self, memory_type: MemoryType, size: u32) -> Self {
        self.memories.push((memory_type, size));
        self
    }

    /// Add a CPU space split into `window_size` windows, all unmapped
    pub fn with_cpu(mut self, cpu_type: CpuType, space_size: u32, window_size: u32) -> Self {
        let count = space_size.div_ceil(window_size.max(1)) as usize;
        self.cpus.insert(
            cpu_type,
            CpuLayout {
                space_size,
                window_size: window_size.max(1),
                windows: vec![None; count],
            },
        );
        self
    }

    /// Point one window of a CPU space at an absolute memory
    pub fn with_window(mut self, cpu_type: CpuType, index: usize, target: BankTarget) -> Self {
        match self
            .cpus
            .get_mut(&cpu_type)
            .and_then(|cpu| cpu.windows.get_mut(index))
        {
            Some(slot) => *slot = Some(target),
            None => tracing::warn!("No window {} for {}", index, cpu_type),
        }
        self
    }

    /// NES-style layout: 2 KB internal RAM mirrored in $0000-$1FFF, work RAM
    /// at $6000, four 8 KB PRG windows with the last two fixed to the end of
    /// PRG ROM.
    pub fn nes(prg_size: u32, chr_size: u32) -> Self {
        let last = prg_size.saturating_sub(NES_PRG_WINDOW);
        let second_last = prg_size.saturating_sub(2 * NES_PRG_WINDOW);
        Self::new()
            .with_memory(MemoryType::NesPrgRom, prg_size)
            .with_memory(MemoryType::NesInternalRam, NES_INTERNAL_RAM_SIZE)
            .with_memory(MemoryType::NesWorkRam, 0x2000)
            .with_memory(MemoryType::NesChrRam, chr_size)
            .with_memory(MemoryType::NesSpriteRam, 0x100)
            .with_memory(MemoryType::NesPaletteRam, 0x20)
            .with_cpu(CpuType::Nes, CPU_SPACE_16, NES_PRG_WINDOW)
            .with_window(CpuType::Nes, 0, BankTarget::new(MemoryType::NesInternalRam, 0))
            .with_window(CpuType::Nes, 3, BankTarget::new(MemoryType::NesWorkRam, 0))
            .with_window(CpuType::Nes, 4, BankTarget::new(MemoryType::NesPrgRom, 0))
            .with_window(CpuType::Nes, 5, BankTarget::new(MemoryType::NesPrgRom, NES_PRG_WINDOW))
            .with_window(CpuType::Nes, 6, BankTarget::new(MemoryType::NesPrgRom, second_last))
            .with_window(CpuType::Nes, 7, BankTarget::new(MemoryType::NesPrgRom, last))
    }

    /// Game Boy-style layout in 4 KB windows: ROM bank 0 and a switchable
    /// ROM bank, cartridge RAM at $A000, work RAM at $C000 echoed at $E000.
    pub fn gameboy(rom_size: u32) -> Self {
        let mut layout = Self::new()
            .with_memory(MemoryType::GbPrgRom, rom_size)
            .with_memory(MemoryType::GbWorkRam, 0x2000)
            .with_memory(MemoryType::GbCartRam, 0x2000)
            .with_memory(MemoryType::GbHighRam, GB_HIGH_RAM_SIZE)
            .with_memory(MemoryType::GbVideoRam, 0x2000)
            .with_memory(MemoryType::GbSpriteRam, 0xA0)
            .with_cpu(CpuType::Gameboy, CPU_SPACE_16, 0x1000);
        let per_bank = GB_ROM_WINDOW / 0x1000;
        for bank in 0..2 {
            for i in 0..per_bank {
                layout = layout.with_window(
                    CpuType::Gameboy,
                    (bank * per_bank + i) as usize,
                    BankTarget::new(MemoryType::GbPrgRom, bank * GB_ROM_WINDOW + i * 0x1000),
                );
            }
        }
        layout
            .with_window(CpuType::Gameboy, 0xA, BankTarget::new(MemoryType::GbCartRam, 0))
            .with_window(CpuType::Gameboy, 0xB, BankTarget::new(MemoryType::GbCartRam, 0x1000))
            .with_window(CpuType::Gameboy, 0xC, BankTarget::new(MemoryType::GbWorkRam, 0))
            .with_window(CpuType::Gameboy, 0xD, BankTarget::new(MemoryType::GbWorkRam, 0x1000))
            .with_window(CpuType::Gameboy, 0xE, BankTarget::new(MemoryType::GbWorkRam, 0))
    }

    /// SNES-style layout in 64 KB banks: ROM from bank $40, work RAM in banks
    /// $7E-$7F, plus the SPC700 with its IPL ROM overlaying the top of RAM.
    pub fn snes(rom_size: u32) -> Self {
        let mut layout = Self::new()
            .with_memory(MemoryType::SnesPrgRom, rom_size)
            .with_memory(MemoryType::SnesWorkRam, SNES_WORK_RAM_SIZE)
            .with_memory(MemoryType::SnesSaveRam, 0x2000)
            .with_memory(MemoryType::SnesVideoRam, 0x1_0000)
            .with_memory(MemoryType::SpcRam, SPC_RAM_SIZE)
            .with_memory(MemoryType::SpcRom, SPC_ROM_SIZE)
            .with_cpu(CpuType::Snes, CPU_SPACE_24, SNES_BANK_SIZE)
            .with_cpu(CpuType::Spc, CPU_SPACE_16, SPC_ROM_SIZE);

        let rom_banks = rom_size.div_ceil(SNES_BANK_SIZE).min(0x3E);
        for bank in 0..rom_banks {
            layout = layout.with_window(
                CpuType::Snes,
                (0x40 + bank) as usize,
                BankTarget::new(MemoryType::SnesPrgRom, bank * SNES_BANK_SIZE),
            );
        }
        layout = layout
            .with_window(CpuType::Snes, 0x7E, BankTarget::new(MemoryType::SnesWorkRam, 0))
            .with_window(
                CpuType::Snes,
                0x7F,
                BankTarget::new(MemoryType::SnesWorkRam, SNES_BANK_SIZE),
            );

        let spc_windows = (CPU_SPACE_16 / SPC_ROM_SIZE) as usize;
        for i in 0..spc_windows - 1 {
            layout = layout.with_window(
                CpuType::Spc,
                i,
                BankTarget::new(MemoryType::SpcRam, i as u32 * SPC_ROM_SIZE),
            );
        }
        layout.with_window(CpuType::Spc, spc_windows - 1, BankTarget::new(MemoryType::SpcRom, 0))
    }
}

struct SimState {
    memories: HashMap<MemoryType, Vec<u8>>,
    cpus: HashMap<CpuType, CpuLayout>,
}

impl SimState {
    fn size(&self, memory_type: MemoryType) -> u32 {
        if memory_type.is_relative_memory() {
            memory_type
                .to_cpu_type()
                .and_then(|cpu| self.cpus.get(&cpu))
                .map_or(0, |cpu| cpu.space_size)
        } else {
            self.memories.get(&memory_type).map_or(0, |m| m.len() as u32)
        }
    }

    fn absolute(&self, relative: AddressInfo) -> AddressInfo {
        let unmapped = AddressInfo::unmapped(relative.memory_type);
        let (Some(cpu), Some(offset)) = (relative.memory_type.to_cpu_type(), relative.offset())
        else {
            return unmapped;
        };
        let Some(layout) = self.cpus.get(&cpu) else {
            return unmapped;
        };
        if offset >= layout.space_size {
            return unmapped;
        }

        let window = (offset / layout.window_size) as usize;
        let in_window = offset % layout.window_size;
        match layout.windows.get(window).copied().flatten() {
            Some(target) => {
                let size = self.size(target.memory_type);
                if size == 0 {
                    return unmapped;
                }
                AddressInfo::new((target.offset + in_window) % size, target.memory_type)
            }
            None => unmapped,
        }
    }

    fn relative(&self, absolute: AddressInfo, cpu_type: CpuType) -> AddressInfo {
        let cpu_memory = cpu_type.memory_type();
        let unmapped = AddressInfo::unmapped(cpu_memory);
        let (Some(layout), Some(offset)) = (self.cpus.get(&cpu_type), absolute.offset()) else {
            return unmapped;
        };
        let size = self.size(absolute.memory_type);
        if offset >= size {
            return unmapped;
        }

        // Lowest window wins when a byte is visible through several
        for (index, target) in layout.windows.iter().copied().enumerate() {
            let Some(target) = target.filter(|t| t.memory_type == absolute.memory_type) else {
                continue;
            };
            let in_window = (offset + size - target.offset % size) % size;
            let relative = index as u32 * layout.window_size + in_window;
            if in_window < layout.window_size && relative < layout.space_size {
                return AddressInfo::new(relative, cpu_memory);
            }
        }
        unmapped
    }

    fn read(&self, memory_type: MemoryType, offset: u32) -> Result<u8, CoreError> {
        if memory_type.is_relative_memory() {
            let abs = self.absolute(AddressInfo::new(offset, memory_type));
            return match abs.offset() {
                Some(abs_offset) => self.read(abs.memory_type, abs_offset),
                None => Ok(0),
            };
        }
        self.memories
            .get(&memory_type)
            .and_then(|m| m.get(offset as usize))
            .copied()
            .ok_or(CoreError::OutOfRange {
                memory_type: memory_type.name(),
                offset,
                size: self.size(memory_type),
            })
    }

    fn write(&mut self, memory_type: MemoryType, offset: u32, value: u8) -> Result<(), CoreError> {
        if memory_type.is_relative_memory() {
            let abs = self.absolute(AddressInfo::new(offset, memory_type));
            return match abs.offset() {
                Some(abs_offset) => self.write(abs.memory_type, abs_offset, value),
                None => {
                    tracing::trace!("Dropped write to unmapped {}:${:04X}", memory_type, offset);
                    Ok(())
                }
            };
        }
        let size = self.size(memory_type);
        match self
            .memories
            .get_mut(&memory_type)
            .and_then(|m| m.get_mut(offset as usize))
        {
            Some(byte) => {
                *byte = value;
                Ok(())
            }
            None => Err(CoreError::OutOfRange {
                memory_type: memory_type.name(),
                offset,
                size,
            }),
        }
    }
}

/// Banked core simulation implementing [`NativeCore`]
pub struct BankedCore {
    state: RwLock<Option<SimState>>,
    listeners: Mutex<Vec<Sender<ConsoleNotification>>>,
}

impl BankedCore {
    /// Create a core with no program loaded
    pub fn new() -> Self {
        Self {
            state: RwLock::new(None),
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Load a program layout; all memories start zeroed
    pub fn load(&self, layout: SimLayout) {
        let memories = layout
            .memories
            .into_iter()
            .map(|(t, size)| (t, vec![0u8; size as usize]))
            .collect();
        *self.state.write() = Some(SimState {
            memories,
            cpus: layout.cpus,
        });
        tracing::info!("Banked core loaded");
        self.notify(ConsoleNotification::GameLoaded);
    }

    /// Unload the program; later queries fail with `NotInitialized`
    pub fn unload(&self) {
        *self.state.write() = None;
        tracing::info!("Banked core unloaded");
    }

    pub fn is_loaded(&self) -> bool {
        self.state.read().is_some()
    }

    /// Switch a CPU window to a new target, or unmap it
    pub fn map_window(
        &self,
        cpu_type: CpuType,
        index: usize,
        target: Option<BankTarget>,
    ) -> Result<(), CoreError> {
        let mut guard = self.state.write();
        let state = guard.as_mut().ok_or(CoreError::NotInitialized)?;
        let layout = state.cpus.get_mut(&cpu_type).ok_or(CoreError::OutOfRange {
            memory_type: cpu_type.memory_type().name(),
            offset: index as u32,
            size: 0,
        })?;
        let count = layout.windows.len() as u32;
        let slot = layout.windows.get_mut(index).ok_or(CoreError::OutOfRange {
            memory_type: cpu_type.memory_type().name(),
            offset: index as u32,
            size: count,
        })?;
        *slot = target;
        tracing::debug!("{} window {} -> {:?}", cpu_type, index, target);
        Ok(())
    }

    /// Read one byte; relative reads go through the current mapping
    pub fn peek(&self, memory_type: MemoryType, offset: u32) -> Result<u8, CoreError> {
        self.state
            .read()
            .as_ref()
            .ok_or(CoreError::NotInitialized)?
            .read(memory_type, offset)
    }

    /// Register a notification listener
    pub fn subscribe(&self) -> Receiver<ConsoleNotification> {
        let (tx, rx) = channel::unbounded();
        self.listeners.lock().push(tx);
        rx
    }

    /// Signal the end of a video frame
    pub fn frame_done(&self) {
        self.notify(ConsoleNotification::PpuFrameDone);
    }

    /// Signal that execution paused
    pub fn code_break(&self) {
        self.notify(ConsoleNotification::CodeBreak);
    }

    fn notify(&self, notification: ConsoleNotification) {
        self.listeners
            .lock()
            .retain(|tx| tx.send(notification).is_ok());
    }

    fn with_state<T>(&self, f: impl FnOnce(&SimState) -> Result<T, CoreError>) -> Result<T, CoreError> {
        f(self.state.read().as_ref().ok_or(CoreError::NotInitialized)?)
    }

    fn with_state_mut<T>(
        &self,
        f: impl FnOnce(&mut SimState) -> Result<T, CoreError>,
    ) -> Result<T, CoreError> {
        f(self.state.write().as_mut().ok_or(CoreError::NotInitialized)?)
    }
}

impl Default for BankedCore {
    fn default() -> Self {
        Self::new()
    }
}

impl NativeCore for BankedCore {
    fn absolute_address(&self, relative: AddressInfo) -> Result<AddressInfo, CoreError> {
        self.with_state(|s| Ok(s.absolute(relative)))
    }

    fn relative_address(
        &self,
        absolute: AddressInfo,
        cpu_type: CpuType,
    ) -> Result<AddressInfo, CoreError> {
        self.with_state(|s| Ok(s.relative(absolute, cpu_type)))
    }

    fn memory_size(&self, memory_type: MemoryType) -> Result<u32, CoreError> {
        self.with_state(|s| Ok(s.size(memory_type)))
    }

    fn set_memory_value(
        &self,
        memory_type: MemoryType,
        offset: u32,
        value: u8,
    ) -> Result<(), CoreError> {
        self.with_state_mut(|s| s.write(memory_type, offset, value))
    }

    fn memory_state(&self, memory_type: MemoryType) -> Result<Vec<u8>, CoreError> {
        self.with_state(|s| {
            if memory_type.is_relative_memory() {
                (0..s.size(memory_type))
                    .map(|offset| s.read(memory_type, offset))
                    .collect()
            } else {
                Ok(s.memories.get(&memory_type).cloned().unwrap_or_default())
            }
        })
    }

    fn set_memory_state(&self, memory_type: MemoryType, data: &[u8]) -> Result<(), CoreError> {
        self.with_state_mut(|s| {
            let size = s.size(memory_type) as usize;
            if data.len() > size {
                return Err(CoreError::StateSizeMismatch {
                    memory_type: memory_type.name(),
                    expected: size,
                    actual: data.len(),
                });
            }
            for (offset, &value) in data.iter().enumerate() {
                s.write(memory_type, offset as u32, value)?;
            }
            Ok(())
        })
    }
}
