//! Address space constants

/// Offset reported for an address no bank currently exposes
pub const UNMAPPED: i32 = -1;

/// Size of an 8-bit CPU's 16-bit address space (NES, Game Boy, SPC700)
pub const CPU_SPACE_16: u32 = 0x1_0000;
/// Size of the SNES 24-bit address space
pub const CPU_SPACE_24: u32 = 0x100_0000;

/// NES PRG bank window (8 KB)
pub const NES_PRG_WINDOW: u32 = 0x2000;
/// NES internal RAM (2 KB, mirrored through $0000-$1FFF)
pub const NES_INTERNAL_RAM_SIZE: u32 = 0x800;

/// Game Boy ROM bank window (16 KB)
pub const GB_ROM_WINDOW: u32 = 0x4000;
/// Game Boy high RAM ($FF80-$FFFE)
pub const GB_HIGH_RAM_SIZE: u32 = 0x7F;

/// SNES bank size (64 KB)
pub const SNES_BANK_SIZE: u32 = 0x1_0000;
/// SNES work RAM (128 KB)
pub const SNES_WORK_RAM_SIZE: u32 = 0x2_0000;

/// SPC700 audio RAM (64 KB)
pub const SPC_RAM_SIZE: u32 = 0x1_0000;
/// SPC700 IPL ROM (64 bytes)
pub const SPC_ROM_SIZE: u32 = 0x40;
