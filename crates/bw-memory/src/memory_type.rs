//! Memory space tags and their capability table

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Capabilities of a memory space
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MemoryTraits: u32 {
        /// Address meaning depends on live banking state
        const RELATIVE   = 0b0_0001;
        /// Video subsystem space
        const PPU        = 0b0_0010;
        /// Labels may be attached to addresses in this space
        const LABELS     = 0b0_0100;
        /// Watch expressions may reference addresses in this space
        const WATCH      = 0b0_1000;
        /// Part of a CPU's instruction fetch stream
        const EXECUTABLE = 0b1_0000;

        /// CPU-relative program space
        const CPU_RELATIVE = Self::RELATIVE.bits() | Self::WATCH.bits() | Self::EXECUTABLE.bits();
        /// Absolute storage a CPU can fetch from
        const CPU_ABSOLUTE = Self::LABELS.bits() | Self::EXECUTABLE.bits();
    }
}

/// CPU family owning a memory space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CpuType {
    Snes,
    Spc,
    Gameboy,
    Nes,
}

impl CpuType {
    pub const ALL: [CpuType; 4] = [Self::Snes, Self::Spc, Self::Gameboy, Self::Nes];

    /// The CPU's relative program space
    pub fn memory_type(self) -> MemoryType {
        match self {
            Self::Snes => MemoryType::SnesMemory,
            Self::Spc => MemoryType::SpcMemory,
            Self::Gameboy => MemoryType::GameboyMemory,
            Self::Nes => MemoryType::NesMemory,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Snes => "Snes",
            Self::Spc => "Spc",
            Self::Gameboy => "Gameboy",
            Self::Nes => "Nes",
        }
    }
}

impl fmt::Display for CpuType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One addressable memory space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MemoryType {
    SnesMemory,
    SnesPrgRom,
    SnesWorkRam,
    SnesSaveRam,
    SnesVideoRam,
    SnesSpriteRam,
    SnesCgRam,

    SpcMemory,
    SpcRam,
    SpcRom,

    GameboyMemory,
    GbPrgRom,
    GbWorkRam,
    GbCartRam,
    GbHighRam,
    GbVideoRam,
    GbSpriteRam,

    NesMemory,
    NesPrgRom,
    NesInternalRam,
    NesWorkRam,
    NesSaveRam,
    NesChrRom,
    NesChrRam,
    NesSpriteRam,
    NesPaletteRam,
}

impl MemoryType {
    pub const ALL: [MemoryType; 26] = [
        Self::SnesMemory,
        Self::SnesPrgRom,
        Self::SnesWorkRam,
        Self::SnesSaveRam,
        Self::SnesVideoRam,
        Self::SnesSpriteRam,
        Self::SnesCgRam,
        Self::SpcMemory,
        Self::SpcRam,
        Self::SpcRom,
        Self::GameboyMemory,
        Self::GbPrgRom,
        Self::GbWorkRam,
        Self::GbCartRam,
        Self::GbHighRam,
        Self::GbVideoRam,
        Self::GbSpriteRam,
        Self::NesMemory,
        Self::NesPrgRom,
        Self::NesInternalRam,
        Self::NesWorkRam,
        Self::NesSaveRam,
        Self::NesChrRom,
        Self::NesChrRam,
        Self::NesSpriteRam,
        Self::NesPaletteRam,
    ];

    /// Owning CPU and capabilities, one row per space
    fn entry(self) -> (Option<CpuType>, MemoryTraits) {
        use CpuType::*;
        match self {
            Self::SnesMemory => (Some(Snes), MemoryTraits::CPU_RELATIVE),
            Self::SnesPrgRom | Self::SnesWorkRam | Self::SnesSaveRam => {
                (Some(Snes), MemoryTraits::CPU_ABSOLUTE)
            }
            Self::SnesVideoRam | Self::SnesSpriteRam | Self::SnesCgRam => {
                (None, MemoryTraits::PPU)
            }

            Self::SpcMemory => (Some(Spc), MemoryTraits::CPU_RELATIVE),
            Self::SpcRam | Self::SpcRom => (Some(Spc), MemoryTraits::CPU_ABSOLUTE),

            Self::GameboyMemory => (Some(Gameboy), MemoryTraits::CPU_RELATIVE),
            Self::GbPrgRom | Self::GbWorkRam | Self::GbCartRam | Self::GbHighRam => {
                (Some(Gameboy), MemoryTraits::CPU_ABSOLUTE)
            }
            Self::GbVideoRam | Self::GbSpriteRam => (None, MemoryTraits::PPU),

            Self::NesMemory => (Some(Nes), MemoryTraits::CPU_RELATIVE),
            Self::NesPrgRom | Self::NesInternalRam | Self::NesWorkRam | Self::NesSaveRam => {
                (Some(Nes), MemoryTraits::CPU_ABSOLUTE)
            }
            Self::NesChrRom | Self::NesChrRam | Self::NesSpriteRam | Self::NesPaletteRam => {
                (None, MemoryTraits::PPU)
            }
        }
    }

    pub fn traits(self) -> MemoryTraits {
        self.entry().1
    }

    /// True when the address meaning depends on current banking state
    pub fn is_relative_memory(self) -> bool {
        self.traits().contains(MemoryTraits::RELATIVE)
    }

    /// True for video subsystem spaces, which never take part in CPU-relative resolution
    pub fn is_ppu_memory(self) -> bool {
        self.traits().contains(MemoryTraits::PPU)
    }

    pub fn supports_labels(self) -> bool {
        self.traits().contains(MemoryTraits::LABELS)
    }

    pub fn supports_watch(self) -> bool {
        self.traits().contains(MemoryTraits::WATCH)
    }

    /// True when the owning CPU can fetch instructions from this space
    pub fn is_executable(self) -> bool {
        self.traits().contains(MemoryTraits::EXECUTABLE)
    }

    /// Owning CPU family, `None` for CPU-agnostic spaces such as video memory
    pub fn to_cpu_type(self) -> Option<CpuType> {
        self.entry().0
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::SnesMemory => "SnesMemory",
            Self::SnesPrgRom => "SnesPrgRom",
            Self::SnesWorkRam => "SnesWorkRam",
            Self::SnesSaveRam => "SnesSaveRam",
            Self::SnesVideoRam => "SnesVideoRam",
            Self::SnesSpriteRam => "SnesSpriteRam",
            Self::SnesCgRam => "SnesCgRam",
            Self::SpcMemory => "SpcMemory",
            Self::SpcRam => "SpcRam",
            Self::SpcRom => "SpcRom",
            Self::GameboyMemory => "GameboyMemory",
            Self::GbPrgRom => "GbPrgRom",
            Self::GbWorkRam => "GbWorkRam",
            Self::GbCartRam => "GbCartRam",
            Self::GbHighRam => "GbHighRam",
            Self::GbVideoRam => "GbVideoRam",
            Self::GbSpriteRam => "GbSpriteRam",
            Self::NesMemory => "NesMemory",
            Self::NesPrgRom => "NesPrgRom",
            Self::NesInternalRam => "NesInternalRam",
            Self::NesWorkRam => "NesWorkRam",
            Self::NesSaveRam => "NesSaveRam",
            Self::NesChrRom => "NesChrRom",
            Self::NesChrRam => "NesChrRam",
            Self::NesSpriteRam => "NesSpriteRam",
            Self::NesPaletteRam => "NesPaletteRam",
        }
    }
}

impl fmt::Display for MemoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MemoryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown memory type: {s}"))
    }
}
