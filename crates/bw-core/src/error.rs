//! Error types for the bankwise debugger
//!
//! An address that no bank currently exposes is not an error. Resolvers report
//! it with the `-1` offset sentinel, so nothing in this module describes it.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures crossing the native emulation core boundary
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Native core is not initialized")]
    NotInitialized,
    #[error("Offset 0x{offset:x} is outside {memory_type} (size 0x{size:x})")]
    OutOfRange {
        memory_type: &'static str,
        offset: u32,
        size: u32,
    },
    #[error("Memory state for {memory_type} is {actual} bytes, expected {expected}")]
    StateSizeMismatch {
        memory_type: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("Native core thread disconnected")]
    Disconnected,
}

/// Label registry errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LabelError {
    #[error("{0} does not support labels")]
    UnsupportedMemoryType(&'static str),
    #[error("Invalid label name: {0:?}")]
    InvalidName(String),
    #[error("Label name {name:?} is already used at ${address:04X}")]
    DuplicateName { name: String, address: u32 },
}

/// Breakpoint registry errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BreakpointError {
    #[error("Invalid breakpoint range: start 0x{start:x} > end 0x{end:x}")]
    InvalidRange { start: u32, end: u32 },
    #[error("Breakpoint not found: {0}")]
    NotFound(u32),
}

/// Watch registry errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WatchError {
    #[error("{0} does not support watch expressions")]
    UnsupportedMemoryType(&'static str),
    #[error("Watch index {index} out of range (count {count})")]
    IndexOutOfRange { index: usize, count: usize },
}

/// TBL character table errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TblError {
    #[error("Line {line}: missing '=' separator")]
    MissingSeparator { line: usize },
    #[error("Line {line}: invalid byte sequence {key:?}")]
    InvalidKey { line: usize, key: String },
}

/// Workspace persistence errors
#[derive(Error, Debug)]
pub enum WorkspaceError {
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to parse workspace {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("Failed to serialize workspace: {0}")]
    Serialize(String),
    #[error("Workspace label rejected: {0}")]
    Label(#[from] LabelError),
    #[error("Workspace breakpoint rejected: {0}")]
    Breakpoint(#[from] BreakpointError),
    #[error("Workspace TBL mappings rejected: {0}")]
    Tbl(#[from] TblError),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No configuration directory available on this platform")]
    NoConfigDir,
    #[error("Config I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Top-level debugger error
#[derive(Error, Debug)]
pub enum DebuggerError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Label(#[from] LabelError),
    #[error(transparent)]
    Breakpoint(#[from] BreakpointError),
    #[error(transparent)]
    Watch(#[from] WatchError),
    #[error(transparent)]
    Tbl(#[from] TblError),
    #[error(transparent)]
    Workspace(#[from] WorkspaceError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, DebuggerError>;
