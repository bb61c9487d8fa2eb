//! Memory tools for the bankwise debugger
//!
//! The action layer behind a hex viewer: label and breakpoint editing on the
//! current selection, watches, "view in debugger", TBL text decoding, and
//! the reaction to notifications raised by the emulation core.

pub mod listener;
pub mod memory_tools;

pub use listener::spawn_listener;
pub use memory_tools::{EditOutcome, EditorHost, MemoryTools, Selection};
