//! Address-keyed debugging registries for the bankwise debugger
//!
//! This crate provides the annotation state a debugger keeps per program:
//! - Code labels keyed by absolute (address, memory type)
//! - Range breakpoints on read, write and execute
//! - Watch expression lists per CPU
//! - Custom character tables (TBL) for text display
//! - The workspace that owns all of the above and persists it

pub mod breakpoint;
pub mod label;
pub mod tbl;
pub mod watch;
pub mod workspace;

pub use breakpoint::{AccessKind, Breakpoint, BreakpointManager};
pub use label::{CodeLabel, LabelManager};
pub use tbl::TblConverter;
pub use watch::{WatchManager, WatchRegistry};
pub use workspace::{DebugWorkspace, WorkspaceData};
