//! Core infrastructure for the bankwise debugger
//!
//! This crate provides the pieces every other bankwise crate leans on:
//! - Error taxonomy for the native boundary and the debug registries
//! - Persistent configuration
//! - Logging setup and per-component logging macros

pub mod config;
pub mod error;
pub mod logging;

pub use config::Config;
pub use error::{DebuggerError, Result};
