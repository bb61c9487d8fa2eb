//! Memory spaces and address resolution for the bankwise debugger
//!
//! The same physical byte can be reached through several coexisting address
//! spaces. This crate names those spaces, classifies them, and converts
//! addresses between CPU-relative and absolute spaces by asking the native
//! emulation core for its live mapping state.

pub mod address;
pub mod bridge;
pub mod constants;
pub mod memory_type;
pub mod native;
pub mod resolver;
pub mod sim;

pub use address::AddressInfo;
pub use bridge::{CoreHost, RemoteCore};
pub use memory_type::{CpuType, MemoryTraits, MemoryType};
pub use native::{ConsoleNotification, NativeCore, NotificationHandler};
pub use resolver::AddressResolver;
pub use sim::{BankTarget, BankedCore, SimLayout};
