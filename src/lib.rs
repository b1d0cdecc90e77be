//! StackLink device model
//!
//! A behavioral model of the StackLink plate-handling track: topology and
//! inventory, fault-injection flags, and the command engine that reproduces
//! the device's protocol responses, codes, and movement semantics.

pub mod command;
pub mod config;
pub mod state;

pub use command::Engine;
pub use config::DeviceConfig;
pub use state::{DeviceState, SharedDevice};
