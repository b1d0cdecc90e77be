//! Device state for the simulated StackLink
//!
//! This module handles:
//! - Track topology and plate inventory (stops, stacks, lift map)
//! - Fault-injection flags for forcing error responses
//! - Plate identity allocation and the in-flight move registry
//! - The shared, mutex-guarded handle both sessions and the dashboard use

mod device;
mod flags;
mod shared;
mod topology;

pub use device::{ActiveMove, DeviceState};
pub use flags::{FaultFlags, LiftFaults};
pub use shared::{DeviceSnapshot, MoveSnapshot, SharedDevice, StackSnapshot, StopSnapshot};
pub use topology::{Stack, TrackStop};
