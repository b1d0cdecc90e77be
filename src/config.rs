//! Startup configuration for the simulated device
//!
//! The configuration is an immutable snapshot handed to [`DeviceState`] at
//! construction; nothing re-reads it at runtime. File parsing and CLI
//! concerns live outside this crate.
//!
//! [`DeviceState`]: crate::state::DeviceState

use std::time::Duration;

use thiserror::Error;

/// Version string reported by the VERSION command.
pub const VERSION_INFO: &str = "StackLink Virtual 1.1.0 (configurable)";

/// Default capacity of a plate stack.
pub const DEFAULT_STACK_CAPACITY: u32 = 30;

/// Errors raised while validating a device configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no stops configured")]
    NoStops,

    #[error("stop ids must be contiguous starting at 1, found {0}")]
    NonContiguousStops(u32),

    #[error("duplicate lift index {0}")]
    DuplicateLift(u32),

    #[error("lift {lift}: initial count {count} exceeds capacity {capacity}")]
    CountOverCapacity { lift: u32, count: u32, capacity: u32 },
}

/// What kind of station a stop is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopKind {
    /// Access point of a plate stack, served by the given lift.
    Stack {
        lift: u32,
        capacity: u32,
        initial_count: u32,
    },
    /// Discard chute; no sensor.
    Waste,
    /// Camera or other instrument station.
    Camera,
}

/// One stop descriptor.
#[derive(Debug, Clone)]
pub struct StopConfig {
    pub id: u32,
    pub kind: StopKind,
    /// Display name; defaults to a derived name when absent.
    pub name: Option<String>,
}

impl StopConfig {
    pub fn camera(id: u32) -> Self {
        Self {
            id,
            kind: StopKind::Camera,
            name: None,
        }
    }

    pub fn stack(id: u32, lift: u32, capacity: u32, initial_count: u32) -> Self {
        Self {
            id,
            kind: StopKind::Stack {
                lift,
                capacity,
                initial_count,
            },
            name: None,
        }
    }

    pub fn waste(id: u32) -> Self {
        Self {
            id,
            kind: StopKind::Waste,
            name: None,
        }
    }
}

/// Per-operation simulated durations.
#[derive(Debug, Clone)]
pub struct Timings {
    pub dispense: Duration,
    pub retrieve: Duration,
    pub move_per_segment: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            dispense: Duration::from_secs(1),
            retrieve: Duration::from_secs(1),
            move_per_segment: Duration::from_secs(1),
        }
    }
}

impl Timings {
    /// Zero-delay timings, used by tests.
    pub fn instant() -> Self {
        Self {
            dispense: Duration::ZERO,
            retrieve: Duration::ZERO,
            move_per_segment: Duration::ZERO,
        }
    }
}

/// Immutable device layout and timing snapshot.
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    pub stops: Vec<StopConfig>,
    pub timings: Timings,
}

impl DeviceConfig {
    /// Create a validated configuration.
    pub fn new(stops: Vec<StopConfig>, timings: Timings) -> Result<Self, ConfigError> {
        if stops.is_empty() {
            return Err(ConfigError::NoStops);
        }
        let mut lifts = Vec::new();
        for (i, stop) in stops.iter().enumerate() {
            let expected = i as u32 + 1;
            if stop.id != expected {
                return Err(ConfigError::NonContiguousStops(stop.id));
            }
            if let StopKind::Stack {
                lift,
                capacity,
                initial_count,
            } = stop.kind
            {
                if lifts.contains(&lift) {
                    return Err(ConfigError::DuplicateLift(lift));
                }
                lifts.push(lift);
                if initial_count > capacity {
                    return Err(ConfigError::CountOverCapacity {
                        lift,
                        count: initial_count,
                        capacity,
                    });
                }
            }
        }
        Ok(Self { stops, timings })
    }

    /// The stock demo track: eight stops, lift 1 at stop 3 feeding from a
    /// 20-plate input stack, lift 2 at stop 4 over an empty output stack,
    /// camera stations everywhere else.
    pub fn default_layout() -> Self {
        let stops = vec![
            StopConfig::camera(1),
            StopConfig::camera(2),
            StopConfig::stack(3, 1, DEFAULT_STACK_CAPACITY, 20),
            StopConfig::stack(4, 2, DEFAULT_STACK_CAPACITY, 0),
            StopConfig::camera(5),
            StopConfig::camera(6),
            StopConfig::camera(7),
            StopConfig::camera(8),
        ];
        Self {
            stops,
            timings: Timings::default(),
        }
    }

    /// Number of stops on the track.
    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }
}
