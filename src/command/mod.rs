//! Command engine for the StackLink protocol
//!
//! This module handles:
//! - The finite registry of recognised command names
//! - Dispatching one command line to its handler
//! - Simulated motion timing and the in-flight move registry
//! - Containing handler failures at the dispatch boundary

mod engine;
pub mod handlers;
pub mod registry;

use std::time::Duration;

use stacklink_shared::Reply;
use thiserror::Error;

use crate::state::DeviceState;

pub use engine::Engine;
pub use registry::{CommandKind, Registry};

/// Unexpected failures inside a handler. Reported to the client as
/// `9999 Internal error`; never allowed to take the session down.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("inconsistent device state: {0}")]
    Inconsistent(String),
}

/// A move the engine should publish while the motion delay runs.
#[derive(Debug, Clone, Copy)]
pub struct TrackedMove {
    pub plate_id: u32,
    pub source: u32,
    pub dest: u32,
}

/// Simulated motion attached to a successful command.
#[derive(Debug, Clone, Copy)]
pub struct Motion {
    pub duration: Duration,
    /// Present only when the moving plate has an identity.
    pub tracked: Option<TrackedMove>,
}

/// What a handler hands back to the engine.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub reply: Reply,
    pub motion: Option<Motion>,
}

impl Outcome {
    /// A reply with no motion.
    pub fn reply(reply: Reply) -> Self {
        Self {
            reply,
            motion: None,
        }
    }

    /// A reply with a blocking motion delay.
    pub fn with_motion(reply: Reply, motion: Motion) -> Self {
        Self {
            reply,
            motion: Some(motion),
        }
    }
}

/// Common contract for every implemented command: mutable device state in,
/// raw argument string in, reply (plus optional motion) out. Handlers are
/// synchronous and I/O-free; the engine owns timing.
pub type Handler = fn(&mut DeviceState, &str) -> Result<Outcome, CommandError>;
