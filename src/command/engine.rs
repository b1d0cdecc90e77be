//! Command dispatch and timing
//!
//! One engine instance serves every connection. A command line is matched
//! case-insensitively against the registry, its handler runs under the
//! device lock, and any motion delay is slept while the lock is still held.
//! The physical device executes commands strictly one at a time, and the
//! simulator reproduces that.

use std::time::Instant;

use stacklink_shared::{codes, Reply};
use tokio::time::sleep;
use tracing::error;

use crate::state::{ActiveMove, SharedDevice};

use super::registry::{CommandKind, Registry};

/// Dispatches command lines against the shared device state.
pub struct Engine {
    registry: Registry,
}

impl Engine {
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
        }
    }

    /// Execute one command line and produce its reply.
    ///
    /// Never fails: every error category maps to a status code, and the
    /// connection stays usable afterwards.
    pub async fn execute(&self, device: &SharedDevice, line: &str) -> Reply {
        let command = line.trim();
        if command.is_empty() {
            return Reply::new(codes::INVALID, "Empty command");
        }

        let (name, args) = split_command(command);
        let handler = match self.registry.lookup(name) {
            Some(CommandKind::Implemented(handler)) => handler,
            Some(CommandKind::Stub) => {
                return Reply::new(codes::UNIMPLEMENTED, "No mock implementation for this command");
            }
            None => return Reply::new(codes::INVALID, "Unrecognized command"),
        };

        // The lock spans the handler and its simulated delay.
        let mut state = device.lock().await;
        match handler(&mut state, args) {
            Ok(outcome) => {
                if let Some(motion) = outcome.motion {
                    match motion.tracked {
                        Some(tracked) => {
                            state.begin_move(ActiveMove {
                                plate_id: tracked.plate_id,
                                source: tracked.source,
                                dest: tracked.dest,
                                started: Instant::now(),
                                duration: motion.duration,
                            });
                            sleep(motion.duration).await;
                            state.end_move(tracked.plate_id);
                        }
                        None => {
                            if !motion.duration.is_zero() {
                                sleep(motion.duration).await;
                            }
                        }
                    }
                }
                outcome.reply
            }
            Err(e) => {
                error!("error handling command '{}': {}", command, e);
                Reply::new(codes::UNIMPLEMENTED, "Internal error")
            }
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

/// Split a command line into its name and raw argument string.
fn split_command(command: &str) -> (&str, &str) {
    match command.find(char::is_whitespace) {
        Some(pos) => (&command[..pos], command[pos..].trim_start()),
        None => (command, ""),
    }
}
