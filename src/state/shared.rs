//! Shared handle over the device state
//!
//! All sessions and the dashboard collaborator share one [`DeviceState`]
//! behind a single mutex. The lock is held for a command's entire execution,
//! including its simulated motion delay: commands are physically sequential
//! on the real machine, so the simulator serializes them identically. The
//! lock is never held while waiting on network bytes.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, MutexGuard};

use crate::state::device::DeviceState;

/// Read-model of one stop, handed to the dashboard collaborator.
#[derive(Debug, Clone)]
pub struct StopSnapshot {
    pub index: u32,
    pub has_plate: bool,
    pub ignored: bool,
    pub plate_id: Option<u32>,
}

/// Read-model of one stack.
#[derive(Debug, Clone)]
pub struct StackSnapshot {
    pub index: u32,
    pub count: u32,
    pub capacity: u32,
}

/// Read-model of one in-flight move.
#[derive(Debug, Clone)]
pub struct MoveSnapshot {
    pub plate_id: u32,
    pub source: u32,
    pub dest: u32,
    pub duration: Duration,
    pub progress: f32,
}

/// Full device read-model.
#[derive(Debug, Clone)]
pub struct DeviceSnapshot {
    pub stops: Vec<StopSnapshot>,
    pub stacks: Vec<StackSnapshot>,
    pub active_moves: Vec<MoveSnapshot>,
    pub error_flags: BTreeMap<String, bool>,
}

/// Cloneable handle to the single shared [`DeviceState`].
#[derive(Clone)]
pub struct SharedDevice {
    inner: Arc<Mutex<DeviceState>>,
}

impl SharedDevice {
    pub fn new(state: DeviceState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(state)),
        }
    }

    /// Acquire the device lock. The command engine holds this guard across a
    /// command's full execution, simulated delay included.
    pub async fn lock(&self) -> MutexGuard<'_, DeviceState> {
        self.inner.lock().await
    }

    // ---- Collaborator interface (dashboard / API layer) ----

    /// Snapshot the complete device state.
    pub async fn snapshot(&self) -> DeviceSnapshot {
        let state = self.inner.lock().await;
        DeviceSnapshot {
            stops: state
                .stops()
                .map(|s| StopSnapshot {
                    index: s.index,
                    has_plate: s.has_plate,
                    ignored: s.ignored,
                    plate_id: s.plate_id,
                })
                .collect(),
            stacks: state
                .stacks()
                .map(|s| StackSnapshot {
                    index: s.index,
                    count: s.count,
                    capacity: s.capacity,
                })
                .collect(),
            active_moves: state
                .active_moves()
                .map(|m| MoveSnapshot {
                    plate_id: m.plate_id,
                    source: m.source,
                    dest: m.dest,
                    duration: m.duration,
                    progress: m.progress(),
                })
                .collect(),
            error_flags: state.error_flags(),
        }
    }

    /// Snapshot just the fault table.
    pub async fn error_flags(&self) -> BTreeMap<String, bool> {
        self.inner.lock().await.error_flags()
    }

    /// The static configuration the device was built from.
    pub async fn config(&self) -> crate::config::DeviceConfig {
        self.inner.lock().await.config().clone()
    }

    /// Toggle a fault flag by its string key. `false` if the key is unknown.
    pub async fn set_error_flag(&self, name: &str, value: bool) -> bool {
        self.inner.lock().await.set_error_flag(name, value)
    }

    /// Manually stage or remove a plate at a stop. `false` on unknown stop.
    pub async fn set_plate_presence(&self, stop: u32, present: bool) -> bool {
        self.inner.lock().await.set_plate_presence(stop, present)
    }

    /// Set a stack's plate count, clamped to capacity. `false` on unknown
    /// stack.
    pub async fn set_stack_count(&self, index: u32, count: u32) -> bool {
        self.inner.lock().await.set_stack_count(index, count)
    }

    /// Reset the device to a clean configuration, optionally overriding
    /// per-stack counts.
    pub async fn reset_state(&self, stack_counts: Option<&BTreeMap<u32, u32>>) {
        self.inner.lock().await.reset_state(stack_counts);
    }
}
