//! Mutable state of the virtual StackLink

use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::config::{DeviceConfig, StopKind, Timings};
use crate::state::flags::FaultFlags;
use crate::state::topology::{Stack, TrackStop};

/// An in-progress MOVEPLATE, kept only for the duration of the blocking call
/// so external observers can render in-flight progress.
#[derive(Debug, Clone)]
pub struct ActiveMove {
    pub plate_id: u32,
    pub source: u32,
    pub dest: u32,
    pub started: Instant,
    pub duration: Duration,
}

impl ActiveMove {
    /// Fraction of the move completed, in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.started.elapsed().as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }
}

/// Mutable state of the virtual StackLink.
///
/// Sole owner and mutator of the topology, stacks, fault flags, and
/// counters. Both the command engine and the dashboard collaborator go
/// through this type; neither touches stops or stacks directly.
pub struct DeviceState {
    config: DeviceConfig,
    stops: BTreeMap<u32, TrackStop>,
    stacks: BTreeMap<u32, Stack>,
    /// Lift index -> stop index of that stack's access point. Fixed.
    lift_map: BTreeMap<u32, u32>,
    /// Initial per-stack counts, restored on reset.
    default_stack_counts: BTreeMap<u32, u32>,
    flags: FaultFlags,
    next_plate_id: u32,
    active_moves: HashMap<u32, ActiveMove>,
}

impl DeviceState {
    /// Build the device from its startup configuration.
    pub fn new(config: DeviceConfig) -> Self {
        let mut stops = BTreeMap::new();
        let mut stacks = BTreeMap::new();
        let mut lift_map = BTreeMap::new();

        for stop_cfg in &config.stops {
            stops.insert(stop_cfg.id, TrackStop::new(stop_cfg.id));
            if let StopKind::Stack {
                lift,
                capacity,
                initial_count,
            } = stop_cfg.kind
            {
                lift_map.insert(lift, stop_cfg.id);
                stacks.insert(lift, Stack::new(lift, capacity, initial_count));
            }
        }

        let default_stack_counts = stacks.iter().map(|(idx, s)| (*idx, s.count)).collect();
        let flags = FaultFlags::for_lifts(stacks.keys().copied());

        Self {
            config,
            stops,
            stacks,
            lift_map,
            default_stack_counts,
            flags,
            next_plate_id: 1,
            active_moves: HashMap::new(),
        }
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    pub fn timings(&self) -> &Timings {
        &self.config.timings
    }

    // ---- Topology access ----

    pub fn stop(&self, index: u32) -> Option<&TrackStop> {
        self.stops.get(&index)
    }

    pub fn stop_mut(&mut self, index: u32) -> Option<&mut TrackStop> {
        self.stops.get_mut(&index)
    }

    /// Stops in ascending index order.
    pub fn stops(&self) -> impl Iterator<Item = &TrackStop> {
        self.stops.values()
    }

    pub fn stop_indices(&self) -> Vec<u32> {
        self.stops.keys().copied().collect()
    }

    pub fn stack(&self, lift: u32) -> Option<&Stack> {
        self.stacks.get(&lift)
    }

    pub fn stack_mut(&mut self, lift: u32) -> Option<&mut Stack> {
        self.stacks.get_mut(&lift)
    }

    pub fn stacks(&self) -> impl Iterator<Item = &Stack> {
        self.stacks.values()
    }

    /// Stop index serving the given lift.
    pub fn lift_stop(&self, lift: u32) -> Option<u32> {
        self.lift_map.get(&lift).copied()
    }

    /// Lift served by the given stop, if it is a stack access point.
    pub fn lift_at_stop(&self, stop: u32) -> Option<u32> {
        self.lift_map
            .iter()
            .find(|(_, s)| **s == stop)
            .map(|(lift, _)| *lift)
    }

    // ---- Fault flags ----

    pub fn flags(&self) -> &FaultFlags {
        &self.flags
    }

    /// Snapshot of the fault table under its string keys.
    pub fn error_flags(&self) -> BTreeMap<String, bool> {
        self.flags.snapshot()
    }

    /// Toggle a fault flag by its string key. `false` if the key is unknown.
    pub fn set_error_flag(&mut self, name: &str, value: bool) -> bool {
        let known = self.flags.set(name, value);
        if known {
            debug!("fault flag {} = {}", name, value);
        }
        known
    }

    // ---- Plate identity ----

    /// Allocate the next plate id. Ids start at 1 and never repeat until
    /// reset.
    pub fn allocate_plate_id(&mut self) -> u32 {
        let id = self.next_plate_id;
        self.next_plate_id += 1;
        id
    }

    // ---- Active-move registry ----

    pub fn active_moves(&self) -> impl Iterator<Item = &ActiveMove> {
        self.active_moves.values()
    }

    /// Publish an in-flight move for external observers.
    pub fn begin_move(&mut self, mv: ActiveMove) {
        self.active_moves.insert(mv.plate_id, mv);
    }

    /// Remove a published move once the blocking call ends.
    pub fn end_move(&mut self, plate_id: u32) {
        self.active_moves.remove(&plate_id);
    }

    // ---- Dashboard staging operations ----

    /// Manually override plate presence at a stop. `false` if the stop is
    /// unknown. Only the presence boolean is touched.
    pub fn set_plate_presence(&mut self, stop: u32, present: bool) -> bool {
        match self.stops.get_mut(&stop) {
            Some(s) => {
                s.has_plate = present;
                true
            }
            None => false,
        }
    }

    /// Set the number of plates in a stack, clamped to `[0, capacity]`.
    /// `false` if the stack is unknown.
    pub fn set_stack_count(&mut self, index: u32, count: u32) -> bool {
        match self.stacks.get_mut(&index) {
            Some(stack) => {
                stack.count = count.min(stack.capacity);
                true
            }
            None => false,
        }
    }

    /// Reset the entire device to a clean configuration.
    ///
    /// Stops are emptied and un-ignored, stacks restored to the supplied
    /// override or their captured defaults (clamped to capacity), every
    /// fault flag cleared, and the plate-id counter rewound to 1. The
    /// active-move registry is self-clearing and not touched here.
    pub fn reset_state(&mut self, stack_counts: Option<&BTreeMap<u32, u32>>) {
        for stop in self.stops.values_mut() {
            stop.clear();
            stop.ignored = false;
        }
        let defaults = &self.default_stack_counts;
        for (idx, stack) in self.stacks.iter_mut() {
            let count = stack_counts
                .and_then(|c| c.get(idx).copied())
                .unwrap_or_else(|| defaults.get(idx).copied().unwrap_or(0));
            stack.count = count.min(stack.capacity);
        }
        self.flags.clear_all();
        self.next_plate_id = 1;
        info!("device state reset");
    }

    // ---- State introspection ----

    /// Comma-separated stop statuses, e.g. `1:Empty, 2:Object`.
    pub fn stops_status_string(&self) -> String {
        let parts: Vec<String> = self
            .stops
            .values()
            .map(|stop| format!("{}:{}", stop.index, stop.sensor_label()))
            .collect();
        parts.join(", ")
    }

    /// Comma-separated ignored stop indices, or `None`.
    pub fn ignored_status_string(&self) -> String {
        let ignored: Vec<String> = self
            .stops
            .values()
            .filter(|s| s.ignored)
            .map(|s| s.index.to_string())
            .collect();
        if ignored.is_empty() {
            "None".to_string()
        } else {
            ignored.join(",")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DeviceConfig, StopConfig, Timings};

    fn device() -> DeviceState {
        DeviceState::new(DeviceConfig::default_layout())
    }

    #[test]
    fn test_layout_construction() {
        let state = device();
        assert_eq!(state.stop_indices(), vec![1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(state.lift_stop(1), Some(3));
        assert_eq!(state.lift_stop(2), Some(4));
        assert_eq!(state.lift_at_stop(4), Some(2));
        assert_eq!(state.lift_at_stop(5), None);
        assert_eq!(state.stack(1).unwrap().count, 20);
        assert_eq!(state.stack(2).unwrap().count, 0);
    }

    #[test]
    fn test_plate_ids_monotonic() {
        let mut state = device();
        assert_eq!(state.allocate_plate_id(), 1);
        assert_eq!(state.allocate_plate_id(), 2);
        state.reset_state(None);
        assert_eq!(state.allocate_plate_id(), 1);
    }

    #[test]
    fn test_set_plate_presence() {
        let mut state = device();
        assert!(state.set_plate_presence(5, true));
        assert!(state.stop(5).unwrap().has_plate);
        assert!(!state.set_plate_presence(99, true));
    }

    #[test]
    fn test_set_stack_count_clamps() {
        let mut state = device();
        assert!(state.set_stack_count(1, 500));
        assert_eq!(state.stack(1).unwrap().count, 30);
        assert!(state.set_stack_count(1, 0));
        assert_eq!(state.stack(1).unwrap().count, 0);
        assert!(!state.set_stack_count(7, 3));
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut state = device();
        state.set_plate_presence(2, true);
        state.stop_mut(2).unwrap().ignored = true;
        state.set_stack_count(1, 3);
        state.set_error_flag("movement_blocked", true);

        state.reset_state(None);

        assert!(!state.stop(2).unwrap().has_plate);
        assert!(!state.stop(2).unwrap().ignored);
        assert_eq!(state.stack(1).unwrap().count, 20);
        assert!(!state.flags().movement_blocked);
    }

    #[test]
    fn test_reset_with_overrides_clamps() {
        let mut state = device();
        let mut counts = BTreeMap::new();
        counts.insert(1u32, 99u32);
        counts.insert(2u32, 5u32);
        state.reset_state(Some(&counts));
        assert_eq!(state.stack(1).unwrap().count, 30);
        assert_eq!(state.stack(2).unwrap().count, 5);
    }

    #[test]
    fn test_status_strings() {
        let stops = vec![
            StopConfig::camera(1),
            StopConfig::stack(2, 1, 30, 5),
            StopConfig::camera(3),
        ];
        let config = DeviceConfig::new(stops, Timings::instant()).unwrap();
        let mut state = DeviceState::new(config);

        assert_eq!(state.stops_status_string(), "1:Empty, 2:Empty, 3:Empty");
        assert_eq!(state.ignored_status_string(), "None");

        state.set_plate_presence(2, true);
        state.stop_mut(1).unwrap().ignored = true;
        state.stop_mut(3).unwrap().ignored = true;

        assert_eq!(state.stops_status_string(), "1:Empty, 2:Object, 3:Empty");
        assert_eq!(state.ignored_status_string(), "1,3");
    }
}
