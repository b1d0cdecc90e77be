//! Fault-injection flags
//!
//! The dashboard toggles these to force specific commands to fail with
//! specific codes. The table is typed (one base flag plus a per-lift set)
//! but keeps the original string-keyed naming convention
//! (`movement_blocked`, `dispense_failure_<lift>`, `lift_blocked_<lift>`,
//! `stack_full_<lift>`) at the collaborator boundary so existing dashboard
//! clients keep working.

use std::collections::BTreeMap;

/// Faults that apply to one lift.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiftFaults {
    /// DISPENSE reports 2000 even when the stack has plates.
    pub dispense_failure: bool,
    /// DISPENSE/RETURN/RECEIVEPLATE report 2001 at this lift's stop.
    pub lift_blocked: bool,
    /// RETURN reports 2003 even when the stack has room.
    pub stack_full: bool,
}

/// The complete fault table.
#[derive(Debug, Clone, Default)]
pub struct FaultFlags {
    /// MOVEPLATE/SHIFTPLATES report 57 regardless of occupancy.
    pub movement_blocked: bool,
    lifts: BTreeMap<u32, LiftFaults>,
}

impl FaultFlags {
    /// Create the table with one all-clear entry per lift.
    pub fn for_lifts(lifts: impl IntoIterator<Item = u32>) -> Self {
        Self {
            movement_blocked: false,
            lifts: lifts
                .into_iter()
                .map(|lift| (lift, LiftFaults::default()))
                .collect(),
        }
    }

    /// Faults for one lift; all-clear if the lift is unknown.
    pub fn lift(&self, lift: u32) -> LiftFaults {
        self.lifts.get(&lift).copied().unwrap_or_default()
    }

    /// Set a flag by its conventional string key.
    ///
    /// Returns `false` when the key does not name a known flag, rather than
    /// upserting: a mistyped key must not create a dead flag.
    pub fn set(&mut self, name: &str, value: bool) -> bool {
        if name == "movement_blocked" {
            self.movement_blocked = value;
            return true;
        }
        let Some((kind, lift)) = parse_lift_key(name) else {
            return false;
        };
        let Some(faults) = self.lifts.get_mut(&lift) else {
            return false;
        };
        match kind {
            LiftFaultKind::DispenseFailure => faults.dispense_failure = value,
            LiftFaultKind::LiftBlocked => faults.lift_blocked = value,
            LiftFaultKind::StackFull => faults.stack_full = value,
        }
        true
    }

    /// Clear every flag.
    pub fn clear_all(&mut self) {
        self.movement_blocked = false;
        for faults in self.lifts.values_mut() {
            *faults = LiftFaults::default();
        }
    }

    /// Snapshot of the table under its conventional string keys.
    pub fn snapshot(&self) -> BTreeMap<String, bool> {
        let mut out = BTreeMap::new();
        out.insert("movement_blocked".to_string(), self.movement_blocked);
        for (lift, faults) in &self.lifts {
            out.insert(format!("dispense_failure_{lift}"), faults.dispense_failure);
            out.insert(format!("lift_blocked_{lift}"), faults.lift_blocked);
            out.insert(format!("stack_full_{lift}"), faults.stack_full);
        }
        out
    }
}

enum LiftFaultKind {
    DispenseFailure,
    LiftBlocked,
    StackFull,
}

fn parse_lift_key(name: &str) -> Option<(LiftFaultKind, u32)> {
    let (kind, rest) = if let Some(rest) = name.strip_prefix("dispense_failure_") {
        (LiftFaultKind::DispenseFailure, rest)
    } else if let Some(rest) = name.strip_prefix("lift_blocked_") {
        (LiftFaultKind::LiftBlocked, rest)
    } else if let Some(rest) = name.strip_prefix("stack_full_") {
        (LiftFaultKind::StackFull, rest)
    } else {
        return None;
    };
    rest.parse().ok().map(|lift| (kind, lift))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_by_key() {
        let mut flags = FaultFlags::for_lifts([1, 2]);

        assert!(flags.set("movement_blocked", true));
        assert!(flags.movement_blocked);

        assert!(flags.set("dispense_failure_1", true));
        assert!(flags.lift(1).dispense_failure);
        assert!(!flags.lift(2).dispense_failure);

        assert!(flags.set("stack_full_2", true));
        assert!(flags.lift(2).stack_full);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let mut flags = FaultFlags::for_lifts([1]);

        assert!(!flags.set("dispence_failure_1", true));
        assert!(!flags.set("lift_blocked_9", true));
        assert!(!flags.set("lift_blocked_x", true));
        assert!(!flags.set("", true));
    }

    #[test]
    fn test_clear_all() {
        let mut flags = FaultFlags::for_lifts([1]);
        flags.set("movement_blocked", true);
        flags.set("lift_blocked_1", true);

        flags.clear_all();
        assert!(!flags.movement_blocked);
        assert!(!flags.lift(1).lift_blocked);
    }

    #[test]
    fn test_snapshot_keys() {
        let flags = FaultFlags::for_lifts([1, 2]);
        let snap = flags.snapshot();
        assert_eq!(snap.len(), 7);
        assert!(snap.contains_key("movement_blocked"));
        assert!(snap.contains_key("dispense_failure_1"));
        assert!(snap.contains_key("lift_blocked_2"));
        assert_eq!(snap.values().filter(|v| **v).count(), 0);
    }
}
