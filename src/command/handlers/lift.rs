//! Lift commands (DISPENSE, RETURN)

use stacklink_shared::{codes, Reply};

use crate::command::{CommandError, Motion, Outcome};
use crate::state::DeviceState;

use super::{invalid_lift, invalid_params, parse_index, split_args};

/// DISPENSE track,lift - feed a plate from the stack onto the lift's stop
/// and give it a fresh identity.
pub fn dispense(state: &mut DeviceState, args: &str) -> Result<Outcome, CommandError> {
    let parsed = split_args(args);
    let &[track, lift] = parsed.as_slice() else {
        return Ok(invalid_params());
    };
    let (Some(_), Some(lift)) = (parse_index(track), parse_index(lift)) else {
        return Ok(invalid_params());
    };
    let Some(stop_index) = state.lift_stop(lift) else {
        return Ok(invalid_lift());
    };

    // Injected faults are reported before the physical checks.
    let faults = state.flags().lift(lift);
    if faults.lift_blocked {
        return Ok(Outcome::reply(Reply::new(codes::LIFT_BLOCKED, "Lift blocked")));
    }
    if faults.dispense_failure {
        return Ok(Outcome::reply(Reply::new(
            codes::DISPENSE_FAILED,
            "No object was dispensed",
        )));
    }

    let occupied = state
        .stop(stop_index)
        .ok_or_else(|| CommandError::Inconsistent(format!("lift {lift} maps to missing stop")))?
        .has_plate;
    if occupied {
        return Ok(Outcome::reply(Reply::new(codes::LIFT_BLOCKED, "Stop occupied")));
    }

    let stack = state
        .stack_mut(lift)
        .ok_or_else(|| CommandError::Inconsistent(format!("no stack for lift {lift}")))?;
    if !stack.dispense() {
        return Ok(Outcome::reply(Reply::new(
            codes::DISPENSE_FAILED,
            "No object was dispensed",
        )));
    }

    let plate_id = state.allocate_plate_id();
    if let Some(stop) = state.stop_mut(stop_index) {
        stop.place(Some(plate_id));
    }

    Ok(Outcome::with_motion(
        Reply::ok("Success"),
        Motion {
            duration: state.timings().dispense,
            tracked: None,
        },
    ))
}

/// RETURN track,lift - push the plate on the lift's stop back into the
/// stack.
pub fn retrieve(state: &mut DeviceState, args: &str) -> Result<Outcome, CommandError> {
    let parsed = split_args(args);
    let &[track, lift] = parsed.as_slice() else {
        return Ok(invalid_params());
    };
    let (Some(_), Some(lift)) = (parse_index(track), parse_index(lift)) else {
        return Ok(invalid_params());
    };
    let Some(stop_index) = state.lift_stop(lift) else {
        return Ok(invalid_lift());
    };

    let faults = state.flags().lift(lift);
    if faults.lift_blocked {
        return Ok(Outcome::reply(Reply::new(codes::LIFT_BLOCKED, "Lift blocked")));
    }
    if faults.stack_full {
        return Ok(Outcome::reply(Reply::new(codes::STACK_FULL, "Stack full")));
    }

    let present = state
        .stop(stop_index)
        .ok_or_else(|| CommandError::Inconsistent(format!("lift {lift} maps to missing stop")))?
        .has_plate;
    if !present {
        return Ok(Outcome::reply(Reply::new(
            codes::NO_PLATE_AT_LIFT,
            "No plate at lift",
        )));
    }

    let stack = state
        .stack_mut(lift)
        .ok_or_else(|| CommandError::Inconsistent(format!("no stack for lift {lift}")))?;
    if !stack.accept() {
        return Ok(Outcome::reply(Reply::new(codes::STACK_FULL, "Stack full")));
    }
    if let Some(stop) = state.stop_mut(stop_index) {
        stop.clear();
    }

    Ok(Outcome::with_motion(
        Reply::ok("Success"),
        Motion {
            duration: state.timings().retrieve,
            tracked: None,
        },
    ))
}
