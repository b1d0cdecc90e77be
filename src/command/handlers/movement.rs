//! Track movement commands (MOVEPLATE, SHIFTPLATES, SENDPLATE,
//! RECEIVEPLATE, ACKNOWLEDGESEND)

use std::collections::BTreeMap;

use stacklink_shared::{codes, Reply};

use crate::command::{CommandError, Motion, Outcome, TrackedMove};
use crate::state::DeviceState;

use super::{invalid_params, invalid_stop, parse_index, split_args, success};

fn movement_blocked() -> Outcome {
    Outcome::reply(Reply::new(codes::MOVEMENT_BLOCKED, "Movement blocked"))
}

/// MOVEPLATE track,source,dest - carry a plate (and its identity) along the
/// track. Any occupied stop on the path, destination included, blocks the
/// move before any state changes.
pub fn move_plate(state: &mut DeviceState, args: &str) -> Result<Outcome, CommandError> {
    let parsed = split_args(args);
    let &[track, source, dest] = parsed.as_slice() else {
        return Ok(invalid_params());
    };
    let (Some(_), Some(source), Some(dest)) =
        (parse_index(track), parse_index(source), parse_index(dest))
    else {
        return Ok(invalid_params());
    };
    if state.stop(dest).is_none() {
        return Ok(invalid_stop());
    }
    let Some(src_stop) = state.stop(source) else {
        return Ok(invalid_stop());
    };

    if state.flags().movement_blocked {
        return Ok(movement_blocked());
    }
    if !src_stop.has_plate {
        return Ok(Outcome::reply(Reply::new(
            codes::NO_PLATE_AT_STOP,
            "No plate at stop",
        )));
    }

    // Scan the path in the direction of travel: source excluded, dest
    // included.
    let path_occupied = if dest > source {
        (source + 1..=dest).any(|i| state.stop(i).is_some_and(|s| s.has_plate))
    } else {
        (dest..source).any(|i| state.stop(i).is_some_and(|s| s.has_plate))
    };
    if path_occupied {
        return Ok(movement_blocked());
    }

    let plate_id = state.stop(source).and_then(|s| s.plate_id);
    if let Some(stop) = state.stop_mut(source) {
        stop.clear();
    }
    if let Some(stop) = state.stop_mut(dest) {
        stop.place(plate_id);
    }

    let segments = source.abs_diff(dest);
    let motion = Motion {
        duration: state.timings().move_per_segment * segments,
        tracked: plate_id.map(|plate_id| TrackedMove {
            plate_id,
            source,
            dest,
        }),
    };
    Ok(Outcome::with_motion(
        Reply::ok(state.stops_status_string()),
        motion,
    ))
}

#[derive(Clone, Copy)]
enum ShiftDirection {
    Forward,
    Reverse,
}

fn parse_direction(arg: &str) -> Option<ShiftDirection> {
    match arg.to_ascii_lowercase().as_str() {
        "forward" | "fwd" | "f" => Some(ShiftDirection::Forward),
        "reverse" | "rev" | "r" => Some(ShiftDirection::Reverse),
        _ => None,
    }
}

/// SHIFTPLATES track,direction - advance every movable plate one stop.
///
/// Plates are processed in reverse index order when shifting forward and
/// ascending order when shifting reverse, so a train of adjacent plates
/// advances instead of blocking itself. The move set is computed first; the
/// movement-blocked fault is only consulted afterwards.
pub fn shift_plates(state: &mut DeviceState, args: &str) -> Result<Outcome, CommandError> {
    let parsed = split_args(args);
    let &[track, direction] = parsed.as_slice() else {
        return Ok(invalid_params());
    };
    if parse_index(track).is_none() {
        return Ok(invalid_params());
    }
    let Some(direction) = parse_direction(direction) else {
        return Ok(Outcome::reply(Reply::new(codes::INVALID, "Invalid direction")));
    };

    // Plan against a scratch occupancy map so nothing mutates before the
    // fault check.
    let mut occupancy: BTreeMap<u32, bool> =
        state.stops().map(|s| (s.index, s.has_plate)).collect();
    let indices = state.stop_indices();
    let mut moves: Vec<(u32, u32)> = Vec::new();

    let mut plan = |from: u32, to: u32, occupancy: &mut BTreeMap<u32, bool>| {
        if occupancy.get(&from) == Some(&true) && occupancy.get(&to) == Some(&false) {
            occupancy.insert(from, false);
            occupancy.insert(to, true);
            moves.push((from, to));
        }
    };
    match direction {
        ShiftDirection::Forward => {
            for &i in indices.iter().rev() {
                plan(i, i + 1, &mut occupancy);
            }
        }
        ShiftDirection::Reverse => {
            for &i in indices.iter() {
                if let Some(prev) = i.checked_sub(1) {
                    plan(i, prev, &mut occupancy);
                }
            }
        }
    }

    if state.flags().movement_blocked {
        return Ok(movement_blocked());
    }
    if moves.is_empty() {
        return Ok(Outcome::reply(Reply::new(
            codes::NOTHING_TO_SHIFT,
            "No plates to shift",
        )));
    }

    for (from, to) in moves {
        let plate_id = state.stop(from).and_then(|s| s.plate_id);
        if let Some(stop) = state.stop_mut(from) {
            stop.clear();
        }
        if let Some(stop) = state.stop_mut(to) {
            stop.place(plate_id);
        }
    }
    Ok(Outcome::reply(Reply::ok(state.stops_status_string())))
}

/// SENDPLATE track,stop - hand the plate at a stop off to an external
/// mechanism.
pub fn send_plate(state: &mut DeviceState, args: &str) -> Result<Outcome, CommandError> {
    let parsed = split_args(args);
    let &[track, stop] = parsed.as_slice() else {
        return Ok(invalid_params());
    };
    let (Some(_), Some(stop)) = (parse_index(track), parse_index(stop)) else {
        return Ok(invalid_params());
    };
    match state.stop_mut(stop) {
        Some(stop) if stop.has_plate => {
            stop.clear();
            Ok(success())
        }
        Some(_) => Ok(Outcome::reply(Reply::new(
            codes::NO_PLATE_AT_STOP,
            "No plate at stop",
        ))),
        None => Ok(invalid_stop()),
    }
}

/// RECEIVEPLATE track,stop - accept a plate from an external mechanism.
/// The plate gets no identity; that is how the device behaves.
pub fn receive_plate(state: &mut DeviceState, args: &str) -> Result<Outcome, CommandError> {
    let parsed = split_args(args);
    let &[track, stop] = parsed.as_slice() else {
        return Ok(invalid_params());
    };
    let (Some(_), Some(stop)) = (parse_index(track), parse_index(stop)) else {
        return Ok(invalid_params());
    };
    if state.stop(stop).is_none() {
        return Ok(invalid_stop());
    }

    if let Some(lift) = state.lift_at_stop(stop) {
        if state.flags().lift(lift).lift_blocked {
            return Ok(Outcome::reply(Reply::new(codes::LIFT_BLOCKED, "Lift blocked")));
        }
    }

    match state.stop_mut(stop) {
        Some(target) if target.has_plate => Ok(Outcome::reply(Reply::new(
            codes::LIFT_BLOCKED,
            "Stop occupied",
        ))),
        Some(target) => {
            target.place(None);
            Ok(success())
        }
        None => Ok(invalid_stop()),
    }
}

/// ACKNOWLEDGESEND track - acknowledged; the simulator has nothing to do.
pub fn acknowledge_send(_state: &mut DeviceState, args: &str) -> Result<Outcome, CommandError> {
    let parsed = split_args(args);
    let &[track] = parsed.as_slice() else {
        return Ok(invalid_params());
    };
    if parse_index(track).is_none() {
        return Ok(invalid_params());
    }
    Ok(success())
}
