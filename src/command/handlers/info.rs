//! Identification and catalog commands (VERSION, LISTCOMMANDS, LISTSTOPS)

use stacklink_shared::{codes, Reply};

use crate::command::registry;
use crate::command::{CommandError, Outcome};
use crate::config::{StopKind, VERSION_INFO};
use crate::state::DeviceState;

use super::{invalid_params, parse_index, split_args};

/// VERSION - report the firmware identification string.
pub fn version(_state: &mut DeviceState, _args: &str) -> Result<Outcome, CommandError> {
    Ok(Outcome::reply(Reply::ok(VERSION_INFO)))
}

/// LISTCOMMANDS [filter] - list recognised command names, optionally only
/// those containing the filter substring (case-insensitive).
pub fn list_commands(_state: &mut DeviceState, args: &str) -> Result<Outcome, CommandError> {
    let names = registry::matching_names(args.trim());
    let message = format!("Command list ({} commands)", names.len());
    let lines = names.iter().map(|n| n.to_string()).collect();
    Ok(Outcome::reply(Reply::with_lines(codes::OK, message, lines)))
}

/// GETNUMTRACKS - this device always models exactly one track.
pub fn get_num_tracks(_state: &mut DeviceState, _args: &str) -> Result<Outcome, CommandError> {
    Ok(Outcome::reply(Reply::ok("1")))
}

/// LISTSTOPS track - describe every stop: position, port letter, name, flag.
pub fn list_stops(state: &mut DeviceState, args: &str) -> Result<Outcome, CommandError> {
    let parsed = split_args(args);
    let &[track] = parsed.as_slice() else {
        return Ok(invalid_params());
    };
    let Some(track) = parse_index(track) else {
        return Ok(invalid_params());
    };
    if track != 1 {
        return Ok(Outcome::reply(Reply::new(codes::INVALID, "Invalid track")));
    }

    let lines: Vec<String> = state
        .config()
        .stops
        .iter()
        .map(|stop| {
            // Port letters cycle A-Z along the track.
            let port = char::from(b'A' + ((stop.id - 1) % 26) as u8);
            let (name, flag) = match &stop.kind {
                StopKind::Stack { lift, .. } => (format!("Lift{lift}"), "Lift"),
                StopKind::Waste => ("Waste".to_string(), "NoSensor"),
                StopKind::Camera => (
                    stop.name.clone().unwrap_or_else(|| format!("Stop{}", stop.id)),
                    "None",
                ),
            };
            format!("{}, {}, {}, {}", stop.id, port, name, flag)
        })
        .collect();

    let message = format!("Track 1 has {} stops:", lines.len());
    Ok(Outcome::reply(Reply::with_lines(codes::OK, message, lines)))
}
