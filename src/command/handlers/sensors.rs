//! Stop sensor and ignore-flag commands

use stacklink_shared::Reply;

use crate::command::{CommandError, Outcome};
use crate::state::DeviceState;

use super::{invalid_params, invalid_stop, parse_bool, parse_index, split_args, success};

/// GETSTOPSENSORS track - sensor reading for every stop, ascending.
pub fn get_stop_sensors(state: &mut DeviceState, args: &str) -> Result<Outcome, CommandError> {
    let parsed = split_args(args);
    let &[track] = parsed.as_slice() else {
        return Ok(invalid_params());
    };
    if parse_index(track).is_none() {
        return Ok(invalid_params());
    }
    Ok(Outcome::reply(Reply::ok(state.stops_status_string())))
}

/// HASPLATE track,stop - sensor reading for one stop.
pub fn has_plate(state: &mut DeviceState, args: &str) -> Result<Outcome, CommandError> {
    let parsed = split_args(args);
    let &[track, stop] = parsed.as_slice() else {
        return Ok(invalid_params());
    };
    let (Some(_), Some(stop)) = (parse_index(track), parse_index(stop)) else {
        return Ok(invalid_params());
    };
    match state.stop(stop) {
        Some(stop) => Ok(Outcome::reply(Reply::ok(stop.sensor_label()))),
        None => Ok(invalid_stop()),
    }
}

/// GETIGNORESTOP track,stop - report one stop's ignore flag.
pub fn get_ignore_stop(state: &mut DeviceState, args: &str) -> Result<Outcome, CommandError> {
    let parsed = split_args(args);
    let &[track, stop] = parsed.as_slice() else {
        return Ok(invalid_params());
    };
    let (Some(_), Some(stop)) = (parse_index(track), parse_index(stop)) else {
        return Ok(invalid_params());
    };
    match state.stop(stop) {
        Some(stop) => {
            let label = if stop.ignored { "True" } else { "False" };
            Ok(Outcome::reply(Reply::ok(label)))
        }
        None => Ok(invalid_stop()),
    }
}

/// GETIGNORESTOPS track - list every ignored stop.
pub fn get_ignore_stops(state: &mut DeviceState, args: &str) -> Result<Outcome, CommandError> {
    let parsed = split_args(args);
    let &[track] = parsed.as_slice() else {
        return Ok(invalid_params());
    };
    if parse_index(track).is_none() {
        return Ok(invalid_params());
    }
    let message = format!("Ignored stops: {}", state.ignored_status_string());
    Ok(Outcome::reply(Reply::ok(message)))
}

/// IGNORESTOP track,stop,bool - set one stop's ignore flag.
pub fn ignore_stop(state: &mut DeviceState, args: &str) -> Result<Outcome, CommandError> {
    let parsed = split_args(args);
    let &[track, stop, value] = parsed.as_slice() else {
        return Ok(invalid_params());
    };
    let (Some(_), Some(stop), Some(value)) =
        (parse_index(track), parse_index(stop), parse_bool(value))
    else {
        return Ok(invalid_params());
    };
    match state.stop_mut(stop) {
        Some(stop) => {
            stop.ignored = value;
            Ok(success())
        }
        None => Ok(invalid_stop()),
    }
}

/// IGNORESTOPRANGE track,start,end,bool - set the ignore flag on every stop
/// in `[start, end]`. Indices the track does not have are skipped silently.
pub fn ignore_stop_range(state: &mut DeviceState, args: &str) -> Result<Outcome, CommandError> {
    let parsed = split_args(args);
    let &[track, start, end, value] = parsed.as_slice() else {
        return Ok(invalid_params());
    };
    let (Some(_), Some(start), Some(end), Some(value)) = (
        parse_index(track),
        parse_index(start),
        parse_index(end),
        parse_bool(value),
    ) else {
        return Ok(invalid_params());
    };
    for index in start..=end {
        if let Some(stop) = state.stop_mut(index) {
            stop.ignored = value;
        }
    }
    Ok(success())
}

/// IGNOREALLSTOPS track,bool - set the ignore flag on every stop.
pub fn ignore_all_stops(state: &mut DeviceState, args: &str) -> Result<Outcome, CommandError> {
    let parsed = split_args(args);
    let &[track, value] = parsed.as_slice() else {
        return Ok(invalid_params());
    };
    let (Some(_), Some(value)) = (parse_index(track), parse_bool(value)) else {
        return Ok(invalid_params());
    };
    for index in state.stop_indices() {
        if let Some(stop) = state.stop_mut(index) {
            stop.ignored = value;
        }
    }
    Ok(success())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeviceConfig;
    use stacklink_shared::codes;

    fn state() -> DeviceState {
        DeviceState::new(DeviceConfig::default_layout())
    }

    #[test]
    fn test_get_stop_sensors() {
        let mut state = state();
        state.set_plate_presence(2, true);
        let outcome = get_stop_sensors(&mut state, "1").unwrap();
        assert_eq!(
            outcome.reply.message,
            "1:Empty, 2:Object, 3:Empty, 4:Empty, 5:Empty, 6:Empty, 7:Empty, 8:Empty"
        );
    }

    #[test]
    fn test_has_plate() {
        let mut state = state();
        state.set_plate_presence(5, true);

        assert_eq!(has_plate(&mut state, "1,5").unwrap().reply.message, "Object");
        assert_eq!(has_plate(&mut state, "1,6").unwrap().reply.message, "Empty");

        let outcome = has_plate(&mut state, "1,99").unwrap();
        assert_eq!(outcome.reply.code, codes::INVALID);
        assert_eq!(outcome.reply.message, "Invalid stop");

        let outcome = has_plate(&mut state, "1").unwrap();
        assert_eq!(outcome.reply.message, "Invalid parameters");
    }

    #[test]
    fn test_ignore_stop_roundtrip() {
        let mut state = state();

        let outcome = ignore_stop(&mut state, "1,5,true").unwrap();
        assert_eq!(outcome.reply.code, codes::OK);
        assert_eq!(
            get_ignore_stop(&mut state, "1,5").unwrap().reply.message,
            "True"
        );

        ignore_stop(&mut state, "1,5,false").unwrap();
        assert_eq!(
            get_ignore_stop(&mut state, "1,5").unwrap().reply.message,
            "False"
        );

        let outcome = ignore_stop(&mut state, "1,99,true").unwrap();
        assert_eq!(outcome.reply.message, "Invalid stop");
    }

    #[test]
    fn test_ignore_stop_range() {
        let mut state = state();

        // Stops 2..=4 flip; 1 and 5 stay untouched.
        let outcome = ignore_stop_range(&mut state, "1,2,4,true").unwrap();
        assert_eq!(outcome.reply.code, codes::OK);
        for (index, expect) in [(1, false), (2, true), (3, true), (4, true), (5, false)] {
            assert_eq!(state.stop(index).unwrap().ignored, expect, "stop {index}");
        }
    }

    #[test]
    fn test_ignore_stop_range_skips_unknown_indices() {
        let mut state = state();
        let outcome = ignore_stop_range(&mut state, "1,7,12,true").unwrap();
        assert_eq!(outcome.reply.code, codes::OK);
        assert!(state.stop(7).unwrap().ignored);
        assert!(state.stop(8).unwrap().ignored);
    }

    #[test]
    fn test_ignore_all_stops_and_listing() {
        let mut state = state();
        ignore_all_stops(&mut state, "1,true").unwrap();
        assert_eq!(
            get_ignore_stops(&mut state, "1").unwrap().reply.message,
            "Ignored stops: 1,2,3,4,5,6,7,8"
        );

        ignore_all_stops(&mut state, "1,false").unwrap();
        assert_eq!(
            get_ignore_stops(&mut state, "1").unwrap().reply.message,
            "Ignored stops: None"
        );
    }
}
