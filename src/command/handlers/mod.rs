//! Handlers for the implemented device commands

pub mod info;
pub mod lift;
pub mod movement;
pub mod sensors;

use stacklink_shared::{codes, Reply};

use super::Outcome;

/// Split a raw argument string on commas, trimming whitespace around each
/// item. An all-whitespace string has no arguments.
pub(crate) fn split_args(args: &str) -> Vec<&str> {
    if args.trim().is_empty() {
        return Vec::new();
    }
    args.split(',').map(str::trim).collect()
}

pub(crate) fn parse_index(arg: &str) -> Option<u32> {
    arg.parse().ok()
}

/// Booleans on the wire are `true`/`false`, case-insensitive.
pub(crate) fn parse_bool(arg: &str) -> Option<bool> {
    if arg.eq_ignore_ascii_case("true") {
        Some(true)
    } else if arg.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Reply for a malformed argument list.
pub(crate) fn invalid_params() -> Outcome {
    Outcome::reply(Reply::new(codes::INVALID, "Invalid parameters"))
}

/// Reply for a stop index the track does not have.
pub(crate) fn invalid_stop() -> Outcome {
    Outcome::reply(Reply::new(codes::INVALID, "Invalid stop"))
}

/// Reply for a lift index the device does not have.
pub(crate) fn invalid_lift() -> Outcome {
    Outcome::reply(Reply::new(codes::INVALID, "Invalid lift"))
}

pub(crate) fn success() -> Outcome {
    Outcome::reply(Reply::ok("Success"))
}
