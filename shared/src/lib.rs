//! StackLink Shared Protocol Types
//!
//! This crate provides the reply model, status codes, and line codec shared
//! between the simulator server and protocol clients.

pub mod codec;

/// Status codes used by the device protocol.
///
/// Codes are rendered on the wire as exactly four zero-padded digits.
pub mod codes {
    /// Command completed.
    pub const OK: u16 = 0;
    /// Protocol or argument error: empty line, unknown name, bad parameters.
    pub const INVALID: u16 = 1;
    /// A track segment on the path of a move is blocked.
    pub const MOVEMENT_BLOCKED: u16 = 57;
    /// Nothing came out of the stack.
    pub const DISPENSE_FAILED: u16 = 2000;
    /// The lift mechanism or its stop is obstructed.
    pub const LIFT_BLOCKED: u16 = 2001;
    /// No plate at the lift stop to return.
    pub const NO_PLATE_AT_LIFT: u16 = 2002;
    /// The stack cannot accept another plate.
    pub const STACK_FULL: u16 = 2003;
    /// No plate at the addressed stop.
    pub const NO_PLATE_AT_STOP: u16 = 2004;
    /// A shift pass found no movable plate.
    pub const NOTHING_TO_SHIFT: u16 = 2005;
    /// Recognised command without a mock implementation, or internal failure.
    pub const UNIMPLEMENTED: u16 = 9999;
}

/// Render a status code in its 4-digit zero-padded wire form.
pub fn format_code(code: u16) -> String {
    format!("{code:04}")
}

/// One command's response: status code, message, and optional list body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub code: u16,
    pub message: String,
    /// Body lines for list replies; when non-empty the framing layer appends
    /// an `End of List` terminator.
    pub extra: Vec<String>,
}

impl Reply {
    /// Create a reply with no body lines.
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            extra: Vec::new(),
        }
    }

    /// Create a success reply.
    pub fn ok(message: impl Into<String>) -> Self {
        Self::new(codes::OK, message)
    }

    /// Create a reply carrying body lines.
    pub fn with_lines(code: u16, message: impl Into<String>, extra: Vec<String>) -> Self {
        Self {
            code,
            message: message.into(),
            extra,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_rendering() {
        assert_eq!(format_code(0), "0000");
        assert_eq!(format_code(1), "0001");
        assert_eq!(format_code(57), "0057");
        assert_eq!(format_code(2000), "2000");
        assert_eq!(format_code(9999), "9999");
    }

    #[test]
    fn test_reply_builders() {
        let ok = Reply::ok("Success");
        assert_eq!(ok.code, codes::OK);
        assert_eq!(ok.message, "Success");
        assert!(ok.extra.is_empty());

        let listing = Reply::with_lines(
            codes::OK,
            "Command list (2 commands)",
            vec!["Dispense".into(), "Return".into()],
        );
        assert_eq!(listing.extra.len(), 2);
    }
}
