//! Line-oriented codec for the StackLink TCP protocol
//!
//! Requests are plain-text command lines terminated by `\n` (optionally
//! `\r\n`). A response for one command line is framed as:
//!
//! ```text
//! <echoed command line>\r\n
//! <4-digit code> <message>\r\n
//! [<body line>\r\n ...]
//! [End of List\r\n]
//! ```
//!
//! The body lines and the `End of List` terminator are only present when the
//! reply carries extra lines. The whole response is serialized into a single
//! buffer so the session layer can issue one write per command line.

use bytes::{Bytes, BytesMut};

use crate::{format_code, Reply};

/// Terminator appended after the body of a multi-line reply.
pub const END_OF_LIST: &str = "End of List";

/// Streaming decoder that splits a TCP byte stream into command lines.
///
/// Bytes arrive in arbitrary chunks; a line is only yielded once its `\n`
/// terminator has been seen, with a trailing `\r` trimmed. Anything after
/// the last `\n` stays buffered until more data arrives.
#[derive(Debug, Default)]
pub struct LineDecoder {
    /// Partial line data being accumulated
    buffer: BytesMut,
}

impl LineDecoder {
    /// Create a new line decoder
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(1024),
        }
    }

    /// Add received bytes to the decoder buffer
    pub fn extend(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Take the next complete line, if one is buffered.
    ///
    /// Call this repeatedly until it returns `None` to drain all complete
    /// lines. Non-UTF-8 bytes are replaced rather than rejected.
    pub fn next_line(&mut self) -> Option<String> {
        let pos = self.buffer.iter().position(|&b| b == b'\n')?;
        let line = self.buffer.split_to(pos + 1);
        let mut end = line.len() - 1;
        if end > 0 && line[end - 1] == b'\r' {
            end -= 1;
        }
        Some(String::from_utf8_lossy(&line[..end]).into_owned())
    }

    /// Get the number of buffered bytes awaiting a terminator (for debugging)
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }
}

/// Encode one command's full response for a single send.
pub fn encode_reply(echo: &str, reply: &Reply) -> Bytes {
    let mut out = BytesMut::with_capacity(echo.len() + reply.message.len() + 32);
    out.extend_from_slice(echo.as_bytes());
    out.extend_from_slice(b"\r\n");
    out.extend_from_slice(format_code(reply.code).as_bytes());
    out.extend_from_slice(b" ");
    out.extend_from_slice(reply.message.as_bytes());
    out.extend_from_slice(b"\r\n");
    if !reply.extra.is_empty() {
        for line in &reply.extra {
            out.extend_from_slice(line.as_bytes());
            out.extend_from_slice(b"\r\n");
        }
        out.extend_from_slice(END_OF_LIST.as_bytes());
        out.extend_from_slice(b"\r\n");
    }
    out.freeze()
}
