//! StackLink simulator TCP server
//!
//! This crate handles:
//! - Binding the protocol listener
//! - Running one session task per accepted connection
//! - Framing responses and writing them back to the client

pub mod listener;
pub mod session;
