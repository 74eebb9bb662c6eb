//! Shared building blocks for the wschat hub and harness.
//!
//! Holds the wire message codec used on both ends of the connection, plus
//! the timestamp and logging helpers both binaries rely on.

pub mod logger;
pub mod message;
pub mod time;

pub use message::{Action, CodecError, Message, SYSTEM_SENDER};
