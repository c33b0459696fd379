//! Shared library for the Idobata chat system.
//!
//! Holds everything both the coordinator and the CLI client need to agree on:
//! the wire protocol, timestamp handling, and logging setup.

pub mod logger;
pub mod protocol;
pub mod time;
