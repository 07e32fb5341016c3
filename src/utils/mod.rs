//! Generic utility primitives with zero domain knowledge.
//!
//! - `command` - External command execution with timeout and capture
//! - `io` - File I/O with consistent error handling

pub mod command;
pub mod io;
