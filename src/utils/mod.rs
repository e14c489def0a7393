//! Generic utility primitives with zero domain knowledge.
//!
//! - `command` - Command execution with error handling
//! - `shell` - Shell quoting and word splitting

pub mod command;
pub mod shell;
