//! WINDMAR CLI library.
//!
//! Subcommand handlers and output formatting for the `windmar` binary. The binary
//! only parses arguments and dispatches here.

pub mod commands;
pub mod output;
