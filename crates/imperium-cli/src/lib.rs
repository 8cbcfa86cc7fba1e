//! Imperium CLI library.
//!
//! Command handlers and output formatting for the `imperium-cli` binary. The
//! handlers only orchestrate calls into `imperium_lib`.

pub mod commands;
pub mod context;
pub mod output;
