//! Handlers for each CLI subcommand.
//!
//! `main.rs` parses arguments and dispatches here; each handler opens only
//! what it needs (catalogs, database, or both).

pub mod blueprint;
pub mod build;
pub mod calc;
pub mod init;
pub mod modules;
pub mod research;
pub mod scan;
