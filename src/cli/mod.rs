//! Command-line interface for credforge.
//!
//! Provides the `run` command for full curation runs and the `catalog`
//! command for exporting the rule catalog alone.

mod commands;

pub use commands::{parse_cli, run, run_with_cli, Cli, Commands};
