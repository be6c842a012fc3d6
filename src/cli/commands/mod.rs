//! CLI subcommands

pub mod grid;
pub mod train;
