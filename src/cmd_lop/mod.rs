//! Subcommand modules for the `lop` binary.

pub mod check;
pub mod project;
pub mod stats;
