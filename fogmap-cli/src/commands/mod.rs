//! Subcommand implementations.

pub mod common;
pub mod config;
pub mod list;
pub mod reset;
pub mod stats;
pub mod track;
