//! Subcommand implementations.

pub mod availability;
pub mod config;
pub mod token;
