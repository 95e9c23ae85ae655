//! simbin command-line interface
//!
//! Runs scenarios in-process or against a running server.

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands, ScenarioArgs};
