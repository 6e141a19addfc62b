//! Trowel CLI - command-line front end for the standardization pipeline.

pub mod cli;

pub use cli::{Cli, Command, InitConfigArgs, StandardizeArgs};
