//! Command-line interface for operating the player controller.
//!
//! `serve` runs the long-lived controller; every other command builds the
//! services, performs one operation and exits.

mod args;
mod commands;
pub mod formatting;
mod service;
mod types;


pub use args::{Cli, Commands, ConfigCommand, PlaylistCommand, ProfileCommand, ProfileKind};
pub use service::CliService;
pub use types::{CliError, CommandResult};
