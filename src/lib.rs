//! Vitrine - control subsystem for a digital signage player.
//!
//! Drives an mpv instance over its JSON IPC socket: playlists are turned
//! into loadable lists and started through a verified state machine, the
//! idle logo is the fallback for every failure, and playback profiles apply
//! grouped player settings. The player process itself runs as a systemd
//! unit that Vitrine restarts when its socket stops answering.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use vitrine::{config::Config, service_manager::Services, services::playlist::PlaylistId};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let services = Services::new(&Config::default())?;
//! services.controller.initialize().await?;
//! services.controller.play(PlaylistId(1)).await?;
//! # Ok(())
//! # }
//! ```

/// Configuration schema definitions and validation.
pub mod config;

/// Core error types and result aliases.
pub mod core;

/// Command-line interface.
pub mod cli;

/// Player control services.
pub mod services;

/// Wiring of the services from configuration.
pub mod service_manager;

/// Persisted playback state.
pub mod runtime_state;

/// Playlist, profile and state storage.
pub mod store;

/// Logging setup.
pub mod tracing_config;

/// Re-exported core types for convenience.
pub use core::{Result, VitrineError};
