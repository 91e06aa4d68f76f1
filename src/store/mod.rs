//! Persistence boundary for playlists, profiles and playback state
//!
//! The playback components only see the repository traits; [`JsonLibrary`]
//! is the bundled implementation backed by a single JSON file.

/// Store error types
pub mod error;
/// JSON-file backed library
pub mod library;
/// Repository traits
pub mod traits;

#[cfg(test)]
mod tests;

pub use error::*;
pub use library::*;
pub use traits::*;
