/// Playlist error types
pub mod error;
/// Loadable list formatting
pub mod formatter;
/// Transition phases and reports
pub mod phase;
/// Playlist playback state machine
pub mod player;
/// Playlist domain types
pub mod types;

#[cfg(test)]
mod tests;

pub use error::*;
pub use formatter::{M3uFormatter, PlaylistFormatter};
pub use phase::*;
pub use player::*;
pub use types::*;
