/// Broadcast-backed notifier
pub mod broadcast;
/// Playback events
pub mod types;

#[cfg(test)]
mod tests;

pub use broadcast::*;
pub use types::*;
