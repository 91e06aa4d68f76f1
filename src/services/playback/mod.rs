/// Playback façade and startup sequencing
pub mod controller;
/// Playback error types
pub mod error;
/// Player process lifecycle checks
pub mod lifecycle;
/// Status snapshots
pub mod status;

#[cfg(test)]
mod tests;

pub use controller::*;
pub use error::*;
pub use lifecycle::*;
pub use status::*;
