/// Idle logo display
pub mod controller;
/// Logo error types
pub mod error;
/// Logo file resolution and repair
pub mod files;


pub use controller::*;
pub use error::*;
pub use files::*;
