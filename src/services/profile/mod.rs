/// Profile validation and application
pub mod applier;
/// Supported player properties
pub mod catalog;
/// Profile error types
pub mod error;
/// Profile domain types
pub mod types;


pub use applier::*;
pub use catalog::*;
pub use error::*;
pub use types::*;
