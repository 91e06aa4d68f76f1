/// Supervisor error types
pub mod error;
/// Service manager abstraction and its systemd implementation
pub mod manager;
/// systemd D-Bus proxy definitions
pub mod proxy;
/// Player service supervision
pub mod supervisor;


pub use error::*;
pub use manager::*;
pub use supervisor::*;
