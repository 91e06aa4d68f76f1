/// Player backend capability shared by all components
pub mod backend;
/// Managed, retrying IPC channel
pub mod channel;
/// IPC error types
pub mod error;
/// Socket transport and line framing
pub mod transport;
/// Commands, responses and channel state
pub mod types;


pub use backend::*;
pub use channel::*;
pub use error::*;
pub use transport::*;
pub use types::*;
