/// Shared service utilities
pub mod common;
/// Playback event publishing
pub mod events;
/// JSON IPC channel to the player
pub mod ipc;
/// Idle logo display
pub mod logo;
/// Playback facade and startup sequencing
pub mod playback;
/// Playlist formatting and the play state machine
pub mod playlist;
/// Playback profiles and their application
pub mod profile;
/// Player service supervision through systemd
pub mod supervisor;


pub use events::{BroadcastNotifier, EventNotifier, PlaybackEvent};
pub use ipc::{IpcChannel, PlayerBackend};
pub use logo::LogoController;
pub use playback::PlaybackController;
pub use playlist::PlaylistPlayer;
pub use profile::ProfileApplier;
pub use supervisor::ProcessSupervisor;
