pub mod config;
pub mod playback;
pub mod playlist;
pub mod profile;
pub mod serve;
