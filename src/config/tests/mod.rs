//! Unit tests for config module
//!
//! Tests configuration types, defaults, serialization and file loading.

#![allow(clippy::unwrap_used, clippy::panic)]

use std::time::Duration;

use crate::config::{BusKind, Config, LogLevel, StartupConfig};

#[test]
fn config_default_matches_documented_values() {
    let config = Config::default();

    assert_eq!(config.general.log_level, LogLevel::Info);
    assert_eq!(config.player.max_retries, 5);
    assert_eq!(config.player.retry_delay(), Duration::from_secs(2));
    assert_eq!(config.player.socket_timeout(), Duration::from_secs(10));
    assert_eq!(config.player.restart_timeout(), Duration::from_secs(10));
    assert_eq!(config.player.bus, BusKind::System);
    assert_eq!(config.media.logo_filename, "logo.png");
    assert_eq!(config.media.default_image_duration_secs, 5);
    assert_eq!(config.media.load_timeout(), Duration::from_secs(10));
    assert_eq!(config.media.settle_delay(), Duration::from_millis(500));
    assert_eq!(config.startup.init_attempts, 3);
}

#[test]
fn config_serialize_roundtrip() {
    let original = Config::default();

    let toml_str = original.to_toml().unwrap();
    assert!(toml_str.contains("[player]"));
    assert!(toml_str.contains("[media]"));

    let deserialized = Config::from_toml(&toml_str).unwrap();
    assert_eq!(format!("{original:?}"), format!("{deserialized:?}"));
}

#[test]
fn config_partial_toml_keeps_other_defaults() {
    let toml_str = r#"
        [general]
        log_level = "debug"

        [player]
        socket_path = "/run/signage/mpv.sock"
        bus = "session"
        retry_delay_secs = 0.5

        [media]
        slideshow_script = "/usr/share/vitrine/slideshow.lua"
    "#;

    let config = Config::from_toml(toml_str).unwrap();

    assert_eq!(config.general.log_level, LogLevel::Debug);
    assert_eq!(
        config.player.socket_path.to_string_lossy(),
        "/run/signage/mpv.sock"
    );
    assert_eq!(config.player.bus, BusKind::Session);
    assert_eq!(config.player.retry_delay(), Duration::from_millis(500));
    assert_eq!(config.player.max_retries, 5);
    assert!(config.media.slideshow_script.is_some());
    assert_eq!(config.media.logo_filename, "logo.png");
}

#[test]
fn config_empty_toml() {
    let config = Config::from_toml("").unwrap();
    assert_eq!(config.player.service_name, "mpv.service");
}

#[test]
fn config_invalid_toml() {
    let invalid_toml = r#"
        [player
        socket_path =
    "#;

    assert!(Config::from_toml(invalid_toml).is_err());
}

#[test]
fn config_negative_durations_clamp_to_zero() {
    let config = Config::from_toml("[player]\nretry_delay_secs = -3.0\n").unwrap();
    assert_eq!(config.player.retry_delay(), Duration::ZERO);
}

#[test]
fn config_huge_durations_are_capped() {
    let config = Config::from_toml(
        "[player]\nsocket_timeout_secs = 1e30\ncommand_timeout_secs = inf\n",
    )
    .unwrap();

    let capped = Duration::from_secs(u64::from(u32::MAX));
    assert_eq!(config.player.socket_timeout(), capped);
    assert_eq!(config.player.command_timeout(), capped);
    assert!(std::time::Instant::now().checked_add(capped).is_some());
}

#[test]
fn init_backoff_doubles_and_caps() {
    let startup = StartupConfig::default();

    assert_eq!(startup.init_backoff(1), Duration::from_secs(2));
    assert_eq!(startup.init_backoff(2), Duration::from_secs(4));
    assert_eq!(startup.init_backoff(3), Duration::from_secs(8));
    assert_eq!(startup.init_backoff(5), Duration::from_secs(30));
    assert_eq!(startup.init_backoff(40), Duration::from_secs(30));
}

#[test]
fn load_creates_default_file_when_missing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested/config.toml");

    let config = Config::load(&path).unwrap();

    assert!(path.exists());
    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.starts_with("# Vitrine configuration file"));
    assert_eq!(config.player.max_retries, 5);
}

#[test]
fn load_reports_file_location_on_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[player]\nmax_retries = \"many\"\n").unwrap();

    let err = Config::load(&path).unwrap_err();
    assert!(err.to_string().contains("config.toml"));
}
