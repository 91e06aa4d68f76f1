#![allow(clippy::unwrap_used, clippy::panic)]

use std::{
    fs, io,
    path::Path,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use futures::StreamExt;
use tempfile::TempDir;

use crate::{
    config::MediaConfig,
    runtime_state::{PlaybackState, PlaybackStatus},
    services::{
        events::{BroadcastNotifier, PlaybackEvent},
        ipc::ChannelError,
        logo::LogoController,
        playlist::{
            M3uFormatter, MediaKind, PlayPhase, PlaybackTimings, PlayerDeps, Playlist,
            PlaylistEntry, PlaylistError, PlaylistFormatter, PlaylistId, PlaylistPlayer,
            formatter::{ListItem, first_entry, list_items},
        },
        testing::{Fault, ScriptedBackend},
    },
    store::{JsonLibrary, PlaybackStateStore, PlaylistRepository, StoreError},
};

fn entry(file: &str, position: u32, duration_secs: Option<u32>) -> PlaylistEntry {
    PlaylistEntry {
        file_reference: file.to_string(),
        duration_secs,
        position,
    }
}

fn sample_playlist() -> Playlist {
    Playlist {
        id: PlaylistId(7),
        name: "lobby".to_string(),
        entries: vec![
            entry("c.mp4", 2, None),
            entry("a.png", 0, None),
            entry("b.jpg", 1, Some(8)),
        ],
    }
}

fn touch(path: &Path) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, b"data").unwrap();
}

struct Rig {
    _dir: TempDir,
    media: MediaConfig,
    backend: Arc<ScriptedBackend>,
    library: Arc<JsonLibrary>,
    notifier: BroadcastNotifier,
    player: PlaylistPlayer,
}

impl Rig {
    async fn new(backend: ScriptedBackend) -> Self {
        Self::with_media(backend, |_| {}).await
    }

    async fn with_media(backend: ScriptedBackend, adjust: impl FnOnce(&mut MediaConfig)) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut media = MediaConfig {
            upload_dir: dir.path().join("uploads"),
            playlist_dir: dir.path().join("lists"),
            default_logo: dir.path().join("default-logo.png"),
            ..MediaConfig::default()
        };
        adjust(&mut media);
        touch(&media.default_logo);
        for file in ["a.png", "b.jpg", "c.mp4"] {
            touch(&media.upload_dir.join(file));
        }

        let backend = Arc::new(backend);
        let library = Arc::new(JsonLibrary::in_memory());
        library.save_playlist(sample_playlist()).await.unwrap();
        let notifier = BroadcastNotifier::default();

        let player = PlaylistPlayer::new(
            PlayerDeps {
                backend: backend.clone(),
                playlists: library.clone(),
                state: library.clone(),
                formatter: Arc::new(M3uFormatter::new(&media)),
                fallback: Arc::new(LogoController::new(backend.clone(), &media)),
                notifier: Arc::new(notifier.clone()),
            },
            PlaybackTimings::new(&media, Duration::from_secs(2)),
        );

        Self {
            _dir: dir,
            media,
            backend,
            library,
            notifier,
            player,
        }
    }

    fn logo_lines(&self) -> Vec<String> {
        vec![
            format!("loadfile {} replace", self.media.logo_path().display()),
            "set_property loop-file inf".to_string(),
            "set_property pause false".to_string(),
        ]
    }

    /// Second player over the same rig with a different state store
    fn player_with_state(&self, state: Arc<dyn PlaybackStateStore>) -> PlaylistPlayer {
        PlaylistPlayer::new(
            PlayerDeps {
                backend: self.backend.clone(),
                playlists: self.library.clone(),
                state,
                formatter: Arc::new(M3uFormatter::new(&self.media)),
                fallback: Arc::new(LogoController::new(self.backend.clone(), &self.media)),
                notifier: Arc::new(self.notifier.clone()),
            },
            PlaybackTimings::new(&self.media, Duration::from_secs(2)),
        )
    }

    fn list_path(&self) -> std::path::PathBuf {
        self.media.playlist_dir.join("playlist-7.m3u")
    }

    fn position(&self, line: &str) -> usize {
        self.backend
            .lines()
            .iter()
            .position(|l| l == line)
            .unwrap_or_else(|| panic!("{line} not sent: {:?}", self.backend.lines()))
    }

    async fn status(&self) -> PlaybackStatus {
        self.library.load_state().await.unwrap().status
    }

    fn ends_on_logo(&self) -> bool {
        self.backend.lines().ends_with(&self.logo_lines())
    }
}

#[tokio::test(start_paused = true)]
async fn play_runs_the_full_transition() {
    let rig = Rig::new(ScriptedBackend::new()).await;
    let mut events = rig.notifier.events();

    let report = rig.player.play(PlaylistId(7)).await.unwrap();

    let mut expected = rig.logo_lines();
    expected.extend([
        "stop".to_string(),
        "set_property loop-file no".to_string(),
        "set_property loop-playlist inf".to_string(),
        "set_property image-display-duration 5".to_string(),
        "get_property core-idle".to_string(),
        format!("loadlist {} replace", rig.list_path().display()),
        format!(
            "loadfile {} insert-at 1 image-display-duration=8",
            rig.media.upload_dir.join("b.jpg").display()
        ),
        "playlist-remove 2".to_string(),
        "set_property pause false".to_string(),
        "playlist-play-index 0".to_string(),
        "set_property pause false".to_string(),
        "get_property playlist-pos".to_string(),
    ]);
    assert_eq!(rig.backend.lines(), expected);

    assert_eq!(
        report.transitions,
        vec![
            PlayPhase::Resolving,
            PlayPhase::Neutral,
            PlayPhase::Configuring,
            PlayPhase::Loading,
            PlayPhase::ListLoaded,
            PlayPhase::Verifying,
            PlayPhase::Playing,
        ]
    );

    let state = rig.library.load_state().await.unwrap();
    assert_eq!(state.status, PlaybackStatus::Playing);
    assert_eq!(state.active_playlist_id, Some(PlaylistId(7)));
    assert_eq!(
        events.next().await.unwrap(),
        PlaybackEvent::PlaybackStarted {
            playlist_id: PlaylistId(7),
            recovered: false
        }
    );
}

#[tokio::test(start_paused = true)]
async fn looping_logo_is_released_before_the_list_loads() {
    let rig = Rig::new(ScriptedBackend::new()).await;

    rig.player.play(PlaylistId(7)).await.unwrap();

    let logo_loop = rig.position("set_property loop-file inf");
    let release = rig.position("set_property loop-file no");
    let load = rig.position(&format!("loadlist {} replace", rig.list_path().display()));
    assert!(logo_loop < release && release < load);
    assert_eq!(rig.backend.property("loop-file"), Some(serde_json::json!("no")));
}

#[tokio::test(start_paused = true)]
async fn unreleased_file_loop_aborts_the_start() {
    let backend = ScriptedBackend::new();
    backend.fail("set_property", Some("loop-file"), Fault::Unavailable);
    let rig = Rig::new(backend).await;

    let err = rig.player.play(PlaylistId(7)).await.unwrap_err();

    assert!(matches!(
        err,
        PlaylistError::Command {
            phase: PlayPhase::Configuring,
            source: ChannelError::Unavailable { .. }
        }
    ));
    assert_eq!(rig.backend.count("loadlist"), 0);
    assert_eq!(rig.status().await, PlaybackStatus::Error);
}

#[tokio::test(start_paused = true)]
async fn only_non_default_image_times_are_pinned() {
    let rig = Rig::with_media(ScriptedBackend::new(), |media| {
        media.default_image_duration_secs = 8;
    })
    .await;

    rig.player.play(PlaylistId(7)).await.unwrap();

    // a.png falls back to the default, b.jpg asks for exactly the default
    assert_eq!(rig.backend.count("playlist-remove"), 0);
    assert!(
        rig.backend
            .lines()
            .contains(&"set_property image-display-duration 8".to_string())
    );
}

#[tokio::test(start_paused = true)]
async fn rejected_entry_time_fails_the_load() {
    let backend = ScriptedBackend::new();
    backend.fail("playlist-remove", None, Fault::Rejected("invalid parameter"));
    let rig = Rig::new(backend).await;

    let err = rig.player.play(PlaylistId(7)).await.unwrap_err();

    assert!(matches!(
        err,
        PlaylistError::Command {
            phase: PlayPhase::Loading,
            source: ChannelError::Protocol { .. }
        }
    ));
    assert!(rig.ends_on_logo());
}

/// Delegates to a library but fails every save after the first
struct RefreshFailsStore {
    inner: Arc<JsonLibrary>,
    saves: AtomicUsize,
}

#[async_trait]
impl PlaybackStateStore for RefreshFailsStore {
    async fn load_state(&self) -> Result<PlaybackState, StoreError> {
        self.inner.load_state().await
    }

    async fn save_state(&self, state: PlaybackState) -> Result<(), StoreError> {
        if self.saves.fetch_add(1, Ordering::SeqCst) > 0 {
            return Err(StoreError::Io {
                path: "library.json".into(),
                source: io::Error::other("disk full"),
            });
        }
        self.inner.save_state(state).await
    }
}

#[tokio::test(start_paused = true)]
async fn failed_state_refresh_keeps_confirmed_playback() {
    let rig = Rig::new(ScriptedBackend::new()).await;
    let store = Arc::new(RefreshFailsStore {
        inner: rig.library.clone(),
        saves: AtomicUsize::new(0),
    });
    let player = rig.player_with_state(store.clone());
    let mut events = rig.notifier.events();

    let report = player.play(PlaylistId(7)).await.unwrap();

    assert_eq!(report.phase(), Some(PlayPhase::Playing));
    assert_eq!(store.saves.load(Ordering::SeqCst), 2);
    assert_eq!(rig.status().await, PlaybackStatus::Playing);
    assert!(!rig.ends_on_logo());
    assert_eq!(events.next().await.unwrap().name(), "playback_started");
}

#[tokio::test(start_paused = true)]
async fn idle_player_is_woken_before_the_list_load() {
    let rig = Rig::new(ScriptedBackend::new().with_property("core-idle", serde_json::json!(true)))
        .await;

    let report = rig.player.play(PlaylistId(7)).await.unwrap();

    let wake = rig.position("loadfile /dev/null replace");
    let load = rig.position(&format!("loadlist {} replace", rig.list_path().display()));
    assert!(wake < load);
    assert!(report.woke_player());
    assert_eq!(rig.status().await, PlaybackStatus::Playing);
}

#[tokio::test(start_paused = true)]
async fn inactive_playlist_position_triggers_direct_recovery() {
    let rig = Rig::new(ScriptedBackend::new().with_property("playlist-pos", serde_json::json!(-1)))
        .await;

    let report = rig.player.play(PlaylistId(7)).await.unwrap();

    let first = rig.media.upload_dir.join("a.png");
    let lines = rig.backend.lines();
    let verify = rig.position("get_property playlist-pos");
    assert_eq!(
        lines[verify + 1..],
        [
            "stop".to_string(),
            format!("loadfile {} replace", first.display()),
            "set_property pause false".to_string(),
        ]
    );
    assert!(report.recovered());
    assert_eq!(rig.status().await, PlaybackStatus::Playing);
}

#[tokio::test(start_paused = true)]
async fn list_load_timeout_falls_back_to_logo() {
    let backend = ScriptedBackend::new();
    backend.fail("loadlist", None, Fault::Timeout);
    let rig = Rig::new(backend).await;
    let mut events = rig.notifier.events();

    let err = rig.player.play(PlaylistId(7)).await.unwrap_err();

    assert!(matches!(
        err,
        PlaylistError::Command {
            phase: PlayPhase::Loading,
            source: ChannelError::Timeout { .. }
        }
    ));
    assert_eq!(rig.status().await, PlaybackStatus::Error);
    assert!(rig.ends_on_logo());
    assert_eq!(events.next().await.unwrap().name(), "playback_failed");
}

#[tokio::test(start_paused = true)]
async fn rejected_index_selection_falls_back_to_logo() {
    let backend = ScriptedBackend::new();
    backend.fail("playlist-play-index", None, Fault::Rejected("invalid parameter"));
    let rig = Rig::new(backend).await;

    let err = rig.player.play(PlaylistId(7)).await.unwrap_err();

    assert!(matches!(
        err,
        PlaylistError::Command {
            phase: PlayPhase::ListLoaded,
            source: ChannelError::Protocol { .. }
        }
    ));
    assert_eq!(rig.status().await, PlaybackStatus::Error);
    assert!(rig.ends_on_logo());
}

#[tokio::test(start_paused = true)]
async fn missing_media_never_reaches_the_player() {
    let rig = Rig::new(ScriptedBackend::new()).await;
    fs::remove_file(rig.media.upload_dir.join("b.jpg")).unwrap();

    let err = rig.player.play(PlaylistId(7)).await.unwrap_err();

    assert!(matches!(err, PlaylistError::MissingMedia { .. }));
    assert_eq!(rig.backend.count("loadlist"), 0);
    assert_eq!(rig.backend.lines(), rig.logo_lines());
    assert_eq!(rig.status().await, PlaybackStatus::Error);
}

#[tokio::test(start_paused = true)]
async fn unknown_playlist_is_reported() {
    let rig = Rig::new(ScriptedBackend::new()).await;

    let err = rig.player.play(PlaylistId(99)).await.unwrap_err();

    assert!(matches!(err, PlaylistError::NotFound(PlaylistId(99))));
    assert!(rig.ends_on_logo());
}

#[tokio::test(start_paused = true)]
async fn optional_slideshow_setup_failures_are_tolerated() {
    let backend = ScriptedBackend::new();
    backend.fail("load-script", None, Fault::Rejected("error running command"));
    backend.fail("set_property", Some("image-display-duration"), Fault::Timeout);
    let rig = Rig::with_media(backend, |media| {
        media.slideshow_script = Some("/usr/share/vitrine/slideshow.lua".into());
    })
    .await;

    rig.player.play(PlaylistId(7)).await.unwrap();

    assert_eq!(rig.backend.count("load-script"), 1);
    assert_eq!(rig.status().await, PlaybackStatus::Playing);
}

#[tokio::test]
async fn stop_is_idempotent() {
    let rig = Rig::new(ScriptedBackend::new()).await;

    rig.player.stop().await.unwrap();
    rig.player.stop().await.unwrap();

    let state = rig.library.load_state().await.unwrap();
    assert_eq!(state.status, PlaybackStatus::Idle);
    assert_eq!(state.active_playlist_id, None);
    assert!(rig.ends_on_logo());
}

#[tokio::test]
async fn stop_shows_logo_even_when_player_stop_fails() {
    let backend = ScriptedBackend::new();
    backend.fail("stop", None, Fault::Unavailable);
    let rig = Rig::new(backend).await;
    let mut events = rig.notifier.events();

    rig.player.stop().await.unwrap();

    assert!(rig.ends_on_logo());
    assert_eq!(events.next().await.unwrap(), PlaybackEvent::PlaybackStopped);
}

#[test]
fn m3u_lists_entries_in_position_order_with_durations() {
    let dir = tempfile::tempdir().unwrap();
    let media = MediaConfig {
        upload_dir: dir.path().to_path_buf(),
        ..MediaConfig::default()
    };
    for file in ["a.png", "b.jpg", "c.mp4"] {
        touch(&dir.path().join(file));
    }

    let rendered = M3uFormatter::new(&media).render(&sample_playlist()).unwrap();

    let root = dir.path().display();
    assert_eq!(
        rendered,
        format!(
            "#EXTM3U\n#EXTINF:5,a.png\n{root}/a.png\n#EXTINF:8,b.jpg\n{root}/b.jpg\n#EXTINF:-1,c.mp4\n{root}/c.mp4\n"
        )
    );
}

#[tokio::test]
async fn formatting_an_unchanged_playlist_leaves_the_file_alone() {
    let dir = tempfile::tempdir().unwrap();
    let media = MediaConfig {
        upload_dir: dir.path().join("uploads"),
        playlist_dir: dir.path().join("lists"),
        ..MediaConfig::default()
    };
    for file in ["a.png", "b.jpg", "c.mp4"] {
        touch(&media.upload_dir.join(file));
    }
    let formatter = M3uFormatter::new(&media);

    let first = formatter.ensure_loadable(&sample_playlist()).await.unwrap();
    let written_at = fs::metadata(&first).unwrap().modified().unwrap();
    let second = formatter.ensure_loadable(&sample_playlist()).await.unwrap();

    assert_eq!(first, second);
    assert!(first.is_absolute());
    assert_eq!(fs::metadata(&second).unwrap().modified().unwrap(), written_at);
}

#[test]
fn positions_must_be_contiguous_from_zero() {
    let mut playlist = sample_playlist();
    playlist.entries[0].position = 3;
    assert!(matches!(
        playlist.validate(),
        Err(PlaylistError::InvalidPositions { .. })
    ));

    let mut duplicated = sample_playlist();
    duplicated.entries[0].position = 0;
    assert!(matches!(
        duplicated.validate(),
        Err(PlaylistError::InvalidPositions { .. })
    ));

    let empty = Playlist {
        id: PlaylistId(1),
        name: "empty".to_string(),
        entries: Vec::new(),
    };
    assert!(matches!(empty.validate(), Err(PlaylistError::Empty(_))));
}

#[test]
fn media_kind_follows_extension() {
    assert_eq!(MediaKind::from_path(Path::new("x/Photo.JPG")), Some(MediaKind::Image));
    assert_eq!(MediaKind::from_path(Path::new("clip.webm")), Some(MediaKind::Video));
    assert_eq!(MediaKind::from_path(Path::new("notes.txt")), None);

    assert_eq!(entry("a.png", 0, None).effective_duration(5), Some(5));
    assert_eq!(entry("a.png", 0, Some(12)).effective_duration(5), Some(12));
    assert_eq!(entry("v.mp4", 0, Some(12)).effective_duration(5), None);
}

#[test]
fn first_entry_skips_directives_and_blank_lines() {
    assert_eq!(
        first_entry("#EXTM3U\n\n#EXTINF:5,a.png\n/srv/a.png\n/srv/b.png\n"),
        Some("/srv/a.png")
    );
    assert_eq!(first_entry("#EXTM3U\n"), None);
}

#[test]
fn list_items_carry_extinf_times() {
    let list = "#EXTM3U\n#EXTINF:5,a.png\n/m/a.png\n\n#EXTINF:-1,c.mp4\n/m/c.mp4\n/m/d.png\n";

    assert_eq!(
        list_items(list),
        vec![
            ListItem {
                index: 0,
                path: "/m/a.png",
                duration_secs: Some(5)
            },
            ListItem {
                index: 1,
                path: "/m/c.mp4",
                duration_secs: None
            },
            ListItem {
                index: 2,
                path: "/m/d.png",
                duration_secs: None
            },
        ]
    );
}
