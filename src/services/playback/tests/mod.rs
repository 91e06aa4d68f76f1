#![allow(clippy::unwrap_used, clippy::panic)]

use std::{
    fs,
    path::Path,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicU32, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use futures::StreamExt;
use serde_json::json;
use tempfile::TempDir;
use tokio::time::{Instant, sleep};

use crate::{
    config::{MediaConfig, StartupConfig},
    runtime_state::{PlaybackState, PlaybackStatus},
    services::{
        events::{BroadcastNotifier, PlaybackEvent},
        ipc::{ChannelError, ChannelState},
        logo::LogoController,
        playback::{
            ControllerDeps, PlaybackController, PlaybackError, PlayerLifecycle, StartupOutcome,
        },
        playlist::{
            M3uFormatter, PlaybackTimings, PlayerDeps, Playlist, PlaylistEntry, PlaylistId,
            PlaylistPlayer,
        },
        profile::{ProfileApplier, ProfileType, SettingValue, Settings},
        testing::{Fault, ScriptedBackend},
    },
    store::{JsonLibrary, PlaybackStateStore, PlaylistRepository},
};

struct FakeLifecycle {
    ready_after: AtomicU32,
    restart_ok: AtomicBool,
    handshakes: Mutex<Vec<Instant>>,
    restarts: AtomicU32,
}

impl FakeLifecycle {
    fn ready_after(failures: u32) -> Arc<Self> {
        Arc::new(Self {
            ready_after: AtomicU32::new(failures),
            restart_ok: AtomicBool::new(true),
            handshakes: Mutex::new(Vec::new()),
            restarts: AtomicU32::new(0),
        })
    }
}

#[async_trait]
impl PlayerLifecycle for FakeLifecycle {
    fn unit(&self) -> String {
        "mpv.service".to_string()
    }

    fn channel_state(&self) -> ChannelState {
        ChannelState::Ready
    }

    async fn service_active(&self) -> bool {
        true
    }

    async fn socket_reachable(&self) -> bool {
        true
    }

    async fn handshake(&self) -> Result<(), ChannelError> {
        self.handshakes.lock().unwrap().push(Instant::now());
        let left = self.ready_after.load(Ordering::SeqCst);
        if left > 0 {
            self.ready_after.store(left - 1, Ordering::SeqCst);
            return Err(ChannelError::Unavailable {
                attempts: 1,
                reason: "connection refused".to_string(),
            });
        }
        Ok(())
    }

    async fn restart(&self) -> bool {
        self.restarts.fetch_add(1, Ordering::SeqCst);
        self.restart_ok.load(Ordering::SeqCst)
    }
}

fn touch(path: &Path) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, b"data").unwrap();
}

fn playlist(id: i64, files: &[&str]) -> Playlist {
    Playlist {
        id: PlaylistId(id),
        name: format!("playlist {id}"),
        entries: files
            .iter()
            .enumerate()
            .map(|(position, file)| PlaylistEntry {
                file_reference: file.to_string(),
                duration_secs: None,
                position: position as u32,
            })
            .collect(),
    }
}

struct Rig {
    _dir: TempDir,
    media: MediaConfig,
    backend: Arc<ScriptedBackend>,
    library: Arc<JsonLibrary>,
    lifecycle: Arc<FakeLifecycle>,
    notifier: BroadcastNotifier,
    controller: Arc<PlaybackController>,
}

impl Rig {
    async fn new(backend: ScriptedBackend, lifecycle: Arc<FakeLifecycle>) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let media = MediaConfig {
            upload_dir: dir.path().join("uploads"),
            playlist_dir: dir.path().join("lists"),
            default_logo: dir.path().join("default-logo.png"),
            ..MediaConfig::default()
        };
        touch(&media.default_logo);
        for file in ["a.png", "b.jpg", "c.mp4", "d.png"] {
            touch(&media.upload_dir.join(file));
        }

        let backend = Arc::new(backend.with_property(
            "property-list",
            json!(["mute", "volume", "fullscreen", "loop-playlist"]),
        ));
        let library = Arc::new(JsonLibrary::in_memory());
        library
            .save_playlist(playlist(7, &["a.png", "b.jpg", "c.mp4"]))
            .await
            .unwrap();
        library
            .save_playlist(playlist(8, &["d.png"]))
            .await
            .unwrap();

        let notifier = BroadcastNotifier::default();
        let command_timeout = Duration::from_secs(2);
        let logo = Arc::new(LogoController::new(backend.clone(), &media));
        let player = PlaylistPlayer::new(
            PlayerDeps {
                backend: backend.clone(),
                playlists: library.clone(),
                state: library.clone(),
                formatter: Arc::new(M3uFormatter::new(&media)),
                fallback: logo.clone(),
                notifier: Arc::new(notifier.clone()),
            },
            PlaybackTimings::new(&media, command_timeout),
        );
        let profiles = Arc::new(ProfileApplier::new(
            backend.clone(),
            library.clone(),
            Arc::new(notifier.clone()),
            command_timeout,
        ));

        let controller = Arc::new(PlaybackController::new(
            ControllerDeps {
                lifecycle: lifecycle.clone(),
                player,
                logo,
                profiles,
                playlists: library.clone(),
                state: library.clone(),
                notifier: Arc::new(notifier.clone()),
            },
            StartupConfig::default(),
        ));

        Self {
            _dir: dir,
            media,
            backend,
            library,
            lifecycle,
            notifier,
            controller,
        }
    }

    fn logo_load(&self) -> String {
        format!("loadfile {} replace", self.media.logo_path().display())
    }

    fn logo_loads(&self) -> usize {
        let logo = self.logo_load();
        self.backend.lines().iter().filter(|l| **l == logo).count()
    }

    async fn state(&self) -> PlaybackState {
        self.library.load_state().await.unwrap()
    }
}

fn logo_path_leaked(rig: &Rig) -> &'static str {
    Box::leak(
        rig.media
            .logo_path()
            .display()
            .to_string()
            .into_boxed_str(),
    )
}

#[tokio::test(start_paused = true)]
async fn cold_start_resumes_the_persisted_playlist() {
    let rig = Rig::new(ScriptedBackend::new(), FakeLifecycle::ready_after(0)).await;
    rig.library
        .save_state(PlaybackState::playing(PlaylistId(7)))
        .await
        .unwrap();

    let outcome = rig.controller.initialize().await.unwrap();
    sleep(Duration::from_secs(30)).await;

    assert_eq!(outcome, StartupOutcome::Resumed(PlaylistId(7)));
    let state = rig.state().await;
    assert_eq!(state.status, PlaybackStatus::Playing);
    assert_eq!(state.active_playlist_id, Some(PlaylistId(7)));
    assert_eq!(rig.logo_loads(), 1, "only the neutral logo before the list load");
    assert_eq!(
        rig.backend.lines().last().map(String::as_str),
        Some("get_property playlist-pos")
    );
}

#[tokio::test(start_paused = true)]
async fn cold_start_without_playlist_shows_logo_in_background() {
    let rig = Rig::new(ScriptedBackend::new(), FakeLifecycle::ready_after(0)).await;
    let mut events = rig.notifier.events();

    let outcome = rig.controller.initialize().await.unwrap();
    sleep(Duration::from_millis(10)).await;

    assert_eq!(outcome, StartupOutcome::Idle);
    assert_eq!(rig.logo_loads(), 1);
    assert!(matches!(
        events.next().await.unwrap(),
        PlaybackEvent::IdleLogoDisplayed { .. }
    ));
}

#[tokio::test(start_paused = true)]
async fn initialization_retries_with_exponential_backoff() {
    let rig = Rig::new(ScriptedBackend::new(), FakeLifecycle::ready_after(2)).await;

    rig.controller.initialize().await.unwrap();

    let handshakes = rig.lifecycle.handshakes.lock().unwrap().clone();
    assert_eq!(handshakes.len(), 3);
    assert!(handshakes[1] - handshakes[0] >= Duration::from_secs(2));
    assert!(handshakes[2] - handshakes[1] >= Duration::from_secs(4));
}

#[tokio::test(start_paused = true)]
async fn initialization_fails_after_three_attempts() {
    let rig = Rig::new(ScriptedBackend::new(), FakeLifecycle::ready_after(u32::MAX)).await;

    let err = rig.controller.initialize().await.unwrap_err();

    assert!(matches!(err, PlaybackError::InitFailed { attempts: 3, ref failures } if failures.contains("handshake")));
    assert!(rig.backend.commands().is_empty());
}

#[tokio::test(start_paused = true)]
async fn background_logo_gives_up_after_three_attempts() {
    let rig = Rig::new(ScriptedBackend::new(), FakeLifecycle::ready_after(0)).await;
    rig.backend
        .fail("loadfile", Some(logo_path_leaked(&rig)), Fault::Unavailable);

    rig.controller.initialize().await.unwrap();
    sleep(Duration::from_secs(30)).await;

    assert_eq!(rig.logo_loads(), 3);
}

#[tokio::test(start_paused = true)]
async fn background_logo_never_overrides_a_later_play() {
    let rig = Rig::new(ScriptedBackend::new(), FakeLifecycle::ready_after(0)).await;
    rig.backend
        .fail("loadfile", Some(logo_path_leaked(&rig)), Fault::Unavailable);

    rig.controller.initialize().await.unwrap();
    sleep(Duration::from_millis(100)).await;
    rig.controller.play(PlaylistId(7)).await.unwrap();
    sleep(Duration::from_secs(30)).await;

    // First background attempt plus the neutral logo inside play.
    assert_eq!(rig.logo_loads(), 2);
    assert_eq!(rig.state().await.status, PlaybackStatus::Playing);
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_background_retries() {
    let rig = Rig::new(ScriptedBackend::new(), FakeLifecycle::ready_after(0)).await;
    rig.backend
        .fail("loadfile", Some(logo_path_leaked(&rig)), Fault::Unavailable);

    rig.controller.initialize().await.unwrap();
    rig.controller.shutdown().await;
    sleep(Duration::from_secs(30)).await;

    assert!(rig.logo_loads() <= 1);
}

#[tokio::test(start_paused = true)]
async fn concurrent_plays_do_not_interleave() {
    let rig = Rig::new(ScriptedBackend::new(), FakeLifecycle::ready_after(0)).await;

    let first = tokio::spawn({
        let controller = rig.controller.clone();
        async move { controller.play(PlaylistId(7)).await.map(|_| ()) }
    });
    let second = tokio::spawn({
        let controller = rig.controller.clone();
        async move { controller.play(PlaylistId(8)).await.map(|_| ()) }
    });
    first.await.unwrap().unwrap();
    second.await.unwrap().unwrap();

    let lines = rig.backend.lines();
    assert_eq!(lines.len(), 26);
    for half in lines.chunks(13) {
        assert_eq!(half[0], rig.logo_load());
        assert_eq!(half.iter().filter(|l| l.starts_with("loadlist")).count(), 1);
        assert_eq!(half[12], "get_property playlist-pos");
    }
}

#[tokio::test(start_paused = true)]
async fn play_applies_the_assigned_profile() {
    let rig = Rig::new(ScriptedBackend::new(), FakeLifecycle::ready_after(0)).await;
    let profile = rig
        .controller
        .create_profile(
            "loud",
            ProfileType::Playlist,
            Settings::from([("volume".to_string(), SettingValue::Int(90))]),
        )
        .await
        .unwrap();
    rig.controller
        .assign_profile(PlaylistId(7), profile.id)
        .await
        .unwrap();

    rig.controller.play(PlaylistId(7)).await.unwrap();

    assert_eq!(rig.backend.property("volume"), Some(json!(90)));
    let status = rig.controller.status().await.unwrap();
    assert_eq!(status.profile_id, Some(profile.id));
    assert_eq!(status.channel, ChannelState::Ready);
}

#[tokio::test]
async fn stop_applies_the_idle_profile() {
    let rig = Rig::new(ScriptedBackend::new(), FakeLifecycle::ready_after(0)).await;
    rig.controller
        .create_profile(
            "silent",
            ProfileType::Idle,
            Settings::from([("mute".to_string(), SettingValue::Bool(true))]),
        )
        .await
        .unwrap();

    rig.controller.stop().await.unwrap();

    assert_eq!(rig.backend.property("mute"), Some(json!(true)));
    assert_eq!(rig.state().await.status, PlaybackStatus::Idle);
}

#[tokio::test(start_paused = true)]
async fn updating_the_profile_in_effect_reapplies_it() {
    let rig = Rig::new(ScriptedBackend::new(), FakeLifecycle::ready_after(0)).await;
    let profile = rig
        .controller
        .create_profile(
            "loud",
            ProfileType::Playlist,
            Settings::from([("volume".to_string(), SettingValue::Int(90))]),
        )
        .await
        .unwrap();
    rig.controller
        .assign_profile(PlaylistId(7), profile.id)
        .await
        .unwrap();
    rig.controller.play(PlaylistId(7)).await.unwrap();

    rig.controller
        .update_settings(
            profile.id,
            Settings::from([("volume".to_string(), SettingValue::Int(40))]),
        )
        .await
        .unwrap();

    assert_eq!(rig.backend.property("volume"), Some(json!(40)));
}

#[tokio::test]
async fn updating_an_inactive_profile_only_stores_it() {
    let rig = Rig::new(ScriptedBackend::new(), FakeLifecycle::ready_after(0)).await;
    let profile = rig
        .controller
        .create_profile("spare", ProfileType::Playlist, Settings::new())
        .await
        .unwrap();

    let updated = rig
        .controller
        .update_settings(
            profile.id,
            Settings::from([("mute".to_string(), SettingValue::Bool(true))]),
        )
        .await
        .unwrap();

    assert_eq!(updated.settings.len(), 1);
    assert_eq!(rig.backend.count("set_property"), 0);
}

#[tokio::test]
async fn display_idle_logo_records_idle_state() {
    let rig = Rig::new(ScriptedBackend::new(), FakeLifecycle::ready_after(0)).await;
    rig.library
        .save_state(PlaybackState::playing(PlaylistId(7)))
        .await
        .unwrap();

    let shown = rig.controller.display_idle_logo().await.unwrap();

    assert_eq!(shown, rig.media.logo_path());
    assert_eq!(rig.state().await.status, PlaybackStatus::Idle);
}

#[tokio::test(start_paused = true)]
async fn restart_player_restores_the_persisted_playlist() {
    let rig = Rig::new(ScriptedBackend::new(), FakeLifecycle::ready_after(0)).await;
    rig.library
        .save_state(PlaybackState::playing(PlaylistId(8)))
        .await
        .unwrap();

    let outcome = rig.controller.restart_player().await.unwrap();

    assert_eq!(outcome, StartupOutcome::Resumed(PlaylistId(8)));
    assert_eq!(rig.lifecycle.restarts.load(Ordering::SeqCst), 1);
    assert_eq!(rig.backend.count("loadlist"), 1);
}

#[tokio::test]
async fn failed_restart_is_reported() {
    let rig = Rig::new(ScriptedBackend::new(), FakeLifecycle::ready_after(0)).await;
    rig.lifecycle.restart_ok.store(false, Ordering::SeqCst);

    let err = rig.controller.restart_player().await.unwrap_err();

    assert!(matches!(err, PlaybackError::RestartFailed { ref unit } if unit == "mpv.service"));
    assert!(rig.backend.commands().is_empty());
}
