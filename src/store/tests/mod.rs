#![allow(clippy::unwrap_used, clippy::panic)]

use crate::{
    runtime_state::{PlaybackState, PlaybackStatus},
    services::{
        playlist::{Playlist, PlaylistEntry, PlaylistId},
        profile::{NewProfile, ProfileType, SettingValue, Settings},
    },
    store::{JsonLibrary, PlaybackStateStore, PlaylistRepository, ProfileRepository, StoreError},
};

fn playlist(id: i64) -> Playlist {
    Playlist {
        id: PlaylistId(id),
        name: format!("list {id}"),
        entries: vec![PlaylistEntry {
            file_reference: "a.png".to_string(),
            duration_secs: None,
            position: 0,
        }],
    }
}

fn new_profile(name: &str, profile_type: ProfileType) -> NewProfile {
    NewProfile {
        name: name.to_string(),
        profile_type,
        settings: Settings::from([("mute".to_string(), SettingValue::Bool(true))]),
    }
}

#[tokio::test]
async fn state_defaults_to_idle() {
    let library = JsonLibrary::in_memory();

    let state = library.load_state().await.unwrap();

    assert_eq!(state.status, PlaybackStatus::Idle);
    assert_eq!(state.active_playlist_id, None);
}

#[tokio::test]
async fn library_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested/library.json");

    {
        let library = JsonLibrary::open(&path).unwrap();
        library.save_playlist(playlist(7)).await.unwrap();
        library
            .save_state(PlaybackState::playing(PlaylistId(7)))
            .await
            .unwrap();
        library
            .create_profile(new_profile("evening", ProfileType::Playlist))
            .await
            .unwrap();
    }

    let reopened = JsonLibrary::open(&path).unwrap();
    let state = reopened.load_state().await.unwrap();
    assert_eq!(state.resumable_playlist(), Some(PlaylistId(7)));
    assert_eq!(reopened.playlist(PlaylistId(7)).await.unwrap(), Some(playlist(7)));
    assert_eq!(reopened.profiles().await.unwrap().len(), 1);
    assert!(!path.with_extension("json.tmp").exists());
}

#[tokio::test]
async fn corrupt_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("library.json");
    std::fs::write(&path, "{ not json").unwrap();

    assert!(matches!(
        JsonLibrary::open(&path),
        Err(StoreError::Corrupt { .. })
    ));
}

#[tokio::test]
async fn profile_ids_keep_increasing_after_delete() {
    let library = JsonLibrary::in_memory();

    let first = library
        .create_profile(new_profile("a", ProfileType::Idle))
        .await
        .unwrap();
    library.delete_profile(first.id).await.unwrap();
    let second = library
        .create_profile(new_profile("b", ProfileType::Idle))
        .await
        .unwrap();

    assert!(second.id > first.id);
}

#[tokio::test]
async fn reassigning_replaces_the_previous_profile() {
    let library = JsonLibrary::in_memory();
    library.save_playlist(playlist(1)).await.unwrap();
    let a = library
        .create_profile(new_profile("a", ProfileType::Playlist))
        .await
        .unwrap();
    let b = library
        .create_profile(new_profile("b", ProfileType::Playlist))
        .await
        .unwrap();

    assert_eq!(library.assign(PlaylistId(1), a.id).await.unwrap(), None);
    assert_eq!(library.assign(PlaylistId(1), b.id).await.unwrap(), Some(a.id));

    assert_eq!(
        library.assignments().await.unwrap(),
        vec![(PlaylistId(1), b.id)]
    );
    assert_eq!(
        library.assigned_profile(PlaylistId(1)).await.unwrap().unwrap().id,
        b.id
    );
}

#[tokio::test]
async fn assignment_requires_both_sides() {
    let library = JsonLibrary::in_memory();
    let profile = library
        .create_profile(new_profile("a", ProfileType::Playlist))
        .await
        .unwrap();

    let err = library.assign(PlaylistId(9), profile.id).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound { kind: "Playlist", id: 9 }));
    assert!(library.assignments().await.unwrap().is_empty());
}

#[tokio::test]
async fn deleting_a_profile_drops_its_assignments() {
    let library = JsonLibrary::in_memory();
    library.save_playlist(playlist(1)).await.unwrap();
    library.save_playlist(playlist(2)).await.unwrap();
    let profile = library
        .create_profile(new_profile("a", ProfileType::Playlist))
        .await
        .unwrap();
    library.assign(PlaylistId(1), profile.id).await.unwrap();
    library.assign(PlaylistId(2), profile.id).await.unwrap();

    assert!(library.delete_profile(profile.id).await.unwrap());
    assert!(!library.delete_profile(profile.id).await.unwrap());
    assert!(library.assignments().await.unwrap().is_empty());
}

#[tokio::test]
async fn newest_idle_profile_is_current() {
    let library = JsonLibrary::in_memory();
    library
        .create_profile(new_profile("old idle", ProfileType::Idle))
        .await
        .unwrap();
    let newest = library
        .create_profile(new_profile("new idle", ProfileType::Idle))
        .await
        .unwrap();
    library
        .create_profile(new_profile("playlist", ProfileType::Playlist))
        .await
        .unwrap();

    let current = library.current_idle_profile().await.unwrap().unwrap();
    assert_eq!(current.id, newest.id);
}

#[tokio::test]
async fn updating_unknown_profile_fails() {
    let library = JsonLibrary::in_memory();

    let err = library
        .update_settings(crate::services::profile::ProfileId(4), Settings::new())
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::NotFound { kind: "Profile", id: 4 }));
}

#[tokio::test]
async fn writes_from_another_handle_are_not_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("library.json");
    let cli = JsonLibrary::open(&path).unwrap();
    let daemon = JsonLibrary::open(&path).unwrap();

    cli.save_playlist(playlist(9)).await.unwrap();
    daemon.save_state(PlaybackState::idle()).await.unwrap();

    let reopened = JsonLibrary::open(&path).unwrap();
    assert!(reopened.playlist(PlaylistId(9)).await.unwrap().is_some());
    assert_eq!(
        reopened.load_state().await.unwrap().status,
        PlaybackStatus::Idle
    );
}

#[tokio::test]
async fn reads_see_writes_from_another_handle() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("library.json");
    let daemon = JsonLibrary::open(&path).unwrap();
    assert!(daemon.playlists().await.unwrap().is_empty());

    let cli = JsonLibrary::open(&path).unwrap();
    cli.save_playlist(playlist(3)).await.unwrap();
    let profile = cli
        .create_profile(new_profile("lobby", ProfileType::Playlist))
        .await
        .unwrap();
    cli.assign(PlaylistId(3), profile.id).await.unwrap();

    assert_eq!(daemon.playlists().await.unwrap().len(), 1);
    assert_eq!(
        daemon.assigned_profile(PlaylistId(3)).await.unwrap().unwrap().id,
        profile.id
    );

    let next = daemon
        .create_profile(new_profile("night", ProfileType::Idle))
        .await
        .unwrap();
    assert!(next.id.0 > profile.id.0);
}
