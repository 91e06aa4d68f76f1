#![allow(clippy::unwrap_used, clippy::panic)]

use futures::StreamExt;
use serde_json::json;

use crate::services::{
    events::{BroadcastNotifier, EventNotifier, PlaybackEvent},
    playlist::PlaylistId,
    profile::{Category, ProfileId},
};

#[test]
fn events_serialize_with_name_and_payload() {
    let started = PlaybackEvent::PlaybackStarted {
        playlist_id: PlaylistId(7),
        recovered: false,
    };
    assert_eq!(
        serde_json::to_value(&started).unwrap(),
        json!({"event": "playback_started", "payload": {"playlist_id": 7, "recovered": false}})
    );

    let applied = PlaybackEvent::ProfileApplied {
        profile_id: ProfileId(2),
        categories: vec![Category::Video, Category::Audio],
        complete: true,
    };
    let value = serde_json::to_value(&applied).unwrap();
    assert_eq!(value["event"], "profile_applied");
    assert_eq!(value["payload"]["categories"], json!(["video", "audio"]));

    assert_eq!(
        serde_json::to_value(PlaybackEvent::PlaybackStopped).unwrap(),
        json!({"event": "playback_stopped"})
    );
}

#[test]
fn notify_without_subscribers_is_silent() {
    let notifier = BroadcastNotifier::default();
    notifier.notify(PlaybackEvent::PlaybackStopped);
}

#[tokio::test]
async fn subscribers_receive_events_in_order() {
    let notifier = BroadcastNotifier::new(8);
    let mut events = notifier.events();

    notifier.notify(PlaybackEvent::PlaybackStopped);
    notifier.notify(PlaybackEvent::PlaybackFailed {
        playlist_id: Some(PlaylistId(3)),
        reason: "loadlist timed out".to_string(),
    });

    assert_eq!(events.next().await.unwrap().name(), "playback_stopped");
    assert_eq!(events.next().await.unwrap().name(), "playback_failed");
}

#[tokio::test]
async fn lagging_subscriber_keeps_receiving_newest_events() {
    let notifier = BroadcastNotifier::new(2);
    let mut events = notifier.events();

    for id in 0..5 {
        notifier.notify(PlaybackEvent::PlaybackStarted {
            playlist_id: PlaylistId(id),
            recovered: false,
        });
    }

    let first = events.next().await.unwrap();
    assert_eq!(
        first,
        PlaybackEvent::PlaybackStarted {
            playlist_id: PlaylistId(3),
            recovered: false
        }
    );
}
