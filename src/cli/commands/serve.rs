use std::pin::pin;

use futures::StreamExt;
use tokio::signal;
use tracing::{debug, info, warn};

use crate::{
    cli::{CommandResult, formatting::format_startup_outcome},
    config::Config,
    service_manager::Services,
};

/// Runs the controller until Ctrl-C.
///
/// Startup waits for the player, then resumes the persisted playlist or
/// establishes the idle logo in the background. Playback events are logged
/// as they happen.
pub async fn run(config: &Config) -> CommandResult {
    let services = Services::new(config)?;
    let controller = services.controller.clone();

    let mut events = services.notifier.events();
    let event_log = tokio::spawn(async move {
        while let Some(event) = events.next().await {
            match serde_json::to_string(&event) {
                Ok(payload) => info!(event = event.name(), %payload, "Playback event"),
                Err(err) => warn!(event = event.name(), error = %err, "Unserializable event"),
            }
        }
    });

    let channel = services.channel.clone();
    let channel_log = tokio::spawn(async move {
        let mut states = pin!(channel.state_monitored());
        while let Some(state) = states.next().await {
            debug!(%state, "Player channel");
        }
    });

    let outcome = tokio::select! {
        outcome = controller.initialize() => outcome,
        _ = signal::ctrl_c() => {
            info!("Interrupted during startup");
            controller.shutdown().await;
            event_log.abort();
            channel_log.abort();
            return Ok("Interrupted during startup".to_string());
        }
    };

    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(err) => {
            controller.shutdown().await;
            event_log.abort();
            channel_log.abort();
            return Err(err.into());
        }
    };
    info!(outcome = %format_startup_outcome(outcome), "Player controller running");

    let shutdown = controller.shutdown_token();
    tokio::select! {
        _ = signal::ctrl_c() => info!("Shutdown requested"),
        () = shutdown.cancelled() => {}
    }

    controller.shutdown().await;
    services.channel.disconnect().await;
    event_log.abort();
    channel_log.abort();

    Ok("Player controller stopped".to_string())
}
