use crate::{
    cli::{
        CommandResult,
        formatting::{format_play_report, format_player_status, format_startup_outcome},
        types::CliError,
    },
    service_manager::Services,
    services::playlist::PlaylistId,
};

/// Starts playlist `id` and reports how it came up.
pub async fn play(services: &Services, id: PlaylistId) -> CommandResult {
    let report = services.controller.play(id).await?;
    Ok(format_play_report(&report))
}

/// Stops playback; the idle logo replaces it.
pub async fn stop(services: &Services) -> CommandResult {
    services.controller.stop().await?;
    Ok("Playback stopped, idle logo shown".to_string())
}

/// Prints the persisted state plus the live channel state.
pub async fn status(services: &Services, json: bool) -> CommandResult {
    let status = services.controller.status().await?;

    if json {
        return serde_json::to_string_pretty(&status).map_err(|e| CliError::ServiceError {
            service: "Output",
            details: e.to_string(),
        });
    }

    Ok(format_player_status(&status))
}

/// Shows the idle logo.
pub async fn logo(services: &Services) -> CommandResult {
    let path = services.controller.display_idle_logo().await?;
    Ok(format!("Idle logo shown: {}", path.display()))
}

/// Restarts the player service and restores the screen.
pub async fn restart_player(services: &Services) -> CommandResult {
    let outcome = services.controller.restart_player().await?;
    Ok(format!(
        "Restarted {}. {}",
        services.supervisor.unit(),
        format_startup_outcome(outcome)
    ))
}
