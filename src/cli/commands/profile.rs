use std::collections::BTreeMap;

use crate::{
    cli::{
        CommandResult,
        args::collect_settings,
        formatting::{format_apply_report, format_header, format_profile_line},
        types::CliError,
    },
    service_manager::Services,
    services::{
        playback::PlaybackError,
        playlist::PlaylistId,
        profile::{ProfileError, ProfileId, ProfileType, SettingValue},
    },
    store::ProfileRepository,
};

/// Profiles with the playlists each is assigned to.
pub async fn list(services: &Services) -> CommandResult {
    let profiles = services.controller.profiles().await?;
    if profiles.is_empty() {
        return Ok("No profiles stored".to_string());
    }

    let mut assigned: BTreeMap<ProfileId, Vec<String>> = BTreeMap::new();
    for (playlist, profile) in services.library.assignments().await? {
        assigned.entry(profile).or_default().push(playlist.to_string());
    }

    Ok(profiles
        .iter()
        .map(|profile| {
            let playlists = assigned.get(&profile.id).map_or(&[][..], Vec::as_slice);
            format_profile_line(profile, playlists)
        })
        .collect::<Vec<_>>()
        .join("\n"))
}

/// Settable properties grouped by category.
pub async fn properties(services: &Services) -> CommandResult {
    let supported = services
        .profiles
        .supported_properties()
        .await
        .map_err(PlaybackError::from)?;

    let mut by_category: BTreeMap<_, Vec<String>> = BTreeMap::new();
    for spec in supported.iter() {
        by_category
            .entry(spec.category)
            .or_default()
            .push(format!("  {} ({})", spec.name, spec.property_type));
    }

    let mut lines = Vec::new();
    for (category, entries) in by_category {
        lines.push(format_header(&category.to_string()));
        lines.extend(entries);
    }

    Ok(lines.join("\n"))
}

/// Creates a profile after validating its settings against the player.
pub async fn create(
    services: &Services,
    name: &str,
    profile_type: ProfileType,
    settings: Vec<(String, SettingValue)>,
) -> CommandResult {
    let profile = services
        .controller
        .create_profile(name, profile_type, collect_settings(settings))
        .await?;

    Ok(format!("Created profile {}", format_profile_line(&profile, &[])))
}

/// Replaces a profile's settings.
pub async fn update(
    services: &Services,
    id: ProfileId,
    settings: Vec<(String, SettingValue)>,
) -> CommandResult {
    let profile = services
        .controller
        .update_settings(id, collect_settings(settings))
        .await?;

    Ok(format!("Updated profile {}", format_profile_line(&profile, &[])))
}

/// Deletes a profile.
pub async fn delete(services: &Services, id: ProfileId) -> CommandResult {
    services.controller.delete_profile(id).await?;
    Ok(format!("Deleted profile {id}"))
}

/// Assigns a playlist profile to a playlist.
pub async fn assign(services: &Services, playlist: PlaylistId, profile: ProfileId) -> CommandResult {
    let replaced = services.controller.assign_profile(playlist, profile).await?;

    Ok(match replaced {
        Some(previous) if previous != profile => {
            format!("Assigned profile {profile} to playlist {playlist}, replacing profile {previous}")
        }
        _ => format!("Assigned profile {profile} to playlist {playlist}"),
    })
}

/// Applies a profile now, reporting partial application as an error.
pub async fn apply(services: &Services, id: ProfileId) -> CommandResult {
    match services.controller.apply_profile(id).await {
        Ok(report) => Ok(format_apply_report(&report)),
        Err(PlaybackError::Profile(ProfileError::PartiallyApplied(report))) => {
            Err(CliError::ServiceError {
                service: "Profile",
                details: format_apply_report(&report),
            })
        }
        Err(err) => Err(err.into()),
    }
}
