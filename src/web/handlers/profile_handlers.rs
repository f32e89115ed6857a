// src/web/handlers/profile_handlers.rs
use rocket::serde::json::Json;
use rocket::State;
use serde_json::Value;
use tracing::{info, warn};

use crate::auth::{AuthenticatedUser, OptionalAuth};
use crate::core::Database;
use crate::models::{Profile, ProfileSettings, ProfileUpdate};
use crate::repository::{ProfileRepository, SettingsUpdate};
use crate::validation::{is_http_url, ValidationErrors};
use crate::web::types::*;

pub async fn get_own_profile_handler(user: AuthenticatedUser) -> Json<DataResponse<Profile>> {
    Json(DataResponse::success(
        "Profile loaded".to_string(),
        user.profile,
        None,
    ))
}

fn validate_profile_update(update: &ProfileUpdate) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    if update.full_name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        errors.add("full_name", "is required");
    }
    if let Some(url) = update.resume_url.as_deref().filter(|u| !u.trim().is_empty()) {
        if !is_http_url(url) {
            errors.add("resume_url", "must be a valid http(s) URL");
        }
    }
    if update.experience_years.is_some_and(|y| y < 0) {
        errors.add("experience_years", "must not be negative");
    }
    if update.salary_expectation.is_some_and(|s| s < 0) {
        errors.add("salary_expectation", "must not be negative");
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

pub async fn update_profile_handler(
    request: Json<StandardRequest<ProfileUpdate>>,
    user: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<DataResponse<Profile>> {
    let conversation_id = request.conversation_id.clone();
    let update = &request.data;

    if update.is_empty() {
        return Ok(Json(DataResponse::success(
            "Nothing to update".to_string(),
            user.profile,
            conversation_id,
        )));
    }
    validate_profile_update(update).map_err(|e| validation_failed(&e))?;

    let profile = ProfileRepository::new(db.pool())
        .update_profile(user.user_id(), update)
        .await
        .map_err(|e| internal_error("Failed to update profile", &e))?
        .ok_or_else(|| not_found("Profile"))?;

    Ok(Json(DataResponse::success(
        "Profile updated".to_string(),
        profile,
        conversation_id,
    )))
}

/// Deep-merge a partial settings object into the stored settings.
pub async fn update_settings_handler(
    patch: Json<Value>,
    user: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<DataResponse<ProfileSettings>> {
    let patch = patch.into_inner();
    if !patch.is_object() {
        warn!("Rejected non-object settings patch from {}", user.user_id());
        return Err(bad_input("Settings patch must be a JSON object"));
    }

    let update = ProfileRepository::new(db.pool())
        .update_settings(user.user_id(), &patch)
        .await
        .map_err(|e| internal_error("Failed to update settings", &e))?;

    let settings = match update {
        SettingsUpdate::Saved(settings) => settings,
        SettingsUpdate::Invalid(errors) => {
            warn!("Rejected settings patch from {}: {:?}", user.user_id(), errors.messages());
            return Err(validation_failed(&errors));
        }
        SettingsUpdate::MissingProfile => return Err(not_found("Profile")),
    };

    info!("Settings updated for {}", user.user_id());
    Ok(Json(DataResponse::success(
        "Settings saved".to_string(),
        settings,
        None,
    )))
}

/// Another user's profile, subject to their privacy settings. Hidden
/// profiles answer 404 so their existence is not disclosed.
pub async fn get_public_profile_handler(
    id: &str,
    viewer: OptionalAuth,
    db: &State<Database>,
) -> ApiResult<DataResponse<Profile>> {
    let profile = ProfileRepository::new(db.pool())
        .get_profile(id)
        .await
        .map_err(|e| internal_error("Failed to load profile", &e))?
        .ok_or_else(|| not_found("Profile"))?;

    let viewer = viewer.user.map(|u| u.profile);
    if !profile.visible_to(viewer.as_ref()) {
        return Err(not_found("Profile"));
    }

    let is_self = viewer.as_ref().is_some_and(|v| v.id == profile.id);
    let data = if is_self { profile } else { profile.public_view() };

    Ok(Json(DataResponse::success(
        "Profile loaded".to_string(),
        data,
        None,
    )))
}
