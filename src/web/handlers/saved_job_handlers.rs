// src/web/handlers/saved_job_handlers.rs
use chrono::Utc;
use rocket::serde::json::Json;
use rocket::State;

use crate::auth::JobSeekerUser;
use crate::core::Database;
use crate::models::{SaveJobInput, SavedJob, SavedJobWithJob};
use crate::reminders::{load_due_reminders, DeadlineReminder};
use crate::repository::{is_unique_violation, JobRepository, SavedJobRepository};
use crate::validation::validate_notification_days;
use crate::web::types::*;

fn already_saved() -> ApiError {
    conflict("This job is already saved", "ALREADY_SAVED")
}

pub async fn list_saved_jobs_handler(
    seeker: JobSeekerUser,
    db: &State<Database>,
) -> ApiResult<DataResponse<Vec<SavedJobWithJob>>> {
    let saved = SavedJobRepository::new(db.pool())
        .get_saved_jobs(seeker.0.user_id())
        .await
        .map_err(|e| internal_error("Failed to load saved jobs", &e))?;

    Ok(Json(DataResponse::success(
        format!("{} saved jobs", saved.len()),
        saved,
        None,
    )))
}

pub async fn save_job_handler(
    request: Json<StandardRequest<SaveJobInput>>,
    seeker: JobSeekerUser,
    db: &State<Database>,
) -> ApiResult<DataResponse<SavedJob>> {
    let conversation_id = request.conversation_id.clone();
    let input = &request.data;
    let user_id = seeker.0.user_id();
    validate_notification_days(input.notification_days).map_err(|e| validation_failed(&e))?;

    JobRepository::new(db.pool())
        .get_job(&input.job_id)
        .await
        .map_err(|e| internal_error("Failed to load job", &e))?
        .ok_or_else(|| not_found("Job"))?;

    let repo = SavedJobRepository::new(db.pool());
    if repo
        .is_saved(user_id, &input.job_id)
        .await
        .map_err(|e| internal_error("Failed to check saved jobs", &e))?
    {
        return Err(already_saved());
    }

    let saved = match repo.save_job(user_id, input).await {
        Ok(saved) => saved,
        Err(e) if is_unique_violation(&e) => return Err(already_saved()),
        Err(e) => return Err(internal_error("Failed to save job", &e)),
    };

    Ok(Json(DataResponse::success(
        "Job saved".to_string(),
        saved,
        conversation_id,
    )))
}

pub async fn update_saved_job_handler(
    id: &str,
    request: Json<StandardRequest<NotificationUpdateRequest>>,
    seeker: JobSeekerUser,
    db: &State<Database>,
) -> ApiResult<DataResponse<SavedJob>> {
    let conversation_id = request.conversation_id.clone();
    let update = &request.data;
    validate_notification_days(update.notification_days).map_err(|e| validation_failed(&e))?;

    let saved = SavedJobRepository::new(db.pool())
        .update_notification(
            id,
            seeker.0.user_id(),
            update.notify_before_deadline,
            update.notification_days,
        )
        .await
        .map_err(|e| internal_error("Failed to update saved job", &e))?
        .ok_or_else(|| not_found("Saved job"))?;

    Ok(Json(DataResponse::success(
        "Reminder settings saved".to_string(),
        saved,
        conversation_id,
    )))
}

pub async fn unsave_job_handler(
    id: &str,
    seeker: JobSeekerUser,
    db: &State<Database>,
) -> ApiResult<ActionResponse> {
    let removed = SavedJobRepository::new(db.pool())
        .unsave_job(id, seeker.0.user_id())
        .await
        .map_err(|e| internal_error("Failed to remove saved job", &e))?;
    if !removed {
        return Err(not_found("Saved job"));
    }

    Ok(Json(ActionResponse::success(
        "Job removed from saved jobs".to_string(),
        "unsaved".to_string(),
        None,
    )))
}

pub async fn due_reminders_handler(
    seeker: JobSeekerUser,
    db: &State<Database>,
) -> ApiResult<DataResponse<Vec<DeadlineReminder>>> {
    let today = Utc::now().date_naive();
    let reminders = load_due_reminders(db.pool(), Some(seeker.0.user_id()), today)
        .await
        .map_err(|e| internal_error("Failed to load reminders", &e))?;

    Ok(Json(DataResponse::success(
        format!("{} deadlines coming up", reminders.len()),
        reminders,
        None,
    )))
}
