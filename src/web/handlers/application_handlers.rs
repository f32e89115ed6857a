// src/web/handlers/application_handlers.rs
use rocket::serde::json::Json;
use rocket::State;
use tracing::{info, warn};

use crate::auth::{EmployerUser, JobSeekerUser};
use crate::core::Database;
use crate::models::{Application, ApplicationInput, ApplicationWithJob, ReceivedApplication};
use crate::repository::{is_unique_violation, ApplicationRepository, JobRepository};
use crate::validation::validate_application;
use crate::web::types::*;

fn already_applied() -> ApiError {
    conflict("You have already applied to this job", "ALREADY_APPLIED")
}

pub async fn apply_handler(
    job_id: &str,
    request: Json<StandardRequest<ApplicationInput>>,
    seeker: JobSeekerUser,
    db: &State<Database>,
) -> ApiResult<DataResponse<Application>> {
    let conversation_id = request.conversation_id.clone();
    let user_id = seeker.0.user_id();
    validate_application(&request.data).map_err(|e| validation_failed(&e))?;

    let job = JobRepository::new(db.pool())
        .get_job(job_id)
        .await
        .map_err(|e| internal_error("Failed to load job", &e))?
        .ok_or_else(|| not_found("Job"))?;
    if !job.job.is_active {
        return Err(conflict("This job is no longer accepting applications", "JOB_CLOSED"));
    }

    let repo = ApplicationRepository::new(db.pool());
    if repo
        .has_applied(job_id, user_id)
        .await
        .map_err(|e| internal_error("Failed to check applications", &e))?
    {
        return Err(already_applied());
    }

    let application = match repo.apply(job_id, user_id, &request.data).await {
        Ok(application) => application,
        Err(e) if is_unique_violation(&e) => return Err(already_applied()),
        Err(e) => return Err(internal_error("Failed to submit application", &e)),
    };

    Ok(Json(DataResponse::success(
        format!("Applied to '{}'", job.job.title),
        application,
        conversation_id,
    )))
}

pub async fn my_applications_handler(
    seeker: JobSeekerUser,
    db: &State<Database>,
) -> ApiResult<DataResponse<Vec<ApplicationWithJob>>> {
    let applications = ApplicationRepository::new(db.pool())
        .get_user_applications(seeker.0.user_id())
        .await
        .map_err(|e| internal_error("Failed to load applications", &e))?;

    Ok(Json(DataResponse::success(
        format!("{} applications", applications.len()),
        applications,
        None,
    )))
}

/// Applications to jobs of every company the employer owns.
pub async fn received_applications_handler(
    employer: EmployerUser,
    db: &State<Database>,
) -> ApiResult<DataResponse<Vec<ReceivedApplication>>> {
    let applications = ApplicationRepository::new(db.pool())
        .get_applications_for_owner(employer.0.user_id())
        .await
        .map_err(|e| internal_error("Failed to load applications", &e))?;

    Ok(Json(DataResponse::success(
        format!("{} applications received", applications.len()),
        applications,
        None,
    )))
}

pub async fn update_application_status_handler(
    id: &str,
    request: Json<StandardRequest<StatusUpdateRequest>>,
    employer: EmployerUser,
    db: &State<Database>,
) -> ApiResult<DataResponse<Application>> {
    let conversation_id = request.conversation_id.clone();
    let repo = ApplicationRepository::new(db.pool());

    let owner = repo
        .owner_of(id)
        .await
        .map_err(|e| internal_error("Failed to load application", &e))?
        .ok_or_else(|| not_found("Application"))?;
    if owner != employer.0.user_id() {
        warn!("User {} tried to review application {}", employer.0.user_id(), id);
        return Err(forbidden("Only the hiring company can change this application"));
    }

    let application = repo
        .update_status(id, request.data.status)
        .await
        .map_err(|e| internal_error("Failed to update application", &e))?
        .ok_or_else(|| not_found("Application"))?;

    info!("Application {} is now {:?}", id, application.status);
    Ok(Json(DataResponse::success(
        "Application status updated".to_string(),
        application,
        conversation_id,
    )))
}

pub async fn withdraw_application_handler(
    id: &str,
    seeker: JobSeekerUser,
    db: &State<Database>,
) -> ApiResult<ActionResponse> {
    let withdrawn = ApplicationRepository::new(db.pool())
        .withdraw(id, seeker.0.user_id())
        .await
        .map_err(|e| internal_error("Failed to withdraw application", &e))?;
    if !withdrawn {
        return Err(not_found("Application"));
    }

    Ok(Json(ActionResponse::success(
        "Application withdrawn".to_string(),
        "withdrawn".to_string(),
        None,
    )))
}
