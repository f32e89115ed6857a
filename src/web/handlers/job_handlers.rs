// src/web/handlers/job_handlers.rs
use rocket::serde::json::Json;
use rocket::State;
use tracing::info;

use super::company_handlers::owned_company;
use crate::auth::{EmployerUser, JobSeekerUser};
use crate::core::Database;
use crate::models::{JobFilter, JobInput, JobUpdate, JobWithCompany};
use crate::recommend::{recommend, ScoredJob};
use crate::repository::JobRepository;
use crate::validation::{validate_job, validate_job_update};
use crate::web::types::*;

async fn load_job(db: &Database, id: &str) -> Result<JobWithCompany, ApiError> {
    JobRepository::new(db.pool())
        .get_job(id)
        .await
        .map_err(|e| internal_error("Failed to load job", &e))?
        .ok_or_else(|| not_found("Job"))
}

pub async fn list_jobs_handler(
    query: JobQuery,
    db: &State<Database>,
) -> ApiResult<DataResponse<Vec<JobWithCompany>>> {
    let filter = query.into_filter()?;
    let jobs = JobRepository::new(db.pool())
        .get_jobs(&filter)
        .await
        .map_err(|e| internal_error("Failed to load jobs", &e))?;

    Ok(Json(DataResponse::success(
        format!("{} jobs", jobs.len()),
        jobs,
        None,
    )))
}

/// Active jobs scored against the seeker's profile, best ten first.
pub async fn recommended_jobs_handler(
    seeker: JobSeekerUser,
    db: &State<Database>,
) -> ApiResult<DataResponse<Vec<ScoredJob>>> {
    let filter = JobFilter {
        active_only: true,
        ..Default::default()
    };
    let jobs = JobRepository::new(db.pool())
        .get_jobs(&filter)
        .await
        .map_err(|e| internal_error("Failed to load jobs", &e))?;

    let scored = recommend(&seeker.0.profile, jobs);
    info!(
        "Recommended {} jobs to {}",
        scored.len(),
        seeker.0.user_id()
    );

    Ok(Json(DataResponse::success(
        "Recommended jobs".to_string(),
        scored,
        None,
    )))
}

pub async fn get_job_handler(id: &str, db: &State<Database>) -> ApiResult<DataResponse<JobWithCompany>> {
    let job = load_job(db, id).await?;
    Ok(Json(DataResponse::success(
        "Job loaded".to_string(),
        job,
        None,
    )))
}

pub async fn create_job_handler(
    request: Json<StandardRequest<JobInput>>,
    employer: EmployerUser,
    db: &State<Database>,
) -> ApiResult<DataResponse<JobWithCompany>> {
    let conversation_id = request.conversation_id.clone();
    let input = &request.data;
    validate_job(input).map_err(|e| validation_failed(&e))?;
    owned_company(db, &input.company_id, employer.0.user_id()).await?;

    let job = JobRepository::new(db.pool())
        .create_job(input)
        .await
        .map_err(|e| internal_error("Failed to create job", &e))?;
    let job = load_job(db, &job.id).await?;

    Ok(Json(DataResponse::success(
        format!("Job '{}' posted", job.job.title),
        job,
        conversation_id,
    )))
}

pub async fn update_job_handler(
    id: &str,
    request: Json<StandardRequest<JobUpdate>>,
    employer: EmployerUser,
    db: &State<Database>,
) -> ApiResult<DataResponse<JobWithCompany>> {
    let conversation_id = request.conversation_id.clone();
    let current = load_job(db, id).await?;
    owned_company(db, &current.job.company_id, employer.0.user_id()).await?;

    validate_job_update(
        &request.data,
        (current.job.salary_min, current.job.salary_max),
    )
    .map_err(|e| validation_failed(&e))?;

    let job = JobRepository::new(db.pool())
        .update_job(id, &request.data)
        .await
        .map_err(|e| internal_error("Failed to update job", &e))?
        .ok_or_else(|| not_found("Job"))?;

    Ok(Json(DataResponse::success(
        "Job updated".to_string(),
        job,
        conversation_id,
    )))
}

pub async fn delete_job_handler(
    id: &str,
    employer: EmployerUser,
    db: &State<Database>,
) -> ApiResult<ActionResponse> {
    let current = load_job(db, id).await?;
    owned_company(db, &current.job.company_id, employer.0.user_id()).await?;

    let deleted = JobRepository::new(db.pool())
        .delete_job(id)
        .await
        .map_err(|e| internal_error("Failed to delete job", &e))?;
    if !deleted {
        return Err(not_found("Job"));
    }

    Ok(Json(ActionResponse::success(
        format!("Job '{}' deleted", current.job.title),
        "deleted".to_string(),
        None,
    )))
}
