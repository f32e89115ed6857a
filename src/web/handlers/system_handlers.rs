// src/web/handlers/system_handlers.rs
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use tracing::{error, info};

use crate::auth::OptionalAuth;
use crate::core::{ContactMessage, Database};
use crate::repository::{CompanyRepository, JobRepository};
use crate::validation::validate_contact;
use crate::web::types::*;
use crate::web::Mailer;

const HOME_JOBS: i64 = 6;
const HOME_COMPANIES: i64 = 6;

pub async fn health_handler(auth: OptionalAuth, db: &State<Database>) -> ApiResult<TextResponse> {
    match auth.user {
        Some(user) => info!("Health check by user {}", user.user_id()),
        None => info!("Health check by anonymous user"),
    }

    if let Err(e) = db.health_check().await {
        error!("Database health check failed: {}", e);
        return Err(api_error(
            Status::ServiceUnavailable,
            "Database unavailable",
            "DATABASE_UNAVAILABLE",
            vec!["Try again in a few moments".to_string()],
        ));
    }
    Ok(Json(TextResponse::success("OK".to_string(), None)))
}

/// Latest jobs and companies, fetched together; either failing fails both.
pub async fn home_handler(db: &State<Database>) -> ApiResult<DataResponse<HomeData>> {
    let jobs = JobRepository::new(db.pool());
    let companies = CompanyRepository::new(db.pool());

    let (latest_jobs, latest_companies) = tokio::try_join!(
        jobs.latest_jobs(HOME_JOBS),
        companies.latest_companies(HOME_COMPANIES)
    )
    .map_err(|e| internal_error("Failed to load home page", &e))?;

    Ok(Json(DataResponse::success(
        "Home".to_string(),
        HomeData {
            latest_jobs,
            latest_companies,
        },
        None,
    )))
}

pub async fn contact_handler(
    request: Json<StandardRequest<ContactMessage>>,
    mailer: &State<Mailer>,
) -> ApiResult<TextResponse> {
    let conversation_id = request.conversation_id.clone();
    let message = &request.data;
    validate_contact(&message.name, &message.email, &message.message)
        .map_err(|e| validation_failed(&e))?;

    let Some(client) = mailer.0.as_ref() else {
        return Err(api_error(
            Status::ServiceUnavailable,
            "Email service is not configured",
            "EMAIL_UNAVAILABLE",
            vec!["Write to us directly by email".to_string()],
        ));
    };

    if let Err(e) = client.send_contact_message(message).await {
        error!("Contact message from {} not sent: {:#}", message.email, e);
        return Err(api_error(
            Status::ServiceUnavailable,
            "Your message could not be sent",
            "EMAIL_FAILED",
            vec!["Try again in a few moments".to_string()],
        ));
    }

    info!("Contact message sent for {}", message.email);
    Ok(Json(TextResponse::success(
        "Thanks for your message, we will get back to you soon".to_string(),
        conversation_id,
    )))
}
