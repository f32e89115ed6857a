// src/web/types.rs
use rocket::form::FromForm;
use rocket::fs::TempFile;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};
use tracing::error;

use crate::auth::AuthFailure;
use crate::models::{
    ApplicationStatus, Company, CompanyFilter, JobFilter, JobType, JobWithCompany, Profile,
    UserType,
};
use crate::validation::ValidationErrors;

pub type ApiError = Custom<Json<StandardErrorResponse>>;
pub type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Serialize)]
#[serde(crate = "rocket::serde", rename_all = "lowercase")]
pub enum ResponseType {
    Text,
    Data,
    Action,
    Error,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct TextResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct DataResponse<T> {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ActionResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_actions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct StandardErrorResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub error: String,
    pub error_code: String,
    pub suggestions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

// Request bodies may carry a conversation_id that is echoed back
#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct StandardRequest<T> {
    #[serde(flatten)]
    pub data: T,
    #[serde(default)]
    pub conversation_id: Option<String>,
}

impl TextResponse {
    pub fn success(message: String, conversation_id: Option<String>) -> Self {
        Self {
            response_type: ResponseType::Text,
            success: true,
            message,
            conversation_id,
        }
    }
}

impl<T> DataResponse<T> {
    pub fn success(message: String, data: T, conversation_id: Option<String>) -> Self {
        Self {
            response_type: ResponseType::Data,
            success: true,
            message,
            data,
            conversation_id,
        }
    }
}

impl ActionResponse {
    pub fn success(message: String, action: String, conversation_id: Option<String>) -> Self {
        Self {
            response_type: ResponseType::Action,
            success: true,
            message,
            action,
            next_actions: None,
            conversation_id,
        }
    }

    pub fn with_next_actions(mut self, next_actions: Vec<String>) -> Self {
        self.next_actions = Some(next_actions);
        self
    }
}

impl StandardErrorResponse {
    pub fn new(
        error: String,
        error_code: String,
        suggestions: Vec<String>,
        conversation_id: Option<String>,
    ) -> Self {
        Self {
            response_type: ResponseType::Error,
            success: false,
            error,
            error_code,
            suggestions,
            conversation_id,
        }
    }
}

pub fn api_error(status: Status, error: &str, code: &str, suggestions: Vec<String>) -> ApiError {
    Custom(
        status,
        Json(StandardErrorResponse::new(
            error.to_string(),
            code.to_string(),
            suggestions,
            None,
        )),
    )
}

/// Log the cause and answer 500 without leaking it.
pub fn internal_error(context: &str, err: &anyhow::Error) -> ApiError {
    error!("{}: {:#}", context, err);
    api_error(
        Status::InternalServerError,
        context,
        "INTERNAL_ERROR",
        vec![
            "Try again in a few moments".to_string(),
            "Contact support if the problem persists".to_string(),
        ],
    )
}

pub fn not_found(what: &str) -> ApiError {
    api_error(
        Status::NotFound,
        &format!("{} not found", what),
        "NOT_FOUND",
        vec!["Check the identifier and try again".to_string()],
    )
}

pub fn forbidden(message: &str) -> ApiError {
    api_error(Status::Forbidden, message, "FORBIDDEN", vec![])
}

pub fn conflict(message: &str, code: &str) -> ApiError {
    api_error(Status::Conflict, message, code, vec![])
}

pub fn bad_input(message: &str) -> ApiError {
    api_error(Status::BadRequest, message, "BAD_REQUEST", vec![])
}

pub fn validation_failed(errors: &ValidationErrors) -> ApiError {
    api_error(
        Status::UnprocessableEntity,
        "Please correct the highlighted fields",
        "VALIDATION_ERROR",
        errors.messages(),
    )
}

impl From<AuthFailure> for ApiError {
    fn from(failure: AuthFailure) -> Self {
        match failure {
            AuthFailure::Validation(errors) => validation_failed(&errors),
            AuthFailure::EmailTaken => conflict(&failure.to_string(), "EMAIL_TAKEN"),
            AuthFailure::InvalidCredentials => api_error(
                Status::Unauthorized,
                &failure.to_string(),
                "INVALID_CREDENTIALS",
                vec!["Check your email and password".to_string()],
            ),
            AuthFailure::InvalidResetToken => api_error(
                Status::BadRequest,
                &failure.to_string(),
                "INVALID_RESET_TOKEN",
                vec!["Request a new password reset email".to_string()],
            ),
            AuthFailure::Internal(e) => internal_error("Authentication service failed", &e),
        }
    }
}

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub user_type: UserType,
}

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct PasswordResetRequest {
    pub email: String,
}

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct PasswordResetConfirm {
    pub token: String,
    pub password: String,
}

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct StatusUpdateRequest {
    pub status: ApplicationStatus,
}

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct NotificationUpdateRequest {
    pub notify_before_deadline: bool,
    pub notification_days: i64,
}

#[derive(FromForm)]
pub struct LogoUploadForm<'f> {
    pub file: TempFile<'f>,
}

#[derive(Debug, Default, FromForm)]
pub struct CompanyQuery {
    pub search: Option<String>,
    pub industry: Option<String>,
    pub size: Option<String>,
    pub location: Option<String>,
}

impl From<CompanyQuery> for CompanyFilter {
    fn from(q: CompanyQuery) -> Self {
        CompanyFilter {
            search: q.search,
            industry: q.industry,
            size: q.size,
            location: q.location,
            owner_id: None,
        }
    }
}

#[derive(Debug, Default, FromForm)]
pub struct JobQuery {
    pub search: Option<String>,
    pub location: Option<String>,
    pub job_type: Option<String>,
    pub company_id: Option<String>,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub include_inactive: Option<bool>,
}

impl JobQuery {
    pub fn into_filter(self) -> Result<JobFilter, ApiError> {
        let job_type = match self.job_type.as_deref().filter(|t| !t.is_empty()) {
            Some(raw) => Some(raw.parse::<JobType>().map_err(|e| bad_input(&e.to_string()))?),
            None => None,
        };
        Ok(JobFilter {
            search: self.search,
            location: self.location,
            job_type,
            company_id: self.company_id,
            salary_min: self.salary_min,
            salary_max: self.salary_max,
            active_only: !self.include_inactive.unwrap_or(false),
        })
    }
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct UserInfo {
    pub user_id: String,
    pub profile: Profile,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct HomeData {
    pub latest_jobs: Vec<JobWithCompany>,
    pub latest_companies: Vec<Company>,
}
