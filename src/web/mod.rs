// src/web/mod.rs
pub mod handlers;
pub mod types;

pub use types::*;

use anyhow::Result;
use rocket::data::{Limits, ToByteUnit};
use rocket::fairing::{Fairing, Info, Kind};
use rocket::figment::Figment;
use rocket::form::Form;
use rocket::fs::{FileServer, Options};
use rocket::http::{Header, Status};
use rocket::serde::json::Json;
use rocket::{catchers, delete, get, options, patch, post, routes, Build, Request, Response, Rocket, State};
use serde_json::Value;
use tracing::{error, info};

use crate::auth::{
    AuthService, AuthSession, AuthenticatedUser, CachedAuthError, EmployerUser, JobSeekerUser,
    OptionalAuth, VerifiedSession,
};
use crate::core::{ConfigManager, ContactMessage, Database, EmailClient};
use crate::models::*;
use crate::recommend::ScoredJob;
use crate::reminders::DeadlineReminder;
use crate::storage::{LogoStore, STORAGE_MOUNT};

/// Email client for the contact form, absent when not configured.
pub struct Mailer(pub Option<EmailClient>);

/// Everything the routes need as managed state.
pub struct AppState {
    pub db: Database,
    pub auth: AuthService,
    pub logos: LogoStore,
    pub mailer: Mailer,
}

impl AppState {
    pub fn from_config(config: &ConfigManager, db: Database) -> Result<Self> {
        let mailer = match &config.email {
            Some(settings) => Some(EmailClient::new(settings.clone())?),
            None => {
                info!("Email service not configured, contact form and reset mails disabled");
                None
            }
        };

        Ok(Self {
            auth: AuthService::new(db.pool().clone(), config.auth.clone(), mailer.clone()),
            logos: LogoStore::new(config.environment.storage_path.clone()),
            mailer: Mailer(mailer),
            db,
        })
    }
}

// CORS Fairing
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "POST, GET, PATCH, DELETE, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
        response.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
    }
}

// Auth

#[post("/auth/signup", data = "<request>")]
pub async fn sign_up(
    request: Json<StandardRequest<SignUpRequest>>,
    auth: &State<AuthService>,
) -> ApiResult<DataResponse<AuthSession>> {
    handlers::sign_up_handler(request, auth).await
}

#[post("/auth/signin", data = "<request>")]
pub async fn sign_in(
    request: Json<StandardRequest<SignInRequest>>,
    auth: &State<AuthService>,
) -> ApiResult<DataResponse<AuthSession>> {
    handlers::sign_in_handler(request, auth).await
}

#[post("/auth/signout")]
pub async fn sign_out(session: VerifiedSession, auth: &State<AuthService>) -> ApiResult<ActionResponse> {
    handlers::sign_out_handler(session, auth).await
}

#[post("/auth/password-reset", data = "<request>")]
pub async fn request_password_reset(
    request: Json<StandardRequest<PasswordResetRequest>>,
    auth: &State<AuthService>,
) -> ApiResult<TextResponse> {
    handlers::request_password_reset_handler(request, auth).await
}

#[post("/auth/password-reset/confirm", data = "<request>")]
pub async fn confirm_password_reset(
    request: Json<StandardRequest<PasswordResetConfirm>>,
    auth: &State<AuthService>,
) -> ApiResult<ActionResponse> {
    handlers::confirm_password_reset_handler(request, auth).await
}

#[get("/me")]
pub async fn get_current_user(user: AuthenticatedUser) -> Json<DataResponse<UserInfo>> {
    handlers::get_current_user_handler(user).await
}

// Profiles

#[get("/profile")]
pub async fn get_own_profile(user: AuthenticatedUser) -> Json<DataResponse<Profile>> {
    handlers::get_own_profile_handler(user).await
}

#[patch("/profile", data = "<request>")]
pub async fn update_profile(
    request: Json<StandardRequest<ProfileUpdate>>,
    user: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<DataResponse<Profile>> {
    handlers::update_profile_handler(request, user, db).await
}

#[patch("/profile/settings", data = "<patch>")]
pub async fn update_settings(
    patch: Json<Value>,
    user: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<DataResponse<ProfileSettings>> {
    handlers::update_settings_handler(patch, user, db).await
}

#[get("/profiles/<id>")]
pub async fn get_public_profile(
    id: &str,
    viewer: OptionalAuth,
    db: &State<Database>,
) -> ApiResult<DataResponse<Profile>> {
    handlers::get_public_profile_handler(id, viewer, db).await
}

// Companies

#[get("/companies?<query..>")]
pub async fn list_companies(query: CompanyQuery, db: &State<Database>) -> ApiResult<DataResponse<Vec<Company>>> {
    handlers::list_companies_handler(query, db).await
}

#[get("/companies/mine")]
pub async fn my_companies(employer: EmployerUser, db: &State<Database>) -> ApiResult<DataResponse<Vec<Company>>> {
    handlers::my_companies_handler(employer, db).await
}

#[get("/companies/<id>", rank = 2)]
pub async fn get_company(id: &str, db: &State<Database>) -> ApiResult<DataResponse<Company>> {
    handlers::get_company_handler(id, db).await
}

#[post("/companies", data = "<request>")]
pub async fn create_company(
    request: Json<StandardRequest<CompanyInput>>,
    employer: EmployerUser,
    db: &State<Database>,
) -> ApiResult<DataResponse<Company>> {
    handlers::create_company_handler(request, employer, db).await
}

#[patch("/companies/<id>", data = "<request>")]
pub async fn update_company(
    id: &str,
    request: Json<StandardRequest<CompanyInput>>,
    employer: EmployerUser,
    db: &State<Database>,
) -> ApiResult<DataResponse<Company>> {
    handlers::update_company_handler(id, request, employer, db).await
}

#[delete("/companies/<id>")]
pub async fn delete_company(
    id: &str,
    employer: EmployerUser,
    db: &State<Database>,
    logos: &State<LogoStore>,
) -> ApiResult<ActionResponse> {
    handlers::delete_company_handler(id, employer, db, logos).await
}

#[post("/companies/<id>/logo", data = "<upload>")]
pub async fn upload_logo(
    id: &str,
    upload: Form<LogoUploadForm<'_>>,
    employer: EmployerUser,
    db: &State<Database>,
    logos: &State<LogoStore>,
) -> ApiResult<DataResponse<Company>> {
    handlers::upload_logo_handler(id, upload, employer, db, logos).await
}

// Jobs

#[get("/jobs?<query..>")]
pub async fn list_jobs(query: JobQuery, db: &State<Database>) -> ApiResult<DataResponse<Vec<JobWithCompany>>> {
    handlers::list_jobs_handler(query, db).await
}

#[get("/jobs/recommended")]
pub async fn recommended_jobs(seeker: JobSeekerUser, db: &State<Database>) -> ApiResult<DataResponse<Vec<ScoredJob>>> {
    handlers::recommended_jobs_handler(seeker, db).await
}

#[get("/jobs/<id>", rank = 2)]
pub async fn get_job(id: &str, db: &State<Database>) -> ApiResult<DataResponse<JobWithCompany>> {
    handlers::get_job_handler(id, db).await
}

#[post("/jobs", data = "<request>")]
pub async fn create_job(
    request: Json<StandardRequest<JobInput>>,
    employer: EmployerUser,
    db: &State<Database>,
) -> ApiResult<DataResponse<JobWithCompany>> {
    handlers::create_job_handler(request, employer, db).await
}

#[patch("/jobs/<id>", data = "<request>")]
pub async fn update_job(
    id: &str,
    request: Json<StandardRequest<JobUpdate>>,
    employer: EmployerUser,
    db: &State<Database>,
) -> ApiResult<DataResponse<JobWithCompany>> {
    handlers::update_job_handler(id, request, employer, db).await
}

#[delete("/jobs/<id>")]
pub async fn delete_job(id: &str, employer: EmployerUser, db: &State<Database>) -> ApiResult<ActionResponse> {
    handlers::delete_job_handler(id, employer, db).await
}

// Applications

#[post("/jobs/<id>/apply", data = "<request>")]
pub async fn apply(
    id: &str,
    request: Json<StandardRequest<ApplicationInput>>,
    seeker: JobSeekerUser,
    db: &State<Database>,
) -> ApiResult<DataResponse<Application>> {
    handlers::apply_handler(id, request, seeker, db).await
}

#[get("/applications/mine")]
pub async fn my_applications(
    seeker: JobSeekerUser,
    db: &State<Database>,
) -> ApiResult<DataResponse<Vec<ApplicationWithJob>>> {
    handlers::my_applications_handler(seeker, db).await
}

#[get("/applications/received")]
pub async fn received_applications(
    employer: EmployerUser,
    db: &State<Database>,
) -> ApiResult<DataResponse<Vec<ReceivedApplication>>> {
    handlers::received_applications_handler(employer, db).await
}

#[patch("/applications/<id>/status", data = "<request>")]
pub async fn update_application_status(
    id: &str,
    request: Json<StandardRequest<StatusUpdateRequest>>,
    employer: EmployerUser,
    db: &State<Database>,
) -> ApiResult<DataResponse<Application>> {
    handlers::update_application_status_handler(id, request, employer, db).await
}

#[delete("/applications/<id>")]
pub async fn withdraw_application(
    id: &str,
    seeker: JobSeekerUser,
    db: &State<Database>,
) -> ApiResult<ActionResponse> {
    handlers::withdraw_application_handler(id, seeker, db).await
}

// Saved jobs

#[get("/saved-jobs")]
pub async fn list_saved_jobs(
    seeker: JobSeekerUser,
    db: &State<Database>,
) -> ApiResult<DataResponse<Vec<SavedJobWithJob>>> {
    handlers::list_saved_jobs_handler(seeker, db).await
}

#[post("/saved-jobs", data = "<request>")]
pub async fn save_job(
    request: Json<StandardRequest<SaveJobInput>>,
    seeker: JobSeekerUser,
    db: &State<Database>,
) -> ApiResult<DataResponse<SavedJob>> {
    handlers::save_job_handler(request, seeker, db).await
}

#[get("/saved-jobs/reminders")]
pub async fn due_reminders(
    seeker: JobSeekerUser,
    db: &State<Database>,
) -> ApiResult<DataResponse<Vec<DeadlineReminder>>> {
    handlers::due_reminders_handler(seeker, db).await
}

#[patch("/saved-jobs/<id>", data = "<request>")]
pub async fn update_saved_job(
    id: &str,
    request: Json<StandardRequest<NotificationUpdateRequest>>,
    seeker: JobSeekerUser,
    db: &State<Database>,
) -> ApiResult<DataResponse<SavedJob>> {
    handlers::update_saved_job_handler(id, request, seeker, db).await
}

#[delete("/saved-jobs/<id>")]
pub async fn unsave_job(id: &str, seeker: JobSeekerUser, db: &State<Database>) -> ApiResult<ActionResponse> {
    handlers::unsave_job_handler(id, seeker, db).await
}

// Content

#[get("/blog?<category>")]
pub async fn list_blog_posts(category: Option<&str>, db: &State<Database>) -> ApiResult<DataResponse<Vec<BlogPost>>> {
    handlers::list_blog_posts_handler(category, db).await
}

#[get("/blog/<slug>")]
pub async fn get_blog_post(slug: &str, db: &State<Database>) -> ApiResult<DataResponse<BlogPost>> {
    handlers::get_blog_post_handler(slug, db).await
}

#[get("/resources?<category>")]
pub async fn list_resources(category: Option<&str>, db: &State<Database>) -> ApiResult<DataResponse<Vec<Resource>>> {
    handlers::list_resources_handler(category, db).await
}

// System

#[get("/home")]
pub async fn home(db: &State<Database>) -> ApiResult<DataResponse<HomeData>> {
    handlers::home_handler(db).await
}

#[post("/contact", data = "<request>")]
pub async fn contact(
    request: Json<StandardRequest<ContactMessage>>,
    mailer: &State<Mailer>,
) -> ApiResult<TextResponse> {
    handlers::contact_handler(request, mailer).await
}

#[get("/health")]
pub async fn health(auth: OptionalAuth, db: &State<Database>) -> ApiResult<TextResponse> {
    handlers::health_handler(auth, db).await
}

#[options("/<_..>")]
pub async fn options() -> Status {
    Status::Ok
}

// Error catchers

fn catcher_error(error: &str, code: &str, suggestions: &[&str]) -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        error.to_string(),
        code.to_string(),
        suggestions.iter().map(|s| s.to_string()).collect(),
        None,
    ))
}

/// Use the guard's own message when an auth guard caused the failure.
fn auth_catcher(req: &Request<'_>, fallback: (&str, &str), suggestions: &[&str]) -> Json<StandardErrorResponse> {
    match req.local_cache(CachedAuthError::default).0 {
        Some(err) => catcher_error(err.message(), err.code(), suggestions),
        None => catcher_error(fallback.0, fallback.1, suggestions),
    }
}

#[rocket::catch(400)]
pub fn bad_request() -> Json<StandardErrorResponse> {
    catcher_error(
        "Invalid request format",
        "BAD_REQUEST",
        &["Check your request JSON format", "Verify all required fields are present"],
    )
}

#[rocket::catch(401)]
pub fn unauthorized(req: &Request) -> Json<StandardErrorResponse> {
    auth_catcher(req, ("Authentication required", "AUTH_REQUIRED"), &["Sign in and try again"])
}

#[rocket::catch(403)]
pub fn forbidden_catcher(req: &Request) -> Json<StandardErrorResponse> {
    auth_catcher(req, ("Access denied", "FORBIDDEN"), &[])
}

#[rocket::catch(404)]
pub fn not_found_catcher() -> Json<StandardErrorResponse> {
    catcher_error("Resource not found", "NOT_FOUND", &["Check the URL"])
}

/// Raised by the form limits before a logo handler runs.
#[rocket::catch(413)]
pub fn payload_too_large() -> Json<StandardErrorResponse> {
    catcher_error(
        "Uploaded file is too large",
        "FILE_TOO_LARGE",
        &["Logos may be at most 5 MB"],
    )
}

#[rocket::catch(422)]
pub fn unprocessable() -> Json<StandardErrorResponse> {
    catcher_error(
        "Request body could not be understood",
        "UNPROCESSABLE",
        &["Check field names and value types"],
    )
}

#[rocket::catch(500)]
pub fn internal_error_catcher() -> Json<StandardErrorResponse> {
    catcher_error(
        "Internal server error",
        "INTERNAL_ERROR",
        &["Try again in a few moments", "Contact support if the problem persists"],
    )
}

#[rocket::catch(503)]
pub fn unavailable(req: &Request) -> Json<StandardErrorResponse> {
    auth_catcher(
        req,
        ("Service temporarily unavailable", "UNAVAILABLE"),
        &["Try again in a few moments"],
    )
}

/// Rocket configuration for the given port with upload limits raised for logos.
pub fn server_figment(port: u16) -> Figment {
    let limits = Limits::default()
        .limit("file", 6.mebibytes())
        .limit("data-form", 8.mebibytes());

    rocket::Config::figment()
        .merge(("address", "0.0.0.0"))
        .merge(("port", port))
        .merge(("limits", limits))
}

pub fn build_rocket(figment: Figment, state: AppState) -> Rocket<Build> {
    let storage_root = state.logos.root().to_path_buf();

    rocket::custom(figment)
        .attach(Cors)
        .manage(state.db)
        .manage(state.auth)
        .manage(state.logos)
        .manage(state.mailer)
        .register(
            "/",
            catchers![
                bad_request,
                unauthorized,
                forbidden_catcher,
                not_found_catcher,
                payload_too_large,
                unprocessable,
                internal_error_catcher,
                unavailable,
            ],
        )
        .mount(STORAGE_MOUNT, FileServer::new(storage_root, Options::Missing))
        .mount(
            "/api",
            routes![
                sign_up,
                sign_in,
                sign_out,
                request_password_reset,
                confirm_password_reset,
                get_current_user,
                get_own_profile,
                update_profile,
                update_settings,
                get_public_profile,
                list_companies,
                my_companies,
                get_company,
                create_company,
                update_company,
                delete_company,
                upload_logo,
                list_jobs,
                recommended_jobs,
                get_job,
                create_job,
                update_job,
                delete_job,
                apply,
                my_applications,
                received_applications,
                update_application_status,
                withdraw_application,
                list_saved_jobs,
                save_job,
                due_reminders,
                update_saved_job,
                unsave_job,
                list_blog_posts,
                get_blog_post,
                list_resources,
                home,
                contact,
                health,
                options,
            ],
        )
}

// Main server start function
pub async fn start_web_server(config: ConfigManager) -> Result<()> {
    config.ensure_directories().await?;

    let db = match Database::new(&config.environment.database_path).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            return Err(e);
        }
    };

    info!("Starting The Germany Jobs API server");
    info!("Database: {}", config.environment.database_path.display());
    info!("Storage: {}", config.environment.storage_path.display());
    info!("Server: http://0.0.0.0:{}", config.port);

    let state = AppState::from_config(&config, db)?;
    let _rocket = build_rocket(server_figment(config.port), state)
        .launch()
        .await
        .map_err(|e| anyhow::anyhow!("Server failed: {}", e))?;

    Ok(())
}
