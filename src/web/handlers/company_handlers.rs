// src/web/handlers/company_handlers.rs
use rocket::form::Form;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use tracing::{error, info, warn};

use crate::auth::EmployerUser;
use crate::core::Database;
use crate::models::{Company, CompanyInput};
use crate::repository::CompanyRepository;
use crate::storage::{LogoStore, MAX_LOGO_SIZE};
use crate::validation::validate_company;
use crate::web::types::*;

/// Load a company and make sure `user_id` owns it.
pub(crate) async fn owned_company(
    db: &Database,
    company_id: &str,
    user_id: &str,
) -> Result<Company, ApiError> {
    let company = CompanyRepository::new(db.pool())
        .get_company(company_id)
        .await
        .map_err(|e| internal_error("Failed to load company", &e))?
        .ok_or_else(|| not_found("Company"))?;

    if company.owner_id != user_id {
        warn!("User {} does not own company {}", user_id, company_id);
        return Err(forbidden("Only the company owner can do this"));
    }
    Ok(company)
}

pub async fn list_companies_handler(
    query: CompanyQuery,
    db: &State<Database>,
) -> ApiResult<DataResponse<Vec<Company>>> {
    let companies = CompanyRepository::new(db.pool())
        .get_companies(&query.into())
        .await
        .map_err(|e| internal_error("Failed to load companies", &e))?;

    Ok(Json(DataResponse::success(
        format!("{} companies", companies.len()),
        companies,
        None,
    )))
}

pub async fn my_companies_handler(
    employer: EmployerUser,
    db: &State<Database>,
) -> ApiResult<DataResponse<Vec<Company>>> {
    let companies = CompanyRepository::new(db.pool())
        .get_companies_by_owner(employer.0.user_id())
        .await
        .map_err(|e| internal_error("Failed to load companies", &e))?;

    Ok(Json(DataResponse::success(
        format!("{} companies", companies.len()),
        companies,
        None,
    )))
}

pub async fn get_company_handler(id: &str, db: &State<Database>) -> ApiResult<DataResponse<Company>> {
    let company = CompanyRepository::new(db.pool())
        .get_company(id)
        .await
        .map_err(|e| internal_error("Failed to load company", &e))?
        .ok_or_else(|| not_found("Company"))?;

    Ok(Json(DataResponse::success(
        "Company loaded".to_string(),
        company,
        None,
    )))
}

pub async fn create_company_handler(
    request: Json<StandardRequest<CompanyInput>>,
    employer: EmployerUser,
    db: &State<Database>,
) -> ApiResult<DataResponse<Company>> {
    let conversation_id = request.conversation_id.clone();
    validate_company(&request.data).map_err(|e| validation_failed(&e))?;

    let company = CompanyRepository::new(db.pool())
        .create_company(employer.0.user_id(), &request.data)
        .await
        .map_err(|e| internal_error("Failed to create company", &e))?;

    Ok(Json(DataResponse::success(
        format!("Company '{}' created", company.name),
        company,
        conversation_id,
    )))
}

pub async fn update_company_handler(
    id: &str,
    request: Json<StandardRequest<CompanyInput>>,
    employer: EmployerUser,
    db: &State<Database>,
) -> ApiResult<DataResponse<Company>> {
    let conversation_id = request.conversation_id.clone();
    owned_company(db, id, employer.0.user_id()).await?;
    validate_company(&request.data).map_err(|e| validation_failed(&e))?;

    let company = CompanyRepository::new(db.pool())
        .update_company(id, &request.data)
        .await
        .map_err(|e| internal_error("Failed to update company", &e))?
        .ok_or_else(|| not_found("Company"))?;

    Ok(Json(DataResponse::success(
        "Company updated".to_string(),
        company,
        conversation_id,
    )))
}

/// Delete a company with all of its jobs, then its logo file.
pub async fn delete_company_handler(
    id: &str,
    employer: EmployerUser,
    db: &State<Database>,
    logos: &State<LogoStore>,
) -> ApiResult<ActionResponse> {
    let company = owned_company(db, id, employer.0.user_id()).await?;

    let jobs_removed = CompanyRepository::new(db.pool())
        .delete_company(id)
        .await
        .map_err(|e| internal_error("Failed to delete company", &e))?
        .ok_or_else(|| not_found("Company"))?;

    if let Some(logo_url) = company.logo_url.as_deref() {
        if let Err(e) = logos.remove(logo_url).await {
            warn!("Company {} deleted but its logo stayed: {}", id, e);
        }
    }

    info!("Company {} deleted with {} jobs", id, jobs_removed);
    Ok(Json(ActionResponse::success(
        format!("Company '{}' and {} jobs deleted", company.name, jobs_removed),
        "deleted".to_string(),
        None,
    )))
}

fn upload_name(upload: &LogoUploadForm<'_>) -> Option<String> {
    let from_name = upload
        .file
        .raw_name()
        .map(|n| n.dangerous_unsafe_unsanitized_raw().as_str().to_string())
        .filter(|n| n.contains('.'));
    let from_type = upload
        .file
        .content_type()
        .and_then(|ct| ct.extension())
        .map(|ext| format!("logo.{}", ext));
    from_name.or(from_type)
}

pub async fn upload_logo_handler(
    id: &str,
    mut upload: Form<LogoUploadForm<'_>>,
    employer: EmployerUser,
    db: &State<Database>,
    logos: &State<LogoStore>,
) -> ApiResult<DataResponse<Company>> {
    let company = owned_company(db, id, employer.0.user_id()).await?;

    if upload.file.len() as usize > MAX_LOGO_SIZE {
        return Err(api_error(
            Status::PayloadTooLarge,
            "Logo exceeds the 5MB limit",
            "FILE_TOO_LARGE",
            vec!["Use a smaller image (max 5MB)".to_string()],
        ));
    }

    let Some(name) = upload_name(&upload) else {
        return Err(api_error(
            Status::UnprocessableEntity,
            "Could not determine the image type",
            "INVALID_FORMAT",
            vec!["Upload a .png, .jpg, .webp or .svg file".to_string()],
        ));
    };

    let temp_path = std::env::temp_dir().join(format!("logo_upload_{}", uuid::Uuid::new_v4()));
    if let Err(e) = upload.file.persist_to(&temp_path).await {
        error!("Failed to persist logo upload: {}", e);
        return Err(internal_error("Failed to receive logo", &e.into()));
    }
    let bytes = tokio::fs::read(&temp_path).await;
    let _ = tokio::fs::remove_file(&temp_path).await;
    let bytes = bytes.map_err(|e| internal_error("Failed to read logo upload", &e.into()))?;

    let url = logos.store_bytes(&name, &bytes).await.map_err(|e| {
        warn!("Rejected logo for company {}: {}", id, e);
        api_error(
            Status::UnprocessableEntity,
            &e.to_string(),
            "INVALID_LOGO",
            vec!["Upload a .png, .jpg, .webp or .svg file up to 5MB".to_string()],
        )
    })?;

    let repo = CompanyRepository::new(db.pool());
    repo.set_logo_url(id, Some(&url))
        .await
        .map_err(|e| internal_error("Failed to save logo", &e))?;

    if let Some(old) = company.logo_url.as_deref() {
        if let Err(e) = logos.remove(old).await {
            warn!("Old logo {} not removed: {}", old, e);
        }
    }

    let company = repo
        .get_company(id)
        .await
        .map_err(|e| internal_error("Failed to load company", &e))?
        .ok_or_else(|| not_found("Company"))?;

    Ok(Json(DataResponse::success(
        "Logo uploaded".to_string(),
        company,
        None,
    )))
}
