use germany_jobs::auth::AuthService;
use germany_jobs::core::config_manager::AuthSettings;
use germany_jobs::core::Database;
use germany_jobs::storage::LogoStore;
use germany_jobs::web::{build_rocket, server_figment, AppState, Mailer};
use rocket::http::{ContentType, Header, Status};
use rocket::local::asynchronous::Client;
use serde_json::{json, Value};
use tempfile::TempDir;

async fn client() -> (Client, TempDir) {
    let storage = TempDir::new().unwrap();
    let db = Database::in_memory().await.unwrap();
    let settings = AuthSettings {
        profile_wait_attempts: 2,
        profile_wait_interval_ms: 5,
        ..AuthSettings::default()
    };
    let state = AppState {
        auth: AuthService::new(db.pool().clone(), settings, None),
        logos: LogoStore::new(storage.path()),
        mailer: Mailer(None),
        db,
    };
    let client = Client::tracked(build_rocket(server_figment(0), state))
        .await
        .unwrap();
    (client, storage)
}

fn bearer(token: &str) -> Header<'static> {
    Header::new("Authorization", format!("Bearer {}", token))
}

async fn post_json(client: &Client, uri: &str, token: Option<&str>, body: Value) -> (Status, Value) {
    let mut request = client.post(uri).header(ContentType::JSON).body(body.to_string());
    if let Some(token) = token {
        request = request.header(bearer(token));
    }
    let response = request.dispatch().await;
    let status = response.status();
    let body = response.into_json::<Value>().await.unwrap_or(Value::Null);
    (status, body)
}

async fn get_json(client: &Client, uri: &str, token: Option<&str>) -> (Status, Value) {
    let mut request = client.get(uri);
    if let Some(token) = token {
        request = request.header(bearer(token));
    }
    let response = request.dispatch().await;
    let status = response.status();
    let body = response.into_json::<Value>().await.unwrap_or(Value::Null);
    (status, body)
}

async fn patch_json(client: &Client, uri: &str, token: &str, body: Value) -> (Status, Value) {
    let response = client
        .patch(uri)
        .header(ContentType::JSON)
        .header(bearer(token))
        .body(body.to_string())
        .dispatch()
        .await;
    let status = response.status();
    let body = response.into_json::<Value>().await.unwrap_or(Value::Null);
    (status, body)
}

const BOUNDARY: &str = "germany-jobs-logo-boundary";

/// Posts `bytes` as the multipart `file` field of a logo upload.
async fn upload_logo(client: &Client, token: &str, company_id: &str, bytes: &[u8]) -> (Status, Value) {
    let mut body = format!(
        "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"logo.png\"\r\n\
         Content-Type: image/png\r\n\r\n",
        BOUNDARY
    )
    .into_bytes();
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    let uri = format!("/api/companies/{}/logo", company_id);
    let response = client
        .post(uri.as_str())
        .header(ContentType::new("multipart", "form-data").with_params(("boundary", BOUNDARY)))
        .header(bearer(token))
        .body(body)
        .dispatch()
        .await;
    let status = response.status();
    let body = response.into_json::<Value>().await.unwrap_or(Value::Null);
    (status, body)
}

/// Signs up and returns the session token.
async fn sign_up(client: &Client, email: &str, user_type: &str) -> String {
    let (status, body) = post_json(
        client,
        "/api/auth/signup",
        None,
        json!({
            "email": email,
            "password": "Secret123",
            "full_name": "Test User",
            "user_type": user_type
        }),
    )
    .await;
    assert_eq!(status, Status::Ok, "{}", body);
    body["data"]["token"].as_str().unwrap().to_string()
}

async fn create_company(client: &Client, token: &str) -> String {
    let (status, body) = post_json(
        client,
        "/api/companies",
        Some(token),
        json!({ "name": "Rheinwerk GmbH", "industry": "Software", "location": "Köln" }),
    )
    .await;
    assert_eq!(status, Status::Ok, "{}", body);
    body["data"]["id"].as_str().unwrap().to_string()
}

async fn create_job(client: &Client, token: &str, company_id: &str, title: &str, salary: (i64, i64)) -> String {
    let (status, body) = post_json(
        client,
        "/api/jobs",
        Some(token),
        json!({
            "company_id": company_id,
            "title": title,
            "description": "Build things",
            "location": "Köln",
            "job_type": "full_time",
            "salary_min": salary.0,
            "salary_max": salary.1
        }),
    )
    .await;
    assert_eq!(status, Status::Ok, "{}", body);
    body["data"]["id"].as_str().unwrap().to_string()
}

#[rocket::async_test]
async fn weak_password_is_rejected_without_creating_an_account() {
    let (client, _storage) = client().await;
    let (status, body) = post_json(
        &client,
        "/api/auth/signup",
        None,
        json!({
            "email": "weak@example.de",
            "password": "short",
            "full_name": "Weak",
            "user_type": "job_seeker"
        }),
    )
    .await;
    assert_eq!(status, Status::UnprocessableEntity);
    assert_eq!(body["success"], json!(false));

    let (status, _) = post_json(
        &client,
        "/api/auth/signin",
        None,
        json!({ "email": "weak@example.de", "password": "short" }),
    )
    .await;
    assert_eq!(status, Status::Unauthorized);
}

#[rocket::async_test]
async fn sign_up_then_sign_in_returns_profile() {
    let (client, _storage) = client().await;
    sign_up(&client, "anna@example.de", "job_seeker").await;

    let (status, body) = post_json(
        &client,
        "/api/auth/signin",
        None,
        json!({ "email": "ANNA@example.de", "password": "Secret123" }),
    )
    .await;
    assert_eq!(status, Status::Ok);
    assert_eq!(body["data"]["profile"]["user_type"], json!("job_seeker"));

    let token = body["data"]["token"].as_str().unwrap();
    let (status, me) = get_json(&client, "/api/me", Some(token)).await;
    assert_eq!(status, Status::Ok);
    assert_eq!(me["data"]["profile"]["email"], json!("anna@example.de"));
}

#[rocket::async_test]
async fn employer_routes_check_account_type() {
    let (client, _storage) = client().await;
    let seeker = sign_up(&client, "seeker@example.de", "job_seeker").await;
    let employer = sign_up(&client, "boss@example.de", "employer").await;

    let (status, _) = get_json(&client, "/api/companies/mine", None).await;
    assert_eq!(status, Status::Unauthorized);

    let (status, body) = get_json(&client, "/api/companies/mine", Some(&seeker)).await;
    assert_eq!(status, Status::Forbidden);
    assert_eq!(body["error_code"], json!("FORBIDDEN"));

    let (status, body) = get_json(&client, "/api/companies/mine", Some(&employer)).await;
    assert_eq!(status, Status::Ok);
    assert_eq!(body["data"], json!([]));
}

#[rocket::async_test]
async fn job_list_filters_by_salary() {
    let (client, _storage) = client().await;
    let employer = sign_up(&client, "hr@example.de", "employer").await;
    let company_id = create_company(&client, &employer).await;
    create_job(&client, &employer, &company_id, "Junior Developer", (40_000, 50_000)).await;
    create_job(&client, &employer, &company_id, "Senior Developer", (70_000, 90_000)).await;

    let (status, body) = get_json(&client, "/api/jobs?salary_min=60000", None).await;
    assert_eq!(status, Status::Ok);
    let jobs = body["data"].as_array().unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0]["title"], json!("Senior Developer"));
    assert_eq!(jobs[0]["company"]["name"], json!("Rheinwerk GmbH"));

    let (status, _) = get_json(&client, "/api/jobs?job_type=permanent", None).await;
    assert_eq!(status, Status::BadRequest);
}

#[rocket::async_test]
async fn second_application_conflicts() {
    let (client, _storage) = client().await;
    let employer = sign_up(&client, "hr@example.de", "employer").await;
    let seeker = sign_up(&client, "jonas@example.de", "job_seeker").await;
    let company_id = create_company(&client, &employer).await;
    let job_id = create_job(&client, &employer, &company_id, "Data Engineer", (60_000, 80_000)).await;

    let uri = format!("/api/jobs/{}/apply", job_id);
    let application = json!({ "cover_letter": "Ich freue mich auf Ihre Antwort." });

    let (status, body) = post_json(&client, &uri, Some(&seeker), application.clone()).await;
    assert_eq!(status, Status::Ok);
    assert_eq!(body["data"]["status"], json!("pending"));

    let (status, body) = post_json(&client, &uri, Some(&seeker), application).await;
    assert_eq!(status, Status::Conflict);
    assert_eq!(body["error_code"], json!("ALREADY_APPLIED"));

    let (status, body) = get_json(&client, "/api/applications/received", Some(&employer)).await;
    assert_eq!(status, Status::Ok);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[rocket::async_test]
async fn sign_out_invalidates_token() {
    let (client, _storage) = client().await;
    let token = sign_up(&client, "lea@example.de", "job_seeker").await;

    let (status, _) = post_json(&client, "/api/auth/signout", Some(&token), json!({})).await;
    assert_eq!(status, Status::Ok);

    let (status, body) = get_json(&client, "/api/profile", Some(&token)).await;
    assert_eq!(status, Status::Unauthorized);
    assert_eq!(body["error_code"], json!("SESSION_EXPIRED"));
}

#[rocket::async_test]
async fn public_content_needs_no_session() {
    let (client, _storage) = client().await;

    let (status, body) = get_json(&client, "/api/home", None).await;
    assert_eq!(status, Status::Ok);
    assert_eq!(body["data"]["latest_jobs"], json!([]));

    let (status, _) = get_json(&client, "/api/blog/does-not-exist", None).await;
    assert_eq!(status, Status::NotFound);

    let (status, body) = post_json(
        &client,
        "/api/contact",
        None,
        json!({ "name": "Max", "email": "max@example.de", "message": "Hallo" }),
    )
    .await;
    assert_eq!(status, Status::ServiceUnavailable);
    assert_eq!(body["error_code"], json!("EMAIL_UNAVAILABLE"));
}

#[rocket::async_test]
async fn settings_patch_with_wrong_shape_is_a_validation_error() {
    let (client, _storage) = client().await;
    let token = sign_up(&client, "mia@example.de", "job_seeker").await;

    for patch in [
        json!({ "notifications": { "newsletter": "yes" } }),
        json!({ "privacy": { "profile_visibility": "friends" } }),
    ] {
        let (status, body) = patch_json(&client, "/api/profile/settings", &token, patch).await;
        assert_eq!(status, Status::UnprocessableEntity, "{}", body);
        assert_eq!(body["error_code"], json!("VALIDATION_ERROR"));
        assert!(body["suggestions"][0].as_str().unwrap().starts_with("settings:"));
    }

    let (status, body) = patch_json(
        &client,
        "/api/profile/settings",
        &token,
        json!({ "notifications": { "newsletter": true } }),
    )
    .await;
    assert_eq!(status, Status::Ok);
    assert_eq!(body["data"]["notifications"]["newsletter"], json!(true));
    assert_eq!(body["data"]["privacy"]["profile_visibility"], json!("public"));
}

#[rocket::async_test]
async fn job_search_ignores_umlaut_case() {
    let (client, _storage) = client().await;
    let employer = sign_up(&client, "praxis@example.de", "employer").await;
    let company_id = create_company(&client, &employer).await;
    create_job(&client, &employer, &company_id, "Ärztin (m/w/d)", (70_000, 90_000)).await;

    let (status, body) = get_json(&client, "/api/jobs?search=%C3%A4rztin", None).await;
    assert_eq!(status, Status::Ok);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["title"], json!("Ärztin (m/w/d)"));

    let (status, body) = get_json(&client, "/api/jobs?location=k%C3%96ln", None).await;
    assert_eq!(status, Status::Ok);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[rocket::async_test]
async fn oversized_logo_gets_the_standard_error() {
    let (client, _storage) = client().await;
    let employer = sign_up(&client, "design@example.de", "employer").await;
    let company_id = create_company(&client, &employer).await;

    // Over the logo limit but inside the upload limit: rejected by the handler.
    let (status, body) = upload_logo(&client, &employer, &company_id, &vec![0u8; 5 * 1024 * 1024 + 512]).await;
    assert_eq!(status, Status::PayloadTooLarge);
    assert_eq!(body["error_code"], json!("FILE_TOO_LARGE"));

    // Over the upload limit: rejected while the form is parsed.
    let (status, body) = upload_logo(&client, &employer, &company_id, &vec![0u8; 7 * 1024 * 1024]).await;
    assert_eq!(status, Status::PayloadTooLarge);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error_code"], json!("FILE_TOO_LARGE"));
}
