// src/web/handlers/auth_handlers.rs
use rocket::serde::json::Json;
use rocket::State;
use tracing::info;

use crate::auth::{AuthService, AuthSession, AuthenticatedUser, VerifiedSession};
use crate::validation::is_valid_email;
use crate::web::types::*;

pub async fn sign_up_handler(
    request: Json<StandardRequest<SignUpRequest>>,
    auth: &State<AuthService>,
) -> ApiResult<DataResponse<AuthSession>> {
    let conversation_id = request.conversation_id.clone();
    let body = &request.data;

    let session = auth
        .sign_up(&body.email, &body.password, &body.full_name, body.user_type)
        .await?;

    Ok(Json(DataResponse::success(
        "Account created".to_string(),
        session,
        conversation_id,
    )))
}

pub async fn sign_in_handler(
    request: Json<StandardRequest<SignInRequest>>,
    auth: &State<AuthService>,
) -> ApiResult<DataResponse<AuthSession>> {
    let conversation_id = request.conversation_id.clone();
    let session = auth
        .sign_in(&request.data.email, &request.data.password)
        .await?;

    Ok(Json(DataResponse::success(
        "Signed in".to_string(),
        session,
        conversation_id,
    )))
}

pub async fn sign_out_handler(
    session: VerifiedSession,
    auth: &State<AuthService>,
) -> ApiResult<ActionResponse> {
    auth.sign_out(&session).await?;
    Ok(Json(ActionResponse::success(
        "Signed out".to_string(),
        "signed_out".to_string(),
        None,
    )))
}

/// Same answer whether or not the address has an account.
pub async fn request_password_reset_handler(
    request: Json<StandardRequest<PasswordResetRequest>>,
    auth: &State<AuthService>,
) -> ApiResult<TextResponse> {
    let conversation_id = request.conversation_id.clone();
    if !is_valid_email(&request.data.email) {
        return Err(bad_input("A valid email address is required"));
    }

    auth.request_password_reset(&request.data.email).await?;

    Ok(Json(TextResponse::success(
        "If an account exists for this email, a reset link has been sent".to_string(),
        conversation_id,
    )))
}

pub async fn confirm_password_reset_handler(
    request: Json<StandardRequest<PasswordResetConfirm>>,
    auth: &State<AuthService>,
) -> ApiResult<ActionResponse> {
    let conversation_id = request.conversation_id.clone();
    auth.reset_password(&request.data.token, &request.data.password)
        .await?;

    Ok(Json(
        ActionResponse::success(
            "Password updated".to_string(),
            "password_updated".to_string(),
            conversation_id,
        )
        .with_next_actions(vec!["sign_in".to_string()]),
    ))
}

pub async fn get_current_user_handler(user: AuthenticatedUser) -> Json<DataResponse<UserInfo>> {
    info!("Current user requested by {}", user.user_id());
    Json(DataResponse::success(
        format!("Signed in as {}", user.profile.user_type),
        UserInfo {
            user_id: user.session.user_id.clone(),
            profile: user.profile,
        },
        None,
    ))
}
