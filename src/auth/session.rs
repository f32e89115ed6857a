// src/auth/session.rs
//! Accounts, sessions and password resets.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::fmt;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use super::password::{hash_password, verify_password};
use super::AuthError;
use crate::core::config_manager::AuthSettings;
use crate::core::EmailClient;
use crate::models::{new_id, NewProfile, Profile, UserType};
use crate::repository::ProfileRepository;
use crate::validation::{validate_password, validate_sign_up, ValidationErrors};

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id
    pub sid: String, // session id
    pub exp: usize,
    pub iat: usize,
}

/// A bearer token that decoded and still has a live session row.
#[derive(Debug, Clone)]
pub struct VerifiedSession {
    pub user_id: String,
    pub session_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "user_id", rename_all = "snake_case")]
pub enum AuthEvent {
    SignedIn(String),
    SignedOut(String),
    PasswordUpdated(String),
}

#[derive(Debug, Serialize)]
pub struct AuthSession {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user_id: String,
    pub profile: Option<Profile>,
}

#[derive(Debug)]
pub enum AuthFailure {
    Validation(ValidationErrors),
    EmailTaken,
    InvalidCredentials,
    InvalidResetToken,
    Internal(anyhow::Error),
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthFailure::Validation(errors) => write!(f, "{}", errors),
            AuthFailure::EmailTaken => write!(f, "An account with this email already exists"),
            AuthFailure::InvalidCredentials => write!(f, "Invalid email or password"),
            AuthFailure::InvalidResetToken => write!(f, "Reset link is invalid or has expired"),
            AuthFailure::Internal(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for AuthFailure {}

impl From<anyhow::Error> for AuthFailure {
    fn from(e: anyhow::Error) -> Self {
        AuthFailure::Internal(e)
    }
}

impl From<sqlx::Error> for AuthFailure {
    fn from(e: sqlx::Error) -> Self {
        AuthFailure::Internal(e.into())
    }
}

impl From<ValidationErrors> for AuthFailure {
    fn from(e: ValidationErrors) -> Self {
        AuthFailure::Validation(e)
    }
}

pub struct AuthService {
    pool: SqlitePool,
    settings: AuthSettings,
    events: broadcast::Sender<AuthEvent>,
    mailer: Option<EmailClient>,
}

impl AuthService {
    pub fn new(pool: SqlitePool, settings: AuthSettings, mailer: Option<EmailClient>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            pool,
            settings,
            events,
            mailer,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Session changes: sign in, sign out and password updates.
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: AuthEvent) {
        // no subscribers is fine
        let _ = self.events.send(event);
    }

    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
        user_type: UserType,
    ) -> Result<AuthSession, AuthFailure> {
        validate_sign_up(email, password, full_name)?;

        let email = email.trim();
        let user_id = new_id();
        let hash = hash_password(password).await?;

        let mut tx = self.pool.begin().await?;
        let inserted = sqlx::query(
            "INSERT INTO users (id, email, password_hash, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&user_id)
        .bind(email)
        .bind(&hash)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await;

        match inserted {
            Ok(_) => {}
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                warn!("Sign up rejected, email already registered: {}", email);
                return Err(AuthFailure::EmailTaken);
            }
            Err(e) => return Err(e.into()),
        }

        ProfileRepository::create_profile(
            &mut *tx,
            &NewProfile {
                id: user_id.clone(),
                email: email.to_string(),
                user_type,
                full_name: full_name.trim().to_string(),
            },
        )
        .await?;
        tx.commit().await?;

        info!("New {} account {} ({})", user_type, user_id, email);
        self.open_session(&user_id).await
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthFailure> {
        let row: Option<(String, String)> =
            sqlx::query_as("SELECT id, password_hash FROM users WHERE email = ? COLLATE NOCASE")
                .bind(email.trim())
                .fetch_optional(&self.pool)
                .await?;

        let Some((user_id, hash)) = row else {
            warn!("Sign in for unknown email {}", email);
            return Err(AuthFailure::InvalidCredentials);
        };

        if !verify_password(password, &hash).await? {
            warn!("Wrong password for user {}", user_id);
            return Err(AuthFailure::InvalidCredentials);
        }

        self.open_session(&user_id).await
    }

    async fn open_session(&self, user_id: &str) -> Result<AuthSession, AuthFailure> {
        let session_id = new_id();
        let now = Utc::now();
        let expires_at = now + Duration::hours(self.settings.session_ttl_hours);

        sqlx::query("INSERT INTO sessions (id, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)")
            .bind(&session_id)
            .bind(user_id)
            .bind(now)
            .bind(expires_at)
            .execute(&self.pool)
            .await?;

        let claims = Claims {
            sub: user_id.to_string(),
            sid: session_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.settings.jwt_secret.as_bytes()),
        )
        .map_err(|e| anyhow::anyhow!("Failed to sign session token: {}", e))?;

        let profile = ProfileRepository::new(&self.pool).get_profile(user_id).await?;

        info!("User {} signed in", user_id);
        self.emit(AuthEvent::SignedIn(user_id.to_string()));

        Ok(AuthSession {
            token,
            expires_at,
            user_id: user_id.to_string(),
            profile,
        })
    }

    pub async fn verify_token(&self, token: &str) -> Result<VerifiedSession, AuthError> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.settings.jwt_secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|e| {
            warn!("Token verification failed: {}", e);
            AuthError::InvalidToken
        })?;

        let session: Option<(String, DateTime<Utc>)> =
            sqlx::query_as("SELECT user_id, expires_at FROM sessions WHERE id = ?")
                .bind(&data.claims.sid)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    error!("Session lookup failed: {}", e);
                    AuthError::DatabaseError
                })?;

        match session {
            Some((user_id, expires_at)) if user_id == data.claims.sub && expires_at > Utc::now() => {
                Ok(VerifiedSession {
                    user_id,
                    session_id: data.claims.sid,
                })
            }
            _ => Err(AuthError::SessionExpired),
        }
    }

    pub async fn sign_out(&self, session: &VerifiedSession) -> Result<(), AuthFailure> {
        sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(&session.session_id)
            .execute(&self.pool)
            .await?;

        info!("User {} signed out", session.user_id);
        self.emit(AuthEvent::SignedOut(session.user_id.clone()));
        Ok(())
    }

    /// Issue a single-use reset token and mail it. Unknown emails succeed
    /// silently; the token is returned for callers that deliver it themselves.
    pub async fn request_password_reset(&self, email: &str) -> Result<Option<String>, AuthFailure> {
        let profile = ProfileRepository::new(&self.pool).get_by_email(email.trim()).await?;

        let Some(Profile { id: user_id, email: stored_email, .. }) = profile else {
            info!("Password reset requested for unknown email {}", email);
            return Ok(None);
        };

        let token = uuid::Uuid::new_v4().simple().to_string();
        let expires_at = Utc::now() + Duration::minutes(self.settings.reset_token_ttl_minutes);

        sqlx::query("INSERT INTO password_resets (token, user_id, expires_at, used) VALUES (?, ?, ?, FALSE)")
            .bind(&token)
            .bind(&user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await?;

        match &self.mailer {
            Some(mailer) => {
                if let Err(e) = mailer.send_password_reset(&stored_email, &token).await {
                    error!("Failed to send password reset email to {}: {}", stored_email, e);
                }
            }
            None => warn!("Email service not configured, reset token for {} not sent", user_id),
        }

        info!("Password reset issued for user {}", user_id);
        Ok(Some(token))
    }

    /// Consume a reset token, replace the password and end every session.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AuthFailure> {
        validate_password(new_password)?;

        let mut tx = self.pool.begin().await?;
        let reset: Option<(String, DateTime<Utc>)> = sqlx::query_as(
            "SELECT user_id, expires_at FROM password_resets WHERE token = ? AND used = FALSE",
        )
        .bind(token)
        .fetch_optional(&mut *tx)
        .await?;

        let user_id = match reset {
            Some((user_id, expires_at)) if expires_at > Utc::now() => user_id,
            _ => return Err(AuthFailure::InvalidResetToken),
        };

        let hash = hash_password(new_password).await?;
        sqlx::query("UPDATE password_resets SET used = TRUE WHERE token = ?")
            .bind(token)
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(&hash)
            .bind(&user_id)
            .execute(&mut *tx)
            .await?;
        let revoked = sqlx::query("DELETE FROM sessions WHERE user_id = ?")
            .bind(&user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        tx.commit().await?;

        info!("Password updated for user {}, {} sessions revoked", user_id, revoked);
        self.emit(AuthEvent::PasswordUpdated(user_id));
        Ok(())
    }

    /// Poll for the profile row a bounded number of times.
    pub async fn wait_for_profile(&self, user_id: &str) -> anyhow::Result<Option<Profile>> {
        let repo = ProfileRepository::new(&self.pool);
        let attempts = self.settings.profile_wait_attempts.max(1);

        for attempt in 1..=attempts {
            if let Some(profile) = repo.get_profile(user_id).await? {
                return Ok(Some(profile));
            }
            if attempt < attempts {
                warn!(
                    "Profile {} not visible yet (attempt {}/{})",
                    user_id, attempt, attempts
                );
                tokio::time::sleep(self.settings.profile_wait_interval()).await;
            }
        }

        error!("Profile {} still missing after {} attempts", user_id, attempts);
        Ok(None)
    }
}
