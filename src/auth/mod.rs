// src/auth/mod.rs
pub mod password;
pub mod session;

pub use session::{AuthEvent, AuthFailure, AuthService, AuthSession, Claims, VerifiedSession};

use rocket::http::Status;
use rocket::request::{FromRequest, Outcome};
use rocket::{Request, State};
use tracing::{error, info, warn};

use crate::models::{Profile, UserType};

/// What a page gated on session and account type should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    /// Signed in, but the profile row is not visible yet.
    Loading,
    SignInRequired,
    Forbidden,
    Granted,
}

pub fn check_access(
    session: Option<&VerifiedSession>,
    profile: Option<&Profile>,
    allowed: Option<UserType>,
) -> RouteAccess {
    let Some(_session) = session else {
        return RouteAccess::SignInRequired;
    };
    let Some(profile) = profile else {
        return RouteAccess::Loading;
    };
    match allowed {
        Some(user_type) if profile.user_type != user_type => RouteAccess::Forbidden,
        _ => RouteAccess::Granted,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    SessionExpired,
    WrongAccountType,
    ProfileUnavailable,
    DatabaseError,
}

impl AuthError {
    pub fn message(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "Authorization token required",
            AuthError::InvalidToken => "Invalid authorization token",
            AuthError::SessionExpired => "Session expired or signed out",
            AuthError::WrongAccountType => "This page is not available for your account type",
            AuthError::ProfileUnavailable => "Profile is not available yet",
            AuthError::DatabaseError => "Database error occurred",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "AUTH_REQUIRED",
            AuthError::InvalidToken => "INVALID_TOKEN",
            AuthError::SessionExpired => "SESSION_EXPIRED",
            AuthError::WrongAccountType => "FORBIDDEN",
            AuthError::ProfileUnavailable => "PROFILE_UNAVAILABLE",
            AuthError::DatabaseError => "DATABASE_ERROR",
        }
    }

    pub fn status(&self) -> Status {
        match self {
            AuthError::MissingToken | AuthError::InvalidToken | AuthError::SessionExpired => {
                Status::Unauthorized
            }
            AuthError::WrongAccountType => Status::Forbidden,
            AuthError::ProfileUnavailable => Status::ServiceUnavailable,
            AuthError::DatabaseError => Status::InternalServerError,
        }
    }
}

/// The guard failure of the current request, read back by the catchers.
#[derive(Debug, Default)]
pub struct CachedAuthError(pub Option<AuthError>);

fn fail<T>(req: &Request<'_>, error: AuthError) -> Outcome<T, AuthError> {
    req.local_cache(|| CachedAuthError(Some(error)));
    Outcome::Error((error.status(), error))
}

/// A signed-in user whose profile row is visible.
pub struct AuthenticatedUser {
    pub session: VerifiedSession,
    pub profile: Profile,
}

impl AuthenticatedUser {
    pub fn user_id(&self) -> &str {
        &self.session.user_id
    }

    pub fn is_employer(&self) -> bool {
        self.profile.is_employer()
    }

    fn require(self, req: &Request<'_>, user_type: UserType) -> Outcome<Self, AuthError> {
        match check_access(Some(&self.session), Some(&self.profile), Some(user_type)) {
            RouteAccess::Granted => Outcome::Success(self),
            _ => {
                warn!(
                    "User {} ({}) denied a {} route",
                    self.session.user_id, self.profile.user_type, user_type
                );
                fail(req, AuthError::WrongAccountType)
            }
        }
    }
}

fn bearer_token<'r>(req: &'r Request<'_>) -> Result<&'r str, AuthError> {
    match req.headers().get_one("Authorization") {
        Some(header) => header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::InvalidToken),
        None => Err(AuthError::MissingToken),
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for VerifiedSession {
    type Error = AuthError;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let auth = match req.guard::<&State<AuthService>>().await {
            Outcome::Success(auth) => auth,
            Outcome::Error(_) | Outcome::Forward(_) => {
                error!("AuthService is not managed");
                return fail(req, AuthError::DatabaseError);
            }
        };

        let token = match bearer_token(req) {
            Ok(token) => token,
            Err(e) => return fail(req, e),
        };

        match auth.verify_token(token).await {
            Ok(session) => Outcome::Success(session),
            Err(e) => fail(req, e),
        }
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthenticatedUser {
    type Error = AuthError;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let session = match VerifiedSession::from_request(req).await {
            Outcome::Success(session) => session,
            Outcome::Error(e) => return Outcome::Error(e),
            Outcome::Forward(f) => return Outcome::Forward(f),
        };

        let auth = match req.guard::<&State<AuthService>>().await {
            Outcome::Success(auth) => auth,
            _ => return fail(req, AuthError::DatabaseError),
        };

        let profile = match auth.wait_for_profile(&session.user_id).await {
            Ok(profile) => profile,
            Err(e) => {
                error!("Profile lookup failed for {}: {}", session.user_id, e);
                return fail(req, AuthError::DatabaseError);
            }
        };

        let Some(profile) = profile else {
            return fail(req, AuthError::ProfileUnavailable);
        };

        info!("User {} authenticated as {}", session.user_id, profile.user_type);
        Outcome::Success(AuthenticatedUser { session, profile })
    }
}

/// Only employers get through.
pub struct EmployerUser(pub AuthenticatedUser);

/// Only job seekers get through.
pub struct JobSeekerUser(pub AuthenticatedUser);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for EmployerUser {
    type Error = AuthError;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        match AuthenticatedUser::from_request(req).await {
            Outcome::Success(user) => user.require(req, UserType::Employer).map(EmployerUser),
            Outcome::Error(e) => Outcome::Error(e),
            Outcome::Forward(f) => Outcome::Forward(f),
        }
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for JobSeekerUser {
    type Error = AuthError;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        match AuthenticatedUser::from_request(req).await {
            Outcome::Success(user) => user.require(req, UserType::JobSeeker).map(JobSeekerUser),
            Outcome::Error(e) => Outcome::Error(e),
            Outcome::Forward(f) => Outcome::Forward(f),
        }
    }
}

// Optional auth guard that doesn't fail if no auth is provided
pub struct OptionalAuth {
    pub user: Option<AuthenticatedUser>,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for OptionalAuth {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        if req.headers().get_one("Authorization").is_none() {
            return Outcome::Success(OptionalAuth { user: None });
        }
        match AuthenticatedUser::from_request(req).await {
            Outcome::Success(auth) => Outcome::Success(OptionalAuth { user: Some(auth) }),
            _ => Outcome::Success(OptionalAuth { user: None }),
        }
    }
}
