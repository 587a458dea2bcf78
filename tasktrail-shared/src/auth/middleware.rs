/// Request authentication for Axum
///
/// This module turns an incoming request's `Authorization: Bearer <token>`
/// header into a [`CurrentUser`] extension. Token validation alone is not
/// enough: the user row is re-read on every request, so a deactivated
/// account or a role change takes effect immediately rather than when the
/// token expires.
///
/// The API crate wires [`authenticate`] into a `middleware::from_fn_with_state`
/// layer and maps [`AuthError`] onto its own response type.
///
/// # Example
///
/// ```no_run
/// use axum::Extension;
/// use tasktrail_shared::auth::middleware::CurrentUser;
///
/// async fn handler(Extension(current): Extension<CurrentUser>) -> String {
///     format!("Hello, {}!", current.user.username)
/// }
/// ```

use axum::http::{header, HeaderMap};
use sqlx::PgPool;

use super::jwt::{validate_access_token, JwtError};
use crate::models::user::User;

/// The authenticated requester, added to request extensions
///
/// Carries the full user row as it was at the start of the request, so
/// handlers and policy checks never consult stale token claims for role
/// decisions.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// The freshly-loaded user row
    pub user: User,
}

/// Error type for request authentication
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Missing authorization header
    #[error("Missing authorization header")]
    MissingCredentials,

    /// Authorization header is not a Bearer token
    #[error("Expected Bearer token")]
    InvalidFormat,

    /// Token validation failed
    #[error("{0}")]
    InvalidToken(String),

    /// Token subject no longer exists
    #[error("Unknown user")]
    UnknownUser,

    /// Token subject's account has been disabled
    #[error("User account is disabled")]
    AccountDisabled,

    /// Database error during user lookup
    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// Authenticates a request from its headers
///
/// Validates the Bearer access token, then loads the user it names and
/// confirms the account is still active.
///
/// # Arguments
///
/// * `pool` - Database connection pool
/// * `secret` - JWT secret for validation
/// * `headers` - The request's headers
///
/// # Returns
///
/// The authenticated user on success
///
/// # Errors
///
/// Returns an error if:
/// - The Authorization header is missing or not a Bearer token
/// - Token validation fails (bad signature, expired, wrong type)
/// - The token's subject does not exist or is disabled
pub async fn authenticate(
    pool: &PgPool,
    secret: &str,
    headers: &HeaderMap,
) -> Result<User, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidFormat)?;

    let claims = validate_access_token(token, secret).map_err(|e| match e {
        JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
        JwtError::InvalidIssuer { .. } => AuthError::InvalidToken("Invalid issuer".to_string()),
        _ => AuthError::InvalidToken(format!("Invalid token: {}", e)),
    })?;

    let user = User::find_by_id(pool, claims.sub)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?
        .ok_or(AuthError::UnknownUser)?;

    if !user.is_active {
        return Err(AuthError::AccountDisabled);
    }

    Ok(user)
}
