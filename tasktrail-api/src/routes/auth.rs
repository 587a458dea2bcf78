/// Authentication endpoints
///
/// This module provides user authentication endpoints:
/// - Registration (admin role gated by a shared secret)
/// - Login
/// - Token refresh
/// - Profile
///
/// # Endpoints
///
/// - `POST /register` - Register new user
/// - `POST /login` - Login and get tokens
/// - `POST /token/refresh` - Refresh access token
/// - `GET /profile` - Current user

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};
use tasktrail_shared::{
    auth::{
        jwt,
        middleware::CurrentUser,
        password,
    },
    models::user::{CreateUser, PublicUser, User, UserRole},
};
use validator::{Validate, ValidateEmail};

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Unique username
    #[validate(length(min = 1, max = 150, message = "Username must be 1-150 characters"))]
    pub username: String,

    /// Email address (optional, validated when non-empty)
    pub email: Option<String>,

    /// Password
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Password confirmation, must match `password`
    pub password_confirm: String,

    /// Requested role: `admin` or `contributor` (default)
    pub role: Option<String>,

    /// Optional first name
    #[validate(length(max = 150, message = "First name must be at most 150 characters"))]
    pub first_name: Option<String>,

    /// Optional last name
    #[validate(length(max = 150, message = "Last name must be at most 150 characters"))]
    pub last_name: Option<String>,

    /// Shared secret required when requesting the admin role
    pub admin_key: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username
    pub username: String,

    /// Password
    pub password: String,
}

/// Register and login response
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// The user's public fields (never the password hash)
    pub user: PublicUser,

    /// Refresh token (30d)
    pub refresh: String,

    /// Access token (24h)
    pub access: String,
}

/// Refresh token request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    /// Refresh token
    pub refresh: String,
}

/// Refresh token response
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// New access token (24h)
    pub access: String,
}

/// Register a new user
///
/// Creates a user account and issues a token pair. The `admin` role is
/// granted only when the request carries the configured registration key;
/// everyone else registers as a contributor.
///
/// # Endpoint
///
/// ```text
/// POST /register
/// Content-Type: application/json
///
/// {
///   "username": "jane_smith",
///   "email": "jane@example.com",
///   "password": "s3cretpass",
///   "password_confirm": "s3cretpass",
///   "role": "contributor",
///   "first_name": "Jane",
///   "last_name": "Smith"
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "user": { "id": "uuid", "username": "jane_smith", "role": "contributor", ... },
///   "refresh": "eyJ...",
///   "access": "eyJ..."
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: validation failed, passwords don't match, or the
///   admin key is missing/wrong for an admin signup
/// - `409 Conflict`: username already exists
/// - `500 Internal Server Error`: server error
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    req.validate()?;

    let email = req.email.unwrap_or_default();
    if !email.is_empty() && !email.validate_email() {
        return Err(ApiError::validation("email", "Invalid email format"));
    }

    if req.password != req.password_confirm {
        return Err(ApiError::validation(
            "password_confirm",
            "Passwords don't match",
        ));
    }

    let role = match req.role.as_deref() {
        None | Some("contributor") => UserRole::Contributor,
        Some("admin") => {
            let admin_key = req.admin_key.as_deref().unwrap_or("");
            if admin_key != state.admin_key() {
                return Err(ApiError::validation(
                    "admin_key",
                    "Invalid admin registration key",
                ));
            }
            UserRole::Admin
        }
        Some(_) => return Err(ApiError::validation("role", "Invalid role")),
    };

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            username: req.username,
            email,
            password_hash,
            role,
            first_name: req.first_name.unwrap_or_default(),
            last_name: req.last_name.unwrap_or_default(),
        },
    )
    .await?;

    let (access, refresh) = jwt::issue_token_pair(user.id, state.jwt_secret())?;

    tracing::info!(username = %user.username, role = %user.role.as_str(), "user registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: PublicUser::from(user),
            refresh,
            access,
        }),
    ))
}

/// Login endpoint
///
/// Verifies the username/password pair and issues a token pair. The wrong
/// username and the wrong password produce the same response; a disabled
/// account is only reported after the password checks out.
///
/// # Errors
///
/// - `400 Bad Request`: "Invalid credentials" or "User account is disabled"
/// - `500 Internal Server Error`: server error
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let user = User::find_by_username(&state.db, &req.username)
        .await?
        .ok_or_else(|| ApiError::BadRequest("Invalid credentials".to_string()))?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::BadRequest("Invalid credentials".to_string()));
    }

    if !user.is_active {
        return Err(ApiError::BadRequest(
            "User account is disabled".to_string(),
        ));
    }

    let (access, refresh) = jwt::issue_token_pair(user.id, state.jwt_secret())?;

    Ok(Json(AuthResponse {
        user: PublicUser::from(user),
        refresh,
        access,
    }))
}

/// Token refresh endpoint
///
/// Exchanges a refresh token for a new access token.
///
/// # Errors
///
/// - `401 Unauthorized`: invalid or expired refresh token
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let access = jwt::refresh_access_token(&req.refresh, state.jwt_secret())?;

    Ok(Json(RefreshResponse { access }))
}

/// Profile endpoint
///
/// Returns the authenticated user's public fields.
pub async fn profile(Extension(current): Extension<CurrentUser>) -> Json<PublicUser> {
    Json(PublicUser::from(current.user))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_validation() {
        let req = RegisterRequest {
            username: "jane".to_string(),
            email: None,
            password: "short".to_string(),
            password_confirm: "short".to_string(),
            role: None,
            first_name: None,
            last_name: None,
            admin_key: None,
        };
        assert!(req.validate().is_err());

        let req = RegisterRequest {
            password: "long enough".to_string(),
            password_confirm: "long enough".to_string(),
            ..req
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_auth_response_never_leaks_hash() {
        let json = serde_json::to_string(&AuthResponse {
            user: PublicUser {
                id: uuid::Uuid::new_v4(),
                username: "jane".to_string(),
                email: String::new(),
                first_name: String::new(),
                last_name: String::new(),
                role: UserRole::Contributor,
                created_at: chrono::Utc::now(),
            },
            refresh: "r".to_string(),
            access: "a".to_string(),
        })
        .unwrap();

        assert!(!json.contains("password"));
        assert!(json.contains("\"refresh\":\"r\""));
        assert!(json.contains("\"access\":\"a\""));
    }
}
