/// JWT issuance and validation
///
/// Signed HS256 tokens carry the user's id plus a token-type marker, so an
/// access token and a refresh token can never stand in for each other even
/// though both verify under the same secret. Claims deliberately carry no
/// role or permission data; those are read fresh from the user row on every
/// request so a role change or a disabled account takes effect immediately.
///
/// # Security
///
/// - **Algorithm**: HS256 (HMAC with SHA-256)
/// - **Expiration**: 24 hours for access tokens, 30 days for refresh tokens
/// - **Validation**: signature, expiration, nbf, and issuer checks
/// - **Secret**: at least 32 bytes; length is enforced by the API config
///
/// # Example
///
/// ```
/// use tasktrail_shared::auth::jwt::{create_token, validate_token, Claims, TokenType};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let user_id = Uuid::new_v4();
///
/// let claims = Claims::new(user_id, TokenType::Access);
/// let token = create_token(&claims, "your-secret-key")?;
///
/// let validated = validate_token(&token, "your-secret-key")?;
/// assert_eq!(validated.sub, user_id);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Issuer claim stamped into and required of every token
const ISSUER: &str = "tasktrail";

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Failed to validate token
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Invalid issuer
    #[error("Invalid issuer: expected {expected}")]
    InvalidIssuer { expected: String },
}

/// Marker distinguishing the two token roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Short-lived Bearer credential for API calls
    Access,

    /// Long-lived token exchanged for fresh access tokens
    Refresh,
}

impl TokenType {
    /// How long a freshly-issued token of this type lives
    pub fn default_expiration(&self) -> Duration {
        match self {
            TokenType::Access => Duration::hours(24),
            TokenType::Refresh => Duration::days(30),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }
}

/// JWT claims
///
/// Standard claims `sub` (user id), `iss`, `iat`, `exp`, `nbf` plus the
/// custom `token_type` marker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - User ID
    pub sub: Uuid,

    /// Issuer - always "tasktrail"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,

    /// Token type (custom claim)
    pub token_type: TokenType,
}

impl Claims {
    /// Claims with the default lifetime for the token type
    pub fn new(user_id: Uuid, token_type: TokenType) -> Self {
        Self::with_expiration(user_id, token_type, token_type.default_expiration())
    }

    /// Claims expiring after a caller-chosen duration
    pub fn with_expiration(user_id: Uuid, token_type: TokenType, expires_in: Duration) -> Self {
        let now = Utc::now();
        let issued_at = now.timestamp();

        Self {
            sub: user_id,
            iss: ISSUER.to_string(),
            iat: issued_at,
            exp: (now + expires_in).timestamp(),
            nbf: issued_at,
            token_type,
        }
    }

    /// Whether the expiration timestamp has passed
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// Remaining lifetime, or None once expired
    pub fn time_until_expiration(&self) -> Option<Duration> {
        let remaining = self.exp - Utc::now().timestamp();
        (remaining > 0).then(|| Duration::seconds(remaining))
    }
}

/// Signs claims into a compact JWT string
///
/// # Errors
///
/// Returns `JwtError::CreateError` if encoding fails
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

fn hs256_validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;
    validation
}

/// Decodes and verifies a token, returning its claims
///
/// Checks the signature, expiration, nbf window, and issuer. The token
/// type is NOT checked here; use [`validate_access_token`] or
/// [`validate_refresh_token`] when the role matters.
///
/// # Errors
///
/// `JwtError::Expired` for an expired token, `JwtError::InvalidIssuer`
/// when the issuer claim is wrong, `JwtError::ValidationError` for a bad
/// signature or malformed token.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let data = decode::<Claims>(token, &key, &hs256_validation()).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidIssuer {
            expected: ISSUER.to_string(),
        },
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(data.claims)
}

fn require_type(claims: Claims, expected: TokenType) -> Result<Claims, JwtError> {
    if claims.token_type != expected {
        return Err(JwtError::ValidationError(format!(
            "Expected {} token, got {} token",
            expected.as_str(),
            claims.token_type.as_str()
        )));
    }
    Ok(claims)
}

/// Validates a token and requires it to be an access token
///
/// Keeps a long-lived refresh token from ever serving as a Bearer
/// credential.
pub fn validate_access_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    require_type(validate_token(token, secret)?, TokenType::Access)
}

/// Validates a token and requires it to be a refresh token
pub fn validate_refresh_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    require_type(validate_token(token, secret)?, TokenType::Refresh)
}

/// Exchanges a valid refresh token for a new access token
///
/// # Errors
///
/// Returns an error when the refresh token is invalid, expired, or is
/// actually an access token.
pub fn refresh_access_token(refresh_token: &str, secret: &str) -> Result<String, JwtError> {
    let refresh_claims = validate_refresh_token(refresh_token, secret)?;

    create_token(&Claims::new(refresh_claims.sub, TokenType::Access), secret)
}

/// Issues the access/refresh pair returned by register and login
///
/// # Errors
///
/// Returns an error if token encoding fails
pub fn issue_token_pair(user_id: Uuid, secret: &str) -> Result<(String, String), JwtError> {
    let access = create_token(&Claims::new(user_id, TokenType::Access), secret)?;
    let refresh = create_token(&Claims::new(user_id, TokenType::Refresh), secret)?;

    Ok((access, refresh))
}
