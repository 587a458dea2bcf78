/// Authentication and authorization utilities
///
/// This module provides the security primitives for TaskTrail:
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: JWT token generation and validation
/// - [`middleware`]: Bearer-token request authentication
/// - [`authorization`]: Role and visibility checks over loaded rows
///
/// # Security Features
///
/// - **Password Hashing**: Argon2id with 64 MB memory, 3 iterations
/// - **JWT Tokens**: HS256 signing, separate access and refresh types
/// - **Fresh Credentials**: user rows are re-read per request, so disabling
///   an account takes effect before its tokens expire
///
/// # Example
///
/// ```no_run
/// use tasktrail_shared::auth::password::{hash_password, verify_password};
/// use tasktrail_shared::auth::jwt::{create_token, Claims, TokenType};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// // Password authentication
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// // JWT token generation
/// let claims = Claims::new(Uuid::new_v4(), TokenType::Access);
/// let token = create_token(&claims, "secret-key")?;
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
