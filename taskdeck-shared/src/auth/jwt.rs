/// JWT token validation for request authentication
///
/// Taskdeck identifies the acting user through an HS256-signed access token
/// carried in the `Authorization` header. Token issuance (login, refresh)
/// belongs to the external credential system; this module only creates tokens
/// for tests and validates them for the API layer.
///
/// # Example
///
/// ```
/// use taskdeck_shared::auth::jwt::{create_access_token, validate_access_token, Claims};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let user_id = Uuid::new_v4();
/// let secret = "a-secret-key-of-at-least-32-bytes!!";
///
/// let token = create_access_token(user_id, secret)?;
/// let claims = validate_access_token(&token, secret)?;
/// assert_eq!(claims.sub, user_id);
/// # Ok(())
/// # }
/// ```
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const ISSUER: &str = "taskdeck";

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("failed to create token: {0}")]
    CreateError(String),

    /// Token failed validation (bad signature, malformed, wrong issuer)
    #[error("failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("token has expired")]
    Expired,
}

/// JWT claims carried by a Taskdeck access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - user ID
    pub sub: Uuid,

    /// Issuer - always "taskdeck"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Creates claims for a user with the default 24-hour expiration
    pub fn new(user_id: Uuid) -> Self {
        Self::with_expiration(user_id, Duration::hours(24))
    }

    /// Creates claims with a custom expiration duration
    pub fn with_expiration(user_id: Uuid, expires_in: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: user_id,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + expires_in).timestamp(),
        }
    }
}

/// Creates a signed access token for a user
///
/// # Errors
///
/// Returns `JwtError::CreateError` if encoding fails.
pub fn create_access_token(user_id: Uuid, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, &Claims::new(user_id), &key)
        .map_err(|e| JwtError::CreateError(format!("token encoding failed: {e}")))
}

/// Validates an access token and extracts its claims
///
/// Verifies the signature, expiration, and issuer.
pub fn validate_access_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        _ => JwtError::ValidationError(format!("token validation failed: {e}")),
    })?;

    Ok(token_data.claims)
}
