/// Token service: signed bearer token issuance and verification
///
/// Tokens are HS256-signed JWTs carrying the user's identity claims. They are
/// not stored anywhere; validity is decided purely by signature and
/// expiration, so an issued token stays valid for its whole lifetime.
///
/// # Security
///
/// - **Algorithm**: HS256 (HMAC with SHA-256)
/// - **Lifetime**: 7 days ([`TOKEN_TTL_SECONDS`])
/// - **Validation**: signature and expiration, zero leeway
/// - **Secret**: injected configuration, at least 32 bytes; there is no default
///
/// # Example
///
/// ```
/// use taskboard_shared::auth::jwt::{create_token, validate_token, Claims};
/// use taskboard_shared::models::user::UserRole;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "an-example-secret-that-is-32-bytes!";
/// let claims = Claims::new(7, "dana@example.com", UserRole::Employee);
/// let token = create_token(&claims, secret)?;
///
/// let decoded = validate_token(&token, secret)?;
/// assert_eq!(decoded, claims);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::models::user::{User, UserRole};

/// Token lifetime in seconds (7 days)
pub const TOKEN_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Error type for token operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to sign a token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Malformed token or signature mismatch
    #[error("Invalid token: {0}")]
    Invalid(String),
}

/// Identity claims carried inside a token
///
/// Serialized as `{userId, email, role, iat, exp}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: i64,

    pub email: String,

    pub role: UserRole,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Creates claims expiring [`TOKEN_TTL_SECONDS`] from now
    pub fn new(user_id: i64, email: impl Into<String>, role: UserRole) -> Self {
        Self::with_expiration(user_id, email, role, Duration::seconds(TOKEN_TTL_SECONDS))
    }

    /// Creates claims for a stored user
    pub fn for_user(user: &User) -> Self {
        Self::new(user.id, user.email.clone(), user.role)
    }

    /// Creates claims with a custom lifetime
    ///
    /// A negative duration yields claims that are already expired.
    pub fn with_expiration(
        user_id: i64,
        email: impl Into<String>,
        role: UserRole,
        expires_in: Duration,
    ) -> Self {
        let now = Utc::now();

        Self {
            user_id,
            email: email.into(),
            role,
            iat: now.timestamp(),
            exp: (now + expires_in).timestamp(),
        }
    }
}

/// Signs claims into a token string
///
/// # Errors
///
/// Returns `JwtError::CreateError` if encoding fails.
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Verifies a token and returns its claims
///
/// There is no partial mode: a bad signature, a malformed token or an
/// expired token all fail.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.leeway = 0;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        _ => JwtError::Invalid(e.to_string()),
    })?;

    Ok(token_data.claims)
}
