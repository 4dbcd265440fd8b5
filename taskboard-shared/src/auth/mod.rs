/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing
/// - [`jwt`]: Token issuance and verification (HS256, 7-day lifetime)
/// - [`middleware`]: Bearer extraction and the per-request [`middleware::AuthContext`]
/// - [`authorization`]: Role checks
///
/// # Caller-facing messages
///
/// The login flow answers "unknown email" and "wrong password" with the same
/// message, and token checks answer every failure with the same message, so
/// callers cannot tell the cases apart. Pending approval is reported
/// explicitly.

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;

/// Returned for unknown email, wrong password and inactive accounts
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password";

/// Returned for any token verification failure
pub const INVALID_TOKEN_MESSAGE: &str = "Invalid or expired token";

/// Returned when the account exists but has not been approved yet
pub const PENDING_APPROVAL_MESSAGE: &str = "Account pending approval";

/// Name of the cookie carrying the session token
pub const AUTH_COOKIE_NAME: &str = "authToken";
