/// API route handlers
///
/// - `health`: Health check endpoint
/// - `auth`: Registration, login, logout and token verification
/// - `users`: Account approval
/// - `teams`: Team details and the cascading team delete
/// - `tasks`: Task status workflow

pub mod auth;
pub mod health;
pub mod tasks;
pub mod teams;
pub mod users;

use crate::error::{ApiError, ApiResult};

/// Parses a numeric path id
pub fn parse_id(raw: &str, what: &str) -> ApiResult<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ApiError::BadRequest(format!("Invalid {} id: {}", what, raw)))
}

/// Runs CPU-heavy work (password hashing) on the blocking pool
pub async fn run_blocking<T, F>(work: F) -> ApiResult<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError::InternalError(format!("Blocking task failed: {}", e)))
}

/// Fallback for unknown routes
pub async fn not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}
