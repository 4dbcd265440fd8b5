/// Authentication endpoints
///
/// - `POST /api/auth/register` - Create an account awaiting approval
/// - `POST /api/auth/login` - Check credentials, issue a token and set the `authToken` cookie
/// - `POST /api/auth/logout` - Clear the `authToken` cookie
/// - `POST /api/auth/verify` - Verify a token passed in the body
/// - `GET /api/auth/verify` - Verify the bearer token
///
/// Tokens are never revoked server-side; logout only removes the cookie.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
    routes::run_blocking,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use taskboard_shared::{
    auth::{
        jwt::{self, Claims, TOKEN_TTL_SECONDS},
        middleware::extract_bearer_token,
        password, AUTH_COOKIE_NAME, INVALID_CREDENTIALS_MESSAGE, INVALID_TOKEN_MESSAGE,
        PENDING_APPROVAL_MESSAGE,
    },
    models::user::{CreateUser, PublicUser, UserRole},
};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(
        required(message = "Email is required"),
        email(message = "Invalid email format")
    )]
    pub email: Option<String>,

    #[validate(required(message = "Password is required"))]
    pub password: Option<String>,

    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(
        required(message = "Email is required"),
        length(min = 1, message = "Email is required")
    )]
    pub email: Option<String>,

    #[validate(
        required(message = "Password is required"),
        length(min = 1, message = "Password is required")
    )]
    pub password: Option<String>,
}

/// A message plus the affected user
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub message: String,
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub user: PublicUser,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub valid: bool,
    pub user: Claims,
}

/// Rejection for the verify endpoints: `401 {valid: false, message}`
#[derive(Debug)]
pub struct VerifyRejection;

impl IntoResponse for VerifyRejection {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({
                "valid": false,
                "message": INVALID_TOKEN_MESSAGE,
            })),
        )
            .into_response()
    }
}

fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(TOKEN_TTL_SECONDS))
        .build()
}

/// Register a new account
///
/// New accounts are employees and cannot log in until an admin approves
/// them.
///
/// # Errors
///
/// - `400 Bad Request`: Missing fields, bad email or weak password
/// - `409 Conflict`: Email already registered
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    let Json(req) = payload?;
    req.validate()?;

    let email = req.email.unwrap_or_default().trim().to_string();
    let password = req.password.unwrap_or_default();

    password::validate_password_strength(&password)
        .map_err(|e| ApiError::ValidationError(vec![ValidationErrorDetail::new("password", e)]))?;

    let password_hash = run_blocking(move || password::hash_password(&password)).await??;

    let user = state
        .store
        .create_user(CreateUser {
            email,
            password_hash,
            name: req.name,
            role: UserRole::Employee,
            is_approved: false,
        })
        .await?;

    tracing::info!(user_id = user.id, "Account registered, awaiting approval");

    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            message: "Registration successful, awaiting admin approval".to_string(),
            user: PublicUser::from(user),
        }),
    ))
}

/// Log in with email and password
///
/// Check order: unknown email, pending approval, password and active flag.
/// Unknown email, inactive account and wrong password share one message;
/// only the logs tell them apart. Each of them runs one Argon2
/// verification, against a throwaway hash for unknown emails.
///
/// Only presence is validated; a malformed email is just an unknown one.
///
/// On success the token is returned in the body and also set as the
/// `authToken` cookie (HttpOnly, SameSite=Lax, Path=/, 7 days, Secure in
/// production).
///
/// # Errors
///
/// - `400 Bad Request`: Missing or blank email or password
/// - `401 Unauthorized`: Invalid email or password
/// - `403 Forbidden`: Account pending approval
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<(CookieJar, Json<LoginResponse>)> {
    let Json(mut req) = payload?;
    req.email = req.email.map(|email| email.trim().to_string());
    req.validate()?;

    let email = req.email.unwrap_or_default();
    let password = req.password.unwrap_or_default();

    let Some(user) = state.store.find_user_by_email(&email).await? else {
        run_blocking(move || password::verify_dummy(&password)).await??;
        tracing::info!("Login failed: unknown email");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS_MESSAGE.to_string()));
    };

    if !user.is_approved {
        tracing::info!(user_id = user.id, "Login refused: account pending approval");
        return Err(ApiError::Forbidden(PENDING_APPROVAL_MESSAGE.to_string()));
    }

    let hash = user.password_hash.clone();
    let valid = run_blocking(move || password::verify_password(&password, &hash)).await??;

    if !user.is_active {
        tracing::info!(user_id = user.id, "Login failed: account inactive");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS_MESSAGE.to_string()));
    }

    if !valid {
        tracing::info!(user_id = user.id, "Login failed: password mismatch");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS_MESSAGE.to_string()));
    }

    let token = jwt::create_token(&Claims::for_user(&user), state.jwt_secret())?;
    let jar = jar.add(session_cookie(token.clone(), state.production()));

    tracing::info!(user_id = user.id, role = %user.role, "Login succeeded");

    Ok((
        jar,
        Json(LoginResponse {
            message: "Login successful".to_string(),
            user: PublicUser::from(user),
            token,
        }),
    ))
}

/// Clear the session cookie
///
/// Always succeeds. Tokens already handed out stay valid until they expire.
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<MessageResponse>) {
    let expired = Cookie::build((AUTH_COOKIE_NAME, ""))
        .path("/")
        .http_only(true)
        .max_age(time::Duration::ZERO)
        .build();

    (
        jar.add(expired),
        Json(MessageResponse {
            message: "Logged out".to_string(),
        }),
    )
}

fn verify(token: &str, secret: &str) -> Result<Json<VerifyResponse>, VerifyRejection> {
    match jwt::validate_token(token, secret) {
        Ok(claims) => Ok(Json(VerifyResponse {
            valid: true,
            user: claims,
        })),
        Err(e) => {
            tracing::debug!(error = %e, "Token verification failed");
            Err(VerifyRejection)
        }
    }
}

/// Verify a token sent as `{"token": "..."}`
pub async fn verify_token_body(
    State(state): State<AppState>,
    payload: Result<Json<VerifyRequest>, JsonRejection>,
) -> Result<Json<VerifyResponse>, VerifyRejection> {
    let token = payload
        .ok()
        .and_then(|Json(req)| req.token)
        .filter(|token| !token.is_empty())
        .ok_or(VerifyRejection)?;

    verify(&token, state.jwt_secret())
}

/// Verify the `Authorization: Bearer` token
pub async fn verify_token_header(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<VerifyResponse>, VerifyRejection> {
    let token = extract_bearer_token(&headers).map_err(|_| VerifyRejection)?;

    verify(token, state.jwt_secret())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("abc".to_string(), false);
        let rendered = cookie.to_string();

        assert!(rendered.starts_with("authToken=abc"));
        assert!(rendered.contains("HttpOnly"));
        assert!(rendered.contains("SameSite=Lax"));
        assert!(rendered.contains("Path=/"));
        assert!(rendered.contains("Max-Age=604800"));
        assert!(!rendered.contains("Secure"));

        assert!(session_cookie("abc".to_string(), true)
            .to_string()
            .contains("Secure"));
    }

    #[test]
    fn test_login_request_validation() {
        let missing = LoginRequest {
            email: None,
            password: Some("x".to_string()),
        };
        assert!(missing.validate().is_err());

        let blank_email = LoginRequest {
            email: Some(String::new()),
            password: Some("x".to_string()),
        };
        assert!(blank_email.validate().is_err());

        // Format is not checked at login; such an email is simply unknown
        let odd_email = LoginRequest {
            email: Some("not-an-email".to_string()),
            password: Some("x".to_string()),
        };
        assert!(odd_email.validate().is_ok());

        let empty_password = LoginRequest {
            email: Some("a@example.com".to_string()),
            password: Some(String::new()),
        };
        assert!(empty_password.validate().is_err());

        let ok = LoginRequest {
            email: Some("a@example.com".to_string()),
            password: Some("x".to_string()),
        };
        assert!(ok.validate().is_ok());
    }
}
