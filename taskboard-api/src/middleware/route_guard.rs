/// Page route guard
///
/// Runs in front of every request and protects the admin pages. API routes
/// do their own authentication and always pass through here.
///
/// # Decision table
///
/// ```text
/// /admin, /admin/* outside production              pass
/// /admin/login                                     pass
/// other /admin paths, no or invalid token          307 -> /admin/login
/// other /admin paths, valid non-admin token        307 -> /
/// other /admin paths, admin token                  pass
/// anything else (/api/*, /health, /_next/*, ...)   pass
/// ```
///
/// Everything under `/admin` is guarded, including paths that look like
/// files (`/admin/users/jane.doe`). Shared assets live under `/_next/` and
/// `/static/`.
///
/// The token is read from the `authToken` cookie, then from an
/// `Authorization: Bearer` header. The guard never answers with an error
/// body, only with redirects.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use taskboard_shared::{
    auth::{jwt::validate_token, middleware::extract_bearer_token, AUTH_COOKIE_NAME},
    models::user::UserRole,
};

use crate::app::AppState;

pub const ADMIN_LOGIN_PATH: &str = "/admin/login";
pub const HOME_PATH: &str = "/";

/// Outcome of the guard for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Pass,
    RedirectToLogin,
    RedirectToHome,
}

fn is_admin_page(path: &str) -> bool {
    path == "/admin" || path.starts_with("/admin/")
}

/// Whether the path needs an admin token under the current environment
pub fn requires_admin(path: &str, production: bool) -> bool {
    production && is_admin_page(path) && path != ADMIN_LOGIN_PATH
}

/// Decides what to do with a request
///
/// `role` is the role from a verified token, None when the token is missing
/// or fails verification.
pub fn decide(path: &str, production: bool, role: Option<UserRole>) -> GuardDecision {
    if !requires_admin(path, production) {
        return GuardDecision::Pass;
    }

    match role {
        None => GuardDecision::RedirectToLogin,
        Some(role) if role.is_admin() => GuardDecision::Pass,
        Some(_) => GuardDecision::RedirectToHome,
    }
}

/// Axum middleware applying [`decide`] to every request
pub async fn route_guard(
    State(state): State<AppState>,
    jar: CookieJar,
    req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();
    let production = state.config.api.production;

    if !requires_admin(&path, production) {
        return next.run(req).await;
    }

    let token = jar
        .get(AUTH_COOKIE_NAME)
        .map(|cookie| cookie.value().to_string())
        .or_else(|| {
            extract_bearer_token(req.headers())
                .ok()
                .map(str::to_string)
        });

    let role = token.and_then(|token| match validate_token(&token, state.jwt_secret()) {
        Ok(claims) => Some(claims.role),
        Err(e) => {
            tracing::debug!(path = %path, error = %e, "Route guard rejected token");
            None
        }
    });

    match decide(&path, production, role) {
        GuardDecision::Pass => next.run(req).await,
        GuardDecision::RedirectToLogin => {
            tracing::info!(path = %path, "Unauthenticated admin page request");
            Redirect::temporary(ADMIN_LOGIN_PATH).into_response()
        }
        GuardDecision::RedirectToHome => {
            tracing::info!(path = %path, "Non-admin admin page request");
            Redirect::temporary(HOME_PATH).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_paths_pass_without_token() {
        for path in [
            "/api/teams/1/details",
            "/api/auth/login",
            "/health",
            "/_next/static/chunks/main.js",
            "/static/logo.svg",
            "/favicon.ico",
            "/",
            "/login",
            "/register",
        ] {
            assert_eq!(decide(path, true, None), GuardDecision::Pass, "{}", path);
        }
    }

    #[test]
    fn test_admin_pages_in_production() {
        assert_eq!(
            decide("/admin/reports", true, None),
            GuardDecision::RedirectToLogin
        );
        assert_eq!(
            decide("/admin/reports", true, Some(UserRole::Employee)),
            GuardDecision::RedirectToHome
        );
        assert_eq!(
            decide("/admin/reports", true, Some(UserRole::TeamLead)),
            GuardDecision::RedirectToHome
        );
        assert_eq!(
            decide("/admin/reports", true, Some(UserRole::Admin)),
            GuardDecision::Pass
        );
        assert_eq!(decide("/admin", true, None), GuardDecision::RedirectToLogin);
    }

    #[test]
    fn test_dotted_admin_paths_are_guarded() {
        for path in [
            "/admin/users/jane.doe",
            "/admin/reports/2024.q1",
            "/admin/users/a@example.com",
            "/admin/styles.css",
        ] {
            assert_eq!(
                decide(path, true, None),
                GuardDecision::RedirectToLogin,
                "{}",
                path
            );
            assert_eq!(
                decide(path, true, Some(UserRole::Employee)),
                GuardDecision::RedirectToHome,
                "{}",
                path
            );
            assert_eq!(
                decide(path, true, Some(UserRole::Admin)),
                GuardDecision::Pass,
                "{}",
                path
            );
        }
    }

    #[test]
    fn test_admin_login_always_passes() {
        assert_eq!(decide(ADMIN_LOGIN_PATH, true, None), GuardDecision::Pass);
    }

    #[test]
    fn test_development_bypass() {
        assert_eq!(decide("/admin/reports", false, None), GuardDecision::Pass);
        assert_eq!(
            decide("/admin", false, Some(UserRole::Employee)),
            GuardDecision::Pass
        );
    }

    #[test]
    fn test_other_pages_pass() {
        assert_eq!(decide("/dashboard", true, None), GuardDecision::Pass);
        assert_eq!(decide("/administrator", true, None), GuardDecision::Pass);
    }
}
