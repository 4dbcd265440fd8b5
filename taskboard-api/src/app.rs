/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskboard_api::{app::{build_router, AppState}, config::Config};
/// use taskboard_shared::store::MemoryStore;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::new(Arc::new(MemoryStore::new()), config);
/// let app = build_router(state);
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    error::ApiError,
    middleware::{route_guard::route_guard, security::SecurityHeadersLayer},
    routes,
};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::{from_fn_with_state, Next},
    response::Response,
    routing::{delete, get, patch, post},
    Router,
};
use std::{sync::Arc, time::Duration};
use taskboard_shared::{auth::middleware::authenticate, store::Store};
use tower_http::{
    cors::CorsLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request by Axum's `State` extractor; both fields are
/// reference counted.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,

    /// Read-only after startup
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    /// Secret for signing and verifying tokens
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }

    pub fn production(&self) -> bool {
        self.config.api.production
    }
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.cors_allows_any() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Routes
///
/// ```text
/// /health                          GET     public
/// /api/auth/register               POST    public
/// /api/auth/login                  POST    public
/// /api/auth/logout                 POST    public
/// /api/auth/verify                 POST    token in body
/// /api/auth/verify                 GET     bearer token
/// /api/users/:id/approve           POST    admin
/// /api/teams/:id/details           GET     authenticated
/// /api/teams/:id/cascade           DELETE  admin
/// /api/tasks/:id/status            PATCH   authenticated
/// ```
///
/// # Middleware Stack
///
/// Outermost first: security headers, CORS, tracing, request timeout, route
/// guard. Bearer authentication is applied to the protected group only.
/// The fallback sits inside the stack so the guard sees page paths too.
pub fn build_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/logout", post(routes::auth::logout))
        .route(
            "/verify",
            post(routes::auth::verify_token_body).get(routes::auth::verify_token_header),
        );

    let protected_routes = Router::new()
        .route("/users/:id/approve", post(routes::users::approve_user))
        .route("/teams/:id/details", get(routes::teams::team_details))
        .route("/teams/:id/cascade", delete(routes::teams::delete_team_cascade))
        .route("/tasks/:id/status", patch(routes::tasks::update_task_status))
        .layer(from_fn_with_state(state.clone(), jwt_auth_layer));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .merge(protected_routes);

    let timeout = Duration::from_secs(state.config.api.request_timeout_seconds);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api", api_routes)
        .fallback(routes::not_found)
        .layer(from_fn_with_state(state.clone(), route_guard))
        .layer(TimeoutLayer::new(timeout))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config))
        .layer(SecurityHeadersLayer::new(state.production()))
        .with_state(state)
}

/// Bearer authentication for the protected group
///
/// Verifies the `Authorization: Bearer` token and inserts the caller's
/// `AuthContext` into request extensions.
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth = authenticate(req.headers(), state.jwt_secret())?;

    tracing::debug!(user_id = auth.user_id, role = %auth.role, "Request authenticated");
    req.extensions_mut().insert(auth);

    Ok(next.run(req).await)
}
