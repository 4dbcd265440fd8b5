//! Common test utilities for integration tests
//!
//! Builds the full router over an in-memory store seeded with:
//!
//! ```text
//! users    1 admin, 2 employee, 3 pending (unapproved), 4 inactive, 5 team lead
//! team 42  lead 5, members {5, 2}, projects {1, 2}, tasks {10, 11} -> 1, {12} -> 2
//! team 7   member {2}, project 3, task 13 (must survive team 42's cascade)
//! ```
//!
//! Every seeded account uses [`PASSWORD`].

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use chrono::{Duration, Utc};
use std::sync::{Arc, OnceLock};
use taskboard_api::{
    app::{build_router, AppState},
    config::{ApiConfig, Config, DatabaseConfig, JwtConfig},
};
use taskboard_shared::{
    auth::{
        jwt::{create_token, Claims},
        password::hash_password,
    },
    models::{
        project::{Project, ProjectStatus},
        task::{Task, TaskPriority, TaskStatus},
        team::Team,
        team_member::TeamMember,
        user::{User, UserRole},
    },
    store::MemoryStore,
};
use tower::Service as _;

pub const SECRET: &str = "integration-test-secret-at-least-32-bytes";
pub const PASSWORD: &str = "Str0ngPassword";

pub const ADMIN_ID: i64 = 1;
pub const EMPLOYEE_ID: i64 = 2;
pub const PENDING_ID: i64 = 3;
pub const INACTIVE_ID: i64 = 4;
pub const LEAD_ID: i64 = 5;
pub const TEAM_ID: i64 = 42;
pub const OTHER_TEAM_ID: i64 = 7;

/// Argon2 is slow without optimizations; hash once per test binary
fn password_hash() -> String {
    static HASH: OnceLock<String> = OnceLock::new();
    HASH.get_or_init(|| hash_password(PASSWORD).expect("hash test password"))
        .clone()
}

fn user(id: i64, email: &str, role: UserRole, approved: bool, active: bool) -> User {
    let now = Utc::now();
    User {
        id,
        email: email.to_string(),
        password_hash: password_hash(),
        name: Some(email.split('@').next().unwrap_or_default().to_string()),
        role,
        is_approved: approved,
        is_active: active,
        created_at: now,
        updated_at: now,
    }
}

fn team(id: i64, name: &str, lead_id: Option<i64>) -> Team {
    let now = Utc::now();
    Team {
        id,
        name: name.to_string(),
        description: None,
        lead_id,
        created_at: now,
        updated_at: now,
    }
}

fn project(id: i64, team_id: i64, age_minutes: i64) -> Project {
    let at = Utc::now() - Duration::minutes(age_minutes);
    Project {
        id,
        name: format!("Project {}", id),
        description: None,
        team_id,
        owner_id: LEAD_ID,
        status: ProjectStatus::Active,
        created_at: at,
        updated_at: at,
    }
}

fn task(id: i64, project_id: i64) -> Task {
    let now = Utc::now();
    Task {
        id,
        title: format!("Task {}", id),
        description: None,
        project_id,
        assignee_id: Some(EMPLOYEE_ID),
        status: TaskStatus::Todo,
        priority: TaskPriority::Medium,
        due_date: None,
        created_at: now,
        updated_at: now,
    }
}

fn member(team_id: i64, user_id: i64, age_minutes: i64) -> TeamMember {
    TeamMember {
        team_id,
        user_id,
        joined_at: Utc::now() - Duration::minutes(age_minutes),
    }
}

pub fn test_config(production: bool) -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            production,
            cors_origins: vec!["*".to_string()],
            request_timeout_seconds: 30,
        },
        database: DatabaseConfig {
            url: "postgresql://unused".to_string(),
            max_connections: 1,
        },
        jwt: JwtConfig {
            secret: SECRET.to_string(),
        },
    }
}

/// Test context containing the router and its backing store
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub app: Router,
}

impl TestContext {
    /// Development environment (admin pages unguarded, no Secure cookie)
    pub async fn new() -> Self {
        Self::build(false).await
    }

    /// Production environment
    pub async fn production() -> Self {
        Self::build(true).await
    }

    async fn build(production: bool) -> Self {
        let store = Arc::new(MemoryStore::new());

        store.insert_user(user(ADMIN_ID, "admin@example.com", UserRole::Admin, true, true)).await;
        store.insert_user(user(EMPLOYEE_ID, "dev@example.com", UserRole::Employee, true, true)).await;
        store.insert_user(user(PENDING_ID, "pending@example.com", UserRole::Employee, false, true)).await;
        store.insert_user(user(INACTIVE_ID, "inactive@example.com", UserRole::Employee, true, false)).await;
        store.insert_user(user(LEAD_ID, "lead@example.com", UserRole::TeamLead, true, true)).await;

        store.insert_team(team(TEAM_ID, "Platform", Some(LEAD_ID))).await;
        store.insert_team(team(OTHER_TEAM_ID, "Support", None)).await;

        store.insert_member(member(TEAM_ID, LEAD_ID, 60)).await;
        store.insert_member(member(TEAM_ID, EMPLOYEE_ID, 30)).await;
        store.insert_member(member(OTHER_TEAM_ID, EMPLOYEE_ID, 10)).await;

        store.insert_project(project(1, TEAM_ID, 120)).await;
        store.insert_project(project(2, TEAM_ID, 5)).await;
        store.insert_project(project(3, OTHER_TEAM_ID, 5)).await;

        store.insert_task(task(10, 1)).await;
        store.insert_task(task(11, 1)).await;
        store.insert_task(task(12, 2)).await;
        store.insert_task(task(13, 3)).await;

        let state = AppState::new(store.clone(), test_config(production));
        let app = build_router(state);

        Self { store, app }
    }

    /// Signs a 7-day token for a seeded user
    pub fn token(&self, user_id: i64, email: &str, role: UserRole) -> String {
        create_token(&Claims::new(user_id, email, role), SECRET).expect("create token")
    }

    pub fn admin_token(&self) -> String {
        self.token(ADMIN_ID, "admin@example.com", UserRole::Admin)
    }

    pub fn employee_token(&self) -> String {
        self.token(EMPLOYEE_ID, "dev@example.com", UserRole::Employee)
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app
            .clone()
            .call(request)
            .await
            .expect("router is infallible")
    }
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn authed_request(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, bearer(token))
        .body(Body::empty())
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8_lossy(&bytes).into_owned()
}
