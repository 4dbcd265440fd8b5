/// Project model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TYPE project_status AS ENUM ('planning', 'active', 'on_hold', 'completed');
///
/// CREATE TABLE projects (
///     id BIGSERIAL PRIMARY KEY,
///     name VARCHAR(255) NOT NULL,
///     description TEXT,
///     team_id BIGINT NOT NULL REFERENCES teams(id),
///     owner_id BIGINT NOT NULL REFERENCES users(id),
///     status project_status NOT NULL DEFAULT 'planning',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "project_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Planning,
    Active,
    OnHold,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub team_id: i64,
    pub owner_id: i64,
    pub status: ProjectStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateProject {
    pub name: String,
    pub description: Option<String>,
    pub team_id: i64,
    pub owner_id: i64,
    pub status: ProjectStatus,
}

const PROJECT_COLUMNS: &str =
    "id, name, description, team_id, owner_id, status, created_at, updated_at";

impl Project {
    pub async fn create(pool: &PgPool, data: CreateProject) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects (name, description, team_id, owner_id, status) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {PROJECT_COLUMNS}"
        );

        sqlx::query_as::<_, Project>(&query)
            .bind(data.name)
            .bind(data.description)
            .bind(data.team_id)
            .bind(data.owner_id)
            .bind(data.status)
            .fetch_one(pool)
            .await
    }

    /// Lists a team's projects, most recently updated first
    pub async fn list_by_team(pool: &PgPool, team_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE team_id = $1 \
             ORDER BY updated_at DESC, id DESC"
        );

        sqlx::query_as::<_, Project>(&query)
            .bind(team_id)
            .fetch_all(pool)
            .await
    }

    /// Collects the ids of a team's projects inside a transaction
    ///
    /// Rows are locked so no project can be attached to the team while the
    /// cascade is running.
    pub async fn ids_by_team(conn: &mut PgConnection, team_id: i64) -> Result<Vec<i64>, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT id FROM projects WHERE team_id = $1 FOR UPDATE")
            .bind(team_id)
            .fetch_all(conn)
            .await
    }

    pub async fn delete_by_team(conn: &mut PgConnection, team_id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE team_id = $1")
            .bind(team_id)
            .execute(conn)
            .await?;

        Ok(result.rows_affected())
    }
}
