/// Team model and database operations
///
/// Teams own projects and members. Deleting a team is only ever done through
/// the cascading delete in [`crate::store`], which removes dependents first.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE teams (
///     id BIGSERIAL PRIMARY KEY,
///     name VARCHAR(255) NOT NULL,
///     description TEXT,
///     lead_id BIGINT REFERENCES users(id) ON DELETE SET NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,

    /// Team lead (a user with the `team_lead` or `admin` role)
    pub lead_id: Option<i64>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a team
#[derive(Debug, Clone)]
pub struct CreateTeam {
    pub name: String,
    pub description: Option<String>,
    pub lead_id: Option<i64>,
}

const TEAM_COLUMNS: &str = "id, name, description, lead_id, created_at, updated_at";

impl Team {
    pub async fn create(pool: &PgPool, data: CreateTeam) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO teams (name, description, lead_id) VALUES ($1, $2, $3) \
             RETURNING {TEAM_COLUMNS}"
        );

        sqlx::query_as::<_, Team>(&query)
            .bind(data.name)
            .bind(data.description)
            .bind(data.lead_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {TEAM_COLUMNS} FROM teams WHERE id = $1");

        sqlx::query_as::<_, Team>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Locks the team row for the rest of the enclosing transaction
    ///
    /// Concurrent writers touching the same team block until the transaction
    /// commits or rolls back.
    pub async fn lock_for_update(
        conn: &mut PgConnection,
        id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {TEAM_COLUMNS} FROM teams WHERE id = $1 FOR UPDATE");

        sqlx::query_as::<_, Team>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Deletes the team row itself
    ///
    /// Fails with a foreign key violation if projects or members still
    /// reference the team.
    pub async fn delete(conn: &mut PgConnection, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM teams WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
