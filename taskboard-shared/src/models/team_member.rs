/// Team membership model and database operations
///
/// Many-to-many link between teams and users.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE team_members (
///     team_id BIGINT NOT NULL REFERENCES teams(id),
///     user_id BIGINT NOT NULL REFERENCES users(id),
///     joined_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (team_id, user_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};

use super::user::UserRole;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub team_id: i64,
    pub user_id: i64,
    pub joined_at: DateTime<Utc>,
}

/// A member joined with the user fields the team details view shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MemberProfile {
    pub user_id: i64,
    pub email: String,
    pub name: Option<String>,
    pub role: UserRole,
    pub joined_at: DateTime<Utc>,
}

impl TeamMember {
    /// Adds a user to a team
    ///
    /// # Errors
    ///
    /// Fails if the membership already exists or either side is missing.
    pub async fn add(pool: &PgPool, team_id: i64, user_id: i64) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, TeamMember>(
            r#"
            INSERT INTO team_members (team_id, user_id)
            VALUES ($1, $2)
            RETURNING team_id, user_id, joined_at
            "#,
        )
        .bind(team_id)
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// Lists members of a team with their user details, oldest first
    pub async fn list_profiles(
        pool: &PgPool,
        team_id: i64,
    ) -> Result<Vec<MemberProfile>, sqlx::Error> {
        sqlx::query_as::<_, MemberProfile>(
            r#"
            SELECT u.id AS user_id, u.email, u.name, u.role, tm.joined_at
            FROM team_members tm
            JOIN users u ON u.id = tm.user_id
            WHERE tm.team_id = $1
            ORDER BY tm.joined_at ASC
            "#,
        )
        .bind(team_id)
        .fetch_all(pool)
        .await
    }

    /// Removes every membership of a team, returning how many rows went away
    pub async fn delete_by_team(conn: &mut PgConnection, team_id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM team_members WHERE team_id = $1")
            .bind(team_id)
            .execute(conn)
            .await?;

        Ok(result.rows_affected())
    }
}
