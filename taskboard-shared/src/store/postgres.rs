/// PostgreSQL-backed store
///
/// Thin layer over the model queries. The only multi-statement operation is
/// the team cascade, which runs in a single transaction:
///
/// ```text
/// BEGIN
///   SELECT ... FROM teams WHERE id = $1 FOR UPDATE
///   SELECT id FROM projects WHERE team_id = $1 FOR UPDATE
///   DELETE FROM tasks WHERE project_id = ANY($2)
///   DELETE FROM projects WHERE team_id = $1
///   DELETE FROM team_members WHERE team_id = $1
///   DELETE FROM teams WHERE id = $1
/// COMMIT            (ROLLBACK on any failure)
/// ```

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use tracing::{debug, error, info};

use super::{CascadeOutcome, CascadeStep, Store, StoreError, StoreResult, TeamDetails};
use crate::db::pool::health_check;
use crate::models::{
    project::Project,
    task::{Task, TaskStatus},
    team::Team,
    team_member::TeamMember,
    user::{CreateUser, PublicUser, User},
};

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn failed_at(step: CascadeStep) -> impl FnOnce(sqlx::Error) -> StoreError {
    move |e| StoreError::CascadeFailed {
        step,
        message: e.to_string(),
    }
}

/// Runs the cascade on an open transaction; the caller commits or rolls back
async fn cascade_in_tx(
    conn: &mut PgConnection,
    team_id: i64,
) -> StoreResult<Option<CascadeOutcome>> {
    if Team::lock_for_update(&mut *conn, team_id).await?.is_none() {
        return Ok(None);
    }

    let project_ids = Project::ids_by_team(&mut *conn, team_id).await?;
    debug!(team_id, projects = project_ids.len(), "Collected team projects");

    let deleted_tasks = Task::delete_by_projects(&mut *conn, &project_ids)
        .await
        .map_err(failed_at(CascadeStep::DeleteTasks))?;

    let deleted_projects = Project::delete_by_team(&mut *conn, team_id)
        .await
        .map_err(failed_at(CascadeStep::DeleteProjects))?;

    let deleted_members = TeamMember::delete_by_team(&mut *conn, team_id)
        .await
        .map_err(failed_at(CascadeStep::DeleteMembers))?;

    let deleted = Team::delete(&mut *conn, team_id)
        .await
        .map_err(failed_at(CascadeStep::DeleteTeam))?;

    if !deleted {
        return Err(StoreError::CascadeFailed {
            step: CascadeStep::DeleteTeam,
            message: "team row disappeared while locked".to_string(),
        });
    }

    Ok(Some(CascadeOutcome {
        deleted_projects,
        deleted_tasks,
        deleted_members,
    }))
}

#[async_trait]
impl Store for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> StoreResult<()> {
        health_check(&self.pool).await?;
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_email(&self.pool, email).await?)
    }

    async fn create_user(&self, data: CreateUser) -> StoreResult<User> {
        match User::create(&self.pool, data).await {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(StoreError::Conflict("Email already exists".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn set_user_approval(&self, user_id: i64, approved: bool) -> StoreResult<Option<User>> {
        Ok(User::set_approved(&self.pool, user_id, approved).await?)
    }

    async fn team_details(&self, team_id: i64) -> StoreResult<Option<TeamDetails>> {
        let Some(team) = Team::find_by_id(&self.pool, team_id).await? else {
            return Ok(None);
        };

        let lead = match team.lead_id {
            Some(lead_id) => User::find_by_id(&self.pool, lead_id)
                .await?
                .map(PublicUser::from),
            None => None,
        };

        let members = TeamMember::list_profiles(&self.pool, team_id).await?;
        let projects = Project::list_by_team(&self.pool, team_id).await?;

        Ok(Some(TeamDetails {
            team,
            lead,
            members,
            projects,
        }))
    }

    async fn delete_team_cascade(&self, team_id: i64) -> StoreResult<Option<CascadeOutcome>> {
        let mut tx = self.pool.begin().await?;

        match cascade_in_tx(&mut *tx, team_id).await {
            Ok(Some(outcome)) => {
                tx.commit().await?;
                info!(
                    team_id,
                    deleted_projects = outcome.deleted_projects,
                    deleted_tasks = outcome.deleted_tasks,
                    deleted_members = outcome.deleted_members,
                    "Team cascade committed"
                );
                Ok(Some(outcome))
            }
            Ok(None) => {
                tx.rollback().await?;
                Ok(None)
            }
            Err(e) => {
                error!(team_id, error = %e, "Team cascade failed, rolling back");
                if let Err(rollback_err) = tx.rollback().await {
                    error!(team_id, error = %rollback_err, "Rollback failed");
                }
                Err(e)
            }
        }
    }

    async fn find_task(&self, task_id: i64) -> StoreResult<Option<Task>> {
        Ok(Task::find_by_id(&self.pool, task_id).await?)
    }

    async fn update_task_status(
        &self,
        task_id: i64,
        status: TaskStatus,
    ) -> StoreResult<Option<Task>> {
        Ok(Task::update_status(&self.pool, task_id, status).await?)
    }
}
