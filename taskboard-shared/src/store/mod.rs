/// Persistence seam for the API server
///
/// Handlers talk to a `dyn Store` rather than a pool so the same request
/// flows run against PostgreSQL in production and against an in-memory
/// implementation in tests.
///
/// # Implementations
///
/// - [`postgres::PgStore`]: sqlx over a `PgPool`; the cascade runs in one
///   transaction with the team row locked
/// - [`memory::MemoryStore`]: tables behind a `RwLock`, with fault injection
///   for the cascade steps
///
/// # Cascade contract
///
/// ```text
/// delete_team_cascade(team_id)
///   ├─> team missing            -> Ok(None), nothing changes
///   ├─> delete tasks of the team's projects
///   ├─> delete the team's projects
///   ├─> delete the team's members
///   ├─> delete the team
///   └─> any step fails          -> Err(CascadeFailed), nothing changes
/// ```

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{
    project::Project,
    task::{Task, TaskStatus},
    team::Team,
    team_member::MemberProfile,
    user::{CreateUser, PublicUser, User},
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Store error types
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness constraint was violated
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A cascade step failed; the whole cascade was rolled back
    #[error("Cascade failed while trying to {step}: {message}")]
    CascadeFailed { step: CascadeStep, message: String },

    /// Backend failure outside the cascade
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Store result type alias
pub type StoreResult<T> = Result<T, StoreError>;

/// One deletion step of the team cascade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CascadeStep {
    DeleteTasks,
    DeleteProjects,
    DeleteMembers,
    DeleteTeam,
}

impl CascadeStep {
    /// Steps in execution order; children go before their parents
    pub const ORDER: [CascadeStep; 4] = [
        CascadeStep::DeleteTasks,
        CascadeStep::DeleteProjects,
        CascadeStep::DeleteMembers,
        CascadeStep::DeleteTeam,
    ];
}

impl fmt::Display for CascadeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CascadeStep::DeleteTasks => "delete tasks",
            CascadeStep::DeleteProjects => "delete projects",
            CascadeStep::DeleteMembers => "delete team members",
            CascadeStep::DeleteTeam => "delete team",
        };
        write!(f, "{}", s)
    }
}

/// Row counts removed by a committed cascade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadeOutcome {
    pub deleted_projects: u64,
    pub deleted_tasks: u64,
    pub deleted_members: u64,
}

/// A team with its lead, members and projects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamDetails {
    pub team: Team,

    /// None when the team has no lead or the lead's account is gone
    pub lead: Option<PublicUser>,

    /// Oldest membership first
    pub members: Vec<MemberProfile>,

    /// Most recently updated first
    pub projects: Vec<Project>,
}

/// Persistence operations used by the API server
#[async_trait]
pub trait Store: Send + Sync {
    /// Short backend name, reported by the health endpoint
    fn backend(&self) -> &'static str;

    /// Checks that the backend is reachable
    async fn ping(&self) -> StoreResult<()>;

    /// Looks a user up by email, ignoring case
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Creates a user
    ///
    /// # Errors
    ///
    /// `StoreError::Conflict` if the email is already taken (ignoring case).
    async fn create_user(&self, data: CreateUser) -> StoreResult<User>;

    /// Sets a user's approval flag, None if the user does not exist
    async fn set_user_approval(&self, user_id: i64, approved: bool) -> StoreResult<Option<User>>;

    /// Loads a team with its lead, members and projects, None if absent
    async fn team_details(&self, team_id: i64) -> StoreResult<Option<TeamDetails>>;

    /// Deletes a team and everything hanging off it, all or nothing
    ///
    /// Returns None (and changes nothing) when the team does not exist.
    async fn delete_team_cascade(&self, team_id: i64) -> StoreResult<Option<CascadeOutcome>>;

    async fn find_task(&self, task_id: i64) -> StoreResult<Option<Task>>;

    /// Stores a new task status without checking the workflow
    async fn update_task_status(&self, task_id: i64, status: TaskStatus)
        -> StoreResult<Option<Task>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cascade_order_children_first() {
        assert_eq!(CascadeStep::ORDER[0], CascadeStep::DeleteTasks);
        assert_eq!(CascadeStep::ORDER[3], CascadeStep::DeleteTeam);
    }

    #[test]
    fn test_cascade_failed_message() {
        let err = StoreError::CascadeFailed {
            step: CascadeStep::DeleteMembers,
            message: "connection reset".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Cascade failed while trying to delete team members: connection reset"
        );
    }

    #[test]
    fn test_outcome_wire_format() {
        let outcome = CascadeOutcome {
            deleted_projects: 2,
            deleted_tasks: 3,
            deleted_members: 2,
        };
        let json = serde_json::to_value(outcome).unwrap();
        assert_eq!(json["deletedProjects"], 2);
        assert_eq!(json["deletedTasks"], 3);
        assert_eq!(json["deletedMembers"], 2);
    }
}
