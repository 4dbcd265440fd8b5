/// In-memory store for tests and local experiments
///
/// All tables sit behind one `RwLock`. The team cascade holds the write lock
/// for its whole duration, applies the steps to a working copy and swaps
/// the copy in only after the last step, so a failure leaves the visible
/// state untouched.
///
/// # Fault injection
///
/// [`MemoryStore::fail_cascade_at`] makes the cascade fail right after the
/// chosen step has been applied to the working copy.
///
/// # Example
///
/// ```
/// use taskboard_shared::store::{CascadeStep, MemoryStore, Store};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::new();
/// store.fail_cascade_at(Some(CascadeStep::DeleteMembers)).await;
///
/// // Unknown team: nothing to delete
/// assert!(store.delete_team_cascade(42).await?.is_none());
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use super::{CascadeOutcome, CascadeStep, Store, StoreError, StoreResult, TeamDetails};
use crate::models::{
    project::Project,
    task::{Task, TaskStatus},
    team::Team,
    team_member::{MemberProfile, TeamMember},
    user::{CreateUser, PublicUser, User},
};

/// Every table, keyed by primary key
#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub users: BTreeMap<i64, User>,
    pub teams: BTreeMap<i64, Team>,
    pub members: Vec<TeamMember>,
    pub projects: BTreeMap<i64, Project>,
    pub tasks: BTreeMap<i64, Task>,
}

impl Tables {
    /// Whether any project, task or membership still points at the team
    pub fn references_team(&self, team_id: i64) -> bool {
        let project_ids: Vec<i64> = self
            .projects
            .values()
            .filter(|p| p.team_id == team_id)
            .map(|p| p.id)
            .collect();

        !project_ids.is_empty()
            || self.members.iter().any(|m| m.team_id == team_id)
            || self
                .tasks
                .values()
                .any(|t| project_ids.contains(&t.project_id))
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    cascade_fault: Mutex<Option<CascadeStep>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following cascade fail after `step`; None clears it
    pub async fn fail_cascade_at(&self, step: Option<CascadeStep>) {
        *self.cascade_fault.lock().await = step;
    }

    /// Copy of the current tables
    pub async fn snapshot(&self) -> Tables {
        self.tables.read().await.clone()
    }

    pub async fn insert_user(&self, user: User) {
        self.tables.write().await.users.insert(user.id, user);
    }

    pub async fn insert_team(&self, team: Team) {
        self.tables.write().await.teams.insert(team.id, team);
    }

    pub async fn insert_member(&self, member: TeamMember) {
        self.tables.write().await.members.push(member);
    }

    pub async fn insert_project(&self, project: Project) {
        self.tables.write().await.projects.insert(project.id, project);
    }

    pub async fn insert_task(&self, task: Task) {
        self.tables.write().await.tasks.insert(task.id, task);
    }
}

fn check_fault(fault: Option<CascadeStep>, step: CascadeStep) -> StoreResult<()> {
    if fault == Some(step) {
        return Err(StoreError::CascadeFailed {
            step,
            message: "injected fault".to_string(),
        });
    }
    Ok(())
}

/// Applies the cascade to `work`, returning the counts or the failing step
fn cascade(
    work: &mut Tables,
    team_id: i64,
    fault: Option<CascadeStep>,
) -> StoreResult<CascadeOutcome> {
    let project_ids: Vec<i64> = work
        .projects
        .values()
        .filter(|p| p.team_id == team_id)
        .map(|p| p.id)
        .collect();

    let before = work.tasks.len();
    work.tasks.retain(|_, t| !project_ids.contains(&t.project_id));
    let deleted_tasks = (before - work.tasks.len()) as u64;
    check_fault(fault, CascadeStep::DeleteTasks)?;

    let before = work.projects.len();
    work.projects.retain(|_, p| p.team_id != team_id);
    let deleted_projects = (before - work.projects.len()) as u64;
    check_fault(fault, CascadeStep::DeleteProjects)?;

    let before = work.members.len();
    work.members.retain(|m| m.team_id != team_id);
    let deleted_members = (before - work.members.len()) as u64;
    check_fault(fault, CascadeStep::DeleteMembers)?;

    work.teams.remove(&team_id);
    check_fault(fault, CascadeStep::DeleteTeam)?;

    Ok(CascadeOutcome {
        deleted_projects,
        deleted_tasks,
        deleted_members,
    })
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn create_user(&self, data: CreateUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;

        if tables
            .users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&data.email))
        {
            return Err(StoreError::Conflict("Email already exists".to_string()));
        }

        let id = tables.users.keys().next_back().map_or(1, |max| max + 1);
        let now = Utc::now();
        let user = User {
            id,
            email: data.email,
            password_hash: data.password_hash,
            name: data.name,
            role: data.role,
            is_approved: data.is_approved,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        tables.users.insert(id, user.clone());
        Ok(user)
    }

    async fn set_user_approval(&self, user_id: i64, approved: bool) -> StoreResult<Option<User>> {
        let mut tables = self.tables.write().await;

        Ok(tables.users.get_mut(&user_id).map(|user| {
            user.is_approved = approved;
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn team_details(&self, team_id: i64) -> StoreResult<Option<TeamDetails>> {
        let tables = self.tables.read().await;

        let Some(team) = tables.teams.get(&team_id).cloned() else {
            return Ok(None);
        };

        let lead = team
            .lead_id
            .and_then(|id| tables.users.get(&id))
            .map(PublicUser::from);

        let mut members: Vec<MemberProfile> = tables
            .members
            .iter()
            .filter(|m| m.team_id == team_id)
            .filter_map(|m| {
                tables.users.get(&m.user_id).map(|u| MemberProfile {
                    user_id: u.id,
                    email: u.email.clone(),
                    name: u.name.clone(),
                    role: u.role,
                    joined_at: m.joined_at,
                })
            })
            .collect();
        members.sort_by_key(|m| m.joined_at);

        let mut projects: Vec<Project> = tables
            .projects
            .values()
            .filter(|p| p.team_id == team_id)
            .cloned()
            .collect();
        projects.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));

        Ok(Some(TeamDetails {
            team,
            lead,
            members,
            projects,
        }))
    }

    async fn delete_team_cascade(&self, team_id: i64) -> StoreResult<Option<CascadeOutcome>> {
        let fault = *self.cascade_fault.lock().await;
        let mut tables = self.tables.write().await;

        if !tables.teams.contains_key(&team_id) {
            return Ok(None);
        }

        let mut work = tables.clone();
        match cascade(&mut work, team_id, fault) {
            Ok(outcome) => {
                *tables = work;
                info!(
                    team_id,
                    deleted_projects = outcome.deleted_projects,
                    deleted_tasks = outcome.deleted_tasks,
                    deleted_members = outcome.deleted_members,
                    "Team cascade committed"
                );
                Ok(Some(outcome))
            }
            Err(e) => {
                warn!(team_id, error = %e, "Team cascade failed, discarding changes");
                Err(e)
            }
        }
    }

    async fn find_task(&self, task_id: i64) -> StoreResult<Option<Task>> {
        Ok(self.tables.read().await.tasks.get(&task_id).cloned())
    }

    async fn update_task_status(
        &self,
        task_id: i64,
        status: TaskStatus,
    ) -> StoreResult<Option<Task>> {
        let mut tables = self.tables.write().await;

        Ok(tables.tasks.get_mut(&task_id).map(|task| {
            task.status = status;
            task.updated_at = Utc::now();
            task.clone()
        }))
    }
}
