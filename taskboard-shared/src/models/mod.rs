/// Database models for Taskboard
///
/// Each model carries its row type, its creation input and the SQL it needs.
/// Handlers never call these directly; they go through [`crate::store::Store`].
///
/// # Models
///
/// - `user`: Accounts, roles and the sanitized [`user::PublicUser`] projection
/// - `team`: Teams
/// - `team_member`: Team/user membership links
/// - `project`: Projects owned by a team
/// - `task`: Tasks within a project and their status workflow

pub mod project;
pub mod task;
pub mod team;
pub mod team_member;
pub mod user;
