/// Role-based authorization checks
///
/// Authentication says who the caller is; these helpers decide whether that
/// caller may perform an operation. Roles are ordered
/// Admin > TeamLead > Employee.
///
/// # Example
///
/// ```
/// use taskboard_shared::auth::authorization::require_admin;
/// use taskboard_shared::auth::middleware::AuthContext;
/// use taskboard_shared::models::user::UserRole;
///
/// let lead = AuthContext {
///     user_id: 2,
///     email: "lead@example.com".to_string(),
///     role: UserRole::TeamLead,
/// };
/// assert!(require_admin(&lead).is_err());
/// ```

use super::middleware::AuthContext;
use crate::models::user::UserRole;

/// Error type for authorization checks
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    /// Caller is authenticated but lacks the required role
    #[error("Insufficient permissions: requires {required}, has {actual}")]
    InsufficientRole { required: UserRole, actual: UserRole },
}

/// Requires the caller's role to be at least `required`
pub fn require_role(auth: &AuthContext, required: UserRole) -> Result<(), AuthzError> {
    if !auth.role.has_permission(required) {
        tracing::warn!(
            user_id = auth.user_id,
            role = %auth.role,
            required = %required,
            "Authorization denied"
        );
        return Err(AuthzError::InsufficientRole {
            required,
            actual: auth.role,
        });
    }

    Ok(())
}

/// Requires the caller to be an admin
pub fn require_admin(auth: &AuthContext) -> Result<(), AuthzError> {
    require_role(auth, UserRole::Admin)
}
