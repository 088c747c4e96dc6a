//! Role gate placed in front of every staff-only or mutating operation.

use powerlink_common::{AppError, AppResult};
use powerlink_db::entities::user::{self, Role};

/// Operations that require a particular role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// List, inspect, edit, delete, re-role and (de)activate accounts.
    ManageUsers,
    /// Admin listing and create/update/delete/toggle of announcements.
    ManageAnnouncements,
    /// Create and delete notices.
    ManageNotices,
    /// Read the full service request listing and single requests.
    ViewServiceRequests,
    /// Triage queue, patch, status change, approve and reject.
    TriageServiceRequests,
    /// Advance an outage report's status.
    UpdateOutageStatus,
}

impl Operation {
    /// Roles allowed to perform this operation.
    #[must_use]
    pub const fn allowed_roles(self) -> &'static [Role] {
        match self {
            Self::ManageUsers | Self::ManageAnnouncements | Self::ManageNotices => &[Role::Admin],
            Self::ViewServiceRequests | Self::UpdateOutageStatus => {
                &[Role::Technician, Role::Supervisor, Role::Admin]
            }
            Self::TriageServiceRequests => &[Role::Supervisor, Role::Admin],
        }
    }

    /// Whether `role` may perform this operation.
    #[must_use]
    pub fn permits(self, role: Role) -> bool {
        self.allowed_roles().contains(&role)
    }
}

/// Fail with `Forbidden` unless `user` may perform `op`.
pub fn require_role(user: &user::Model, op: Operation) -> AppResult<()> {
    if op.permits(user.role) {
        Ok(())
    } else {
        tracing::debug!(user_id = %user.id, role = %user.role, operation = ?op, "Role check failed");
        Err(AppError::Forbidden("Insufficient permissions".to_string()))
    }
}

/// Allow `user` to act on their own records, or anyone permitted `op`.
pub fn require_self_or(user: &user::Model, owner_id: &str, op: Operation) -> AppResult<()> {
    if user.id == owner_id {
        Ok(())
    } else {
        require_role(user, op)
    }
}
