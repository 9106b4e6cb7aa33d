//! Admin access policy.
//!
//! # Invariants
//! - `is_admin` is a pure membership test; it never touches storage or
//!   dialogue state.
//! - An empty admin set disables every admin action.

use crate::model::user::ExternalUserId;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Operation restricted to admins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminAction {
    OpenPanel,
    AddBook,
    ListForEdit,
    EditField,
    DeleteBook,
    ViewStatistics,
}

impl AdminAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OpenPanel => "open_panel",
            Self::AddBook => "add_book",
            Self::ListForEdit => "list_for_edit",
            Self::EditField => "edit_field",
            Self::DeleteBook => "delete_book",
            Self::ViewStatistics => "view_statistics",
        }
    }
}

/// Denied admin action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionDenied {
    pub user: ExternalUserId,
    pub action: AdminAction,
}

impl Display for PermissionDenied {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "user {} is not allowed to {}",
            self.user,
            self.action.as_str()
        )
    }
}

impl Error for PermissionDenied {}

/// Configured set of privileged identities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessPolicy {
    admins: BTreeSet<ExternalUserId>,
}

impl AccessPolicy {
    pub fn new(admins: impl IntoIterator<Item = ExternalUserId>) -> Self {
        Self {
            admins: admins.into_iter().collect(),
        }
    }

    pub fn is_admin(&self, user: ExternalUserId) -> bool {
        self.admins.contains(&user)
    }

    /// Returns `Err` when `user` may not perform `action`.
    pub fn ensure_admin(
        &self,
        user: ExternalUserId,
        action: AdminAction,
    ) -> Result<(), PermissionDenied> {
        if self.is_admin(user) {
            Ok(())
        } else {
            log::warn!(
                "event=access_denied module=access status=denied user={} action={}",
                user,
                action.as_str()
            );
            Err(PermissionDenied { user, action })
        }
    }

    pub fn has_admins(&self) -> bool {
        !self.admins.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{AccessPolicy, AdminAction, PermissionDenied};

    #[test]
    fn membership_decides_admin_status() {
        let policy = AccessPolicy::new([10, 20]);
        assert!(policy.is_admin(10));
        assert!(!policy.is_admin(30));
        assert!(policy.ensure_admin(20, AdminAction::DeleteBook).is_ok());
        assert_eq!(
            policy.ensure_admin(30, AdminAction::AddBook),
            Err(PermissionDenied {
                user: 30,
                action: AdminAction::AddBook
            })
        );
    }

    #[test]
    fn empty_policy_denies_everyone() {
        let policy = AccessPolicy::default();
        assert!(!policy.has_admins());
        assert!(policy.ensure_admin(1, AdminAction::OpenPanel).is_err());
    }
}
