//! Editorial workflow engine
//!
//! The only subsystem with non-trivial invariants. Split into:
//! - core vocabulary types (`Role`, `WorkflowStatus`, `WorkflowAction`)
//! - a pure permission table (`permissions`)
//! - a pure transition decision function (`machine`)
//! - the transition executor that applies a decision atomically
//!   (`executor`)

pub mod executor;
pub mod machine;
pub mod permissions;

pub use executor::TransitionExecutor;
pub use machine::{decide, Decision, NotificationPlan, TransitionPatch};
pub use permissions::{can_edit, can_manage_users, can_perform, can_view};

use serde::{Deserialize, Serialize};

/// Canonical user roles.
///
/// The single role vocabulary used across the codebase. Legacy
/// spellings (`superadmin`) are accepted when parsing stored strings
/// but never produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Writer,
    Editor,
    Publisher,
    Superuser,
}

impl Role {
    /// Parse a role from its stored string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "writer" => Some(Role::Writer),
            "editor" => Some(Role::Editor),
            "publisher" => Some(Role::Publisher),
            "superuser" => Some(Role::Superuser),
            // legacy spelling kept in old rows
            "superadmin" => Some(Role::Superuser),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Writer => "writer",
            Role::Editor => "editor",
            Role::Publisher => "publisher",
            Role::Superuser => "superuser",
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Editorial state of an article.
///
/// Distinct from public visibility, which is the derived predicate
/// `workflow_status == published`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    Draft,
    InReview,
    Approved,
    Rejected,
    Published,
}

impl WorkflowStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(WorkflowStatus::Draft),
            "in_review" => Some(WorkflowStatus::InReview),
            "approved" => Some(WorkflowStatus::Approved),
            "rejected" => Some(WorkflowStatus::Rejected),
            "published" => Some(WorkflowStatus::Published),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowStatus::Draft => "draft",
            WorkflowStatus::InReview => "in_review",
            WorkflowStatus::Approved => "approved",
            WorkflowStatus::Rejected => "rejected",
            WorkflowStatus::Published => "published",
        }
    }

    /// Check if the status has no outgoing transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkflowStatus::Published)
    }

    /// An author may edit content only in these statuses.
    pub fn is_editable_by_author(&self) -> bool {
        matches!(self, WorkflowStatus::Draft | WorkflowStatus::Rejected)
    }
}

impl From<WorkflowStatus> for String {
    fn from(status: WorkflowStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A workflow action requested by an actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowAction {
    Submit,
    Approve,
    Reject,
    Publish,
}

impl WorkflowAction {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "submit" => Some(WorkflowAction::Submit),
            "approve" => Some(WorkflowAction::Approve),
            "reject" => Some(WorkflowAction::Reject),
            "publish" => Some(WorkflowAction::Publish),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowAction::Submit => "submit",
            WorkflowAction::Approve => "approve",
            WorkflowAction::Reject => "reject",
            WorkflowAction::Publish => "publish",
        }
    }
}

impl std::fmt::Display for WorkflowAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_roundtrip() {
        for role in [Role::Writer, Role::Editor, Role::Publisher, Role::Superuser] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
    }

    #[test]
    fn test_legacy_superadmin_accepted_on_parse_only() {
        assert_eq!(Role::parse("superadmin"), Some(Role::Superuser));
        assert_eq!(Role::Superuser.as_str(), "superuser");
    }

    #[test]
    fn test_unknown_role_rejected() {
        assert_eq!(Role::parse("admin"), None);
        assert_eq!(Role::parse(""), None);
    }

    #[test]
    fn test_status_roundtrip() {
        for status in [
            WorkflowStatus::Draft,
            WorkflowStatus::InReview,
            WorkflowStatus::Approved,
            WorkflowStatus::Rejected,
            WorkflowStatus::Published,
        ] {
            assert_eq!(WorkflowStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(WorkflowStatus::parse("live"), None);
    }

    #[test]
    fn test_terminal_status() {
        assert!(WorkflowStatus::Published.is_terminal());
        assert!(!WorkflowStatus::Rejected.is_terminal());
        assert!(!WorkflowStatus::Approved.is_terminal());
    }

    #[test]
    fn test_author_editable_statuses() {
        assert!(WorkflowStatus::Draft.is_editable_by_author());
        assert!(WorkflowStatus::Rejected.is_editable_by_author());
        assert!(!WorkflowStatus::InReview.is_editable_by_author());
        assert!(!WorkflowStatus::Published.is_editable_by_author());
    }

    #[test]
    fn test_action_roundtrip() {
        for action in [
            WorkflowAction::Submit,
            WorkflowAction::Approve,
            WorkflowAction::Reject,
            WorkflowAction::Publish,
        ] {
            assert_eq!(WorkflowAction::parse(action.as_str()), Some(action));
        }
        assert_eq!(WorkflowAction::parse("archive"), None);
    }
}
