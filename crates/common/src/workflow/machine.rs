//! Pure transition decision logic
//!
//! Given the article's current status, the actor, and the requested
//! action, decide allow/deny and produce the resulting patch plus the
//! notifications to send. No I/O happens here; the executor applies
//! the decision.

use crate::db::models::Article;
use crate::errors::{AppError, Result};
use crate::workflow::{permissions, Role, WorkflowAction, WorkflowStatus};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// The exact set of columns a transition writes.
///
/// `None` means "leave the column untouched". `review_feedback` uses a
/// nested option so a transition can explicitly clear it
/// (`Some(None)`), as resubmission does with stale feedback.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransitionPatch {
    pub submitted_at: Option<DateTime<Utc>>,
    pub reviewer_id: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub review_feedback: Option<Option<String>>,
    pub publisher_id: Option<Uuid>,
    pub published_at: Option<DateTime<Utc>>,
}

/// Notifications a transition produces.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NotificationPlan {
    /// Message for the article's author, if any.
    pub author_message: Option<String>,

    /// Fan-out message for every publisher/superuser user except the
    /// actor, if any.
    pub publisher_pool_message: Option<String>,
}

impl NotificationPlan {
    pub fn is_empty(&self) -> bool {
        self.author_message.is_none() && self.publisher_pool_message.is_none()
    }
}

/// A validated transition: the state to move from/to, the columns to
/// write, and the notifications to dispatch afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    /// Status the article must still be in when the write lands.
    pub expected_status: WorkflowStatus,
    pub next_status: WorkflowStatus,
    pub patch: TransitionPatch,
    pub notifications: NotificationPlan,
}

/// Look up the transition table edge for (status, action).
///
/// The table is total by exclusion: every pair not listed is an
/// explicit reject, never a default-allow.
fn table_edge(status: WorkflowStatus, action: WorkflowAction) -> Option<WorkflowStatus> {
    match (status, action) {
        (WorkflowStatus::Draft, WorkflowAction::Submit) => Some(WorkflowStatus::InReview),
        (WorkflowStatus::Rejected, WorkflowAction::Submit) => Some(WorkflowStatus::InReview),
        (WorkflowStatus::InReview, WorkflowAction::Approve) => Some(WorkflowStatus::Approved),
        (WorkflowStatus::InReview, WorkflowAction::Reject) => Some(WorkflowStatus::Rejected),
        (WorkflowStatus::Approved, WorkflowAction::Publish) => Some(WorkflowStatus::Published),
        _ => None,
    }
}

/// Decide a requested transition.
///
/// Check order: transition table first (`InvalidTransition`), then
/// role/ownership (`PermissionDenied`), then payload validation
/// (`Validation` for a blank reject reason).
pub fn decide(
    article: &Article,
    actor_id: Uuid,
    actor_role: Role,
    action: WorkflowAction,
    feedback: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Decision> {
    let status = article.status().ok_or_else(|| AppError::Internal {
        message: format!(
            "Article {} has unknown workflow status '{}'",
            article.id, article.workflow_status
        ),
    })?;

    let next_status = table_edge(status, action).ok_or_else(|| AppError::InvalidTransition {
        action: action.to_string(),
        status: status.to_string(),
    })?;

    if !permissions::can_perform(actor_role, actor_id, action, article) {
        return Err(AppError::PermissionDenied {
            message: format!("Role '{}' may not {} this article", actor_role, action),
        });
    }

    let mut patch = TransitionPatch::default();
    let mut notifications = NotificationPlan::default();

    match action {
        WorkflowAction::Submit => {
            patch.submitted_at = Some(now);
            // stale feedback from a previous rejection must not follow
            // the article back into review
            if status == WorkflowStatus::Rejected || article.review_feedback.is_some() {
                patch.review_feedback = Some(None);
            }
        }
        WorkflowAction::Approve => {
            patch.reviewer_id = Some(actor_id);
            patch.reviewed_at = Some(now);
            notifications.author_message =
                Some(format!("Your article \"{}\" was approved", article.title));
            notifications.publisher_pool_message = Some(format!(
                "Article \"{}\" was approved and is ready to publish",
                article.title
            ));
        }
        WorkflowAction::Reject => {
            let reason = feedback.map(str::trim).unwrap_or("");
            if reason.is_empty() {
                return Err(AppError::Validation {
                    message: "A non-empty reason is required to reject an article".to_string(),
                    field: Some("reason".to_string()),
                });
            }
            patch.reviewer_id = Some(actor_id);
            patch.reviewed_at = Some(now);
            patch.review_feedback = Some(Some(reason.to_string()));
            notifications.author_message = Some(format!(
                "Your article \"{}\" was rejected: {}",
                article.title, reason
            ));
        }
        WorkflowAction::Publish => {
            patch.publisher_id = Some(actor_id);
            patch.published_at = Some(now);
            notifications.author_message =
                Some(format!("Your article \"{}\" has been published", article.title));
        }
    }

    Ok(Decision {
        expected_status: status,
        next_status,
        patch,
        notifications,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::test_support::article_with_status;

    const ALL_STATUSES: [WorkflowStatus; 5] = [
        WorkflowStatus::Draft,
        WorkflowStatus::InReview,
        WorkflowStatus::Approved,
        WorkflowStatus::Rejected,
        WorkflowStatus::Published,
    ];

    const ALL_ACTIONS: [WorkflowAction; 4] = [
        WorkflowAction::Submit,
        WorkflowAction::Approve,
        WorkflowAction::Reject,
        WorkflowAction::Publish,
    ];

    #[test]
    fn test_every_pair_off_the_table_is_invalid() {
        let author = Uuid::new_v4();
        let su = Uuid::new_v4();

        for status in ALL_STATUSES {
            for action in ALL_ACTIONS {
                if table_edge(status, action).is_some() {
                    continue;
                }
                let article = article_with_status(author, status);
                // superuser passes every permission check, so the only
                // possible rejection is the table itself
                let err = decide(&article, su, Role::Superuser, action, Some("reason"), Utc::now())
                    .unwrap_err();
                assert!(
                    matches!(err, AppError::InvalidTransition { .. }),
                    "expected InvalidTransition for ({status}, {action})"
                );
            }
        }
    }

    #[test]
    fn test_table_has_exactly_five_edges() {
        let mut edges = 0;
        for status in ALL_STATUSES {
            for action in ALL_ACTIONS {
                if table_edge(status, action).is_some() {
                    edges += 1;
                }
            }
        }
        assert_eq!(edges, 5);
    }

    #[test]
    fn test_published_has_no_outgoing_edges() {
        for action in ALL_ACTIONS {
            assert_eq!(table_edge(WorkflowStatus::Published, action), None);
        }
    }

    #[test]
    fn test_submit_sets_only_submitted_at() {
        let author = Uuid::new_v4();
        let article = article_with_status(author, WorkflowStatus::Draft);
        let now = Utc::now();

        let decision = decide(&article, author, Role::Writer, WorkflowAction::Submit, None, now)
            .expect("submit should be allowed");

        assert_eq!(decision.expected_status, WorkflowStatus::Draft);
        assert_eq!(decision.next_status, WorkflowStatus::InReview);
        assert_eq!(decision.patch.submitted_at, Some(now));
        assert_eq!(decision.patch.reviewer_id, None);
        assert_eq!(decision.patch.reviewed_at, None);
        assert_eq!(decision.patch.publisher_id, None);
        assert_eq!(decision.patch.published_at, None);
        assert_eq!(decision.patch.review_feedback, None);
        assert!(decision.notifications.is_empty());
    }

    #[test]
    fn test_resubmission_clears_stale_feedback() {
        let author = Uuid::new_v4();
        let mut article = article_with_status(author, WorkflowStatus::Rejected);
        article.review_feedback = Some("needs sources".to_string());

        let decision = decide(
            &article,
            author,
            Role::Writer,
            WorkflowAction::Submit,
            None,
            Utc::now(),
        )
        .unwrap();

        assert_eq!(decision.patch.review_feedback, Some(None));
        assert!(decision.patch.submitted_at.is_some());
    }

    #[test]
    fn test_approve_sets_reviewer_and_notifies() {
        let author = Uuid::new_v4();
        let editor = Uuid::new_v4();
        let article = article_with_status(author, WorkflowStatus::InReview);
        let now = Utc::now();

        let decision = decide(&article, editor, Role::Editor, WorkflowAction::Approve, None, now)
            .unwrap();

        assert_eq!(decision.next_status, WorkflowStatus::Approved);
        assert_eq!(decision.patch.reviewer_id, Some(editor));
        assert_eq!(decision.patch.reviewed_at, Some(now));
        assert_eq!(decision.patch.submitted_at, None);
        assert_eq!(decision.patch.publisher_id, None);
        assert_eq!(decision.patch.published_at, None);
        assert!(decision.notifications.author_message.is_some());
        assert!(decision.notifications.publisher_pool_message.is_some());
    }

    #[test]
    fn test_reject_requires_non_blank_reason() {
        let author = Uuid::new_v4();
        let editor = Uuid::new_v4();
        let article = article_with_status(author, WorkflowStatus::InReview);

        for reason in [None, Some(""), Some("   "), Some("\t\n")] {
            let err = decide(&article, editor, Role::Editor, WorkflowAction::Reject, reason, Utc::now())
                .unwrap_err();
            assert!(
                matches!(err, AppError::Validation { .. }),
                "expected Validation for reason {reason:?}"
            );
        }
    }

    #[test]
    fn test_reject_trims_and_stores_reason() {
        let author = Uuid::new_v4();
        let editor = Uuid::new_v4();
        let article = article_with_status(author, WorkflowStatus::InReview);
        let now = Utc::now();

        let decision = decide(
            &article,
            editor,
            Role::Editor,
            WorkflowAction::Reject,
            Some("  too thin  "),
            now,
        )
        .unwrap();

        assert_eq!(decision.next_status, WorkflowStatus::Rejected);
        assert_eq!(decision.patch.reviewer_id, Some(editor));
        assert_eq!(decision.patch.reviewed_at, Some(now));
        assert_eq!(
            decision.patch.review_feedback,
            Some(Some("too thin".to_string()))
        );
        assert!(decision.notifications.author_message.is_some());
        assert!(decision.notifications.publisher_pool_message.is_none());
    }

    #[test]
    fn test_publish_sets_publisher_and_notifies_author_only() {
        let author = Uuid::new_v4();
        let publisher = Uuid::new_v4();
        let article = article_with_status(author, WorkflowStatus::Approved);
        let now = Utc::now();

        let decision = decide(
            &article,
            publisher,
            Role::Publisher,
            WorkflowAction::Publish,
            None,
            now,
        )
        .unwrap();

        assert_eq!(decision.next_status, WorkflowStatus::Published);
        assert_eq!(decision.patch.publisher_id, Some(publisher));
        assert_eq!(decision.patch.published_at, Some(now));
        assert_eq!(decision.patch.reviewer_id, None);
        assert_eq!(decision.patch.submitted_at, None);
        assert!(decision.notifications.author_message.is_some());
        assert!(decision.notifications.publisher_pool_message.is_none());
    }

    #[test]
    fn test_non_author_submit_is_permission_denied_not_invalid() {
        let author = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let article = article_with_status(author, WorkflowStatus::Draft);

        let err = decide(&article, stranger, Role::Writer, WorkflowAction::Submit, None, Utc::now())
            .unwrap_err();
        assert!(matches!(err, AppError::PermissionDenied { .. }));
    }

    #[test]
    fn test_writer_cannot_approve_even_in_review() {
        let author = Uuid::new_v4();
        let article = article_with_status(author, WorkflowStatus::InReview);

        let err = decide(&article, author, Role::Writer, WorkflowAction::Approve, None, Utc::now())
            .unwrap_err();
        assert!(matches!(err, AppError::PermissionDenied { .. }));
    }

    #[test]
    fn test_superuser_performs_every_table_edge() {
        let author = Uuid::new_v4();
        let su = Uuid::new_v4();

        for (status, action) in [
            (WorkflowStatus::Draft, WorkflowAction::Submit),
            (WorkflowStatus::Rejected, WorkflowAction::Submit),
            (WorkflowStatus::InReview, WorkflowAction::Approve),
            (WorkflowStatus::InReview, WorkflowAction::Reject),
            (WorkflowStatus::Approved, WorkflowAction::Publish),
        ] {
            let article = article_with_status(author, status);
            let decision = decide(&article, su, Role::Superuser, action, Some("reason"), Utc::now());
            assert!(decision.is_ok(), "superuser blocked on ({status}, {action})");
        }
    }

    #[test]
    fn test_invalid_transition_wins_over_permission() {
        // a stranger approving a draft hits the table check first
        let article = article_with_status(Uuid::new_v4(), WorkflowStatus::Draft);
        let err = decide(
            &article,
            Uuid::new_v4(),
            Role::Writer,
            WorkflowAction::Approve,
            None,
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition { .. }));
    }

    #[test]
    fn test_unknown_stored_status_is_internal_error() {
        let mut article = article_with_status(Uuid::new_v4(), WorkflowStatus::Draft);
        article.workflow_status = "limbo".to_string();

        let err = decide(
            &article,
            Uuid::new_v4(),
            Role::Superuser,
            WorkflowAction::Submit,
            None,
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Internal { .. }));
    }
}
