//! Workflow transition executor
//!
//! The single place a workflow action is applied. Every HTTP entry
//! point (submit, review, reject, publish) funnels into
//! [`TransitionExecutor::execute`], so the transition table and the
//! permission checks run in exactly one place, against freshly
//! fetched state rather than anything the client claims.

use crate::auth::AuthContext;
use crate::db::models::Article;
use crate::db::Repository;
use crate::errors::{AppError, Result};
use crate::metrics;
use crate::notify::Notifier;
use crate::workflow::{machine, WorkflowAction};
use chrono::Utc;
use uuid::Uuid;

/// Applies validated workflow transitions.
#[derive(Clone)]
pub struct TransitionExecutor {
    repo: Repository,
    notifier: Notifier,
}

impl TransitionExecutor {
    pub fn new(repo: Repository) -> Self {
        let notifier = Notifier::new(repo.clone());
        Self { repo, notifier }
    }

    /// Execute a workflow action on an article.
    ///
    /// Fetches current state, decides the transition server-side,
    /// applies it with a conditional update guarded on the status the
    /// decision was made against, then dispatches notifications.
    /// A zero-row update means a concurrent transition won the race;
    /// the caller gets a conflict and nothing is double-applied.
    pub async fn execute(
        &self,
        article_id: Uuid,
        action: WorkflowAction,
        actor: &AuthContext,
        feedback: Option<&str>,
    ) -> Result<Article> {
        let article = self
            .repo
            .find_article_by_id(article_id)
            .await?
            .ok_or_else(|| AppError::ArticleNotFound {
                id: article_id.to_string(),
            })?;

        let now = Utc::now();
        let decision =
            match machine::decide(&article, actor.user_id, actor.role, action, feedback, now) {
                Ok(decision) => decision,
                Err(err) => {
                    metrics::record_transition(action, "denied");
                    return Err(err);
                }
            };

        let rows = self.repo.apply_transition(article.id, &decision, now).await?;
        if rows == 0 {
            metrics::record_transition(action, "conflict");
            // Distinguish a lost race from a deleted row.
            return match self.repo.find_article_by_id(article_id).await? {
                Some(_) => Err(AppError::TransitionConflict {
                    id: article_id.to_string(),
                    expected: decision.expected_status.to_string(),
                }),
                None => Err(AppError::ArticleNotFound {
                    id: article_id.to_string(),
                }),
            };
        }

        metrics::record_transition(action, "applied");
        tracing::info!(
            article_id = %article_id,
            action = %action,
            actor_id = %actor.user_id,
            from = %decision.expected_status,
            to = %decision.next_status,
            "Workflow transition applied"
        );

        // The state change is the primary effect; notification failure
        // is logged inside the notifier and never rolls it back.
        self.notifier
            .dispatch(&article, &decision.notifications, actor.user_id)
            .await;

        self.repo
            .find_article_by_id(article_id)
            .await?
            .ok_or_else(|| AppError::ArticleNotFound {
                id: article_id.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthContext;
    use crate::db::models::test_support::{article_with_status, user_with_role};
    use crate::db::models::{Article, Notification};
    use crate::db::DbPool;
    use crate::workflow::{Role, WorkflowStatus};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn actor(role: Role) -> AuthContext {
        AuthContext {
            user_id: Uuid::new_v4(),
            role,
            request_id: "test-req".to_string(),
        }
    }

    fn executor_for(db: MockDatabase) -> TransitionExecutor {
        let pool = DbPool {
            primary: std::sync::Arc::new(db.into_connection()),
            replica: None,
        };
        TransitionExecutor::new(Repository::new(pool))
    }

    fn notification_row(user_id: Uuid, article_id: Uuid) -> Notification {
        Notification {
            id: Uuid::new_v4(),
            user_id,
            article_id: Some(article_id),
            message: "msg".to_string(),
            is_read: false,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_missing_article_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results::<Article, _, _>([vec![]]);

        let executor = executor_for(db);
        let err = executor
            .execute(Uuid::new_v4(), WorkflowAction::Submit, &actor(Role::Superuser), None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ArticleNotFound { .. }));
    }

    #[tokio::test]
    async fn test_denied_transition_writes_nothing() {
        let article = article_with_status(Uuid::new_v4(), WorkflowStatus::Draft);
        let article_id = article.id;

        // only the initial fetch is queued; any write would panic the mock
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![article]]);

        let executor = executor_for(db);
        let err = executor
            .execute(article_id, WorkflowAction::Publish, &actor(Role::Publisher), None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn test_lost_race_surfaces_conflict() {
        let author = Uuid::new_v4();
        let fetched = article_with_status(author, WorkflowStatus::InReview);
        let article_id = fetched.id;

        let mut already_moved = fetched.clone();
        already_moved.workflow_status = WorkflowStatus::Approved.as_str().to_string();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![fetched]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .append_query_results([vec![already_moved]]);

        let executor = executor_for(db);
        let err = executor
            .execute(
                article_id,
                WorkflowAction::Approve,
                &actor(Role::Editor),
                None,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::TransitionConflict { .. }));
    }

    #[tokio::test]
    async fn test_submit_applies_and_returns_updated_article() {
        let author = Uuid::new_v4();
        let fetched = article_with_status(author, WorkflowStatus::Draft);
        let article_id = fetched.id;

        let mut updated = fetched.clone();
        updated.workflow_status = WorkflowStatus::InReview.as_str().to_string();
        updated.submitted_at = Some(Utc::now().into());

        // submit produces no notifications, so the sequence is
        // fetch, guarded update, refetch
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![fetched]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .append_query_results([vec![updated]]);

        let executor = executor_for(db);
        let mut submitting = actor(Role::Writer);
        submitting.user_id = author;

        let result = executor
            .execute(article_id, WorkflowAction::Submit, &submitting, None)
            .await
            .unwrap();

        assert_eq!(result.status(), Some(WorkflowStatus::InReview));
        assert!(result.submitted_at.is_some());
    }

    #[tokio::test]
    async fn test_approve_fans_out_and_survives_notification_failure() {
        let author = Uuid::new_v4();
        let editor = actor(Role::Editor);
        let fetched = article_with_status(author, WorkflowStatus::InReview);
        let article_id = fetched.id;

        let mut updated = fetched.clone();
        updated.workflow_status = WorkflowStatus::Approved.as_str().to_string();
        updated.reviewer_id = Some(editor.user_id);
        updated.reviewed_at = Some(Utc::now().into());

        let publisher_a = user_with_role(Role::Publisher);
        let publisher_b = user_with_role(Role::Publisher);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // fetch
            .append_query_results([vec![fetched]])
            // guarded update
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            // author notification insert
            .append_query_results([vec![notification_row(author, article_id)]])
            // publisher pool lookup
            .append_query_results([vec![publisher_a.clone(), publisher_b.clone()]])
            // one insert per publisher; the second fails and must not
            // fail the transition
            .append_query_results([vec![notification_row(publisher_a.id, article_id)]])
            .append_query_errors([sea_orm::DbErr::Custom("insert failed".to_string())])
            // refetch
            .append_query_results([vec![updated]]);

        let executor = executor_for(db);
        let result = executor
            .execute(article_id, WorkflowAction::Approve, &editor, None)
            .await
            .unwrap();

        assert_eq!(result.status(), Some(WorkflowStatus::Approved));
        assert_eq!(result.reviewer_id, Some(editor.user_id));
    }

    #[tokio::test]
    async fn test_approve_fan_out_excludes_the_actor() {
        let author = Uuid::new_v4();
        let acting_user = user_with_role(Role::Superuser);
        let mut approving = actor(Role::Superuser);
        approving.user_id = acting_user.id;

        let fetched = article_with_status(author, WorkflowStatus::InReview);
        let article_id = fetched.id;

        let mut updated = fetched.clone();
        updated.workflow_status = WorkflowStatus::Approved.as_str().to_string();

        let other_publisher = user_with_role(Role::Publisher);

        // the pool lookup returns the actor too; only the other member
        // gets a row, so exactly one pool insert is queued
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![fetched]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .append_query_results([vec![notification_row(author, article_id)]])
            .append_query_results([vec![acting_user, other_publisher.clone()]])
            .append_query_results([vec![notification_row(other_publisher.id, article_id)]])
            .append_query_results([vec![updated]]);

        let executor = executor_for(db);
        let result = executor
            .execute(article_id, WorkflowAction::Approve, &approving, None)
            .await
            .unwrap();

        assert_eq!(result.status(), Some(WorkflowStatus::Approved));
    }
}
