//! Repository pattern for database operations
//!
//! Provides a clean interface for all data access operations with
//! proper error handling. Workflow transitions go through
//! [`Repository::apply_transition`], which performs the guarded
//! conditional update the executor relies on.

use crate::db::models::*;
use crate::db::DbPool;
use crate::errors::{AppError, Result};
use crate::workflow::machine::Decision;
use crate::workflow::{Role, WorkflowStatus};
use chrono::{DateTime, Utc};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

/// Repository for data access operations
#[derive(Clone)]
pub struct Repository {
    pool: DbPool,
}

impl Repository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get the read connection
    fn read_conn(&self) -> &DatabaseConnection {
        self.pool.read()
    }

    /// Get the write connection
    fn write_conn(&self) -> &DatabaseConnection {
        self.pool.write()
    }

    // ========================================================================
    // Health Check
    // ========================================================================

    /// Ping the database
    pub async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }

    // ========================================================================
    // User Operations
    // ========================================================================

    /// Create a new user
    pub async fn create_user(&self, name: String, email: String, role: Role) -> Result<User> {
        if self.find_user_by_email(&email).await?.is_some() {
            return Err(AppError::DuplicateEmail { email });
        }

        let now = Utc::now();

        let user = UserActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            email: Set(email),
            role: Set(role.as_str().to_string()),
            is_active: Set(true),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        user.insert(self.write_conn()).await.map_err(Into::into)
    }

    /// Find user by ID
    pub async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        UserEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Find user by email
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        UserEntity::find()
            .filter(UserColumn::Email.eq(email))
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Change a user's role (superuser-only, enforced at the handler)
    pub async fn update_user_role(&self, id: Uuid, role: Role) -> Result<User> {
        let mut user: UserActiveModel = UserEntity::find_by_id(id)
            .one(self.write_conn())
            .await?
            .ok_or_else(|| AppError::UserNotFound { id: id.to_string() })?
            .into();

        user.role = Set(role.as_str().to_string());
        user.updated_at = Set(Utc::now().into());

        user.update(self.write_conn()).await.map_err(Into::into)
    }

    /// List active users holding any of the given roles.
    ///
    /// Legacy role spellings stored by older deployments are matched
    /// alongside their canonical name.
    pub async fn list_active_users_by_roles(&self, roles: &[Role]) -> Result<Vec<User>> {
        let mut names: Vec<&str> = Vec::with_capacity(roles.len() + 1);
        for role in roles {
            names.push(role.as_str());
            if *role == Role::Superuser {
                names.push("superadmin");
            }
        }

        UserEntity::find()
            .filter(UserColumn::Role.is_in(names))
            .filter(UserColumn::IsActive.eq(true))
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // Article Operations
    // ========================================================================

    /// Create a new article in draft
    pub async fn create_article(
        &self,
        author_id: Uuid,
        title: String,
        body: String,
    ) -> Result<Article> {
        let now = Utc::now();

        let article = ArticleActiveModel {
            id: Set(Uuid::new_v4()),
            author_id: Set(author_id),
            title: Set(title),
            body: Set(body),
            workflow_status: Set(WorkflowStatus::Draft.as_str().to_string()),
            reviewer_id: Set(None),
            publisher_id: Set(None),
            submitted_at: Set(None),
            reviewed_at: Set(None),
            published_at: Set(None),
            review_feedback: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        article.insert(self.write_conn()).await.map_err(Into::into)
    }

    /// Find article by ID
    pub async fn find_article_by_id(&self, id: Uuid) -> Result<Option<Article>> {
        ArticleEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// List every article, newest first (staff view)
    pub async fn list_articles(&self) -> Result<Vec<Article>> {
        ArticleEntity::find()
            .order_by_desc(ArticleColumn::CreatedAt)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// List the articles a writer may see: their own plus everything
    /// published
    pub async fn list_articles_for_writer(&self, author_id: Uuid) -> Result<Vec<Article>> {
        ArticleEntity::find()
            .filter(
                Condition::any()
                    .add(ArticleColumn::AuthorId.eq(author_id))
                    .add(ArticleColumn::WorkflowStatus.eq("published")),
            )
            .order_by_desc(ArticleColumn::CreatedAt)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Update article content (permission-checked at the handler)
    pub async fn update_article_content(
        &self,
        id: Uuid,
        title: Option<String>,
        body: Option<String>,
    ) -> Result<Article> {
        let mut article: ArticleActiveModel = ArticleEntity::find_by_id(id)
            .one(self.write_conn())
            .await?
            .ok_or_else(|| AppError::ArticleNotFound { id: id.to_string() })?
            .into();

        if let Some(title) = title {
            article.title = Set(title);
        }
        if let Some(body) = body {
            article.body = Set(body);
        }
        article.updated_at = Set(Utc::now().into());

        article.update(self.write_conn()).await.map_err(Into::into)
    }

    /// Apply a workflow transition with an atomic conditional update.
    ///
    /// The write is guarded on the status the decision was made
    /// against: `UPDATE articles SET ... WHERE id = :id AND
    /// workflow_status = :expected`. A concurrent transition that
    /// already moved the article makes this a zero-row update, which
    /// the executor surfaces as a conflict instead of double-applying
    /// side effects.
    ///
    /// Returns the number of rows affected (0 or 1).
    pub async fn apply_transition(
        &self,
        article_id: Uuid,
        decision: &Decision,
        now: DateTime<Utc>,
    ) -> Result<u64> {
        let patch = &decision.patch;

        let mut update = ArticleEntity::update_many()
            .col_expr(
                ArticleColumn::WorkflowStatus,
                Expr::value(decision.next_status.as_str()),
            )
            .col_expr(
                ArticleColumn::UpdatedAt,
                Expr::value(DateTimeWithTimeZone::from(now)),
            );

        if let Some(ts) = patch.submitted_at {
            update = update.col_expr(
                ArticleColumn::SubmittedAt,
                Expr::value(Some(DateTimeWithTimeZone::from(ts))),
            );
        }
        if let Some(reviewer) = patch.reviewer_id {
            update = update.col_expr(ArticleColumn::ReviewerId, Expr::value(Some(reviewer)));
        }
        if let Some(ts) = patch.reviewed_at {
            update = update.col_expr(
                ArticleColumn::ReviewedAt,
                Expr::value(Some(DateTimeWithTimeZone::from(ts))),
            );
        }
        if let Some(feedback) = &patch.review_feedback {
            update = update.col_expr(ArticleColumn::ReviewFeedback, Expr::value(feedback.clone()));
        }
        if let Some(publisher) = patch.publisher_id {
            update = update.col_expr(ArticleColumn::PublisherId, Expr::value(Some(publisher)));
        }
        if let Some(ts) = patch.published_at {
            update = update.col_expr(
                ArticleColumn::PublishedAt,
                Expr::value(Some(DateTimeWithTimeZone::from(ts))),
            );
        }

        let result = update
            .filter(ArticleColumn::Id.eq(article_id))
            .filter(ArticleColumn::WorkflowStatus.eq(decision.expected_status.as_str()))
            .exec(self.write_conn())
            .await?;

        Ok(result.rows_affected)
    }

    // ========================================================================
    // Notification Operations
    // ========================================================================

    /// Append a notification row
    pub async fn create_notification(
        &self,
        user_id: Uuid,
        message: String,
        article_id: Option<Uuid>,
    ) -> Result<Notification> {
        let notification = NotificationActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            article_id: Set(article_id),
            message: Set(message),
            is_read: Set(false),
            created_at: Set(Utc::now().into()),
        };

        notification
            .insert(self.write_conn())
            .await
            .map_err(Into::into)
    }

    /// List a recipient's notifications, newest first
    pub async fn list_notifications(&self, user_id: Uuid) -> Result<Vec<Notification>> {
        NotificationEntity::find()
            .filter(NotificationColumn::UserId.eq(user_id))
            .order_by_desc(NotificationColumn::CreatedAt)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Mark a notification read. Idempotent: marking an already-read
    /// notification again is a no-op, not an error. Scoped to the
    /// recipient; other users get a not-found.
    pub async fn mark_notification_read(&self, id: Uuid, user_id: Uuid) -> Result<Notification> {
        let notification = NotificationEntity::find_by_id(id)
            .one(self.write_conn())
            .await?
            .filter(|n| n.user_id == user_id)
            .ok_or_else(|| AppError::NotificationNotFound { id: id.to_string() })?;

        if notification.is_read {
            return Ok(notification);
        }

        let mut active: NotificationActiveModel = notification.into();
        active.is_read = Set(true);

        active.update(self.write_conn()).await.map_err(Into::into)
    }

    /// Mark all of a recipient's unread notifications read. Returns the
    /// number of rows touched.
    pub async fn mark_all_notifications_read(&self, user_id: Uuid) -> Result<u64> {
        let result = NotificationEntity::update_many()
            .col_expr(NotificationColumn::IsRead, Expr::value(true))
            .filter(NotificationColumn::UserId.eq(user_id))
            .filter(NotificationColumn::IsRead.eq(false))
            .exec(self.write_conn())
            .await?;

        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::test_support::user_with_role;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn repo_for(db: MockDatabase) -> Repository {
        Repository::new(DbPool {
            primary: std::sync::Arc::new(db.into_connection()),
            replica: None,
        })
    }

    fn read_notification(user_id: Uuid) -> Notification {
        Notification {
            id: Uuid::new_v4(),
            user_id,
            article_id: None,
            message: "msg".to_string(),
            is_read: true,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_mark_read_twice_is_idempotent() {
        let user_id = Uuid::new_v4();
        let notification = read_notification(user_id);
        let id = notification.id;

        // already read: the call returns without issuing an update
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![notification]]);

        let result = repo_for(db).mark_notification_read(id, user_id).await;
        assert!(result.unwrap().is_read);
    }

    #[tokio::test]
    async fn test_mark_read_is_scoped_to_recipient() {
        let notification = read_notification(Uuid::new_v4());
        let id = notification.id;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![notification]]);

        let err = repo_for(db)
            .mark_notification_read(id, Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotificationNotFound { .. }));
    }

    #[tokio::test]
    async fn test_create_user_rejects_duplicate_email() {
        let existing = user_with_role(Role::Writer);
        let email = existing.email.clone();

        // the pre-check finds the existing row; no insert is attempted
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![existing]]);

        let err = repo_for(db)
            .create_user("Another".to_string(), email, Role::Writer)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateEmail { .. }));
    }
}
