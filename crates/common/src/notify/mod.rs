//! Notification dispatch
//!
//! Persists notification rows as a side effect of workflow
//! transitions. Persistence is the only delivery guarantee; there is
//! no email or push. Dispatch is best-effort: the transition has
//! already committed by the time this runs, so failures are logged
//! and swallowed.

use crate::db::models::Article;
use crate::db::Repository;
use crate::metrics;
use crate::workflow::machine::NotificationPlan;
use crate::workflow::Role;
use uuid::Uuid;

#[derive(Clone)]
pub struct Notifier {
    repo: Repository,
}

impl Notifier {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Dispatch the notifications a transition produced.
    ///
    /// The publisher fan-out goes to every active publisher and
    /// superuser except the actor, one row per recipient,
    /// sequentially.
    pub async fn dispatch(&self, article: &Article, plan: &NotificationPlan, actor_id: Uuid) {
        if let Some(message) = &plan.author_message {
            self.deliver(article.author_id, message, article.id).await;
        }

        if let Some(message) = &plan.publisher_pool_message {
            let pool = match self
                .repo
                .list_active_users_by_roles(&[Role::Publisher, Role::Superuser])
                .await
            {
                Ok(users) => users,
                Err(err) => {
                    tracing::warn!(
                        error = %err,
                        article_id = %article.id,
                        "Failed to resolve publisher pool for notification fan-out"
                    );
                    return;
                }
            };

            for user in pool.into_iter().filter(|u| u.id != actor_id) {
                self.deliver(user.id, message, article.id).await;
            }
        }
    }

    async fn deliver(&self, recipient: Uuid, message: &str, article_id: Uuid) {
        match self
            .repo
            .create_notification(recipient, message.to_string(), Some(article_id))
            .await
        {
            Ok(_) => metrics::record_notification_created(),
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    recipient = %recipient,
                    article_id = %article_id,
                    "Failed to persist notification"
                );
            }
        }
    }
}
