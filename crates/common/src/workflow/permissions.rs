//! Static role capability table
//!
//! Pure functions, no I/O. The table is small and static, so it is
//! recomputed on every call rather than cached. Every mutating entry
//! point must consult these checks before touching the database.

use crate::db::models::Article;
use crate::workflow::{Role, WorkflowAction};
use uuid::Uuid;

/// Check whether an actor may request a workflow action on an article.
///
/// Submit is ownership-gated: only the article's author (or a
/// superuser) may submit it, whatever the author's role. Review and
/// publish are role-gated only; any editor may review any in-review
/// article, first to act wins.
pub fn can_perform(role: Role, actor_id: Uuid, action: WorkflowAction, article: &Article) -> bool {
    if role == Role::Superuser {
        return true;
    }

    match action {
        WorkflowAction::Submit => article.author_id == actor_id,
        WorkflowAction::Approve | WorkflowAction::Reject => role == Role::Editor,
        WorkflowAction::Publish => role == Role::Publisher,
    }
}

/// Check whether an actor may edit an article's content.
///
/// Authors own their articles while draft or rejected; once submitted,
/// content is frozen until it comes back. Superusers bypass ownership.
pub fn can_edit(role: Role, actor_id: Uuid, article: &Article) -> bool {
    if role == Role::Superuser {
        return true;
    }

    article.author_id == actor_id
        && article
            .status()
            .is_some_and(|s| s.is_editable_by_author())
}

/// Check whether an actor may view an article.
///
/// Published articles are publicly visible. Unpublished ones are
/// visible to the author and to staff roles that participate in the
/// workflow.
pub fn can_view(role: Role, actor_id: Uuid, article: &Article) -> bool {
    if article.is_publicly_visible() {
        return true;
    }

    match role {
        Role::Superuser | Role::Editor | Role::Publisher => true,
        Role::Writer => article.author_id == actor_id,
    }
}

/// User management is reserved for superusers.
pub fn can_manage_users(role: Role) -> bool {
    role == Role::Superuser
}
