//! Article entity

use crate::workflow::WorkflowStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "articles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Owning user, set at creation and never changed
    pub author_id: Uuid,

    #[sea_orm(column_type = "Text")]
    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub body: String,

    /// Editorial state, see [`WorkflowStatus`]. Public visibility is
    /// derived from this; there is no second stored flag.
    #[sea_orm(column_type = "Text")]
    pub workflow_status: String,

    /// User who last reviewed, set on approve/reject
    pub reviewer_id: Option<Uuid>,

    /// User who published
    pub publisher_id: Option<Uuid>,

    pub submitted_at: Option<DateTimeWithTimeZone>,

    pub reviewed_at: Option<DateTimeWithTimeZone>,

    pub published_at: Option<DateTimeWithTimeZone>,

    /// Reviewer feedback, set on reject and cleared on resubmission
    #[sea_orm(column_type = "Text", nullable)]
    pub review_feedback: Option<String>,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    /// Get the workflow status as an enum, `None` for unknown strings.
    pub fn status(&self) -> Option<WorkflowStatus> {
        WorkflowStatus::parse(&self.workflow_status)
    }

    /// Publicly visible means published, nothing else.
    pub fn is_publicly_visible(&self) -> bool {
        self.status() == Some(WorkflowStatus::Published)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id"
    )]
    Author,

    #[sea_orm(has_many = "super::notification::Entity")]
    Notifications,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::notification::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Notifications.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::test_support::article_with_status;

    #[test]
    fn test_visibility_is_derived_from_workflow_status() {
        let author = Uuid::new_v4();

        let published = article_with_status(author, WorkflowStatus::Published);
        assert!(published.is_publicly_visible());

        for status in [
            WorkflowStatus::Draft,
            WorkflowStatus::InReview,
            WorkflowStatus::Approved,
            WorkflowStatus::Rejected,
        ] {
            let article = article_with_status(author, status);
            assert!(!article.is_publicly_visible());
        }
    }

    #[test]
    fn test_unknown_status_string() {
        let mut article = article_with_status(Uuid::new_v4(), WorkflowStatus::Draft);
        article.workflow_status = "archived".to_string();
        assert_eq!(article.status(), None);
        assert!(!article.is_publicly_visible());
    }
}
