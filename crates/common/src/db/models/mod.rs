//! SeaORM entity models
//!
//! Database entities for Pressroom

mod article;
mod notification;
mod user;

pub use article::{
    ActiveModel as ArticleActiveModel,
    Column as ArticleColumn,
    Entity as ArticleEntity,
    Model as Article,
};

pub use notification::{
    ActiveModel as NotificationActiveModel,
    Column as NotificationColumn,
    Entity as NotificationEntity,
    Model as Notification,
};

pub use user::{
    ActiveModel as UserActiveModel,
    Column as UserColumn,
    Entity as UserEntity,
    Model as User,
};
