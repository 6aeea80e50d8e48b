//! Article management handlers
//!
//! Plain CRUD around the workflow core. Content edits are only allowed
//! to the author while the article is draft or rejected; everything
//! status-related goes through the workflow handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::AppState;
use pressroom_common::{
    auth::AuthContext,
    db::models::Article,
    errors::{AppError, Result},
    workflow::{permissions, Role},
};

/// Request to create a new article
#[derive(Debug, Deserialize, Validate)]
pub struct CreateArticleRequest {
    #[validate(length(min = 1, max = 300))]
    pub title: String,

    #[validate(length(min = 1))]
    pub body: String,
}

/// Request to update an article's content
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateArticleRequest {
    #[validate(length(min = 1, max = 300))]
    pub title: Option<String>,

    #[validate(length(min = 1))]
    pub body: Option<String>,
}

/// API representation of an article
#[derive(Debug, Serialize)]
pub struct ArticleResponse {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub body: String,
    pub workflow_status: String,
    pub is_publicly_visible: bool,
    pub reviewer_id: Option<Uuid>,
    pub publisher_id: Option<Uuid>,
    pub submitted_at: Option<String>,
    pub reviewed_at: Option<String>,
    pub published_at: Option<String>,
    pub review_feedback: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Article> for ArticleResponse {
    fn from(article: Article) -> Self {
        Self {
            id: article.id,
            author_id: article.author_id,
            is_publicly_visible: article.is_publicly_visible(),
            title: article.title,
            body: article.body,
            workflow_status: article.workflow_status,
            reviewer_id: article.reviewer_id,
            publisher_id: article.publisher_id,
            submitted_at: article.submitted_at.map(|dt| dt.to_rfc3339()),
            reviewed_at: article.reviewed_at.map(|dt| dt.to_rfc3339()),
            published_at: article.published_at.map(|dt| dt.to_rfc3339()),
            review_feedback: article.review_feedback,
            created_at: article.created_at.to_rfc3339(),
            updated_at: article.updated_at.to_rfc3339(),
        }
    }
}

/// Create a new article in draft, owned by the actor
pub async fn create_article(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(request): Json<CreateArticleRequest>,
) -> Result<(StatusCode, Json<ArticleResponse>)> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let article = state
        .repo
        .create_article(auth.user_id, request.title, request.body)
        .await?;

    tracing::info!(
        article_id = %article.id,
        author_id = %auth.user_id,
        "Article created"
    );

    Ok((StatusCode::CREATED, Json(article.into())))
}

/// List the articles visible to the actor
pub async fn list_articles(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<Vec<ArticleResponse>>> {
    let articles = match auth.role {
        Role::Writer => state.repo.list_articles_for_writer(auth.user_id).await?,
        Role::Editor | Role::Publisher | Role::Superuser => state.repo.list_articles().await?,
    };

    Ok(Json(articles.into_iter().map(Into::into).collect()))
}

/// Get a single article
pub async fn get_article(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(article_id): Path<Uuid>,
) -> Result<Json<ArticleResponse>> {
    let article = state
        .repo
        .find_article_by_id(article_id)
        .await?
        .ok_or_else(|| AppError::ArticleNotFound {
            id: article_id.to_string(),
        })?;

    if !permissions::can_view(auth.role, auth.user_id, &article) {
        return Err(AppError::PermissionDenied {
            message: "You may not view this article".to_string(),
        });
    }

    Ok(Json(article.into()))
}

/// Update an article's content
pub async fn update_article(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(article_id): Path<Uuid>,
    Json(request): Json<UpdateArticleRequest>,
) -> Result<Json<ArticleResponse>> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let article = state
        .repo
        .find_article_by_id(article_id)
        .await?
        .ok_or_else(|| AppError::ArticleNotFound {
            id: article_id.to_string(),
        })?;

    if !permissions::can_edit(auth.role, auth.user_id, &article) {
        return Err(AppError::PermissionDenied {
            message: "Articles are editable by their author only while draft or rejected"
                .to_string(),
        });
    }

    let updated = state
        .repo
        .update_article_content(article_id, request.title, request.body)
        .await?;

    Ok(Json(updated.into()))
}
