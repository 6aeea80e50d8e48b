//! Workflow transition handlers
//!
//! Thin wrappers: each endpoint maps its payload to a `WorkflowAction`
//! and hands off to the transition executor, so the transition table
//! and permission checks run in exactly one place.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::handlers::articles::ArticleResponse;
use crate::AppState;
use pressroom_common::{
    auth::AuthContext,
    errors::{AppError, Result},
    workflow::WorkflowAction,
};

/// Body for the combined review endpoint
#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    /// `approve` or `reject`
    pub decision: String,

    /// Required (non-blank) when rejecting
    #[serde(default)]
    pub feedback: Option<String>,
}

/// Body for the dedicated reject endpoint
#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    pub reason: String,
}

/// Submit a draft or rejected article for review
pub async fn submit_article(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(article_id): Path<Uuid>,
) -> Result<Json<ArticleResponse>> {
    let article = state
        .executor
        .execute(article_id, WorkflowAction::Submit, &auth, None)
        .await?;

    Ok(Json(article.into()))
}

/// Review an in-review article: approve or reject with feedback
pub async fn review_article(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(article_id): Path<Uuid>,
    Json(request): Json<ReviewRequest>,
) -> Result<Json<ArticleResponse>> {
    let action = match request.decision.as_str() {
        "approve" => WorkflowAction::Approve,
        "reject" => WorkflowAction::Reject,
        other => {
            return Err(AppError::Validation {
                message: format!("Unknown review decision '{}', expected approve or reject", other),
                field: Some("decision".to_string()),
            })
        }
    };

    let article = state
        .executor
        .execute(article_id, action, &auth, request.feedback.as_deref())
        .await?;

    Ok(Json(article.into()))
}

/// Reject an in-review article with a required reason
pub async fn reject_article(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(article_id): Path<Uuid>,
    Json(request): Json<RejectRequest>,
) -> Result<Json<ArticleResponse>> {
    let article = state
        .executor
        .execute(
            article_id,
            WorkflowAction::Reject,
            &auth,
            Some(request.reason.as_str()),
        )
        .await?;

    Ok(Json(article.into()))
}

/// Publish an approved article
pub async fn publish_article(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(article_id): Path<Uuid>,
) -> Result<Json<ArticleResponse>> {
    let article = state
        .executor
        .execute(article_id, WorkflowAction::Publish, &auth, None)
        .await?;

    Ok(Json(article.into()))
}
