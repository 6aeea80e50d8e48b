//! Bearer-token authentication middleware
//!
//! Session issuance lives outside this service; requests arrive with a
//! bearer token encoding the actor's identity and role. The middleware
//! validates it and stashes an `AuthContext` in request extensions for
//! the `AuthContext` extractor.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use pressroom_common::{
    auth::extract_bearer_token,
    errors::AppError,
};
use uuid::Uuid;

use crate::AppState;

pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let request_id = request
        .headers()
        .get(state.config.auth.request_id_header.as_str())
        .and_then(|v| v.to_str().ok())
        .map(String::from)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let auth_header = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized {
            message: "Missing Authorization header".to_string(),
        })?;

    let token = extract_bearer_token(auth_header).ok_or_else(|| AppError::Unauthorized {
        message: "Expected a bearer token".to_string(),
    })?;

    let claims = state.jwt.validate_token(token)?;
    let ctx = state.jwt.context_from_claims(&claims, request_id)?;

    request.extensions_mut().insert(ctx);

    Ok(next.run(request).await)
}
