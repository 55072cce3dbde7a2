//! Bearer token authentication middleware.
//!
//! Extracts `Authorization: Bearer <token>`, verifies it, resolves the
//! staff principal, and injects [`Principal`] into request extensions
//! for downstream policy checks and handlers.

use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::auth;
use crate::models::Principal;

/// Require a valid staff bearer token.
///
/// Accesses `ApiContext` from request extensions (injected by Extension
/// layer). On success the non-secret [`Principal`] rides along in the
/// request; authorization failures short-circuit before any handler runs.
pub async fn require_auth(req: Request<axum::body::Body>, next: Next) -> Response {
    match require_auth_inner(req, next).await {
        Ok(resp) => resp,
        Err(err) => err.into_response(),
    }
}

async fn require_auth_inner(
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx: ApiContext = req
        .extensions()
        .get::<ApiContext>()
        .cloned()
        .ok_or(ApiError::Internal("missing API context".into()))?;

    let header = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok());

    let principal: Principal = {
        let conn = ctx.db()?;
        auth::authenticate(&conn, &ctx.codec, header)?
    }; // guard dropped here, before the await below

    tracing::debug!(staff = %principal.id, role = ?principal.role, "request authenticated");
    req.extensions_mut().insert(principal);

    Ok(next.run(req).await)
}
