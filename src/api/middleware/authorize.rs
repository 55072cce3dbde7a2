//! Role/permission policy middleware.
//!
//! Each protected route group carries a [`Policy`] as an `Extension`
//! layer; this middleware evaluates the authenticated principal against
//! it. Routes without a policy layer require authentication only.

use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;
use crate::auth::{self, Policy};
use crate::models::Principal;

pub async fn enforce(req: Request<axum::body::Body>, next: Next) -> Response {
    match enforce_inner(req, next).await {
        Ok(resp) => resp,
        Err(err) => err.into_response(),
    }
}

async fn enforce_inner(
    req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let policy = req
        .extensions()
        .get::<Policy>()
        .cloned()
        .ok_or(ApiError::Internal("missing route policy".into()))?;

    // A policy with no principal means the auth middleware did not run;
    // that is an unauthenticated request, not a server bug.
    let principal = req
        .extensions()
        .get::<Principal>()
        .ok_or(ApiError::Unauthorized)?;

    auth::authorize(principal, &policy)?;
    Ok(next.run(req).await)
}
