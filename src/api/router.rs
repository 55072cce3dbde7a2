//! API router.
//!
//! Middleware stack (outermost → innermost):
//! 1. ApiContext extension → 2. Bearer auth → 3. Per-group role policy
//!
//! Every protected route authenticates first; role policies ride on the
//! route groups as `Extension<Policy>` layers read by the authorize
//! middleware. `/auth/login` is the only unauthenticated route.

use axum::routing::{get, post, put};
use axum::{Extension, Router};

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::auth::Policy;
use crate::models::Role;

pub fn api_router(ctx: ApiContext) -> Router {
    // Creation and completion are the referring/receiving doctor's acts.
    let doctor_routes = Router::new()
        .route("/referrals", post(endpoints::referrals::create))
        .route(
            "/referrals/:id/complete",
            put(endpoints::referrals::complete),
        )
        .route_layer(axum::middleware::from_fn(middleware::authorize::enforce))
        .route_layer(Extension(Policy::Role(Role::Doctor)));

    let reader_routes = Router::new()
        .route("/referrals", get(endpoints::referrals::list))
        .route("/referrals/:id", get(endpoints::referrals::detail))
        .route_layer(axum::middleware::from_fn(middleware::authorize::enforce))
        .route_layer(Extension(Policy::AnyOf(vec![
            Role::Admin,
            Role::HealthAdmin,
            Role::Doctor,
            Role::Nurse,
        ])));

    let triage_routes = Router::new()
        .route("/referrals/:id/accept", put(endpoints::referrals::accept))
        .route("/referrals/:id/reject", put(endpoints::referrals::reject))
        .route_layer(axum::middleware::from_fn(middleware::authorize::enforce))
        .route_layer(Extension(Policy::AnyOf(vec![
            Role::Doctor,
            Role::ClinicManager,
        ])));

    // Authentication alone suffices — no policy layer.
    let authenticated = Router::new().route("/health", get(endpoints::health::check));

    let protected = Router::new()
        .merge(doctor_routes)
        .merge(reader_routes)
        .merge(triage_routes)
        .merge(authenticated)
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::auth::require_auth))
        // Extension must be outermost so the auth middleware can see it
        .layer(Extension(ctx.clone()));

    let unprotected = Router::new()
        .route("/auth/login", post(endpoints::auth::login))
        .with_state(ctx);

    Router::new()
        .nest("/api", protected)
        .nest("/api", unprotected)
}
