//! `POST /api/auth/login` — exchange staff credentials for a bearer token.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::auth::password::verify_password;
use crate::db::repository::staff::find_staff_by_email;
use crate::models::Principal;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub principal: Principal,
}

/// Unknown email and wrong password produce the same 401; the response
/// never reveals which half failed.
pub async fn login(
    State(ctx): State<ApiContext>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let staff = {
        let conn = ctx.db()?;
        find_staff_by_email(&conn, &body.email)?
    };

    let staff = staff.ok_or(ApiError::Unauthorized)?;
    if !verify_password(&body.password, &staff.password_hash) {
        tracing::warn!(email = %body.email, "failed login attempt");
        return Err(ApiError::Unauthorized);
    }

    let token = ctx
        .codec
        .sign(&staff.id, staff.role)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(LoginResponse {
        token,
        principal: staff.principal(),
    }))
}
