//! Referral endpoints.
//!
//! - `POST /api/referrals` — create (Doctor)
//! - `GET /api/referrals`, `GET /api/referrals/:id` — read
//! - `PUT /api/referrals/:id/accept|reject|complete` — transitions

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::{Principal, ReferralView};
use crate::referrals::{self, NewReferral};

#[derive(Deserialize)]
pub struct CreateReferralRequest {
    pub patient_id: Uuid,
    pub from_clinic_id: i64,
    pub to_clinic_id: i64,
    pub reason: String,
    pub referring_doctor_id: Uuid,
    pub receiving_doctor_id: Option<Uuid>,
}

#[derive(Serialize)]
pub struct CreateReferralResponse {
    pub referral_id: Uuid,
}

/// `POST /api/referrals` — create a referral. The stored destination is
/// the post-routing one, which may differ from the requested clinic.
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<CreateReferralRequest>,
) -> Result<(StatusCode, Json<CreateReferralResponse>), ApiError> {
    let conn = ctx.db()?;
    let referral = referrals::create_referral(
        &conn,
        &ctx.topology,
        NewReferral {
            patient_id: body.patient_id,
            from_clinic_id: body.from_clinic_id,
            to_clinic_id: body.to_clinic_id,
            reason: body.reason,
            referring_doctor_id: body.referring_doctor_id,
            receiving_doctor_id: body.receiving_doctor_id,
        },
    )?;

    tracing::info!(
        referral = %referral.id,
        by = %principal.id,
        to_clinic = referral.to_clinic_id,
        "referral created"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreateReferralResponse {
            referral_id: referral.id,
        }),
    ))
}

#[derive(Serialize)]
pub struct ReferralsResponse {
    pub referrals: Vec<ReferralView>,
}

/// `GET /api/referrals` — list referrals with display names.
pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<ReferralsResponse>, ApiError> {
    let conn = ctx.db()?;
    let referrals = referrals::list(&conn)?;
    Ok(Json(ReferralsResponse { referrals }))
}

/// `GET /api/referrals/:id`
pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReferralView>, ApiError> {
    let conn = ctx.db()?;
    Ok(Json(referrals::get(&conn, &id)?))
}

#[derive(Deserialize, Default)]
pub struct AcceptRequest {
    pub receiving_doctor_id: Option<Uuid>,
}

/// `PUT /api/referrals/:id/accept`
pub async fn accept(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
    body: Option<Json<AcceptRequest>>,
) -> Result<Json<ReferralView>, ApiError> {
    let receiving = body.and_then(|Json(b)| b.receiving_doctor_id);
    let conn = ctx.db()?;
    Ok(Json(referrals::accept(&conn, &id, receiving.as_ref())?))
}

/// `PUT /api/referrals/:id/reject`
pub async fn reject(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReferralView>, ApiError> {
    let conn = ctx.db()?;
    Ok(Json(referrals::reject(&conn, &id)?))
}

/// `PUT /api/referrals/:id/complete`
pub async fn complete(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReferralView>, ApiError> {
    let conn = ctx.db()?;
    Ok(Json(referrals::complete(&conn, &id)?))
}
