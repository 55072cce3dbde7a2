use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::ReferralStatus;

/// Durable referral record. `to_clinic_id` is the post-routing destination,
/// which may differ from what the referring doctor asked for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Referral {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub from_clinic_id: i64,
    pub to_clinic_id: i64,
    pub reason: String,
    pub referring_doctor_id: Uuid,
    pub receiving_doctor_id: Option<Uuid>,
    pub status: ReferralStatus,
    pub created_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
}

/// Referral joined with display names for presentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferralView {
    #[serde(flatten)]
    pub referral: Referral,
    pub patient_name: String,
    pub from_clinic_name: String,
    pub to_clinic_name: String,
    pub referring_doctor_name: String,
    pub receiving_doctor_name: Option<String>,
}
