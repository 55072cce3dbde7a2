use serde::{Deserialize, Serialize};

use super::enums::{ActiveStatus, ClinicType};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clinic {
    pub id: i64,
    pub campus_id: i64,
    pub name: String,
    pub clinic_type: ClinicType,
    pub status: ActiveStatus,
}
