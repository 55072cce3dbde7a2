use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{ActiveStatus, Role};

/// Full staff row as stored. Deliberately not `Serialize`: the password
/// hash must never reach a response body. Handlers work with [`Principal`].
#[derive(Debug, Clone)]
pub struct Staff {
    pub id: Uuid,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub role: Role,
    pub email: String,
    pub password_hash: String,
    pub campus_id: i64,
    pub clinic_id: Option<i64>,
    pub status: ActiveStatus,
}

impl Staff {
    /// Non-secret projection handed to request handlers after authentication.
    pub fn principal(&self) -> Principal {
        Principal {
            id: self.id,
            full_name: self.full_name(),
            role: self.role,
            email: self.email.clone(),
            campus_id: self.campus_id,
            clinic_id: self.clinic_id,
            status: self.status,
        }
    }

    pub fn full_name(&self) -> String {
        match &self.middle_name {
            Some(middle) => format!("{} {} {}", self.first_name, middle, self.last_name),
            None => format!("{} {}", self.first_name, self.last_name),
        }
    }
}

/// Authenticated staff identity attached to a request after token
/// verification. Carries everything downstream handlers may use and
/// nothing they may not (no credential material).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub id: Uuid,
    pub full_name: String,
    pub role: Role,
    pub email: String,
    pub campus_id: i64,
    pub clinic_id: Option<i64>,
    pub status: ActiveStatus,
}
