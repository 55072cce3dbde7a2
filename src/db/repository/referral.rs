use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::*;

const REFERRAL_COLUMNS: &str = "r.id, r.patient_id, r.from_clinic_id, r.to_clinic_id, \
     r.reason, r.referring_doctor_id, r.receiving_doctor_id, r.status, \
     r.created_at, r.accepted_at";

struct RawReferral {
    id: String,
    patient_id: String,
    from_clinic_id: i64,
    to_clinic_id: i64,
    reason: String,
    referring_doctor_id: String,
    receiving_doctor_id: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    accepted_at: Option<DateTime<Utc>>,
}

fn referral_from_row(row: &Row) -> rusqlite::Result<RawReferral> {
    Ok(RawReferral {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        from_clinic_id: row.get(2)?,
        to_clinic_id: row.get(3)?,
        reason: row.get(4)?,
        referring_doctor_id: row.get(5)?,
        receiving_doctor_id: row.get(6)?,
        status: row.get(7)?,
        created_at: row.get(8)?,
        accepted_at: row.get(9)?,
    })
}

fn build_referral(raw: RawReferral) -> Result<Referral, DatabaseError> {
    Ok(Referral {
        id: Uuid::parse_str(&raw.id).unwrap_or_default(),
        patient_id: Uuid::parse_str(&raw.patient_id).unwrap_or_default(),
        from_clinic_id: raw.from_clinic_id,
        to_clinic_id: raw.to_clinic_id,
        reason: raw.reason,
        referring_doctor_id: Uuid::parse_str(&raw.referring_doctor_id).unwrap_or_default(),
        receiving_doctor_id: raw
            .receiving_doctor_id
            .and_then(|id| Uuid::parse_str(&id).ok()),
        status: ReferralStatus::from_str(&raw.status)?,
        created_at: raw.created_at,
        accepted_at: raw.accepted_at,
    })
}

pub fn insert_referral(conn: &Connection, referral: &Referral) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO referrals (id, patient_id, from_clinic_id, to_clinic_id, reason,
         referring_doctor_id, receiving_doctor_id, status, created_at, accepted_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            referral.id.to_string(),
            referral.patient_id.to_string(),
            referral.from_clinic_id,
            referral.to_clinic_id,
            referral.reason,
            referral.referring_doctor_id.to_string(),
            referral.receiving_doctor_id.map(|id| id.to_string()),
            referral.status.as_str(),
            referral.created_at,
            referral.accepted_at,
        ],
    )?;
    Ok(())
}

pub fn get_referral(conn: &Connection, id: &Uuid) -> Result<Option<Referral>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {REFERRAL_COLUMNS} FROM referrals r WHERE r.id = ?1"
    ))?;
    match stmt.query_row(params![id.to_string()], referral_from_row) {
        Ok(raw) => Ok(Some(build_referral(raw)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Conditional transition: moves `id` from `from` to `to` in one statement.
/// Returns the number of rows updated — zero means the referral is missing
/// or no longer in `from`, so two racing callers cannot both succeed.
pub fn transition_status(
    conn: &Connection,
    id: &Uuid,
    from: ReferralStatus,
    to: ReferralStatus,
) -> Result<usize, DatabaseError> {
    let rows = conn.execute(
        "UPDATE referrals SET status = ?3 WHERE id = ?1 AND status = ?2",
        params![id.to_string(), from.as_str(), to.as_str()],
    )?;
    Ok(rows)
}

/// Pending → Accepted, stamping `accepted_at` and the receiving doctor
/// in the same guarded statement. A NULL receiving doctor keeps whatever
/// the referral already carries from creation.
pub fn accept_referral(
    conn: &Connection,
    id: &Uuid,
    receiving_doctor_id: Option<&Uuid>,
    accepted_at: DateTime<Utc>,
) -> Result<usize, DatabaseError> {
    let rows = conn.execute(
        "UPDATE referrals
         SET status = 'accepted',
             receiving_doctor_id = COALESCE(?2, receiving_doctor_id),
             accepted_at = ?3
         WHERE id = ?1 AND status = 'pending'",
        params![
            id.to_string(),
            receiving_doctor_id.map(|d| d.to_string()),
            accepted_at,
        ],
    )?;
    Ok(rows)
}

const VIEW_QUERY: &str = "SELECT r.id, r.patient_id, r.from_clinic_id, r.to_clinic_id, \
     r.reason, r.referring_doctor_id, r.receiving_doctor_id, r.status, \
     r.created_at, r.accepted_at, \
     p.first_name || ' ' || p.last_name, \
     fc.name, tc.name, \
     rd.first_name || ' ' || rd.last_name, \
     rv.first_name || ' ' || rv.last_name \
     FROM referrals r \
     JOIN patients p ON p.id = r.patient_id \
     JOIN clinics fc ON fc.id = r.from_clinic_id \
     JOIN clinics tc ON tc.id = r.to_clinic_id \
     JOIN staff rd ON rd.id = r.referring_doctor_id \
     LEFT JOIN staff rv ON rv.id = r.receiving_doctor_id";

fn view_from_row(row: &Row) -> rusqlite::Result<(RawReferral, String, String, String, String, Option<String>)> {
    Ok((
        referral_from_row(row)?,
        row.get(10)?,
        row.get(11)?,
        row.get(12)?,
        row.get(13)?,
        row.get(14)?,
    ))
}

fn build_view(
    (raw, patient, from_clinic, to_clinic, referring, receiving): (
        RawReferral,
        String,
        String,
        String,
        String,
        Option<String>,
    ),
) -> Result<ReferralView, DatabaseError> {
    Ok(ReferralView {
        referral: build_referral(raw)?,
        patient_name: patient,
        from_clinic_name: from_clinic,
        to_clinic_name: to_clinic,
        referring_doctor_name: referring,
        receiving_doctor_name: receiving,
    })
}

pub fn get_referral_view(
    conn: &Connection,
    id: &Uuid,
) -> Result<Option<ReferralView>, DatabaseError> {
    let mut stmt = conn.prepare(&format!("{VIEW_QUERY} WHERE r.id = ?1"))?;
    match stmt.query_row(params![id.to_string()], view_from_row) {
        Ok(raw) => Ok(Some(build_view(raw)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_referral_views(conn: &Connection) -> Result<Vec<ReferralView>, DatabaseError> {
    let mut stmt = conn.prepare(&format!("{VIEW_QUERY} ORDER BY r.created_at DESC"))?;
    let rows = stmt.query_map([], view_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from).and_then(build_view))
        .collect()
}
