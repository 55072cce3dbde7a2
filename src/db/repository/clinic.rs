use std::str::FromStr;

use rusqlite::{params, Connection, Row};

use crate::db::DatabaseError;
use crate::models::*;

fn clinic_from_row(row: &Row) -> rusqlite::Result<(i64, i64, String, String, String)> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
    ))
}

fn build_clinic(
    (id, campus_id, name, clinic_type, status): (i64, i64, String, String, String),
) -> Result<Clinic, DatabaseError> {
    Ok(Clinic {
        id,
        campus_id,
        name,
        clinic_type: ClinicType::from_str(&clinic_type)?,
        status: ActiveStatus::from_str(&status)?,
    })
}

pub fn insert_clinic(conn: &Connection, clinic: &Clinic) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO clinics (id, campus_id, name, clinic_type, status)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            clinic.id,
            clinic.campus_id,
            clinic.name,
            clinic.clinic_type.as_str(),
            clinic.status.as_str(),
        ],
    )?;
    Ok(())
}

pub fn get_clinic(conn: &Connection, id: i64) -> Result<Option<Clinic>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, campus_id, name, clinic_type, status FROM clinics WHERE id = ?1",
    )?;
    match stmt.query_row(params![id], clinic_from_row) {
        Ok(raw) => Ok(Some(build_clinic(raw)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// The active General-type clinic on a campus, if one is registered.
/// Referral routing uses this to find the hub's receiving clinic.
pub fn find_general_clinic(
    conn: &Connection,
    campus_id: i64,
) -> Result<Option<Clinic>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, campus_id, name, clinic_type, status FROM clinics
         WHERE campus_id = ?1 AND clinic_type = 'general' AND status = 'active'
         ORDER BY id LIMIT 1",
    )?;
    match stmt.query_row(params![campus_id], clinic_from_row) {
        Ok(raw) => Ok(Some(build_clinic(raw)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
