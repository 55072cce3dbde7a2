use std::str::FromStr;

use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::*;

const STAFF_COLUMNS: &str = "id, first_name, middle_name, last_name, role, email, \
                             password_hash, campus_id, clinic_id, status";

struct RawStaff {
    id: String,
    first_name: String,
    middle_name: Option<String>,
    last_name: String,
    role: String,
    email: String,
    password_hash: String,
    campus_id: i64,
    clinic_id: Option<i64>,
    status: String,
}

// Enum parsing happens outside the rusqlite closure so DatabaseError
// can carry the offending value.
fn staff_from_row(row: &Row) -> rusqlite::Result<RawStaff> {
    Ok(RawStaff {
        id: row.get(0)?,
        first_name: row.get(1)?,
        middle_name: row.get(2)?,
        last_name: row.get(3)?,
        role: row.get(4)?,
        email: row.get(5)?,
        password_hash: row.get(6)?,
        campus_id: row.get(7)?,
        clinic_id: row.get(8)?,
        status: row.get(9)?,
    })
}

fn build_staff(raw: RawStaff) -> Result<Staff, DatabaseError> {
    Ok(Staff {
        id: Uuid::parse_str(&raw.id).unwrap_or_default(),
        first_name: raw.first_name,
        middle_name: raw.middle_name,
        last_name: raw.last_name,
        role: Role::from_str(&raw.role)?,
        email: raw.email,
        password_hash: raw.password_hash,
        campus_id: raw.campus_id,
        clinic_id: raw.clinic_id,
        status: ActiveStatus::from_str(&raw.status)?,
    })
}

pub fn insert_staff(conn: &Connection, staff: &Staff) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO staff (id, first_name, middle_name, last_name, role, email,
         password_hash, campus_id, clinic_id, status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            staff.id.to_string(),
            staff.first_name,
            staff.middle_name,
            staff.last_name,
            staff.role.as_str(),
            staff.email,
            staff.password_hash,
            staff.campus_id,
            staff.clinic_id,
            staff.status.as_str(),
        ],
    )?;
    Ok(())
}

pub fn get_staff(conn: &Connection, id: &Uuid) -> Result<Option<Staff>, DatabaseError> {
    let mut stmt =
        conn.prepare(&format!("SELECT {STAFF_COLUMNS} FROM staff WHERE id = ?1"))?;
    match stmt.query_row(params![id.to_string()], staff_from_row) {
        Ok(raw) => Ok(Some(build_staff(raw)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn find_staff_by_email(
    conn: &Connection,
    email: &str,
) -> Result<Option<Staff>, DatabaseError> {
    let mut stmt =
        conn.prepare(&format!("SELECT {STAFF_COLUMNS} FROM staff WHERE email = ?1"))?;
    match stmt.query_row(params![email], staff_from_row) {
        Ok(raw) => Ok(Some(build_staff(raw)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
