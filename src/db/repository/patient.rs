use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::*;

pub fn insert_patient(conn: &Connection, patient: &Patient) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO patients (id, first_name, last_name) VALUES (?1, ?2, ?3)",
        params![
            patient.id.to_string(),
            patient.first_name,
            patient.last_name,
        ],
    )?;
    Ok(())
}
