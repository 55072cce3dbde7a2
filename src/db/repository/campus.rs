use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::*;

pub fn insert_campus(conn: &Connection, campus: &Campus) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO campuses (id, name, status) VALUES (?1, ?2, ?3)",
        params![campus.id, campus.name, campus.status.as_str()],
    )?;
    Ok(())
}
