use serde::{Deserialize, Serialize};

use super::enums::ActiveStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campus {
    pub id: i64,
    pub name: String,
    pub status: ActiveStatus,
}
