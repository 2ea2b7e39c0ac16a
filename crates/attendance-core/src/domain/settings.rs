//! Per-group reader settings

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::record::RecordType;

/// Which table the card reader writes to, and whether it checks in or out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub active_table: Option<Uuid>,
    pub mode: Option<RecordType>,
}
