// ============================================================================
// Attendance Core - Attendance Table Entity
// File: crates/attendance-core/src/domain/table.rs
// Description: Named roster owned by a user group
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Table status enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableStatus {
    Active,
    Inactive,
}

impl TableStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableStatus::Active => "active",
            TableStatus::Inactive => "inactive",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "active" => Some(TableStatus::Active),
            "inactive" => Some(TableStatus::Inactive),
            _ => None,
        }
    }
}

impl Default for TableStatus {
    fn default() -> Self {
        TableStatus::Active
    }
}

/// Attendance table (roster) entity
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceTable {
    pub id: Uuid,

    #[validate(length(min = 1, max = 200, message = "Table name must be between 1 and 200 characters"))]
    pub name: String,

    #[validate(length(max = 2000, message = "Description too long"))]
    pub description: String,

    pub user_group: String,
    pub status: TableStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AttendanceTable {
    pub fn new(
        name: String,
        description: Option<String>,
        user_group: String,
    ) -> Result<Self, validator::ValidationErrors> {
        let now = Utc::now();
        let table = Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            description: description.map(|d| d.trim().to_string()).unwrap_or_default(),
            user_group,
            status: TableStatus::Active,
            created_at: now,
            updated_at: now,
        };

        table.validate()?;
        Ok(table)
    }

    pub fn rename(&mut self, name: String) -> Result<(), validator::ValidationErrors> {
        self.name = name.trim().to_string();
        self.validate()?;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// A table together with how many members it holds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSummary {
    #[serde(flatten)]
    pub table: AttendanceTable,
    pub member_count: i64,
}
