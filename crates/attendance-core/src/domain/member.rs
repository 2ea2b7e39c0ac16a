//! Member domain entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A person on a table's roster, optionally bound to a physical card
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: Uuid,
    pub table_id: Uuid,

    #[validate(length(min = 1, max = 200, message = "Name must be between 1 and 200 characters"))]
    pub name: String,

    /// Student or employee number; unique within the table.
    #[validate(length(min = 1, max = 100, message = "Employee id must be between 1 and 100 characters"))]
    pub employee_id: String,

    #[validate(length(max = 200, message = "Contact too long"))]
    pub contact: String,

    /// Unique across all members when present.
    pub card_id: Option<String>,

    pub joined_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Member {
    pub fn new(
        table_id: Uuid,
        name: String,
        employee_id: String,
        contact: Option<String>,
    ) -> Result<Self, validator::ValidationErrors> {
        let now = Utc::now();
        let member = Self {
            id: Uuid::new_v4(),
            table_id,
            name: name.trim().to_string(),
            employee_id: employee_id.trim().to_string(),
            contact: contact.map(|c| c.trim().to_string()).unwrap_or_default(),
            card_id: None,
            joined_at: now,
            created_at: now,
        };

        member.validate()?;
        Ok(member)
    }

    pub fn bind_card(&mut self, card_id: String) {
        self.card_id = Some(card_id);
    }

    pub fn unbind_card(&mut self) {
        self.card_id = None;
    }

    pub fn has_card(&self) -> bool {
        self.card_id.is_some()
    }
}
