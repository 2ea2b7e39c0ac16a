// ============================================================================
// Attendance Core - Record Entity
// File: crates/attendance-core/src/domain/record.rs
// Description: One member's check-in/check-out entry for a day
// ============================================================================

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use attendance_shared::constants::{DATE_FORMAT, TIME_FORMAT};

use crate::error::DomainError;

/// Record status, always derived from the check-in/out fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Pending,
    CheckedIn,
    Completed,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Pending => "pending",
            RecordStatus::CheckedIn => "checkedin",
            RecordStatus::Completed => "completed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(RecordStatus::Pending),
            "checkedin" => Some(RecordStatus::CheckedIn),
            "completed" => Some(RecordStatus::Completed),
            _ => None,
        }
    }
}

/// Check-in or check-out; also the card reader's mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordType {
    CheckIn,
    CheckOut,
}

impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::CheckIn => "checkin",
            RecordType::CheckOut => "checkout",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "checkin" => Some(RecordType::CheckIn),
            "checkout" => Some(RecordType::CheckOut),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: Uuid,
    pub table_id: Uuid,
    pub member_id: Uuid,
    pub checkin_date: Option<NaiveDate>,
    pub checkin_time: Option<NaiveTime>,
    pub checkout_date: Option<NaiveDate>,
    pub checkout_time: Option<NaiveTime>,
    pub status: RecordStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record {
    /// A fresh record holding one event.
    pub fn new(
        table_id: Uuid,
        member_id: Uuid,
        record_type: RecordType,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Self {
        let now = Utc::now();
        let mut record = Self {
            id: Uuid::new_v4(),
            table_id,
            member_id,
            checkin_date: None,
            checkin_time: None,
            checkout_date: None,
            checkout_time: None,
            status: RecordStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        record.apply(record_type, date, time);
        record
    }

    /// Stamp an event onto the record and re-derive the status.
    pub fn apply(&mut self, record_type: RecordType, date: NaiveDate, time: NaiveTime) {
        match record_type {
            RecordType::CheckIn => {
                self.checkin_date = Some(date);
                self.checkin_time = Some(time);
            }
            RecordType::CheckOut => {
                self.checkout_date = Some(date);
                self.checkout_time = Some(time);
            }
        }
        self.refresh();
    }

    /// The day this record belongs to: the check-in date, or the check-out
    /// date of a checkout-only record.
    pub fn record_date(&self) -> Option<NaiveDate> {
        self.checkin_date.or(self.checkout_date)
    }

    pub fn derive_status(&self) -> RecordStatus {
        match (
            self.checkin_date.is_some() && self.checkin_time.is_some(),
            self.checkout_date.is_some() && self.checkout_time.is_some(),
        ) {
            (true, true) => RecordStatus::Completed,
            (true, false) => RecordStatus::CheckedIn,
            _ => RecordStatus::Pending,
        }
    }

    pub fn refresh(&mut self) {
        self.status = self.derive_status();
        self.updated_at = Utc::now();
    }
}

/// Field-wise edit of a record. The outer `Option` says whether the field
/// was sent; the inner one clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordPatch {
    pub checkin_date: Option<Option<NaiveDate>>,
    pub checkin_time: Option<Option<NaiveTime>>,
    pub checkout_date: Option<Option<NaiveDate>>,
    pub checkout_time: Option<Option<NaiveTime>>,
}

impl RecordPatch {
    pub fn apply_to(&self, record: &mut Record) -> Result<(), DomainError> {
        if let Some(v) = self.checkin_date {
            record.checkin_date = v;
        }
        if let Some(v) = self.checkin_time {
            record.checkin_time = v;
        }
        if let Some(v) = self.checkout_date {
            record.checkout_date = v;
        }
        if let Some(v) = self.checkout_time {
            record.checkout_time = v;
        }
        if record.record_date().is_none() {
            return Err(DomainError::ValidationError(
                "A record needs a check-in or check-out date".to_string(),
            ));
        }
        record.refresh();
        Ok(())
    }
}

/// A record joined with the member it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordView {
    pub record: Record,
    pub member_name: String,
    pub member_employee_id: String,
}

pub fn parse_date(value: &str) -> Result<NaiveDate, DomainError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
        DomainError::ValidationError(format!("Invalid date '{}', expected YYYY-MM-DD", value))
    })
}

/// Accepts `HH:MM` and `HH:MM:SS`; seconds are dropped.
pub fn parse_time(value: &str) -> Result<NaiveTime, DomainError> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map(truncate_to_minute)
        .map_err(|_| DomainError::ValidationError(format!("Invalid time '{}', expected HH:MM", value)))
}

pub fn truncate_to_minute(time: NaiveTime) -> NaiveTime {
    use chrono::Timelike;
    NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time)
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}
