//! # Attendance Core - Domain Module
//!
//! Entities of the attendance service and the authenticated actor.

pub mod actor;
pub mod user;
pub mod table;
pub mod member;
pub mod record;
pub mod settings;

pub use actor::Actor;
pub use user::{User, UserRole};
pub use table::{AttendanceTable, TableStatus, TableSummary};
pub use member::Member;
pub use record::{Record, RecordPatch, RecordStatus, RecordType, RecordView};
pub use settings::Settings;
