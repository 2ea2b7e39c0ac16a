//! Domain services (business logic)

pub mod auth_service;
pub mod user_service;
pub mod table_service;
pub mod member_service;
pub mod record_service;
pub mod settings_service;
pub mod clock;

pub use auth_service::{AuthService, LoginResult, SetupStatus};
pub use user_service::{CreateUser, UpdateUser, UserService};
pub use table_service::{CreateTable, ExportRow, TableExport, TableService, UpdateTable};
pub use member_service::{CreateMember, MemberService, UpdateMember};
pub use record_service::{CardCheckin, CardCheckinResult, ManualRecord, RecordQuery, RecordService};
pub use settings_service::SettingsService;
pub use clock::{Clock, SystemClock};
