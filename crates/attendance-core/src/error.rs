//! Domain errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("User not found")]
    UserNotFound,

    #[error("Table not found")]
    TableNotFound,

    #[error("Member not found")]
    MemberNotFound,

    #[error("Record not found")]
    RecordNotFound,

    #[error("No member is bound to card {0}")]
    CardNotBound(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Setup already completed, ask a super administrator to create your account")]
    SetupAlreadyCompleted,

    #[error("Username already exists: {0}")]
    UsernameAlreadyExists(String),

    #[error("Employee id already exists in this table: {0}")]
    EmployeeIdAlreadyExists(String),

    #[error("Card is already bound to another member: {0}")]
    CardAlreadyBound(String),

    #[error("A record for this member and day already exists")]
    RecordAlreadyExists,

    #[error("Member does not belong to this table")]
    MemberNotInTable,

    #[error("No check-in record for today, check in first")]
    CheckinRequired,

    #[error("{0}")]
    SelfModification(String),

    #[error("Password too short")]
    PasswordTooShort,

    #[error("Password too long")]
    PasswordTooLong,

    #[error("Password hash error: {0}")]
    PasswordHashError(String),

    #[error("Token generation error: {0}")]
    TokenGenerationError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        // First message is enough for the client
        let message = errors
            .field_errors()
            .values()
            .flat_map(|errs| errs.iter())
            .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .unwrap_or_else(|| errors.to_string());
        DomainError::ValidationError(message)
    }
}
