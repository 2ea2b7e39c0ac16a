//! # Card Bridge
//!
//! Reads card UIDs from a reader device and turns each accepted read into a
//! check-in or check-out call against the attendance API.

pub mod bridge;
pub mod client;
pub mod config;
pub mod debounce;
pub mod error;
pub mod reader;

pub use bridge::{Bridge, CardOutcome};
pub use client::{ApiClient, CheckinMode, CheckinOutcome, MemberInfo, ReaderSettings};
pub use config::BridgeConfig;
pub use debounce::Debouncer;
pub use error::BridgeError;
pub use reader::{CardSource, LineCardSource};
