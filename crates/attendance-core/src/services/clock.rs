//! Wall clock used to stamp card check-ins

use chrono::{Local, NaiveDateTime};

pub trait Clock: Send + Sync {
    /// Local date and time of the server.
    fn now(&self) -> NaiveDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}
