//! Suppression of repeated reads of the same card

use std::time::{Duration, Instant};

/// Accepts a card unless the same card was accepted less than `window` ago.
/// A different card is always accepted and resets the window.
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    last: Option<(String, Instant)>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    pub fn accept(&mut self, card_id: &str, now: Instant) -> bool {
        if let Some((last_card, at)) = &self.last {
            if last_card == card_id && now.saturating_duration_since(*at) < self.window {
                return false;
            }
        }
        self.last = Some((card_id.to_string(), now));
        true
    }
}
