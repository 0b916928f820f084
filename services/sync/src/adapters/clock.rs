//! services/sync/src/adapters/clock.rs
//!
//! The production implementation of the `Clock` port.

use chrono::{DateTime, Utc};
use studymate_core::ports::Clock;

/// A `Clock` that reads the system wall clock.
#[derive(Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
