//! services/station/src/adapters/clock.rs

use chrono::{DateTime, Local, NaiveDate, Utc};
use laundry_core::ports::Clock;

/// The wall clock. Bag names follow the station's local calendar day.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}
