use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::slots::SlotName;
use crate::errors::DomainError;

pub const STAY_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StayDates {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

impl StayDates {
    /// Whole days between check-in and check-out. Negative when the dates are
    /// reversed; callers going through validation never see that.
    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }
}

pub fn parse_stay_date(slot: SlotName, raw: &str) -> Result<NaiveDate, DomainError> {
    NaiveDate::parse_from_str(raw, STAY_DATE_FORMAT)
        .map_err(|_| DomainError::InvalidDate { slot, value: raw.to_owned() })
}

/// A stay date begins at local midnight; that instant is what gets compared
/// against the clock.
pub fn starts_before(date: NaiveDate, now: NaiveDateTime) -> bool {
    date.and_time(chrono::NaiveTime::MIN) < now
}
