use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::slots::{SlotMap, SlotName};
use crate::domain::stay::{parse_stay_date, starts_before, StayDates};
use crate::errors::DomainError;
use crate::pricing::RateTable;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationKind {
    Missing,
    InvalidFormat,
    PastDate,
    NotAfterCheckIn,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotViolation {
    pub slot: SlotName,
    pub kind: ViolationKind,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationResult {
    Valid(StayDates),
    Invalid(SlotViolation),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    pub fn violation(&self) -> Option<&SlotViolation> {
        match self {
            Self::Valid(_) => None,
            Self::Invalid(violation) => Some(violation),
        }
    }
}

pub trait SlotValidator: Send + Sync {
    /// A violation is a prompt for the caller; an `Err` means the slot payload
    /// itself is malformed and the turn cannot continue.
    fn validate(&self, slots: &SlotMap, now: NaiveDateTime) -> Result<ValidationResult, DomainError>;
}

/// Checks the booking slots in their fixed order and stops at the first
/// problem. Guest count and room type are only checked for presence.
#[derive(Clone, Debug, Default)]
pub struct BookingSlotValidator {
    rates: RateTable,
}

impl BookingSlotValidator {
    pub fn new(rates: RateTable) -> Self {
        Self { rates }
    }
}

impl SlotValidator for BookingSlotValidator {
    fn validate(&self, slots: &SlotMap, now: NaiveDateTime) -> Result<ValidationResult, DomainError> {
        validate_booking(slots, now, &self.rates)
    }
}

fn validate_booking(
    slots: &SlotMap,
    now: NaiveDateTime,
    rates: &RateTable,
) -> Result<ValidationResult, DomainError> {
    use ValidationResult::Invalid;

    if !slots.is_filled(SlotName::Location) {
        return Ok(Invalid(missing(SlotName::Location, "Which city would you like to book a hotel in?")));
    }

    if !slots.is_filled(SlotName::CheckInDate) {
        return Ok(Invalid(missing(SlotName::CheckInDate, "When would you like to check in?")));
    }
    let Some(check_in) = read_date(slots, SlotName::CheckInDate)? else {
        return Ok(Invalid(SlotViolation {
            slot: SlotName::CheckInDate,
            kind: ViolationKind::InvalidFormat,
            message: "Invalid date format for Check-in date. Please provide a valid date in YYYY-MM-DD format."
                .to_owned(),
        }));
    };
    if starts_before(check_in, now) {
        return Ok(Invalid(SlotViolation {
            slot: SlotName::CheckInDate,
            kind: ViolationKind::PastDate,
            message: "Check-in date cannot be in the past. Please provide a valid date.".to_owned(),
        }));
    }

    if !slots.is_filled(SlotName::CheckOutDate) {
        return Ok(Invalid(missing(SlotName::CheckOutDate, "When would you like to check out?")));
    }
    let Some(check_out) = read_date(slots, SlotName::CheckOutDate)? else {
        return Ok(Invalid(SlotViolation {
            slot: SlotName::CheckOutDate,
            kind: ViolationKind::InvalidFormat,
            message: "Invalid date format for Check-out date. Please provide a valid date in YYYY-MM-DD format."
                .to_owned(),
        }));
    };
    if check_out <= check_in {
        return Ok(Invalid(SlotViolation {
            slot: SlotName::CheckOutDate,
            kind: ViolationKind::NotAfterCheckIn,
            message:
                "Check-out date must be after the Check-in date. Please provide a valid date."
                    .to_owned(),
        }));
    }

    if !slots.is_filled(SlotName::RoomType) {
        return Ok(Invalid(missing(
            SlotName::RoomType,
            &format!(
                "What type of room would you like to book? We have {}.",
                rates.offer_list()
            ),
        )));
    }

    if !slots.is_filled(SlotName::NumberOfGuests) {
        return Ok(Invalid(missing(SlotName::NumberOfGuests, "How many guests will be staying?")));
    }

    Ok(ValidationResult::Valid(StayDates { check_in, check_out }))
}

/// `Ok(None)` when the date is absent from the slot or does not parse; a
/// slot shaped wrong (non-object slot or value, non-string text) is an error.
fn read_date(slots: &SlotMap, slot: SlotName) -> Result<Option<NaiveDate>, DomainError> {
    Ok(slots.lookup_interpreted(slot)?.and_then(|raw| parse_stay_date(slot, raw).ok()))
}

fn missing(slot: SlotName, message: &str) -> SlotViolation {
    SlotViolation { slot, kind: ViolationKind::Missing, message: message.to_owned() }
}
