use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::slots::SlotName;
use crate::domain::stay::{parse_stay_date, StayDates};
use crate::errors::DomainError;
use crate::pricing::rates::RateTable;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FareTraceStep {
    pub stage: String,
    pub detail: String,
    pub amount: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FareQuote {
    pub room_type: String,
    pub nights: i64,
    pub guests: i64,
    pub nightly_rate: Decimal,
    pub total: Decimal,
    pub trace: Vec<FareTraceStep>,
}

pub trait FareCalculator: Send + Sync {
    fn calculate_fare(
        &self,
        check_in: &str,
        check_out: &str,
        guests: i64,
        room_type: &str,
    ) -> Result<FareQuote, DomainError>;
}

#[derive(Clone, Debug, Default)]
pub struct NightlyFareCalculator {
    rates: RateTable,
}

impl NightlyFareCalculator {
    pub fn new(rates: RateTable) -> Self {
        Self { rates }
    }

    pub fn rates(&self) -> &RateTable {
        &self.rates
    }
}

impl FareCalculator for NightlyFareCalculator {
    fn calculate_fare(
        &self,
        check_in: &str,
        check_out: &str,
        guests: i64,
        room_type: &str,
    ) -> Result<FareQuote, DomainError> {
        let stay = StayDates {
            check_in: parse_stay_date(SlotName::CheckInDate, check_in)?,
            check_out: parse_stay_date(SlotName::CheckOutDate, check_out)?,
        };
        price_stay(&self.rates, &stay, guests, room_type)
    }
}

/// nights x nightly rate x guests, with no rounding and no floor on nights.
pub fn price_stay(
    rates: &RateTable,
    stay: &StayDates,
    guests: i64,
    room_type: &str,
) -> Result<FareQuote, DomainError> {
    let nights = stay.nights();
    let nightly_rate = rates.fare_rate(room_type);
    let total = Decimal::from(nights)
        .checked_mul(nightly_rate)
        .and_then(|per_guest| per_guest.checked_mul(Decimal::from(guests)))
        .ok_or(DomainError::FareOverflow { nights, guests })?;

    Ok(FareQuote {
        room_type: room_type.to_owned(),
        nights,
        guests,
        nightly_rate,
        total,
        trace: vec![
            FareTraceStep {
                stage: "nights".to_owned(),
                detail: format!("{} to {}", stay.check_in, stay.check_out),
                amount: Decimal::from(nights),
            },
            FareTraceStep {
                stage: "nightly_rate".to_owned(),
                detail: if rates.lookup(room_type).is_some() {
                    format!("rate table entry for {room_type}")
                } else {
                    format!("fare fallback for unknown room type {room_type}")
                },
                amount: nightly_rate,
            },
            FareTraceStep {
                stage: "total".to_owned(),
                detail: format!("nights * nightly_rate * {guests} guests"),
                amount: total,
            },
        ],
    })
}

/// Guest counts arrive as free text; surrounding whitespace is tolerated,
/// anything else that is not a whole number is rejected.
pub fn parse_guest_count(raw: &str) -> Result<i64, DomainError> {
    raw.trim().parse::<i64>().map_err(|_| DomainError::InvalidGuestCount(raw.to_owned()))
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{parse_guest_count, FareCalculator, NightlyFareCalculator};
    use crate::domain::slots::SlotName;
    use crate::errors::DomainError;
    use crate::pricing::{RateTable, RoomRate};

    #[test]
    fn suite_for_three_guests_over_four_nights() {
        let quote = NightlyFareCalculator::default()
            .calculate_fare("2025-01-01", "2025-01-05", 3, "Suite")
            .expect("valid dates");

        assert_eq!(quote.nights, 4);
        assert_eq!(quote.nightly_rate, Decimal::from(20));
        assert_eq!(quote.total, Decimal::from(240));
        assert_eq!(quote.total.to_string(), "240");
        assert_eq!(quote.trace.len(), 3);
        assert_eq!(quote.trace[2].amount, quote.total);
    }

    #[test]
    fn fare_is_linear_in_nights_and_guests() {
        let calculator = NightlyFareCalculator::default();
        for (check_out, nights) in [("2025-06-02", 1), ("2025-06-04", 3), ("2025-06-11", 10)] {
            for guests in [1_i64, 2, 5] {
                let quote = calculator
                    .calculate_fare("2025-06-01", check_out, guests, "Luxury")
                    .expect("valid dates");
                assert_eq!(quote.total, Decimal::from(nights * guests * 50));
            }
        }
    }

    #[test]
    fn zero_nights_costs_nothing() {
        let quote = NightlyFareCalculator::default()
            .calculate_fare("2025-06-01", "2025-06-01", 4, "Duplex")
            .expect("valid dates");
        assert_eq!(quote.total, Decimal::ZERO);
    }

    #[test]
    fn unknown_room_is_charged_at_fare_fallback() {
        let quote = NightlyFareCalculator::default()
            .calculate_fare("2025-06-01", "2025-06-03", 2, "Treehouse")
            .expect("valid dates");
        assert_eq!(quote.nightly_rate, Decimal::from(10));
        assert_eq!(quote.total, Decimal::from(40));
        assert!(quote.trace[1].detail.contains("fallback"));
    }

    #[test]
    fn unparsable_dates_are_reported_per_slot() {
        let error = NightlyFareCalculator::default()
            .calculate_fare("2025-06-01", "soon", 2, "Suite")
            .expect_err("bad checkout");
        assert_eq!(
            error,
            DomainError::InvalidDate { slot: SlotName::CheckOutDate, value: "soon".to_owned() }
        );
    }

    #[test]
    fn oversized_fare_is_an_error_not_a_panic() {
        let rates = RateTable::new(
            vec![RoomRate::new("Suite", Decimal::from(100_000))],
            Decimal::from(100),
            Decimal::from(10),
        );
        let error = NightlyFareCalculator::new(rates)
            .calculate_fare("2025-01-01", "9999-12-31", i64::MAX, "Suite")
            .expect_err("total exceeds decimal range");

        assert!(matches!(error, DomainError::FareOverflow { guests: i64::MAX, .. }));
    }

    #[test]
    fn guest_count_parsing() {
        assert_eq!(parse_guest_count("3"), Ok(3));
        assert_eq!(parse_guest_count(" 4 "), Ok(4));
        assert_eq!(parse_guest_count("+2"), Ok(2));
        assert_eq!(
            parse_guest_count("three"),
            Err(DomainError::InvalidGuestCount("three".to_owned()))
        );
        assert!(parse_guest_count("2.5").is_err());
    }
}
