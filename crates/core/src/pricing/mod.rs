pub mod fare;
pub mod rates;

pub use fare::{
    parse_guest_count, price_stay, FareCalculator, FareQuote, FareTraceStep,
    NightlyFareCalculator,
};
pub use rates::{RateTable, RoomRate};
