use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomRate {
    pub name: String,
    pub nightly_rate: Decimal,
}

impl RoomRate {
    pub fn new(name: impl Into<String>, nightly_rate: Decimal) -> Self {
        Self { name: name.into(), nightly_rate }
    }
}

/// Nightly rates per room type, in the order rooms are offered to guests.
///
/// Two fallbacks exist for unknown room types. The rate quoted when asking the
/// guest to confirm their room falls back to `announcement_fallback` (100 by
/// default) while the fare charged at fulfilment falls back to `fare_fallback`
/// (10 by default). The two values disagree for historical reasons and it is
/// not settled which one is intended, so both are kept and configurable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateTable {
    rooms: Vec<RoomRate>,
    pub announcement_fallback: Decimal,
    pub fare_fallback: Decimal,
}

impl Default for RateTable {
    fn default() -> Self {
        Self {
            rooms: vec![
                RoomRate::new("Classic", Decimal::from(10)),
                RoomRate::new("Duplex", Decimal::from(15)),
                RoomRate::new("Suite", Decimal::from(20)),
                RoomRate::new("Premium Suite", Decimal::from(25)),
                RoomRate::new("Luxury", Decimal::from(50)),
            ],
            announcement_fallback: Decimal::from(100),
            fare_fallback: Decimal::from(10),
        }
    }
}

impl RateTable {
    pub fn new(rooms: Vec<RoomRate>, announcement_fallback: Decimal, fare_fallback: Decimal) -> Self {
        Self { rooms, announcement_fallback, fare_fallback }
    }

    pub fn rooms(&self) -> &[RoomRate] {
        &self.rooms
    }

    pub fn lookup(&self, room_type: &str) -> Option<Decimal> {
        self.rooms.iter().find(|room| room.name == room_type).map(|room| room.nightly_rate)
    }

    /// Rate quoted in the room confirmation prompt.
    pub fn announced_rate(&self, room_type: &str) -> Decimal {
        self.lookup(room_type).unwrap_or(self.announcement_fallback)
    }

    /// Rate used when computing the total fare.
    pub fn fare_rate(&self, room_type: &str) -> Decimal {
        self.lookup(room_type).unwrap_or(self.fare_fallback)
    }

    /// "Classic, Duplex, Suite, Premium Suite, and Luxury"
    pub fn offer_list(&self) -> String {
        let names: Vec<&str> = self.rooms.iter().map(|room| room.name.as_str()).collect();
        match names.as_slice() {
            [] => String::new(),
            [only] => (*only).to_owned(),
            [first, second] => format!("{first} and {second}"),
            [init @ .., last] => format!("{}, and {last}", init.join(", ")),
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{RateTable, RoomRate};

    #[test]
    fn default_table_matches_published_rates() {
        let table = RateTable::default();
        assert_eq!(table.lookup("Classic"), Some(Decimal::from(10)));
        assert_eq!(table.lookup("Duplex"), Some(Decimal::from(15)));
        assert_eq!(table.lookup("Suite"), Some(Decimal::from(20)));
        assert_eq!(table.lookup("Premium Suite"), Some(Decimal::from(25)));
        assert_eq!(table.lookup("Luxury"), Some(Decimal::from(50)));
    }

    #[test]
    fn unknown_room_uses_divergent_fallbacks() {
        let table = RateTable::default();
        assert_eq!(table.lookup("Penthouse"), None);
        assert_eq!(table.announced_rate("Penthouse"), Decimal::from(100));
        assert_eq!(table.fare_rate("Penthouse"), Decimal::from(10));
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let table = RateTable::default();
        assert_eq!(table.lookup("suite"), None);
        assert_eq!(table.fare_rate("suite"), Decimal::from(10));
    }

    #[test]
    fn offer_list_uses_table_order() {
        assert_eq!(
            RateTable::default().offer_list(),
            "Classic, Duplex, Suite, Premium Suite, and Luxury"
        );

        let pair = RateTable::new(
            vec![RoomRate::new("Single", Decimal::ONE), RoomRate::new("Double", Decimal::TWO)],
            Decimal::ONE,
            Decimal::ONE,
        );
        assert_eq!(pair.offer_list(), "Single and Double");
    }
}
