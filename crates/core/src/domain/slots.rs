use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SlotName {
    Location,
    CheckInDate,
    CheckOutDate,
    RoomType,
    NumberOfGuests,
    RoomTypeConfirmation,
    Confirmation,
}

impl SlotName {
    /// Slots the validator walks, in the order it walks them.
    pub const REQUIRED: [SlotName; 5] = [
        SlotName::Location,
        SlotName::CheckInDate,
        SlotName::CheckOutDate,
        SlotName::RoomType,
        SlotName::NumberOfGuests,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Location => "Location",
            Self::CheckInDate => "CheckInDate",
            Self::CheckOutDate => "CheckOutDate",
            Self::RoomType => "RoomType",
            Self::NumberOfGuests => "NumberOfGuests",
            Self::RoomTypeConfirmation => "RoomTypeConfirmation",
            Self::Confirmation => "Confirmation",
        }
    }
}

impl fmt::Display for SlotName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only view over the slot object a caller submitted.
///
/// The raw JSON is kept as-is so a response can echo it back byte-for-byte,
/// including members this crate never reads (`originalValue`, `resolvedValues`,
/// `shape`, ...).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SlotMap {
    raw: Map<String, Value>,
}

impl SlotMap {
    pub fn new(raw: Map<String, Value>) -> Self {
        Self { raw }
    }

    pub fn from_value(value: Value) -> Result<Self, DomainError> {
        match value {
            Value::Object(raw) => Ok(Self { raw }),
            other => Err(DomainError::MalformedSlots { found: json_kind(&other).to_owned() }),
        }
    }

    pub fn raw(&self) -> &Map<String, Value> {
        &self.raw
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.raw)
    }

    /// True when the slot key exists and carries a non-empty payload.
    pub fn is_filled(&self, name: SlotName) -> bool {
        self.raw.get(name.as_str()).is_some_and(is_truthy)
    }

    /// True when the slot is filled and its nested `value` member is non-empty.
    pub fn has_value(&self, name: SlotName) -> Result<bool, DomainError> {
        let Some(slot) = self.raw.get(name.as_str()).filter(|slot| is_truthy(slot)) else {
            return Ok(false);
        };
        match slot {
            Value::Object(members) => Ok(members.get("value").is_some_and(is_truthy)),
            _ => Err(DomainError::MalformedSlot { slot: name }),
        }
    }

    /// Like [`SlotMap::interpreted`], but tells an absent key apart from a
    /// wrongly typed member: a missing slot, `value` or `interpretedValue` is
    /// `Ok(None)`, a non-object slot or value or a non-string text is an error.
    pub fn lookup_interpreted(&self, name: SlotName) -> Result<Option<&str>, DomainError> {
        let malformed = || DomainError::MalformedSlot { slot: name };
        let Some(slot) = self.raw.get(name.as_str()) else {
            return Ok(None);
        };
        let Some(value) = slot.as_object().ok_or_else(malformed)?.get("value") else {
            return Ok(None);
        };
        let Some(text) = value.as_object().ok_or_else(malformed)?.get("interpretedValue") else {
            return Ok(None);
        };
        text.as_str().map(Some).ok_or_else(malformed)
    }

    pub fn interpreted(&self, name: SlotName) -> Result<&str, DomainError> {
        self.raw
            .get(name.as_str())
            .and_then(|slot| slot.get("value"))
            .and_then(|value| value.get("interpretedValue"))
            .and_then(Value::as_str)
            .ok_or(DomainError::MalformedSlot { slot: name })
    }
}

/// Slot payload a response should echo: the inbound value when it carries
/// anything, otherwise an empty object.
pub fn echo_slots(raw: Option<&Value>) -> Value {
    match raw {
        Some(value) if is_truthy(value) => value.clone(),
        _ => Value::Object(Map::new()),
    }
}

pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(members) => !members.is_empty(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
