use tracing::warn;

use crate::{
    error::HandlerError,
    models::{DynamicValue, Flight, ValueMap},
};

/// Well-known key under which the flight under discussion is seeded.
pub const FLIGHT_KEY: &str = "flight";

/// Accumulator of action results for one query cycle.
///
/// Seeded with the flight under discussion and grown additively by the
/// executor after each successful action. Handlers only ever see a shared
/// borrow; updates flow back through [`ExecutionContext::merge`].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ExecutionContext {
    values: ValueMap,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_flight(flight: &Flight) -> Self {
        let mut values = ValueMap::new();
        values.insert(FLIGHT_KEY.to_string(), flight.to_value());
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&DynamicValue> {
        self.values.get(key)
    }

    /// Dotted lookup through nested maps, e.g. `"meetingAvailabilityData.location"`.
    pub fn get_path(&self, path: &str) -> Option<&DynamicValue> {
        let mut segments = path.split('.');
        let first = self.values.get(segments.next()?)?;
        segments.try_fold(first, |value, segment| value.get(segment))
    }

    pub fn require(&self, key: &str) -> Result<&DynamicValue, HandlerError> {
        self.get(key)
            .ok_or_else(|| HandlerError::MissingContext(key.to_string()))
    }

    pub fn require_path(&self, path: &str) -> Result<&DynamicValue, HandlerError> {
        self.get_path(path)
            .ok_or_else(|| HandlerError::MissingContext(path.to_string()))
    }

    pub fn require_str(&self, path: &str) -> Result<&str, HandlerError> {
        self.require_path(path)?
            .as_str()
            .ok_or_else(|| HandlerError::MissingContext(format!("{path} (expected string)")))
    }

    /// Decodes the seeded flight.
    pub fn flight(&self) -> Result<Flight, HandlerError> {
        Flight::from_value(self.require(FLIGHT_KEY)?)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_map(&self) -> &ValueMap {
        &self.values
    }

    /// Inserts directly, bypassing merge rules. Used for seeding.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<DynamicValue>) {
        self.values.insert(key.into(), value.into());
    }

    /// Folds a handler's partial update into the context.
    ///
    /// Map values merge key by key (recursively); anything else replaces the
    /// existing value. The seeded flight is never overwritten.
    pub fn merge(&mut self, update: ValueMap) {
        for (key, value) in update {
            if key == FLIGHT_KEY && self.values.contains_key(FLIGHT_KEY) {
                warn!("ignoring update to immutable context key '{FLIGHT_KEY}'");
                continue;
            }
            match self.values.get_mut(&key) {
                Some(existing) => merge_value(existing, value),
                None => {
                    self.values.insert(key, value);
                }
            }
        }
    }
}

fn merge_value(existing: &mut DynamicValue, incoming: DynamicValue) {
    match (existing, incoming) {
        (DynamicValue::Map(current), DynamicValue::Map(update)) => {
            for (key, value) in update {
                match current.get_mut(&key) {
                    Some(slot) => merge_value(slot, value),
                    None => {
                        current.insert(key, value);
                    }
                }
            }
        }
        (slot, incoming) => *slot = incoming,
    }
}

impl From<ValueMap> for ExecutionContext {
    fn from(values: ValueMap) -> Self {
        Self { values }
    }
}
