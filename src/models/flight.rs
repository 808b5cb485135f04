use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{error::HandlerError, models::value::DynamicValue};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarbonEmissions {
    pub this_flight: i64,
    pub typical_for_this_route: i64,
    pub difference_percent: i64,
}

/// The flight a query is about. Seeded into every execution context under
/// the `"flight"` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flight {
    pub airline: String,
    pub airline_code: String,
    pub flight_number: String,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_departure_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_arrival_time: Option<DateTime<Utc>>,
    pub departure_airport: String,
    pub arrival_airport: String,
    #[serde(default)]
    pub departure_airport_name: String,
    #[serde(default)]
    pub arrival_airport_name: String,
    #[serde(default)]
    pub price: f64,
    /// Minutes.
    #[serde(default)]
    pub duration: i64,
    #[serde(default)]
    pub airplane_model: String,
    #[serde(default)]
    pub travel_class: String,
    #[serde(default)]
    pub legroom: String,
    #[serde(default)]
    pub is_overnight: bool,
    #[serde(default)]
    pub often_delayed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbon_emissions: Option<CarbonEmissions>,
}

impl Flight {
    /// Best known arrival: actual when reported, scheduled otherwise.
    pub fn effective_arrival(&self) -> DateTime<Utc> {
        self.actual_arrival_time.unwrap_or(self.arrival_time)
    }

    pub fn summary(&self) -> String {
        format!(
            "{} {} from {} to {}, departing {}, arriving {}",
            self.airline,
            self.flight_number,
            self.departure_airport,
            self.arrival_airport,
            self.departure_time.to_rfc3339(),
            self.effective_arrival().to_rfc3339(),
        )
    }

    pub fn to_value(&self) -> DynamicValue {
        // Serializing a plain struct of strings, numbers and dates cannot fail.
        serde_json::to_value(self)
            .map(DynamicValue::from)
            .unwrap_or(DynamicValue::Unsupported)
    }

    pub fn from_value(value: &DynamicValue) -> Result<Self, HandlerError> {
        serde_json::from_value(Value::from(value.clone()))
            .map_err(|e| HandlerError::MissingContext(format!("flight: {e}")))
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::TimeZone;

    use super::*;

    pub fn sample_flight() -> Flight {
        Flight {
            airline: "United".into(),
            airline_code: "UA".into(),
            flight_number: "UA123".into(),
            departure_time: Utc.with_ymd_and_hms(2024, 10, 14, 8, 0, 0).unwrap(),
            arrival_time: Utc.with_ymd_and_hms(2024, 10, 14, 14, 30, 0).unwrap(),
            actual_departure_time: None,
            actual_arrival_time: None,
            departure_airport: "JFK".into(),
            arrival_airport: "SFO".into(),
            departure_airport_name: "John F. Kennedy International Airport".into(),
            arrival_airport_name: "San Francisco International Airport".into(),
            price: 420.5,
            duration: 390,
            airplane_model: "Boeing 777".into(),
            travel_class: "Economy".into(),
            legroom: "31 in".into(),
            is_overnight: false,
            often_delayed: true,
            carbon_emissions: Some(CarbonEmissions {
                this_flight: 350_000,
                typical_for_this_route: 330_000,
                difference_percent: 6,
            }),
        }
    }
}
