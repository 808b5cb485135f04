use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::{
    context::ExecutionContext,
    dispatch::ActionHandler,
    error::HandlerError,
    models::{Action, DynamicValue, Flight, ValueMap},
    value_map,
};

pub const FLIGHT_DATA_API: &str = "flight_data";

#[derive(Debug, Clone, PartialEq)]
pub struct FlightStatus {
    pub status: String,
    pub estimated_arrival: DateTime<Utc>,
}

/// Live status lookup for a flight, e.g. a flight-tracking API client.
#[async_trait]
pub trait FlightStatusProvider: Send + Sync {
    async fn status(
        &self,
        flight_number: &str,
        flight: &Flight,
    ) -> Result<FlightStatus, HandlerError>;
}

/// Derives status from the flight record itself: delayed when the actual
/// arrival is later than scheduled.
#[derive(Debug, Default, Clone)]
pub struct ScheduleStatusProvider;

#[async_trait]
impl FlightStatusProvider for ScheduleStatusProvider {
    async fn status(
        &self,
        flight_number: &str,
        flight: &Flight,
    ) -> Result<FlightStatus, HandlerError> {
        if !flight_number.eq_ignore_ascii_case(&flight.flight_number) {
            return Err(HandlerError::NoData(format!("no status for flight {flight_number}")));
        }
        let estimated = flight.effective_arrival();
        let late = (estimated - flight.arrival_time).num_minutes();
        let status = if late > 0 {
            format!("Delayed {late} min")
        } else {
            "On Time".to_string()
        };
        Ok(FlightStatus {
            status,
            estimated_arrival: estimated,
        })
    }
}

pub struct FlightDataHandler<P> {
    provider: P,
}

impl<P: FlightStatusProvider> FlightDataHandler<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<P: FlightStatusProvider> ActionHandler for FlightDataHandler<P> {
    fn api(&self) -> &str {
        FLIGHT_DATA_API
    }

    async fn handle(
        &self,
        action: &Action,
        context: &ExecutionContext,
    ) -> Result<ValueMap, HandlerError> {
        let flight = context.flight()?;
        let flight_number = match action.param("flightNumber") {
            Some(DynamicValue::String(n)) => n.clone(),
            Some(_) => return Err(HandlerError::invalid_param("flightNumber")),
            None => flight.flight_number.clone(),
        };
        debug!(%flight_number, "fetching flight status");

        let status = self.provider.status(&flight_number, &flight).await?;
        Ok(value_map! {
            "flightStatus" => DynamicValue::Map(value_map! {
                "flightNumber" => flight_number,
                "status" => status.status,
                "scheduledArrival" => flight.arrival_time,
                "estimatedArrival" => status.estimated_arrival,
            }),
        })
    }
}
