use std::{collections::HashMap, future::Future, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    config::MapsConfig,
    context::ExecutionContext,
    dispatch::ActionHandler,
    error::HandlerError,
    models::{Action, DynamicValue, ValueMap},
    reconcile::{MAP_DATA, MEETING_AVAILABILITY_DATA},
    value_map,
};

pub const MAPS_API: &str = "maps";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance in meters.
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        const EARTH_RADIUS_M: f64 = 6_371_000.0;
        let (lat1, lat2) = (self.latitude.to_radians(), other.latitude.to_radians());
        let dlat = lat2 - lat1;
        let dlon = (other.longitude - self.longitude).to_radians();
        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_M * a.sqrt().asin()
    }

    fn to_value(self) -> DynamicValue {
        DynamicValue::Map(value_map! {
            "latitude" => self.latitude,
            "longitude" => self.longitude,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Route {
    pub travel_time_secs: f64,
    pub distance_meters: f64,
}

/// Geocoding and driving directions.
#[async_trait]
pub trait DirectionsProvider: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<Coordinate, HandlerError>;

    async fn route(
        &self,
        from: Coordinate,
        to: Coordinate,
        departure: DateTime<Utc>,
    ) -> Result<Route, HandlerError>;
}

/// Known places plus straight-line routing at a fixed average speed.
#[derive(Debug, Clone)]
pub struct StaticDirections {
    places: HashMap<String, Coordinate>,
    average_speed_kmh: f64,
}

impl StaticDirections {
    pub fn new(average_speed_kmh: f64) -> Self {
        Self {
            places: HashMap::new(),
            average_speed_kmh,
        }
    }

    pub fn with_place(mut self, address: &str, coordinate: Coordinate) -> Self {
        self.places.insert(address.to_lowercase(), coordinate);
        self
    }
}

#[async_trait]
impl DirectionsProvider for StaticDirections {
    async fn geocode(&self, address: &str) -> Result<Coordinate, HandlerError> {
        self.places
            .get(&address.to_lowercase())
            .copied()
            .ok_or_else(|| HandlerError::NoData(format!("could not geocode '{address}'")))
    }

    async fn route(
        &self,
        from: Coordinate,
        to: Coordinate,
        _departure: DateTime<Utc>,
    ) -> Result<Route, HandlerError> {
        if self.average_speed_kmh <= 0.0 {
            return Err(HandlerError::NoData("no route available".into()));
        }
        let distance = from.distance_to(&to);
        Ok(Route {
            travel_time_secs: distance / (self.average_speed_kmh * 1000.0 / 3600.0),
            distance_meters: distance,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub base_delay: Duration,
}

impl From<&MapsConfig> for RetryPolicy {
    fn from(config: &MapsConfig) -> Self {
        Self {
            attempts: config.geocode_attempts.max(1),
            base_delay: Duration::from_millis(config.geocode_backoff_ms),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::from(&MapsConfig::default())
    }
}

/// Travel time from the arrival airport to the meeting.
///
/// Requires the seeded flight and `meetingAvailabilityData.location`.
/// Writes `mapData`, and when the meeting start is known also merges
/// `travelTime`, `canMakeIt` and a travel-adjusted `timeDifference` into
/// `meetingAvailabilityData`.
pub struct MapsHandler<P> {
    provider: P,
    retry: RetryPolicy,
}

impl<P: DirectionsProvider> MapsHandler<P> {
    pub fn new(provider: P) -> Self {
        Self::with_retry(provider, RetryPolicy::default())
    }

    pub fn with_retry(provider: P, retry: RetryPolicy) -> Self {
        Self { provider, retry }
    }

    async fn geocode(&self, address: &str) -> Result<Coordinate, HandlerError> {
        retry_transient(self.retry, address, || self.provider.geocode(address)).await
    }
}

/// Re-runs `op` on transient failures with exponential backoff, up to
/// `policy.attempts` tries in total.
async fn retry_transient<T, F, Fut>(
    policy: RetryPolicy,
    what: &str,
    mut op: F,
) -> Result<T, HandlerError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, HandlerError>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < policy.attempts => {
                let delay = policy.base_delay * 2u32.saturating_pow(attempt - 1);
                warn!(what, attempt, ?delay, error = %e, "geocoding failed, retrying");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[async_trait]
impl<P: DirectionsProvider> ActionHandler for MapsHandler<P> {
    fn api(&self) -> &str {
        MAPS_API
    }

    async fn handle(
        &self,
        action: &Action,
        context: &ExecutionContext,
    ) -> Result<ValueMap, HandlerError> {
        let flight = context.flight()?;
        let destination = context
            .require_str(&format!("{MEETING_AVAILABILITY_DATA}.location"))?
            .to_string();
        let origin = match action.param("from") {
            Some(DynamicValue::String(s)) => s.clone(),
            Some(_) => return Err(HandlerError::invalid_param("from")),
            None => flight.arrival_airport.clone(),
        };
        let arrival = flight.effective_arrival();

        let from = self.geocode(&origin).await?;
        let to = self.geocode(&destination).await?;
        let route = self.provider.route(from, to, arrival).await?;
        debug!(%origin, %destination, travel_time = route.travel_time_secs, "route computed");

        let mut update = value_map! {
            MAP_DATA => DynamicValue::Map(value_map! {
                "fromLocation" => origin,
                "toLocation" => destination,
                "fromCoordinate" => from.to_value(),
                "toCoordinate" => to.to_value(),
                "travelTime" => route.travel_time_secs,
                "distance" => route.distance_meters,
            }),
        };

        let start = context
            .get_path(&format!("{MEETING_AVAILABILITY_DATA}.eventStartTime"))
            .and_then(DynamicValue::as_timestamp);
        if let Some(start) = start {
            let ready_at =
                arrival + chrono::Duration::seconds(route.travel_time_secs.round() as i64);
            update.insert(
                MEETING_AVAILABILITY_DATA.to_string(),
                DynamicValue::Map(value_map! {
                    "travelTime" => route.travel_time_secs,
                    "canMakeIt" => ready_at <= start,
                    "timeDifference" => (start - ready_at).num_seconds() as f64,
                }),
            );
        }
        Ok(update)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use chrono::TimeZone;

    use super::*;
    use crate::models::flight::fixtures::sample_flight;

    fn directions() -> StaticDirections {
        StaticDirections::new(60.0)
            .with_place("SFO", Coordinate::new(37.6213, -122.3790))
            .with_place("Apple Park", Coordinate::new(37.3349, -122.0090))
    }

    fn context_with_meeting(start_hour: u32) -> ExecutionContext {
        let mut ctx = ExecutionContext::for_flight(&sample_flight());
        ctx.insert(
            MEETING_AVAILABILITY_DATA,
            DynamicValue::Map(value_map! {
                "location" => "Apple Park",
                "eventStartTime" => Utc.with_ymd_and_hms(2024, 10, 14, start_hour, 0, 0).unwrap(),
            }),
        );
        ctx
    }

    #[tokio::test]
    async fn computes_route_and_feasibility() {
        let update = MapsHandler::new(directions())
            .handle(&Action::new(MAPS_API, "getTravelTime"), &context_with_meeting(17))
            .await
            .unwrap();

        let travel = update[MAP_DATA].get("travelTime").and_then(DynamicValue::as_f64).unwrap();
        assert!(travel > 1800.0 && travel < 4000.0, "travel time {travel}");
        assert_eq!(update[MAP_DATA].get("fromLocation"), Some(&DynamicValue::from("SFO")));
        assert_eq!(
            update[MEETING_AVAILABILITY_DATA].get("canMakeIt"),
            Some(&DynamicValue::Bool(true))
        );
    }

    #[tokio::test]
    async fn meeting_right_at_landing_is_missed() {
        let update = MapsHandler::new(directions())
            .handle(&Action::new(MAPS_API, "getTravelTime"), &context_with_meeting(14))
            .await
            .unwrap();
        assert_eq!(
            update[MEETING_AVAILABILITY_DATA].get("canMakeIt"),
            Some(&DynamicValue::Bool(false))
        );
    }

    #[tokio::test]
    async fn missing_meeting_location_is_missing_context() {
        let ctx = ExecutionContext::for_flight(&sample_flight());
        let err = MapsHandler::new(directions())
            .handle(&Action::new(MAPS_API, "getTravelTime"), &ctx)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            HandlerError::MissingContext("meetingAvailabilityData.location".into())
        );
    }

    /// Fails with a network error a fixed number of times before delegating.
    struct Flaky {
        inner: StaticDirections,
        failures_left: AtomicU32,
        calls: AtomicU32,
    }

    #[async_trait]
    impl DirectionsProvider for Flaky {
        async fn geocode(&self, address: &str) -> Result<Coordinate, HandlerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let left = self.failures_left.load(Ordering::SeqCst);
            if left > 0 {
                self.failures_left.store(left - 1, Ordering::SeqCst);
                return Err(HandlerError::Network("geocoder timed out".into()));
            }
            self.inner.geocode(address).await
        }

        async fn route(
            &self,
            from: Coordinate,
            to: Coordinate,
            at: DateTime<Utc>,
        ) -> Result<Route, HandlerError> {
            self.inner.route(from, to, at).await
        }
    }

    fn flaky(failures: u32) -> Flaky {
        Flaky {
            inner: directions(),
            failures_left: AtomicU32::new(failures),
            calls: AtomicU32::new(0),
        }
    }

    fn fast_retry(attempts: u32) -> RetryPolicy {
        RetryPolicy {
            attempts,
            base_delay: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn transient_geocode_failures_are_retried() {
        let handler = MapsHandler::with_retry(flaky(2), fast_retry(3));
        let result = handler
            .handle(&Action::new(MAPS_API, "getTravelTime"), &context_with_meeting(17))
            .await;
        assert!(result.is_ok());
        // two failures + success for origin, one call for destination
        assert_eq!(handler.provider.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn retry_gives_up_after_configured_attempts() {
        let handler = MapsHandler::with_retry(flaky(5), fast_retry(3));
        let err = handler
            .handle(&Action::new(MAPS_API, "getTravelTime"), &context_with_meeting(17))
            .await
            .unwrap_err();
        assert!(matches!(err, HandlerError::Network(_)));
        assert_eq!(handler.provider.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn haversine_distance_is_plausible() {
        let sfo = Coordinate::new(37.6213, -122.3790);
        let park = Coordinate::new(37.3349, -122.0090);
        let d = sfo.distance_to(&park);
        assert!((44_000.0..48_000.0).contains(&d), "distance {d}");
    }
}
