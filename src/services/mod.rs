//! Domain handlers: flight data, calendar, maps, weather and clothing advice.
//!
//! Each handler wraps a narrow provider trait so the network clients behind
//! it stay outside the crate and tests can plug in in-memory providers.

pub mod calendar;
pub mod clothing;
pub mod flight_data;
pub mod maps;
pub mod weather;

pub use calendar::{CALENDAR_API, CalendarEvent, CalendarHandler, CalendarSource, StaticCalendar};
pub use clothing::{AdviceProvider, CLOTHING_API, ClothingHandler, RuleBasedAdvice};
pub use flight_data::{
    FLIGHT_DATA_API, FlightDataHandler, FlightStatus, FlightStatusProvider, ScheduleStatusProvider,
};
pub use maps::{
    Coordinate, DirectionsProvider, MAPS_API, MapsHandler, RetryPolicy, Route, StaticDirections,
};
pub use weather::{Forecast, StaticWeather, WEATHER_API, WeatherHandler, WeatherProvider};

use crate::dispatch::DispatchTable;

/// Registers the five standard domain handlers.
pub fn standard_table<F, C, D, W, A>(
    flights: F,
    calendar: C,
    directions: D,
    retry: RetryPolicy,
    weather: W,
    advice: A,
) -> DispatchTable
where
    F: FlightStatusProvider + 'static,
    C: CalendarSource + 'static,
    D: DirectionsProvider + 'static,
    W: WeatherProvider + 'static,
    A: AdviceProvider + 'static,
{
    DispatchTable::new()
        .with(FlightDataHandler::new(flights))
        .with(CalendarHandler::new(calendar))
        .with(MapsHandler::with_retry(directions, retry))
        .with(WeatherHandler::new(weather))
        .with(ClothingHandler::new(advice))
}
