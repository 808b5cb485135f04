use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    context::ExecutionContext,
    dispatch::ActionHandler,
    error::HandlerError,
    models::{Action, DynamicValue, ValueMap},
    reconcile::WEATHER_DATA,
    value_map,
};

pub const WEATHER_API: &str = "weather";

#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    pub condition: String,
    /// Degrees Fahrenheit.
    pub temperature: f64,
}

impl Forecast {
    pub fn new(condition: impl Into<String>, temperature: f64) -> Self {
        Self {
            condition: condition.into(),
            temperature,
        }
    }
}

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn forecast(&self, location: &str, at: DateTime<Utc>) -> Result<Forecast, HandlerError>;
}

/// Fixed forecasts per location, with an optional fallback.
#[derive(Debug, Default, Clone)]
pub struct StaticWeather {
    forecasts: HashMap<String, Forecast>,
    fallback: Option<Forecast>,
}

impl StaticWeather {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_forecast(mut self, location: &str, forecast: Forecast) -> Self {
        self.forecasts.insert(location.to_lowercase(), forecast);
        self
    }

    pub fn with_fallback(mut self, forecast: Forecast) -> Self {
        self.fallback = Some(forecast);
        self
    }
}

#[async_trait]
impl WeatherProvider for StaticWeather {
    async fn forecast(&self, location: &str, _at: DateTime<Utc>) -> Result<Forecast, HandlerError> {
        self.forecasts
            .get(&location.to_lowercase())
            .or(self.fallback.as_ref())
            .cloned()
            .ok_or_else(|| HandlerError::NoData(format!("no forecast for '{location}'")))
    }
}

pub struct WeatherHandler<P> {
    provider: P,
}

impl<P: WeatherProvider> WeatherHandler<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<P: WeatherProvider> ActionHandler for WeatherHandler<P> {
    fn api(&self) -> &str {
        WEATHER_API
    }

    async fn handle(
        &self,
        action: &Action,
        context: &ExecutionContext,
    ) -> Result<ValueMap, HandlerError> {
        let flight = context.flight()?;
        let location = match action.param("location") {
            Some(DynamicValue::String(s)) => s.clone(),
            Some(_) => return Err(HandlerError::invalid_param("location")),
            None => flight.arrival_airport.clone(),
        };
        let at = match action.param("time") {
            Some(value) => value
                .as_timestamp()
                .ok_or_else(|| HandlerError::invalid_param("time"))?,
            None => flight.effective_arrival(),
        };

        let forecast = self.provider.forecast(&location, at).await?;
        Ok(value_map! {
            WEATHER_DATA => DynamicValue::Map(value_map! {
                "condition" => forecast.condition,
                "temperature" => forecast.temperature,
                "location" => location,
                "time" => at,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::models::flight::fixtures::sample_flight;

    #[tokio::test]
    async fn defaults_to_arrival_airport() {
        let weather = StaticWeather::new().with_forecast("SFO", Forecast::new("Cloudy", 61.0));
        let ctx = ExecutionContext::for_flight(&sample_flight());
        let update = WeatherHandler::new(weather)
            .handle(&Action::new(WEATHER_API, "getForecast"), &ctx)
            .await
            .unwrap();
        let data = &update[WEATHER_DATA];
        assert_eq!(data.get("condition"), Some(&DynamicValue::from("Cloudy")));
        assert_eq!(data.get("location"), Some(&DynamicValue::from("SFO")));
        assert_eq!(
            data.get("time"),
            Some(&DynamicValue::Timestamp(sample_flight().arrival_time))
        );
    }

    #[tokio::test]
    async fn offset_less_time_param_is_read_as_utc() {
        let weather = StaticWeather::new().with_fallback(Forecast::new("Sunny", 70.0));
        let ctx = ExecutionContext::for_flight(&sample_flight());
        let action =
            Action::new(WEATHER_API, "getForecast").with_param("time", "2024-10-14T15:00:00");
        let update = WeatherHandler::new(weather).handle(&action, &ctx).await.unwrap();
        assert_eq!(
            update[WEATHER_DATA].get("time"),
            Some(&DynamicValue::Timestamp(
                Utc.with_ymd_and_hms(2024, 10, 14, 15, 0, 0).unwrap()
            ))
        );
    }

    #[tokio::test]
    async fn unknown_location_without_fallback_is_no_data() {
        let ctx = ExecutionContext::for_flight(&sample_flight());
        let action = Action::new(WEATHER_API, "getForecast").with_param("location", "Atlantis");
        let err = WeatherHandler::new(StaticWeather::new())
            .handle(&action, &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, HandlerError::NoData(_)));
    }

    #[tokio::test]
    async fn free_text_time_is_rejected() {
        let ctx = ExecutionContext::for_flight(&sample_flight());
        let action = Action::new(WEATHER_API, "getForecast").with_param("time", "tonight");
        let weather = StaticWeather::new().with_fallback(Forecast::new("Sunny", 70.0));
        let err = WeatherHandler::new(weather)
            .handle(&action, &ctx)
            .await
            .unwrap_err();
        assert_eq!(err, HandlerError::invalid_param("time"));
    }
}
