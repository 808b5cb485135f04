use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tracing::debug;

use crate::{
    context::ExecutionContext,
    dispatch::ActionHandler,
    error::HandlerError,
    models::{Action, DynamicValue, ValueMap},
    reconcile::MEETING_AVAILABILITY_DATA,
    value_map,
};

pub const CALENDAR_API: &str = "calendar";

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEvent {
    pub title: String,
    pub start: DateTime<Utc>,
    pub location: Option<String>,
}

impl CalendarEvent {
    pub fn new(title: impl Into<String>, start: DateTime<Utc>, location: Option<&str>) -> Self {
        Self {
            title: title.into(),
            start,
            location: location.map(str::to_string),
        }
    }
}

/// Read access to the user's calendar.
#[async_trait]
pub trait CalendarSource: Send + Sync {
    /// Events starting on `day` (UTC), in any order.
    async fn events_on(&self, day: NaiveDate) -> Result<Vec<CalendarEvent>, HandlerError>;
}

#[derive(Debug, Default, Clone)]
pub struct StaticCalendar {
    events: Vec<CalendarEvent>,
}

impl StaticCalendar {
    pub fn new(events: Vec<CalendarEvent>) -> Self {
        Self { events }
    }
}

#[async_trait]
impl CalendarSource for StaticCalendar {
    async fn events_on(&self, day: NaiveDate) -> Result<Vec<CalendarEvent>, HandlerError> {
        Ok(self
            .events
            .iter()
            .filter(|e| e.start.date_naive() == day)
            .cloned()
            .collect())
    }
}

/// Finds the meeting on the flight's arrival day.
///
/// Picks the first event starting at or after arrival (or the first of the
/// day when everything started earlier), optionally narrowed by an `event`
/// title parameter. `timeDifference` here is meeting start minus arrival in
/// seconds; the maps handler later refines it with travel time.
pub struct CalendarHandler<S> {
    source: S,
}

impl<S: CalendarSource> CalendarHandler<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }
}

#[async_trait]
impl<S: CalendarSource> ActionHandler for CalendarHandler<S> {
    fn api(&self) -> &str {
        CALENDAR_API
    }

    async fn handle(
        &self,
        action: &Action,
        context: &ExecutionContext,
    ) -> Result<ValueMap, HandlerError> {
        let flight = context.flight()?;
        let arrival = flight.effective_arrival();
        let wanted = match action.param("event") {
            Some(DynamicValue::String(s)) => Some(s.to_lowercase()),
            Some(_) => return Err(HandlerError::invalid_param("event")),
            None => None,
        };

        let mut events: Vec<CalendarEvent> = self
            .source
            .events_on(arrival.date_naive())
            .await?
            .into_iter()
            .filter(|e| {
                wanted
                    .as_deref()
                    .is_none_or(|w| e.title.to_lowercase().contains(w))
            })
            .collect();
        events.sort_by_key(|e| e.start);
        debug!(candidates = events.len(), "calendar events on arrival day");

        let event = events
            .iter()
            .find(|e| e.start >= arrival)
            .or_else(|| events.first())
            .ok_or_else(|| {
                HandlerError::NoData(format!("no calendar event on {}", arrival.date_naive()))
            })?;

        let mut data = value_map! {
            "title" => event.title.clone(),
            "eventStartTime" => event.start,
            "flightArrivalTime" => arrival,
            "timeDifference" => (event.start - arrival).num_seconds() as f64,
        };
        if let Some(location) = &event.location {
            data.insert("location".to_string(), DynamicValue::from(location.clone()));
        }
        Ok(value_map! { MEETING_AVAILABILITY_DATA => DynamicValue::Map(data) })
    }
}
