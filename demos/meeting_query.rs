use std::{env, sync::Arc};

use airschedule::{
    ActionExecutor, AppConfig, Flight, PlanSource, QuerySession, Renderer,
    llm::{ChatCompletionsPlanSource, StaticPlanSource},
    services::{
        CalendarEvent, Coordinate, Forecast, RetryPolicy, RuleBasedAdvice, ScheduleStatusProvider,
        StaticCalendar, StaticDirections, StaticWeather, standard_table,
    },
    utils::init_logging,
};
use chrono::{TimeZone, Utc};

const CANNED_PLAN: &str = r#"```json
{
  "intent": "check_meeting_availability",
  "entities": {"meeting": "Design review"},
  "actions": [
    {"api": "calendar", "method": "getEvent", "parameters": {}},
    {"api": "maps", "method": "getTravelTime", "parameters": {}}, // needs the meeting location
    {"api": "weather", "method": "getForecast", "parameters": {}},
    {"api": "clothing", "method": "getAdvice", "parameters": {}}
  ],
  "ui_components": [
    {"type": "text", "properties": {}},
    {"type": "meetingAvailability", "properties": {}},
    {"type": "map", "properties": {}},
    {"type": "weather", "properties": {}},
    {"type": "clothingAdvice", "properties": {}},
    {"type": "boardingPass", "properties": {}}
  ]
}
```"#;

#[tokio::main]
async fn main() -> airschedule::Result<()> {
    let config = match env::args().nth(1) {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    init_logging(&config.log_level);

    let flight: Flight = serde_json::from_value(serde_json::json!({
        "airline": "United",
        "airlineCode": "UA",
        "flightNumber": "UA123",
        "departureTime": "2024-10-14T08:00:00Z",
        "arrivalTime": "2024-10-14T14:30:00Z",
        "departureAirport": "JFK",
        "departureAirportName": "John F. Kennedy International",
        "arrivalAirport": "SFO",
        "arrivalAirportName": "San Francisco International"
    }))?;

    let meeting_start = Utc
        .with_ymd_and_hms(2024, 10, 14, 17, 0, 0)
        .single()
        .ok_or_else(|| airschedule::Error::Config("invalid meeting time".into()))?;
    let table = standard_table(
        ScheduleStatusProvider,
        StaticCalendar::new(vec![CalendarEvent::new(
            "Design review",
            meeting_start,
            Some("Apple Park"),
        )]),
        StaticDirections::new(55.0)
            .with_place("SFO", Coordinate::new(37.6213, -122.3790))
            .with_place("Apple Park", Coordinate::new(37.3349, -122.0090)),
        RetryPolicy::from(&config.maps),
        StaticWeather::new().with_fallback(Forecast::new("Partly cloudy", 64.0)),
        RuleBasedAdvice,
    );

    // Ask the real model when a key is configured, otherwise replay a canned plan.
    let plan_source: Arc<dyn PlanSource> =
        if env::var(&config.llm.api_key_env).is_ok_and(|k| !k.is_empty()) {
            Arc::new(ChatCompletionsPlanSource::from_env(
                config.llm.clone(),
                table.apis().into_iter().map(str::to_string).collect(),
            )?)
        } else {
            Arc::new(StaticPlanSource::new(CANNED_PLAN))
        };

    let session = QuerySession::new(
        flight,
        plan_source,
        ActionExecutor::new(Arc::new(table)),
        Renderer::default(),
    );

    let response = session
        .process_query("Can I make it to my design review after landing?")
        .await;
    println!("{}", response.rendered);
    println!("\noutcome: {:?}", response.outcome);
    Ok(())
}
