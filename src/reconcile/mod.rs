//! UI descriptor reconciliation.
//!
//! The LLM emits placeholder descriptors before any data exists. Once the
//! executor is done, each descriptor whose type has a known data source is
//! filled in from the final context. Pure: same input, same output.
//! Empty `text` components get an availability sentence when the context
//! has one to offer.

use crate::{
    context::ExecutionContext,
    models::{DynamicValue, UIComponent, ValueMap},
};

pub const MEETING_AVAILABILITY_DATA: &str = "meetingAvailabilityData";
pub const MAP_DATA: &str = "mapData";
pub const WEATHER_DATA: &str = "weatherData";
pub const CLOTHING_ADVICE: &str = "clothingAdvice";

pub fn reconcile(components: &[UIComponent], context: &ExecutionContext) -> Vec<UIComponent> {
    components
        .iter()
        .map(|component| reconcile_one(component, context))
        .collect()
}

fn reconcile_one(component: &UIComponent, context: &ExecutionContext) -> UIComponent {
    let mut out = component.clone();
    match component.component_type.as_str() {
        "meetingAvailability" => {
            splice(&mut out.properties, context.get(MEETING_AVAILABILITY_DATA))
        }
        "map" => splice(&mut out.properties, context.get(MAP_DATA)),
        "weather" => splice(&mut out.properties, context.get(WEATHER_DATA)),
        "clothingAdvice" => splice(&mut out.properties, context.get(CLOTHING_ADVICE)),
        "text" if has_no_text(component) => {
            if let Some(sentence) = availability_sentence(context) {
                out.properties
                    .insert("text".to_string(), DynamicValue::String(sentence));
            }
        }
        _ => {}
    }
    out
}

fn splice(properties: &mut ValueMap, source: Option<&DynamicValue>) {
    if let Some(data) = source.and_then(DynamicValue::as_map) {
        for (key, value) in data {
            properties.insert(key.clone(), value.clone());
        }
    }
}

/// Text the model wrote itself is left alone.
fn has_no_text(component: &UIComponent) -> bool {
    component
        .property("text")
        .and_then(DynamicValue::as_str)
        .is_none_or(|text| text.trim().is_empty())
}

/// Looks for `key` at the top level, then inside the meeting and map data.
fn lookup<'a>(context: &'a ExecutionContext, key: &str) -> Option<&'a DynamicValue> {
    context
        .get(key)
        .or_else(|| context.get(MEETING_AVAILABILITY_DATA)?.get(key))
        .or_else(|| context.get(MAP_DATA)?.get(key))
}

fn availability_sentence(context: &ExecutionContext) -> Option<String> {
    let can_make_it = lookup(context, "canMakeIt").and_then(DynamicValue::as_bool);
    let travel_time = lookup(context, "travelTime").and_then(DynamicValue::as_f64);

    let verdict = can_make_it.map(|ok| {
        if ok {
            "You can make it to your meeting."
        } else {
            "You might not make it to your meeting on time."
        }
    });
    let travel = travel_time.map(|t| format!("Estimated travel time: {}.", format_travel_time(t)));

    match (verdict, travel) {
        (Some(v), Some(t)) => Some(format!("{v} {t}")),
        (Some(v), None) => Some(v.to_string()),
        (None, Some(t)) => Some(t),
        (None, None) => None,
    }
}

/// `"1h 5m"`, or `"45m"` under an hour.
pub fn format_travel_time(seconds: f64) -> String {
    let minutes = (seconds.max(0.0) as i64) / 60;
    let hours = minutes / 60;
    let remaining = minutes % 60;
    if hours > 0 {
        format!("{hours}h {remaining}m")
    } else {
        format!("{remaining}m")
    }
}

/// Signed slack between two instants, e.g. `"+1h 5m"` or `"-0h 20m"`.
pub fn format_time_difference(seconds: f64) -> String {
    let magnitude = seconds.abs() as i64;
    let sign = if seconds >= 0.0 { "+" } else { "-" };
    format!("{sign}{}h {}m", magnitude / 3600, (magnitude % 3600) / 60)
}
