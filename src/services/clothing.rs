use async_trait::async_trait;

use crate::{
    context::ExecutionContext,
    dispatch::ActionHandler,
    error::HandlerError,
    models::{Action, DynamicValue, ValueMap},
    reconcile::{CLOTHING_ADVICE, WEATHER_DATA},
    value_map,
};

pub const CLOTHING_API: &str = "clothing";

/// Attire suggestions, typically backed by an LLM.
#[async_trait]
pub trait AdviceProvider: Send + Sync {
    async fn suggest_attire(
        &self,
        weather: &str,
        temperature: Option<f64>,
        event_type: Option<&str>,
    ) -> Result<String, HandlerError>;
}

/// Keyword and temperature rules, no network.
#[derive(Debug, Default, Clone)]
pub struct RuleBasedAdvice;

#[async_trait]
impl AdviceProvider for RuleBasedAdvice {
    async fn suggest_attire(
        &self,
        weather: &str,
        temperature: Option<f64>,
        event_type: Option<&str>,
    ) -> Result<String, HandlerError> {
        let weather = weather.to_lowercase();
        let mut parts = Vec::new();

        match temperature {
            Some(t) if t < 50.0 => parts.push("a warm coat"),
            Some(t) if t < 65.0 => parts.push("a light jacket"),
            Some(_) => parts.push("breathable layers"),
            None => {}
        }
        if weather.contains("rain") {
            parts.push("an umbrella");
        }
        if weather.contains("wind") {
            parts.push("a windbreaker");
        }
        if weather.contains("sun") {
            parts.push("sunglasses");
        }

        let base = match event_type.map(str::to_lowercase).as_deref() {
            Some(e) if e.contains("formal") || e.contains("meeting") || e.contains("business") => {
                "Business attire"
            }
            Some(e) if e.contains("outdoor") || e.contains("hike") => {
                "Comfortable outdoor clothing"
            }
            _ => "Smart casual clothing",
        };

        Ok(if parts.is_empty() {
            format!("{base}.")
        } else {
            format!("{base} with {}.", parts.join(" and "))
        })
    }
}

/// Uses the `weather` parameter or `weatherData.condition` from a prior step.
pub struct ClothingHandler<P> {
    provider: P,
}

impl<P: AdviceProvider> ClothingHandler<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<P: AdviceProvider> ActionHandler for ClothingHandler<P> {
    fn api(&self) -> &str {
        CLOTHING_API
    }

    async fn handle(
        &self,
        action: &Action,
        context: &ExecutionContext,
    ) -> Result<ValueMap, HandlerError> {
        let weather = match action.param("weather") {
            Some(DynamicValue::String(s)) => s.clone(),
            Some(_) => return Err(HandlerError::invalid_param("weather")),
            None => context
                .require_str(&format!("{WEATHER_DATA}.condition"))?
                .to_string(),
        };
        let temperature = context
            .get_path(&format!("{WEATHER_DATA}.temperature"))
            .and_then(DynamicValue::as_f64);
        let event_type = action.str_param("eventType");

        let suggestion = self
            .provider
            .suggest_attire(&weather, temperature, event_type)
            .await?;
        Ok(value_map! {
            CLOTHING_ADVICE => DynamicValue::Map(value_map! { "suggestion" => suggestion }),
        })
    }
}
