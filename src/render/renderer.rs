//! Capability-polymorphic rendering of UI descriptors.
//!
//! Each component type maps to a [`ComponentRenderer`]. Types with no
//! registered renderer come out as [`RenderedComponent::Unsupported`]; they
//! are never dropped and never panic, since type strings are LLM-generated.

use std::collections::HashMap;

use super::component::{RenderedComponent, RenderedOutput};
use crate::{
    models::{DynamicValue, UIComponent},
    reconcile::{format_time_difference, format_travel_time},
};

pub trait ComponentRenderer: Send + Sync {
    fn render(&self, component: &UIComponent) -> RenderedComponent;
}

impl<F> ComponentRenderer for F
where
    F: Fn(&UIComponent) -> RenderedComponent + Send + Sync,
{
    fn render(&self, component: &UIComponent) -> RenderedComponent {
        self(component)
    }
}

pub struct Renderer {
    renderers: HashMap<String, Box<dyn ComponentRenderer>>,
}

impl Renderer {
    /// A renderer with no capabilities; every component renders as unsupported.
    pub fn empty() -> Self {
        Self {
            renderers: HashMap::new(),
        }
    }

    pub fn register(
        &mut self,
        component_type: impl Into<String>,
        renderer: impl ComponentRenderer + 'static,
    ) -> &mut Self {
        self.renderers
            .insert(component_type.into(), Box::new(renderer));
        self
    }

    pub fn supports(&self, component_type: &str) -> bool {
        self.renderers.contains_key(component_type)
    }

    pub fn render_one(&self, component: &UIComponent) -> RenderedComponent {
        match self.renderers.get(&component.component_type) {
            Some(renderer) => renderer.render(component),
            None => RenderedComponent::Unsupported {
                component_type: component.component_type.clone(),
            },
        }
    }

    pub fn render(&self, components: &[UIComponent]) -> RenderedOutput {
        RenderedOutput {
            components: components.iter().map(|c| self.render_one(c)).collect(),
        }
    }
}

impl Default for Renderer {
    fn default() -> Self {
        let mut renderer = Self::empty();
        renderer
            .register("text", render_text)
            .register("map", render_map)
            .register("meetingAvailability", render_meeting)
            .register("weather", render_weather)
            .register("clothingAdvice", render_advice)
            .register("error", render_error);
        renderer
    }
}

fn string_prop(component: &UIComponent, key: &str) -> Option<String> {
    match component.property(key)? {
        DynamicValue::Unsupported => None,
        other => Some(other.to_display_string()),
    }
}

/// Instants (native or date-shaped strings) to the minute, other text as is.
fn time_prop(component: &UIComponent, key: &str) -> Option<String> {
    match component.property(key)?.as_timestamp() {
        Some(t) => Some(t.format("%Y-%m-%dT%H:%MZ").to_string()),
        None => string_prop(component, key),
    }
}

fn number_prop(component: &UIComponent, key: &str) -> Option<f64> {
    component.property(key).and_then(DynamicValue::as_f64)
}

fn render_text(component: &UIComponent) -> RenderedComponent {
    RenderedComponent::Text {
        text: string_prop(component, "text")
            .or_else(|| string_prop(component, "content"))
            .unwrap_or_default(),
    }
}

fn render_map(component: &UIComponent) -> RenderedComponent {
    RenderedComponent::Map {
        from: string_prop(component, "fromLocation"),
        to: string_prop(component, "toLocation"),
        travel_time: number_prop(component, "travelTime").map(format_travel_time),
        distance_km: number_prop(component, "distance").map(|m| m / 1000.0),
    }
}

fn render_meeting(component: &UIComponent) -> RenderedComponent {
    RenderedComponent::MeetingAvailability {
        title: string_prop(component, "title"),
        location: string_prop(component, "location"),
        start_time: time_prop(component, "eventStartTime"),
        can_make_it: component.property("canMakeIt").and_then(DynamicValue::as_bool),
        time_difference: number_prop(component, "timeDifference").map(format_time_difference),
    }
}

fn render_weather(component: &UIComponent) -> RenderedComponent {
    RenderedComponent::Weather {
        condition: string_prop(component, "condition"),
        temperature: number_prop(component, "temperature"),
        location: string_prop(component, "location"),
    }
}

fn render_advice(component: &UIComponent) -> RenderedComponent {
    RenderedComponent::Advice {
        suggestion: string_prop(component, "suggestion")
            .unwrap_or_else(|| "No clothing suggestion available.".to_string()),
    }
}

fn render_error(component: &UIComponent) -> RenderedComponent {
    RenderedComponent::Error {
        message: string_prop(component, "text")
            .or_else(|| string_prop(component, "message"))
            .unwrap_or_else(|| "Something went wrong.".to_string()),
    }
}
