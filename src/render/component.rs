use std::fmt;

use serde::Serialize;

/// Pure description of one drawn component.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RenderedComponent {
    Text {
        text: String,
    },
    Map {
        from: Option<String>,
        to: Option<String>,
        travel_time: Option<String>,
        distance_km: Option<f64>,
    },
    MeetingAvailability {
        title: Option<String>,
        location: Option<String>,
        start_time: Option<String>,
        /// `None` when availability could not be determined.
        can_make_it: Option<bool>,
        time_difference: Option<String>,
    },
    Weather {
        condition: Option<String>,
        temperature: Option<f64>,
        location: Option<String>,
    },
    Advice {
        suggestion: String,
    },
    Error {
        message: String,
    },
    /// Visible but inert stand-in for a type no renderer knows.
    Unsupported {
        component_type: String,
    },
}

impl fmt::Display for RenderedComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderedComponent::Text { text } => write!(f, "{text}"),
            RenderedComponent::Map {
                from,
                to,
                travel_time,
                distance_km,
            } => {
                write!(
                    f,
                    "Route: {} -> {}",
                    from.as_deref().unwrap_or("?"),
                    to.as_deref().unwrap_or("?")
                )?;
                if let Some(t) = travel_time {
                    write!(f, "\nEstimated Travel Time: {t}")?;
                }
                if let Some(d) = distance_km {
                    write!(f, "\nDistance: {d:.1} km")?;
                }
                Ok(())
            }
            RenderedComponent::MeetingAvailability {
                title,
                location,
                start_time,
                can_make_it,
                time_difference,
            } => {
                writeln!(f, "Meeting Details")?;
                if let Some(t) = title {
                    writeln!(f, "Title: {t}")?;
                }
                if let Some(s) = start_time {
                    writeln!(f, "Start Time: {s}")?;
                }
                if let Some(l) = location {
                    writeln!(f, "Location: {l}")?;
                }
                match can_make_it {
                    Some(true) => write!(f, "You can make it to your meeting!")?,
                    Some(false) => write!(f, "You will not make it to your meeting on time.")?,
                    None => write!(f, "Unable to determine meeting availability.")?,
                }
                if let Some(d) = time_difference {
                    write!(f, "\nTime difference: {d}")?;
                }
                Ok(())
            }
            RenderedComponent::Weather {
                condition,
                temperature,
                location,
            } => {
                write!(f, "Weather: {}", condition.as_deref().unwrap_or("unavailable"))?;
                if let Some(t) = temperature {
                    write!(f, ", {t:.0}°F")?;
                }
                if let Some(l) = location {
                    write!(f, " in {l}")?;
                }
                Ok(())
            }
            RenderedComponent::Advice { suggestion } => write!(f, "Suggestion: {suggestion}"),
            RenderedComponent::Error { message } => write!(f, "Error: {message}"),
            RenderedComponent::Unsupported { component_type } => {
                write!(f, "Unsupported component: {component_type}")
            }
        }
    }
}

/// Ordered result of rendering a descriptor list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderedOutput {
    pub components: Vec<RenderedComponent>,
}

impl RenderedOutput {
    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RenderedComponent> {
        self.components.iter()
    }
}

impl fmt::Display for RenderedOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, component) in self.components.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
                writeln!(f)?;
            }
            write!(f, "{component}")?;
        }
        Ok(())
    }
}
