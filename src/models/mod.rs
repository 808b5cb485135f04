pub mod flight;
pub mod plan;
pub mod value;

pub use flight::{CarbonEmissions, Flight};
pub use plan::{Action, ActionPlan, ERROR_COMPONENT, UIComponent};
pub use value::{DynamicValue, UNSUPPORTED_SENTINEL, ValueMap, parse_timestamp};
