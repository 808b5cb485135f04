use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::value::{DynamicValue, ValueMap};

/// Component type used for synthesized failure descriptors.
pub const ERROR_COMPONENT: &str = "error";

/// Structured interpretation of one user query, as produced by the LLM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionPlan {
    pub intent: String,

    #[serde(default)]
    pub entities: ValueMap,

    /// Execution order is the order of this list.
    #[serde(default)]
    pub actions: Vec<Action>,

    #[serde(rename = "ui_components", alias = "uiComponents")]
    pub ui_components: Vec<UIComponent>,
}

impl ActionPlan {
    pub fn new(intent: impl Into<String>) -> Self {
        Self {
            intent: intent.into(),
            entities: ValueMap::new(),
            actions: Vec::new(),
            ui_components: Vec::new(),
        }
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    pub fn with_component(mut self, component: UIComponent) -> Self {
        self.ui_components.push(component);
        self
    }
}

/// One declared API invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub api: String,

    #[serde(default)]
    pub method: String,

    #[serde(default)]
    pub parameters: ValueMap,
}

impl Action {
    pub fn new(api: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            api: api.into(),
            method: method.into(),
            parameters: ValueMap::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<DynamicValue>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    pub fn param(&self, key: &str) -> Option<&DynamicValue> {
        self.parameters.get(key)
    }

    pub fn str_param(&self, key: &str) -> Option<&str> {
        self.param(key).and_then(DynamicValue::as_str)
    }
}

/// A typed, property-bagged descriptor for one renderable unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UIComponent {
    #[serde(skip, default = "Uuid::new_v4")]
    pub id: Uuid,

    #[serde(rename = "type")]
    pub component_type: String,

    #[serde(default)]
    pub properties: ValueMap,
}

impl UIComponent {
    pub fn new(component_type: impl Into<String>, properties: ValueMap) -> Self {
        Self {
            id: Uuid::new_v4(),
            component_type: component_type.into(),
            properties,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        let mut properties = ValueMap::new();
        properties.insert("text".to_string(), DynamicValue::String(message.into()));
        Self::new(ERROR_COMPONENT, properties)
    }

    pub fn is_error(&self) -> bool {
        self.component_type == ERROR_COMPONENT
    }

    pub fn property(&self, key: &str) -> Option<&DynamicValue> {
        self.properties.get(key)
    }
}

// The generated id is identity for list diffing only, not content.
impl PartialEq for UIComponent {
    fn eq(&self, other: &Self) -> bool {
        self.component_type == other.component_type && self.properties == other.properties
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn component_equality_ignores_id() {
        let a = UIComponent::error("boom");
        let b = UIComponent::error("boom");
        assert_ne!(a.id, b.id);
        assert_eq!(a, b);
    }

    #[test]
    fn component_id_is_not_serialized() {
        let encoded = serde_json::to_value(UIComponent::error("boom")).unwrap();
        assert_eq!(encoded, json!({"type": "error", "properties": {"text": "boom"}}));
    }

    #[test]
    fn plan_accepts_camel_case_component_key() {
        let plan: ActionPlan =
            serde_json::from_value(json!({"intent": "x", "uiComponents": [{"type": "text"}]}))
                .unwrap();
        assert_eq!(plan.ui_components.len(), 1);
        assert!(plan.ui_components[0].properties.is_empty());
    }
}
