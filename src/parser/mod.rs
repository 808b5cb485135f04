//! Turns raw LLM output into a validated [`ActionPlan`].
//!
//! Model output is mostly JSON but tends to arrive wrapped in a fenced code
//! block and sprinkled with `//` or `/* */` comments. Both are removed before
//! decoding. Missing `actions` and `entities` decode as empty; `intent` and
//! `ui_components` are required.

use tracing::debug;

use crate::{
    error::ParseError,
    models::ActionPlan,
    utils::string_util::{StripCodeBlock, StripJsonComments},
};

/// Fence and comment stripping, without decoding.
pub fn clean_plan_text(raw: &str) -> String {
    raw.strip_code_block().strip_json_comments().trim().to_string()
}

pub fn parse_plan(raw: &str) -> Result<ActionPlan, ParseError> {
    let cleaned = clean_plan_text(raw);
    if cleaned.is_empty() {
        return Err(ParseError::Empty);
    }

    match serde_json::from_str::<ActionPlan>(&cleaned) {
        Ok(plan) => {
            debug!(
                intent = %plan.intent,
                actions = plan.actions.len(),
                components = plan.ui_components.len(),
                "parsed action plan"
            );
            Ok(plan)
        }
        Err(source) => Err(ParseError::Decode { source, cleaned }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DynamicValue;

    #[test]
    fn fenced_minimal_plan_defaults_optional_fields() {
        let raw = "```json\n{ \"intent\": \"x\", \"ui_components\": [] }\n```";
        let plan = parse_plan(raw).unwrap();
        assert_eq!(plan.intent, "x");
        assert!(plan.actions.is_empty());
        assert!(plan.entities.is_empty());
        assert!(plan.ui_components.is_empty());
    }

    #[test]
    fn commented_plan_with_mixed_scalars() {
        let raw = r#"
```json
{
  // what the user wants
  "intent": "check_meeting_availability",
  "entities": {"flight": "UA123", "passengers": 2},
  "actions": [
    /* meeting first, then travel time */
    {"api": "calendar", "method": "getEvent", "parameters": {"event": "Design review", "strict": true}},
    {"api": "maps", "method": "getTravelTime", "parameters": {"buffer": 0.5, "url": "https://maps.example/x"}}
  ],
  "ui_components": [
    {"type": "meetingAvailability", "properties": {}},
    {"type": "map", "properties": {"zoom": 12}}
  ]
}
```"#;
        let plan = parse_plan(raw).unwrap();
        assert_eq!(plan.actions.len(), 2);
        assert_eq!(plan.actions[0].api, "calendar");
        assert_eq!(plan.actions[0].param("strict"), Some(&DynamicValue::Bool(true)));
        assert_eq!(plan.actions[1].param("buffer"), Some(&DynamicValue::Float(0.5)));
        assert_eq!(plan.actions[1].str_param("url"), Some("https://maps.example/x"));
        assert_eq!(plan.entities["passengers"], DynamicValue::Integer(2));
        assert_eq!(plan.ui_components[1].property("zoom"), Some(&DynamicValue::Integer(12)));
    }

    #[test]
    fn missing_ui_components_is_rejected_with_cleaned_text() {
        let err = parse_plan("```\n{\"intent\": \"x\"} // trailing\n```").unwrap_err();
        assert!(matches!(err, ParseError::Decode { .. }));
        assert_eq!(err.cleaned_text(), Some("{\"intent\": \"x\"}"));
    }

    #[test]
    fn single_line_fenced_plan_is_parsed() {
        let raw = r#"```json {"intent": "status", "actions": [{"api": "flightData"}], "ui_components": []} ```"#;
        let plan = parse_plan(raw).unwrap();
        assert_eq!(plan.intent, "status");
        assert_eq!(plan.actions[0].api, "flightData");
    }

    #[test]
    fn prose_is_rejected() {
        let err = parse_plan("Sure! Here is your plan.").unwrap_err();
        assert!(matches!(err, ParseError::Decode { .. }));
    }

    #[test]
    fn empty_output_is_rejected() {
        assert!(matches!(parse_plan("```\n```"), Err(ParseError::Empty)));
        assert!(matches!(parse_plan("  // nothing here"), Err(ParseError::Empty)));
    }

    #[test]
    fn actions_without_method_or_parameters_are_accepted() {
        let plan = parse_plan(r#"{"intent":"i","actions":[{"api":"weather"}],"ui_components":[]}"#)
            .unwrap();
        assert_eq!(plan.actions[0].method, "");
        assert!(plan.actions[0].parameters.is_empty());
    }
}
