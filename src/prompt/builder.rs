use crate::models::Flight;

pub fn build_system_prompt(apis: &[&str]) -> String {
    let api_list = if apis.is_empty() {
        "None".to_string()
    } else {
        apis.iter()
            .map(|api| format!(" - {api}"))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        r#"
You are an assistant for a flight information app.
Interpret the user's query and generate an action plan.
Your only output should be valid JSON matching this structure:

{{
  "intent": "string",
  "entities": {{"name": "value"}},
  "actions": [
    {{"api": "api name", "method": "string", "parameters": {{"param": "value"}}}}
  ],
  "ui_components": [
    {{"type": "text | map | meetingAvailability | weather | clothingAdvice", "properties": {{}}}}
  ]
}}

Actions run in the order listed; later actions can use the results of earlier ones.
Available APIs:
{api_list}

IMPORTANT: These are the ONLY APIs available. Do not use or reference any other APIs.
Respond only with the JSON data and no additional text.
"#
    )
}

pub fn build_user_prompt(query: &str, flight: &Flight) -> String {
    format!(
        r#"
Flight: {}
User Query: "{}"

Action Plan:"#,
        flight.summary(),
        query.trim()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::flight::fixtures::sample_flight;

    #[test]
    fn system_prompt_lists_registered_apis() {
        let prompt = build_system_prompt(&["calendar", "maps"]);
        assert!(prompt.contains(" - calendar\n - maps"));
        assert!(prompt.contains("\"ui_components\""));
    }

    #[test]
    fn user_prompt_embeds_query_and_flight() {
        let prompt = build_user_prompt("  Can I make it to my meeting? ", &sample_flight());
        assert!(prompt.contains("User Query: \"Can I make it to my meeting?\""));
        assert!(prompt.contains("UA123 from JFK to SFO"));
    }
}
