use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::PlanSource;
use crate::{
    config::LlmConfig,
    error::{Error, Result},
    models::Flight,
    prompt::{build_system_prompt, build_user_prompt},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Plan source backed by an OpenAI-compatible `/chat/completions` endpoint.
pub struct ChatCompletionsPlanSource {
    client: reqwest::Client,
    config: LlmConfig,
    api_key: String,
    apis: Vec<String>,
}

impl ChatCompletionsPlanSource {
    /// `apis` are the names advertised to the model, normally
    /// [`DispatchTable::apis`](crate::dispatch::DispatchTable::apis).
    pub fn new(config: LlmConfig, api_key: impl Into<String>, apis: Vec<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            config,
            api_key: api_key.into(),
            apis,
        })
    }

    /// Reads the API key from the environment variable named in `config`.
    pub fn from_env(config: LlmConfig, apis: Vec<String>) -> Result<Self> {
        let key = config.api_key()?;
        Self::new(config, key, apis)
    }

    pub fn messages(&self, query: &str, flight: &Flight) -> Vec<ChatMessage> {
        let apis: Vec<&str> = self.apis.iter().map(String::as_str).collect();
        vec![
            ChatMessage::system(build_system_prompt(&apis)),
            ChatMessage::user(build_user_prompt(query, flight)),
        ]
    }
}

fn first_choice(response: ChatResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content.trim().to_string())
        .filter(|content| !content.is_empty())
        .ok_or_else(|| Error::Llm("no content in completion response".to_string()))
}

#[async_trait]
impl PlanSource for ChatCompletionsPlanSource {
    async fn plan_text(&self, query: &str, flight: &Flight) -> Result<String> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: self.messages(query, flight),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };
        debug!(model = %self.config.model, "requesting action plan");

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "completion request failed");
            return Err(Error::Llm(format!("HTTP {status}: {body}")));
        }

        first_choice(response.json::<ChatResponse>().await?)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::models::flight::fixtures::sample_flight;

    #[test]
    fn request_body_matches_chat_completions_shape() {
        let request = ChatRequest {
            model: "gpt-3.5-turbo",
            messages: vec![ChatMessage::system("s"), ChatMessage::user("u")],
            max_tokens: 500,
            temperature: 0.0,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "model": "gpt-3.5-turbo",
                "messages": [
                    {"role": "system", "content": "s"},
                    {"role": "user", "content": "u"}
                ],
                "max_tokens": 500,
                "temperature": 0.0
            })
        );
    }

    #[test]
    fn first_choice_content_is_trimmed() {
        let response: ChatResponse = serde_json::from_value(json!({
            "choices": [{"message": {"role": "assistant", "content": "  {\"intent\": \"x\"}\n"}}]
        }))
        .unwrap();
        assert_eq!(first_choice(response).unwrap(), "{\"intent\": \"x\"}");
    }

    #[test]
    fn empty_choices_are_an_llm_error() {
        let response: ChatResponse = serde_json::from_value(json!({"choices": []})).unwrap();
        assert!(matches!(first_choice(response), Err(Error::Llm(_))));
    }

    #[test]
    fn messages_advertise_registered_apis() {
        let source = ChatCompletionsPlanSource::new(
            LlmConfig::default(),
            "test-key",
            vec!["calendar".into(), "maps".into()],
        )
        .unwrap();
        let messages = source.messages("Can I make it?", &sample_flight());
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert!(messages[0].content.contains(" - calendar"));
        assert!(messages[1].content.contains("Can I make it?"));
    }
}
