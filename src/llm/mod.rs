//! The LLM collaborator boundary: something that turns a query into raw
//! action-plan text. Parsing that text is the parser's job, not this one's.

pub mod chat;

use async_trait::async_trait;

pub use chat::{ChatCompletionsPlanSource, ChatMessage};

use crate::{error::Result, models::Flight};

#[async_trait]
pub trait PlanSource: Send + Sync {
    async fn plan_text(&self, query: &str, flight: &Flight) -> Result<String>;
}

/// Returns the same text for every query.
#[derive(Debug, Clone)]
pub struct StaticPlanSource {
    text: String,
}

impl StaticPlanSource {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait]
impl PlanSource for StaticPlanSource {
    async fn plan_text(&self, _query: &str, _flight: &Flight) -> Result<String> {
        Ok(self.text.clone())
    }
}
