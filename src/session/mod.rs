//! One flight's query-processing session.
//!
//! Drives a query through the whole pipeline: plan source, parser,
//! executor, reconciliation and rendering. Every failure along the way
//! degrades to a rendered `"error"` component; nothing here panics on a
//! malformed plan or a failed domain call.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::{
    context::ExecutionContext,
    executor::{ActionExecutor, ExecutionOutcome},
    llm::PlanSource,
    models::{Flight, UIComponent},
    parser::parse_plan,
    reconcile::reconcile,
    render::{RenderedOutput, Renderer},
};

#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// The plan source failed or produced text that is not a valid plan.
    PlanRejected { reason: String },
    Executed(ExecutionOutcome),
}

impl QueryOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, QueryOutcome::Executed(outcome) if outcome.is_success())
    }
}

#[derive(Debug, Clone)]
pub struct QueryResponse {
    pub intent: Option<String>,
    /// Reconciled descriptors, in render order.
    pub components: Vec<UIComponent>,
    pub rendered: RenderedOutput,
    pub outcome: QueryOutcome,
    pub context: ExecutionContext,
}

pub struct QuerySession {
    flight: Flight,
    plan_source: Arc<dyn PlanSource>,
    executor: ActionExecutor,
    renderer: Renderer,
    in_flight: Mutex<CancellationToken>,
}

impl QuerySession {
    pub fn new(
        flight: Flight,
        plan_source: Arc<dyn PlanSource>,
        executor: ActionExecutor,
        renderer: Renderer,
    ) -> Self {
        Self {
            flight,
            plan_source,
            executor,
            renderer,
            in_flight: Mutex::new(CancellationToken::new()),
        }
    }

    pub fn flight(&self) -> &Flight {
        &self.flight
    }

    /// Cancels whatever query is currently running, if any.
    pub async fn cancel(&self) {
        self.in_flight.lock().await.cancel();
    }

    /// Supersedes the previous query and hands out a fresh token.
    async fn begin_query(&self) -> CancellationToken {
        let mut current = self.in_flight.lock().await;
        current.cancel();
        *current = CancellationToken::new();
        current.clone()
    }

    pub async fn process_query(&self, query: &str) -> QueryResponse {
        let cancel = self.begin_query().await;
        let seed = ExecutionContext::for_flight(&self.flight);
        info!(flight = %self.flight.flight_number, query, "processing query");

        let raw = match self.plan_source.plan_text(query, &self.flight).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "plan source failed");
                return self.rejected(
                    format!("Could not interpret your question: {e}"),
                    seed,
                );
            }
        };

        let plan = match parse_plan(&raw) {
            Ok(plan) => plan,
            Err(e) => {
                warn!(error = %e, cleaned = ?e.cleaned_text(), "rejecting action plan");
                return self.rejected(
                    format!("Could not understand the plan for your question: {e}"),
                    seed,
                );
            }
        };

        let report = self
            .executor
            .execute_with_cancel(&plan, seed, &cancel)
            .await;
        let components = reconcile(&report.ui_components, &report.context);
        let rendered = self.renderer.render(&components);

        QueryResponse {
            intent: Some(plan.intent),
            components,
            rendered,
            outcome: QueryOutcome::Executed(report.outcome),
            context: report.context,
        }
    }

    fn rejected(&self, message: String, context: ExecutionContext) -> QueryResponse {
        let components = vec![UIComponent::error(message.clone())];
        let rendered = self.renderer.render(&components);
        QueryResponse {
            intent: None,
            components,
            rendered,
            outcome: QueryOutcome::PlanRejected { reason: message },
            context,
        }
    }
}
