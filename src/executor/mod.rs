//! Sequential action executor.
//!
//! Runs a plan's actions strictly in declared order. Each handler sees the
//! context accumulated by every earlier step; its update is merged before the
//! next action starts. The first failure halts the plan: an `"error"`
//! component is appended and the context is returned as it stood after the
//! last successful step.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    context::ExecutionContext,
    dispatch::DispatchTable,
    error::HandlerError,
    models::{ActionPlan, UIComponent},
};

/// How a plan execution ended.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionOutcome {
    Completed {
        actions_run: usize,
    },
    Failed {
        index: usize,
        api: String,
        error: HandlerError,
    },
    /// Stopped before action `index` started.
    Cancelled {
        index: usize,
    },
}

impl ExecutionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionOutcome::Completed { .. })
    }
}

#[derive(Debug, Clone)]
pub struct ExecutionReport {
    pub context: ExecutionContext,
    /// Plan components, followed by the synthesized error component on failure.
    pub ui_components: Vec<UIComponent>,
    pub outcome: ExecutionOutcome,
}

#[derive(Debug, Clone)]
pub struct ActionExecutor {
    table: Arc<DispatchTable>,
}

impl ActionExecutor {
    pub fn new(table: Arc<DispatchTable>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &DispatchTable {
        &self.table
    }

    pub async fn execute(&self, plan: &ActionPlan, context: ExecutionContext) -> ExecutionReport {
        self.execute_with_cancel(plan, context, &CancellationToken::new())
            .await
    }

    pub async fn execute_with_cancel(
        &self,
        plan: &ActionPlan,
        mut context: ExecutionContext,
        cancel: &CancellationToken,
    ) -> ExecutionReport {
        let mut ui_components = plan.ui_components.clone();
        info!(
            intent = %plan.intent,
            actions = plan.actions.len(),
            "executing action plan"
        );

        for (index, action) in plan.actions.iter().enumerate() {
            if cancel.is_cancelled() {
                info!(index, "plan execution cancelled");
                return ExecutionReport {
                    context,
                    ui_components,
                    outcome: ExecutionOutcome::Cancelled { index },
                };
            }

            debug!(index, api = %action.api, method = %action.method, "running action");

            let result = match self.table.resolve(&action.api) {
                Ok(handler) => handler.handle(action, &context).await,
                Err(e) => Err(e),
            };

            match result {
                Ok(update) => {
                    debug!(index, api = %action.api, keys = update.len(), "action succeeded");
                    context.merge(update);
                }
                Err(error) => {
                    warn!(index, api = %action.api, %error, "action failed, halting plan");
                    ui_components.push(UIComponent::error(error.to_string()));
                    return ExecutionReport {
                        context,
                        ui_components,
                        outcome: ExecutionOutcome::Failed {
                            index,
                            api: action.api.clone(),
                            error,
                        },
                    };
                }
            }
        }

        info!(actions_run = plan.actions.len(), "action plan completed");
        ExecutionReport {
            context,
            ui_components,
            outcome: ExecutionOutcome::Completed {
                actions_run: plan.actions.len(),
            },
        }
    }
}
