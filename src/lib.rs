//! Plan-execute-render core for flight questions.
//!
//! An LLM turns a user's question about a flight into an [`ActionPlan`];
//! [`parser::parse_plan`] validates it, [`ActionExecutor`] runs its actions in
//! order against a [`DispatchTable`] of domain handlers, [`reconcile`]
//! fills the plan's UI descriptors from the resulting context, and
//! [`Renderer`] turns them into a [`RenderedOutput`]. [`QuerySession`] ties
//! the stages together for one flight.

pub mod config;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod executor;
pub mod llm;
pub mod models;
pub mod parser;
pub mod prompt;
pub mod reconcile;
pub mod render;
pub mod services;
pub mod session;
pub mod utils;

pub use config::AppConfig;
pub use context::ExecutionContext;
pub use dispatch::{ActionHandler, DispatchTable};
pub use error::{Error, HandlerError, ParseError, Result};
pub use executor::{ActionExecutor, ExecutionOutcome, ExecutionReport};
pub use llm::PlanSource;
pub use models::{Action, ActionPlan, DynamicValue, Flight, UIComponent, ValueMap};
pub use parser::parse_plan;
pub use reconcile::reconcile;
pub use render::{RenderedComponent, RenderedOutput, Renderer};
pub use session::{QueryOutcome, QueryResponse, QuerySession};
