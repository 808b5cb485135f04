//! The `ActionHandler` trait -- the executable behind one `api` name.
//!
//! Each domain collaborator (flight data, calendar, maps, weather, clothing
//! advice) implements this trait once per supported `api` value. The trait
//! is object-safe so handlers can live as `Arc<dyn ActionHandler>` in the
//! [`super::DispatchTable`].

use async_trait::async_trait;

use crate::{
    context::ExecutionContext,
    error::HandlerError,
    models::{Action, ValueMap},
};

#[async_trait]
pub trait ActionHandler: Send + Sync {
    /// The `api` value this handler serves (e.g. "calendar").
    fn api(&self) -> &str;

    /// Execute one action against the accumulated context.
    ///
    /// Returns a partial update that the executor merges into the context.
    /// Any retry policy lives inside the handler; the executor only sees the
    /// final outcome.
    async fn handle(
        &self,
        action: &Action,
        context: &ExecutionContext,
    ) -> Result<ValueMap, HandlerError>;
}

// Compile-time assertion: ActionHandler must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn ActionHandler) {}
};
