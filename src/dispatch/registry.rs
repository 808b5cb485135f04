//! Dispatch table -- maps an action's `api` name to its handler.
//!
//! Built once when a session starts and shared immutably with the executor,
//! so new domains are added by registering a handler rather than touching
//! the executor.

use std::{collections::HashMap, sync::Arc};

use tracing::info;

use super::handler::ActionHandler;
use crate::error::HandlerError;

#[derive(Default, Clone)]
pub struct DispatchTable {
    handlers: HashMap<String, Arc<dyn ActionHandler>>,
}

impl DispatchTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under the name returned by [`ActionHandler::api`].
    ///
    /// A handler already registered under that name is replaced and returned.
    pub fn register(
        &mut self,
        handler: impl ActionHandler + 'static,
    ) -> Option<Arc<dyn ActionHandler>> {
        self.register_arc(Arc::new(handler))
    }

    pub fn register_arc(
        &mut self,
        handler: Arc<dyn ActionHandler>,
    ) -> Option<Arc<dyn ActionHandler>> {
        let api = handler.api().to_string();
        info!("registered handler for api '{}'", api);
        self.handlers.insert(api, handler)
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, handler: impl ActionHandler + 'static) -> Self {
        self.register(handler);
        self
    }

    /// Look up the handler for `api`.
    ///
    /// An unregistered name is an ordinary, reportable outcome:
    /// [`HandlerError::UnknownApi`].
    pub fn resolve(&self, api: &str) -> Result<&dyn ActionHandler, HandlerError> {
        self.handlers
            .get(api)
            .map(|h| h.as_ref())
            .ok_or_else(|| HandlerError::UnknownApi(api.to_string()))
    }

    /// Registered api names, sorted.
    pub fn apis(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for DispatchTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchTable")
            .field("apis", &self.apis())
            .finish()
    }
}
