//! Shared application state.

use std::sync::Arc;

use crate::config::ServiceConfig;
use crate::pipeline::Pipeline;

/// Cloneable handle shared across HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
}

impl AppState {
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            pipeline: Arc::new(Pipeline::new(config)),
        }
    }
}
