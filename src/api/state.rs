use std::sync::Arc;

use crate::services::RoutineEngine;

/// Shared application state
///
/// Everything behind it is read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RoutineEngine>,
}

impl AppState {
    pub fn new(engine: RoutineEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}
