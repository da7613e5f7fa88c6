use crate::dispatch::Dispatcher;
use prometheus::Registry;
use std::sync::Arc;
use std::time::Instant;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub started_at: Instant,
    pub registry: Registry,
}

impl AppState {
    pub fn new(dispatcher: Dispatcher, registry: Registry) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            started_at: Instant::now(),
            registry,
        }
    }
}
