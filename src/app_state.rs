use std::sync::Arc;

use crate::services::{pipeline::Pipeline, queue::JobQueue};

/// Shared state for the worker loop and the health route.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub queue: Arc<JobQueue>,
}

impl AppState {
    pub fn new(pipeline: Pipeline, queue: JobQueue) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            queue: Arc::new(queue),
        }
    }
}
