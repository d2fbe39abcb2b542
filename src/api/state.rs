use std::sync::Arc;

use crate::dashboard::Panel;
use crate::dataset::Dataset;

/// Shared, read-only state for request handlers.
#[derive(Clone)]
pub struct AppState {
    pub dataset: Arc<Dataset>,
    pub panels: Arc<Vec<Panel>>,
}

impl AppState {
    pub fn new(dataset: Dataset, panels: Vec<Panel>) -> Self {
        Self {
            dataset: Arc::new(dataset),
            panels: Arc::new(panels),
        }
    }
}
