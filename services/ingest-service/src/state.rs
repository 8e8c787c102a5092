use std::sync::Arc;

use crate::record::LogPolicy;

#[derive(Clone)]
pub struct AppState {
    pub log_policy: Arc<LogPolicy>,
}

impl AppState {
    pub fn new(log_policy: LogPolicy) -> Self {
        Self {
            log_policy: Arc::new(log_policy),
        }
    }
}
