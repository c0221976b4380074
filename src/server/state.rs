//! Application state management

use std::sync::Arc;

use crate::inference::InferenceEngine;
use crate::staging::StagingArea;

use super::ServerConfig;

/// Application state shared across handlers.
///
/// The engine is built before the router and never replaced, so every request
/// sees the same classifier instance.
pub struct AppState {
    pub config: ServerConfig,
    pub engine: Arc<InferenceEngine>,
    pub staging: StagingArea,
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(config: ServerConfig, engine: InferenceEngine) -> Self {
        let staging = StagingArea::new(config.staging_dir.clone());
        Self {
            config,
            engine: Arc::new(engine),
            staging,
            started_at: chrono::Utc::now(),
        }
    }

    /// Seconds since the state was created
    pub fn uptime_secs(&self) -> i64 {
        chrono::Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds()
    }
}
