use std::sync::Arc;

use fitback_events::{EventBus, Mailer};
use fitback_vision::FrameAnalyzer;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything is behind `Arc` or already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: fitback_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Outbound email. SMTP in production, a logging mailer otherwise.
    pub mailer: Arc<dyn Mailer>,
    /// Vision model used to validate try-on frames. `None` disables validation.
    pub frame_analyzer: Option<Arc<dyn FrameAnalyzer>>,
    /// Event bus for domain events.
    pub event_bus: Arc<EventBus>,
}
