use std::sync::Arc;

use crate::auth::store::AccountStore;
use crate::config::Config;
use crate::matching::ai_client::GeminiClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub ai: GeminiClient,
    /// Account persistence behind the `AccountStore` capability.
    /// Production uses the Postgres realization.
    pub store: Arc<dyn AccountStore>,
    pub config: Config,
}
