use std::sync::Arc;

use civicflow_core::RoutingTable;

use crate::config::Config;
use crate::llm_client::GenerativeModel;
use crate::media::MediaStore;

/// Shared relay state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable model backend. Default: GeminiClient.
    pub model: Arc<dyn GenerativeModel>,
    /// Local disk unless `S3_BUCKET` is configured.
    pub media: Arc<dyn MediaStore>,
    pub routing: Arc<RoutingTable>,
    pub config: Config,
}
