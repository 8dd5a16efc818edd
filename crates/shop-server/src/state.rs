//! Application State

use std::sync::Arc;

use shop_payments::IntentProcessor;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Payment processor (optional - None if not configured)
    pub processor: Option<Arc<dyn IntentProcessor>>,

    /// Forward raw processor messages to callers
    pub expose_processor_errors: bool,
}
