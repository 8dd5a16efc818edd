//! Router

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers::{create_payment_intent, health_check, root};
use crate::state::AppState;

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    // Any origin may call in, as the storefront is served from elsewhere
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health & info
        .route("/", get(root))
        .route("/health", get(health_check))

        // Payments
        .route("/payment/create", post(create_payment_intent))

        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
