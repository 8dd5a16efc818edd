//! HTTP Handlers

use axum::{
    Json,
    body::Bytes,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use shop_payments::{
    PaymentError, PaymentIntentRequest, PaymentIntentResponse, TOTAL_NOT_POSITIVE,
    parse_json_total, parse_total,
};

use crate::state::AppState;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub stripe_configured: bool,
}

#[derive(Debug, Deserialize)]
pub struct TotalQuery {
    #[serde(default)]
    pub total: Option<String>,
}

/// Failures of the intent endpoint, each with its own status and body shape
#[derive(Debug)]
pub enum ApiError {
    /// 403 `{message}`: the total was rejected before any processor call
    Rejected(String),

    /// 500 `{error}`: the processor call failed
    Processor(String),

    /// 503 `{error}`: no processor configured
    PaymentsDisabled,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Rejected(message) => {
                (StatusCode::FORBIDDEN, Json(MessageResponse { message })).into_response()
            }
            Self::Processor(error) => {
                (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse { error })).into_response()
            }
            Self::PaymentsDisabled => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse {
                    error: "Payments not configured".into(),
                }),
            )
                .into_response(),
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Liveness probe
pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "success!".into(),
    })
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        stripe_configured: state.processor.is_some(),
    })
}

/// Create a payment intent for `total` minor units.
///
/// `total` comes from the query string, or failing that from a JSON body.
/// The amount is trusted as given.
pub async fn create_payment_intent(
    State(state): State<AppState>,
    query: Result<Query<TotalQuery>, QueryRejection>,
    body: Bytes,
) -> Result<(StatusCode, Json<PaymentIntentResponse>), ApiError> {
    let Ok(Query(query)) = query.inspect_err(|e| {
        tracing::warn!("Rejected payment intent request: unreadable query ({})", e);
    }) else {
        return Err(ApiError::Rejected(TOTAL_NOT_POSITIVE.into()));
    };

    let total = read_total(query, &body).map_err(|e| {
        tracing::warn!("Rejected payment intent request: {}", e);
        ApiError::Rejected(match e {
            PaymentError::InvalidAmount(message) => message,
            other => other.user_message(),
        })
    })?;

    let processor = state.processor.as_ref().ok_or_else(|| {
        tracing::warn!(amount = total, "Payment intent requested but payments are disabled");
        ApiError::PaymentsDisabled
    })?;

    let intent = processor.create_intent(total).await.map_err(|e| {
        tracing::error!(amount = total, processor = processor.name(), "Payment intent error: {}", e);
        ApiError::Processor(if state.expose_processor_errors {
            raw_message(e)
        } else {
            e.user_message()
        })
    })?;

    tracing::info!(intent_id = %intent.id, amount = intent.amount, "Created payment intent");

    Ok((
        StatusCode::CREATED,
        Json(PaymentIntentResponse {
            client_secret: intent.client_secret,
        }),
    ))
}

fn read_total(query: TotalQuery, body: &[u8]) -> shop_payments::Result<i64> {
    if let Some(raw) = query.total {
        return parse_total(&raw);
    }

    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(PaymentError::InvalidAmount(TOTAL_NOT_POSITIVE.into()));
    }

    let request: PaymentIntentRequest = serde_json::from_slice(body)
        .map_err(|_| PaymentError::InvalidAmount(TOTAL_NOT_POSITIVE.into()))?;

    request
        .total
        .as_ref()
        .map_or_else(|| Err(PaymentError::InvalidAmount(TOTAL_NOT_POSITIVE.into())), parse_json_total)
}

/// The processor's own message, without our error-kind prefix
fn raw_message(error: PaymentError) -> String {
    match error {
        PaymentError::Stripe(message)
        | PaymentError::Card(message)
        | PaymentError::Config(message)
        | PaymentError::InvalidAmount(message) => message,
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Request, header},
    };
    use shop_payments::{IntentProcessor, MockProcessor};
    use tower::ServiceExt;

    use crate::app::build_router;
    use crate::state::AppState;

    use super::*;

    fn router_with(processor: Option<Arc<MockProcessor>>, expose: bool) -> Router {
        build_router(AppState {
            processor: processor.map(|p| p as Arc<dyn IntentProcessor>),
            expose_processor_errors: expose,
        })
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_query(total: &str) -> Request<Body> {
        Request::post(format!("/payment/create?total={total}"))
            .body(Body::empty())
            .unwrap()
    }

    fn post_json(body: serde_json::Value) -> Request<Body> {
        Request::post("/payment/create")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_positive_total_creates_intent() {
        let processor = Arc::new(MockProcessor::new());
        let router = router_with(Some(processor.clone()), false);

        let (status, body) = send(router, post_query("2550")).await;

        assert_eq!(status, StatusCode::CREATED);
        let secret = body["clientSecret"].as_str().unwrap();
        assert!(secret.contains("_secret_"));
        assert_eq!(processor.created_amounts().await, vec![2550]);
    }

    #[tokio::test]
    async fn test_total_from_json_body() {
        let processor = Arc::new(MockProcessor::new());
        let router = router_with(Some(processor.clone()), false);

        let (status, body) = send(router, post_json(serde_json::json!({"total": 1999}))).await;

        assert_eq!(status, StatusCode::CREATED);
        assert!(body["clientSecret"].is_string());
        assert_eq!(processor.created_amounts().await, vec![1999]);
    }

    #[tokio::test]
    async fn test_query_takes_precedence_over_body() {
        let processor = Arc::new(MockProcessor::new());
        let router = router_with(Some(processor.clone()), false);

        let request = Request::post("/payment/create?total=500")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"total": 900}"#))
            .unwrap();
        let (status, _) = send(router, request).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(processor.created_amounts().await, vec![500]);
    }

    #[tokio::test]
    async fn test_non_positive_totals_never_reach_processor() {
        let processor = Arc::new(MockProcessor::new());

        for total in ["0", "-1", "-2550", "abc", ""] {
            let router = router_with(Some(processor.clone()), false);
            let (status, body) = send(router, post_query(total)).await;

            assert_eq!(status, StatusCode::FORBIDDEN, "total={total}");
            assert_eq!(body, serde_json::json!({"message": "total must be greater than 0"}));
        }

        let router = router_with(Some(processor.clone()), false);
        let (status, _) = send(router, post_json(serde_json::json!({"total": 0}))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        assert_eq!(processor.create_calls().await, 0);
    }

    #[tokio::test]
    async fn test_missing_total_is_rejected() {
        let processor = Arc::new(MockProcessor::new());

        let router = router_with(Some(processor.clone()), false);
        let request = Request::post("/payment/create").body(Body::empty()).unwrap();
        let (status, _) = send(router, request).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let router = router_with(Some(processor.clone()), false);
        let (status, _) = send(router, post_json(serde_json::json!({}))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        assert_eq!(processor.create_calls().await, 0);
    }

    #[tokio::test]
    async fn test_fractional_total_is_rejected() {
        let processor = Arc::new(MockProcessor::new());
        let router = router_with(Some(processor.clone()), false);

        let (status, body) = send(router, post_query("25.5")).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "total must be a whole number of minor units");
        assert_eq!(processor.create_calls().await, 0);
    }

    #[tokio::test]
    async fn test_inexact_totals_are_rejected() {
        let processor = Arc::new(MockProcessor::new());

        let router = router_with(Some(processor.clone()), false);
        let (status, body) = send(router, post_query("2550.0000000000001")).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "total must be a whole number of minor units");

        let router = router_with(Some(processor.clone()), false);
        let (status, body) = send(router, post_query("18446744073709551615")).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "total is too large");

        let router = router_with(Some(processor.clone()), false);
        let (status, body) = send(router, post_json(serde_json::json!({"total": u64::MAX}))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "total is too large");

        assert_eq!(processor.create_calls().await, 0);
    }

    #[tokio::test]
    async fn test_large_whole_total_is_forwarded_exactly() {
        let processor = Arc::new(MockProcessor::new());
        let router = router_with(Some(processor.clone()), false);

        let (status, _) = send(router, post_query("9007199254740993.0")).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(processor.created_amounts().await, vec![9_007_199_254_740_993]);
    }

    #[tokio::test]
    async fn test_unreadable_query_is_rejected() {
        let processor = Arc::new(MockProcessor::new());
        let router = router_with(Some(processor.clone()), false);

        let (status, body) = send(router, post_query("1&total=2")).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, serde_json::json!({"message": "total must be greater than 0"}));
        assert_eq!(processor.create_calls().await, 0);
    }

    #[tokio::test]
    async fn test_processor_failure_is_500() {
        let processor = Arc::new(MockProcessor::new().failing_create("Invalid API Key provided"));
        let router = router_with(Some(processor.clone()), false);

        let (status, body) = send(router, post_query("100")).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, serde_json::json!({"error": "Payment failed. Please try again."}));
        assert_eq!(processor.create_calls().await, 1);
    }

    #[tokio::test]
    async fn test_processor_failure_exposed_when_configured() {
        let processor = Arc::new(MockProcessor::new().failing_create("Invalid API Key provided"));
        let router = router_with(Some(processor), true);

        let (status, body) = send(router, post_query("100")).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, serde_json::json!({"error": "Invalid API Key provided"}));
    }

    #[tokio::test]
    async fn test_payments_disabled() {
        let router = router_with(None, false);
        let (status, body) = send(router, post_query("100")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "Payments not configured");

        // Validation still runs first
        let router = router_with(None, false);
        let (status, _) = send(router, post_query("0")).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_root_and_health() {
        let router = router_with(None, false);
        let (status, body) = send(router, Request::get("/").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({"message": "success!"}));

        let router = router_with(Some(Arc::new(MockProcessor::new())), false);
        let (status, body) = send(router, Request::get("/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["stripe_configured"], true);
    }
}
