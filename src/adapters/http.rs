use {
    crate::{
        AppState,
        adapters::api_errors::ApiError,
        domain::{
            checkout::{CheckoutSessionResult, OrderCheckoutRequest},
            error::PaymentError,
        },
        services::{checkout::create_payment_session, webhook::handle_webhook},
    },
    axum::{
        Json, Router,
        body::Bytes,
        extract::{DefaultBodyLimit, State, rejection::JsonRejection},
        http::{HeaderMap, StatusCode},
        routing::{get, post},
    },
    tower_http::trace::TraceLayer,
};

pub const STRIPE_SIGNATURE: &str = "stripe-signature";

/// Stripe events are typically well under 20 KB.
const WEBHOOK_BODY_LIMIT: usize = 64 * 1024;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "ok" }))
        .route(
            "/payments/create-payment-session",
            post(create_payment_session_handler),
        )
        .route("/payments/success", get(payment_success))
        .route("/payments/cancel", get(payment_cancel))
        .route(
            "/payments/webhook",
            post(stripe_webhook_handler).layer(DefaultBodyLimit::max(WEBHOOK_BODY_LIMIT)),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn create_payment_session_handler(
    State(state): State<AppState>,
    payload: Result<Json<OrderCheckoutRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CheckoutSessionResult>), ApiError> {
    let Json(request) = payload.map_err(|e| PaymentError::Validation(e.body_text()))?;
    let result = create_payment_session(&*state.checkout, &state.redirects, request).await?;
    Ok((StatusCode::CREATED, Json(result)))
}

pub async fn payment_success() -> Json<serde_json::Value> {
    Json(serde_json::json!({"ok": true, "message": "Payment successful"}))
}

pub async fn payment_cancel() -> Json<serde_json::Value> {
    Json(serde_json::json!({"ok": false, "message": "Payment cancel"}))
}

/// Takes the body as raw bytes: it has to reach the verifier untouched.
pub async fn stripe_webhook_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<serde_json::Value>, ApiError> {
    // A header that is present but not visible ASCII still counts as present
    // and fails verification.
    let signature = headers
        .get(STRIPE_SIGNATURE)
        .map(|v| v.to_str().unwrap_or_default());

    let receipt = handle_webhook(&state.verifier, &*state.publisher, &body, signature).await?;

    Ok(Json(serde_json::json!({
        "status": receipt.disposition.as_str(),
        "sig": receipt.signature,
    })))
}
