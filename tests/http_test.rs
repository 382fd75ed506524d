mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::*;
use http_body_util::BodyExt;
use pay_relay::adapters::http::router;
use std::sync::Arc;
use tower::ServiceExt;

async fn send(
    app: axum::Router,
    request: Request<Body>,
) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

fn app() -> (axum::Router, Arc<FakeCheckout>, Arc<RecordingPublisher>) {
    let checkout = Arc::new(FakeCheckout::default());
    let publisher = Arc::new(RecordingPublisher::default());
    let app = router(app_state(checkout.clone(), publisher.clone()));
    (app, checkout, publisher)
}

fn webhook(body: &str, signature: Option<&str>) -> Request<Body> {
    let mut builder = Request::post("/payments/webhook").header("content-type", "application/json");
    if let Some(sig) = signature {
        builder = builder.header("stripe-signature", sig);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

// ── static routes ──────────────────────────────────────────────────────────

#[tokio::test]
async fn success_and_cancel_acknowledgements() {
    let (app, _, _) = app();

    let (status, body) = send(
        app.clone(),
        Request::get("/payments/success").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({"ok": true, "message": "Payment successful"}));

    let (status, body) = send(
        app,
        Request::get("/payments/cancel").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({"ok": false, "message": "Payment cancel"}));
}

// ── session creation ───────────────────────────────────────────────────────

#[tokio::test]
async fn create_session_returns_redirect_urls_only() {
    let (app, checkout, _) = app();
    let payload = serde_json::json!({
        "orderId": "ord-1",
        "currency": "usd",
        "items": [{"name": "Mug", "price": 12.5, "quantity": 2}],
    });

    let (status, body) = send(
        app,
        Request::post("/payments/create-payment-session")
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        body,
        serde_json::json!({
            "successUrl": SUCCESS_URL,
            "cancelUrl": CANCEL_URL,
            "sessionUrl": SESSION_URL,
        })
    );
    assert_eq!(checkout.calls().len(), 1);
}

#[tokio::test]
async fn create_session_rejects_invalid_order() {
    let (app, checkout, _) = app();
    let payload = serde_json::json!({"orderId": "ord-1", "currency": "usd", "items": []});

    let (status, body) = send(
        app,
        Request::post("/payments/create-payment-session")
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "validation_error");
    assert!(checkout.calls().is_empty());
}

#[tokio::test]
async fn create_session_passes_processor_status_through() {
    let checkout = Arc::new(FakeCheckout::failing(Some(402), "Your card was declined."));
    let app = router(app_state(checkout, Arc::new(RecordingPublisher::default())));
    let payload = serde_json::json!({
        "orderId": "ord-1",
        "currency": "usd",
        "items": [{"name": "Mug", "price": 1, "quantity": 1}],
    });

    let (status, body) = send(
        app,
        Request::post("/payments/create-payment-session")
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert_eq!(body["message"], "Your card was declined.");
}

// ── webhook ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn webhook_without_signature_is_400() {
    let (app, _, publisher) = app();

    let (status, body) = send(app, webhook(&event_body("charge.succeeded"), None)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Missing stripe-signature header");
    assert!(publisher.events().is_empty());
}

#[tokio::test]
async fn webhook_with_bad_signature_reveals_nothing() {
    let (app, _, _) = app();
    let body = event_body("charge.failed");
    let sig = sign_with("whsec_wrong", body.as_bytes());

    let (status, json) = send(app, webhook(&body, Some(sig.as_str()))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json,
        serde_json::json!({
            "error_code": "webhook_error",
            "message": "webhook verification failed",
        })
    );
}

#[tokio::test]
async fn webhook_charge_succeeded_is_acknowledged_and_published() {
    let (app, _, publisher) = app();
    let body = charge_succeeded_body(
        "ch_1",
        serde_json::json!({"orderId": "abc123"}),
        Some("https://x/r1"),
    );
    let sig = sign(body.as_bytes());

    let (status, json) = send(app, webhook(&body, Some(sig.as_str()))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, serde_json::json!({"status": "emitted", "sig": sig}));
    let events = publisher.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].0, "payment.succeeded");
    assert_eq!(events[0].1["orderId"], "abc123");
}

#[tokio::test]
async fn webhook_unrecognized_type_is_200() {
    let (app, _, publisher) = app();
    let body = event_body("payment_intent.created");
    let sig = sign(body.as_bytes());

    let (status, json) = send(app, webhook(&body, Some(sig.as_str()))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ignored");
    assert!(publisher.events().is_empty());
}

#[tokio::test]
async fn webhook_malformed_payload_is_400() {
    let (app, _, _) = app();
    let body = "not json at all";
    let sig = sign(body.as_bytes());

    let (status, json) = send(app, webhook(body, Some(sig.as_str()))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "malformed webhook payload");
}
