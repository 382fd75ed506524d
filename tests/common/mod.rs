#![allow(dead_code)]

use pay_relay::AppState;
use pay_relay::adapters::stripe::{SignatureVerifier, signature::compute_signature};
use pay_relay::config::RedirectUrls;
use pay_relay::domain::checkout::{LineItem, OrderCheckoutRequest, SessionRequest};
use pay_relay::domain::error::PaymentError;
use pay_relay::domain::provider::{CheckoutProvider, CreatedSession};
use pay_relay::domain::publisher::{EventPublisher, PublishFuture};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const WEBHOOK_SECRET: &str = "whsec_test123secret456";
pub const SUCCESS_URL: &str = "http://localhost:3003/payments/success";
pub const CANCEL_URL: &str = "http://localhost:3003/payments/cancel";
pub const SESSION_URL: &str = "https://checkout.stripe.com/c/pay/cs_test_1";

// ── Fakes ──────────────────────────────────────────────────────────────────

/// Records every session request; answers with a canned session or error.
#[derive(Default)]
pub struct FakeCheckout {
    pub requests: Mutex<Vec<SessionRequest>>,
    pub fail_with: Option<(Option<u16>, String)>,
    pub omit_url: bool,
}

impl FakeCheckout {
    pub fn failing(status: Option<u16>, message: &str) -> Self {
        Self {
            fail_with: Some((status, message.to_string())),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<SessionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl CheckoutProvider for FakeCheckout {
    fn create_session(
        &self,
        request: SessionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<CreatedSession, PaymentError>> + Send + '_>> {
        let success_url = request.success_url.clone();
        let cancel_url = request.cancel_url.clone();
        self.requests.lock().unwrap().push(request);

        let result = match &self.fail_with {
            Some((status, message)) => Err(PaymentError::Upstream {
                status: *status,
                message: message.clone(),
            }),
            None => Ok(CreatedSession {
                url: (!self.omit_url).then(|| SESSION_URL.to_string()),
                success_url: Some(success_url),
                cancel_url: Some(cancel_url),
            }),
        };
        Box::pin(async move { result })
    }
}

/// Captures published events at call time and counts the publish futures
/// that were driven to completion.
#[derive(Default)]
pub struct RecordingPublisher {
    pub published: Mutex<Vec<(String, serde_json::Value)>>,
    pub completed: Arc<AtomicUsize>,
    pub fail: bool,
}

impl RecordingPublisher {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn events(&self) -> Vec<(String, serde_json::Value)> {
        self.published.lock().unwrap().clone()
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

impl EventPublisher for RecordingPublisher {
    fn publish(&self, pattern: &str, data: serde_json::Value) -> PublishFuture {
        self.published
            .lock()
            .unwrap()
            .push((pattern.to_string(), data));
        let fail = self.fail;
        let completed = self.completed.clone();
        Box::pin(async move {
            completed.fetch_add(1, Ordering::SeqCst);
            if fail {
                Err(PaymentError::Publish("bus unreachable".into()))
            } else {
                Ok(())
            }
        })
    }
}

// ── Builders ───────────────────────────────────────────────────────────────

pub fn verifier() -> SignatureVerifier {
    SignatureVerifier::new(WEBHOOK_SECRET, 300)
}

pub fn redirects() -> RedirectUrls {
    RedirectUrls {
        success: SUCCESS_URL.parse().unwrap(),
        cancel: CANCEL_URL.parse().unwrap(),
    }
}

pub fn app_state(checkout: Arc<FakeCheckout>, publisher: Arc<RecordingPublisher>) -> AppState {
    AppState {
        checkout,
        publisher,
        verifier: Arc::new(verifier()),
        redirects: Arc::new(redirects()),
    }
}

/// `Stripe-Signature` header for `body`, signed now.
pub fn sign(body: &[u8]) -> String {
    sign_with(WEBHOOK_SECRET, body)
}

pub fn sign_with(secret: &str, body: &[u8]) -> String {
    let ts = chrono::Utc::now().timestamp();
    format!("t={ts},v1={}", compute_signature(secret, ts, body))
}

pub fn charge_succeeded_body(
    charge_id: &str,
    metadata: serde_json::Value,
    receipt_url: Option<&str>,
) -> String {
    serde_json::json!({
        "id": "evt_test_1",
        "object": "event",
        "type": "charge.succeeded",
        "data": {
            "object": {
                "id": charge_id,
                "object": "charge",
                "amount": 2000,
                "currency": "usd",
                "metadata": metadata,
                "receipt_url": receipt_url,
            }
        }
    })
    .to_string()
}

pub fn event_body(event_type: &str) -> String {
    serde_json::json!({
        "id": "evt_test_2",
        "type": event_type,
        "data": { "object": { "id": "ch_other" } }
    })
    .to_string()
}

pub fn order(order_id: &str, items: &[(&str, f64, i64)]) -> OrderCheckoutRequest {
    OrderCheckoutRequest {
        order_id: order_id.to_string(),
        currency: "usd".to_string(),
        items: items
            .iter()
            .map(|(name, price, quantity)| LineItem {
                name: name.to_string(),
                price: *price,
                quantity: *quantity,
            })
            .collect(),
    }
}

/// Lets detached publish tasks run to completion.
pub async fn settle() {
    for _ in 0..4 {
        tokio::task::yield_now().await;
    }
}
