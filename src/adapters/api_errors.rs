use crate::domain::error::PaymentError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

pub struct ApiError(pub PaymentError);

impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        Self(err)
    }
}

/// Status, machine-readable code and caller-facing message for an error.
///
/// Webhook rejections get fixed text so nothing about the verification
/// leaks. Processor failures keep the processor's status and message.
pub fn describe(err: &PaymentError) -> (StatusCode, &'static str, String) {
    match err {
        PaymentError::Validation(msg) => {
            (StatusCode::BAD_REQUEST, "validation_error", msg.clone())
        }
        PaymentError::SignatureMissing => (
            StatusCode::BAD_REQUEST,
            "webhook_error",
            "Missing stripe-signature header".to_string(),
        ),
        PaymentError::SignatureInvalid(_) => (
            StatusCode::BAD_REQUEST,
            "webhook_error",
            "webhook verification failed".to_string(),
        ),
        PaymentError::EnvelopeDecode(_) => (
            StatusCode::BAD_REQUEST,
            "webhook_error",
            "malformed webhook payload".to_string(),
        ),
        PaymentError::Upstream { status, message } => {
            let status = status
                .and_then(|s| StatusCode::from_u16(s).ok())
                .filter(|s| s.is_client_error() || s.is_server_error())
                .unwrap_or(StatusCode::BAD_GATEWAY);
            (status, "upstream_error", message.clone())
        }
        PaymentError::Publish(err) => {
            tracing::error!("publish error: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "internal error".to_string(),
            )
        }
        PaymentError::Transport(err) => {
            tracing::error!("bus transport error: {err}");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "internal_error",
                "internal error".to_string(),
            )
        }
        PaymentError::Serialization(err) => {
            tracing::error!("serialization error: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "internal error".to_string(),
            )
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = describe(&self.0);

        let body = serde_json::json!({
            "error_code": error_code,
            "message": message,
        });

        (status, Json(body)).into_response()
    }
}
