pub mod checkout;
pub mod signature;

pub use {checkout::StripeCheckout, signature::SignatureVerifier};

use crate::domain::error::PaymentError;

/// Keeps the processor's own status and message so callers see the real
/// failure.
pub(crate) fn upstream_error(err: stripe::StripeError) -> PaymentError {
    match err {
        stripe::StripeError::Stripe(req) => PaymentError::Upstream {
            status: Some(req.http_status),
            message: req
                .message
                .unwrap_or_else(|| format!("stripe request failed: {:?}", req.error_type)),
        },
        other => PaymentError::Upstream {
            status: None,
            message: other.to_string(),
        },
    }
}
