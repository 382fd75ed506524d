use crate::{
    config::RedirectUrls,
    domain::{
        checkout::{CheckoutSessionResult, OrderCheckoutRequest},
        error::PaymentError,
        provider::CheckoutProvider,
    },
};

/// Validate the order, open one hosted session for it and return only the
/// redirect URLs. The processor call is made exactly once and never retried.
#[tracing::instrument(
    name = "create_payment_session",
    skip_all,
    fields(order_id = %request.order_id, items = request.items.len())
)]
pub async fn create_payment_session(
    provider: &dyn CheckoutProvider,
    redirects: &RedirectUrls,
    request: OrderCheckoutRequest,
) -> Result<CheckoutSessionResult, PaymentError> {
    let session_request =
        request.into_session_request(redirects.success.as_str(), redirects.cancel.as_str())?;

    let created = provider
        .create_session(session_request)
        .await
        .inspect_err(|e| tracing::warn!(error = %e, "checkout session creation failed"))?;

    let session_url = created.url.ok_or_else(|| PaymentError::Upstream {
        status: None,
        message: "no checkout URL returned".into(),
    })?;

    tracing::info!("checkout session created");

    Ok(CheckoutSessionResult {
        success_url: created
            .success_url
            .unwrap_or_else(|| redirects.success.to_string()),
        cancel_url: created
            .cancel_url
            .unwrap_or_else(|| redirects.cancel.to_string()),
        session_url,
    })
}
