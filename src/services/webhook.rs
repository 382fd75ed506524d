use {
    crate::{
        adapters::stripe::SignatureVerifier,
        domain::{
            error::PaymentError,
            event::{CHARGE_SUCCEEDED, PAYMENT_SUCCEEDED, PaymentSucceededEvent, WebhookEnvelope},
            publisher::EventPublisher,
        },
    },
    tracing::Instrument,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// A `payment.succeeded` event was handed to the bus.
    Emitted(PaymentSucceededEvent),
    /// Verified and acknowledged, nothing to publish.
    Ignored { event_type: String },
}

impl Disposition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Emitted(_) => "emitted",
            Self::Ignored { .. } => "ignored",
        }
    }
}

/// Outcome of an accepted webhook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookReceipt {
    pub signature: String,
    pub disposition: Disposition,
}

/// Authenticate, decode and dispatch one webhook delivery.
///
/// Rejections come back as `SignatureMissing`, `SignatureInvalid` or
/// `EnvelopeDecode`; every other outcome is a receipt the caller should
/// acknowledge with 200. The body is verified as the exact bytes received
/// and only decoded afterwards. Publishing is detached: a bus failure is
/// logged and does not change the receipt.
///
/// Redelivered events are not deduplicated here.
#[tracing::instrument(
    name = "webhook",
    skip_all,
    fields(event_id = tracing::field::Empty, event_type = tracing::field::Empty)
)]
pub async fn handle_webhook(
    verifier: &SignatureVerifier,
    publisher: &dyn EventPublisher,
    body: &[u8],
    signature: Option<&str>,
) -> Result<WebhookReceipt, PaymentError> {
    let Some(signature) = signature else {
        tracing::warn!("webhook rejected: missing signature header");
        return Err(PaymentError::SignatureMissing);
    };

    let verified = verifier.verify(body, signature).inspect_err(|e| {
        tracing::warn!(reason = %e, "webhook rejected: verification failed");
    })?;

    let envelope = WebhookEnvelope::decode(verified).inspect_err(|e| {
        tracing::warn!(error = %e, "webhook rejected: malformed envelope");
    })?;

    let span = tracing::Span::current();
    if let Some(event_id) = envelope.event_id() {
        span.record("event_id", tracing::field::display(event_id));
    }
    span.record("event_type", tracing::field::display(envelope.event_type()));

    let disposition = match envelope {
        WebhookEnvelope::ChargeSucceeded { charge, .. } => {
            match PaymentSucceededEvent::from_charge(&charge) {
                Some(event) => {
                    emit(publisher, &event)?;
                    Disposition::Emitted(event)
                }
                None => {
                    tracing::warn!(
                        charge_id = %charge.id,
                        "charge carries no orderId metadata, not published"
                    );
                    Disposition::Ignored {
                        event_type: CHARGE_SUCCEEDED.to_string(),
                    }
                }
            }
        }
        WebhookEnvelope::Unrecognized { event_type, .. } => {
            tracing::info!("unhandled event type");
            Disposition::Ignored { event_type }
        }
    };

    Ok(WebhookReceipt {
        signature: verified.signature().to_string(),
        disposition,
    })
}

fn emit(publisher: &dyn EventPublisher, event: &PaymentSucceededEvent) -> Result<(), PaymentError> {
    let payload = serde_json::to_value(event)?;
    let publish = publisher.publish(PAYMENT_SUCCEEDED, payload);

    let order_id = event.order_id().to_string();
    tokio::spawn(
        async move {
            match publish.await {
                Ok(()) => tracing::info!(%order_id, "published {PAYMENT_SUCCEEDED}"),
                Err(e) => {
                    tracing::error!(%order_id, error = %e, "failed to publish {PAYMENT_SUCCEEDED}")
                }
            }
        }
        .in_current_span(),
    );
    Ok(())
}
