use {
    super::error::PaymentError,
    std::{future::Future, pin::Pin},
};

pub type PublishFuture = Pin<Box<dyn Future<Output = Result<(), PaymentError>> + Send + 'static>>;

/// Fire-and-forget emitter onto the message bus.
///
/// The returned future owns everything it needs so callers can detach it
/// with `tokio::spawn`; no acknowledgement from consumers is awaited.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, pattern: &str, data: serde_json::Value) -> PublishFuture;
}
