use thiserror::Error;

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("validation: {0}")]
    Validation(String),

    #[error("webhook signature header missing")]
    SignatureMissing,

    #[error("webhook signature: {0}")]
    SignatureInvalid(#[from] SignatureError),

    #[error("webhook envelope: {0}")]
    EnvelopeDecode(String),

    #[error("upstream: {message}")]
    Upstream { status: Option<u16>, message: String },

    #[error("publish: {0}")]
    Publish(String),

    /// Connecting or subscribing to the message bus failed.
    #[error("bus transport: {0}")]
    Transport(String),

    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Why a signature was rejected. Logged, never sent back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("malformed header: {0}")]
    MalformedHeader(&'static str),

    #[error("timestamp outside tolerance (age {age_secs}s)")]
    OutsideTolerance { age_secs: i64 },

    #[error("no matching v1 signature")]
    Mismatch,
}
