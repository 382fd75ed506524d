//! Stripe webhook signature scheme.
//!
//! The `Stripe-Signature` header looks like `t=<unix>,v1=<hex>[,v1=<hex>][,v0=<hex>]`.
//! Each `v1` is HMAC-SHA256 over `"<t>." ++ body`, keyed by the endpoint
//! secret. Several `v1` entries appear while a secret is being rolled.

use {
    crate::domain::{error::SignatureError, event::VerifiedPayload},
    hmac::{Hmac, Mac},
    sha2::Sha256,
    subtle::ConstantTimeEq,
};

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, PartialEq, Eq)]
struct SignatureHeader {
    timestamp: i64,
    v1: Vec<Vec<u8>>,
}

impl SignatureHeader {
    fn parse(header: &str) -> Result<Self, SignatureError> {
        let mut timestamp = None;
        let mut v1 = Vec::new();

        for part in header.split(',') {
            let (key, value) = part
                .split_once('=')
                .ok_or(SignatureError::MalformedHeader("entry without '='"))?;

            match key.trim() {
                "t" => {
                    let ts = value
                        .trim()
                        .parse()
                        .map_err(|_| SignatureError::MalformedHeader("timestamp is not an integer"))?;
                    timestamp = Some(ts);
                }
                "v1" => {
                    let sig = hex::decode(value.trim())
                        .map_err(|_| SignatureError::MalformedHeader("v1 is not hex"))?;
                    v1.push(sig);
                }
                // v0 and future schemes
                _ => {}
            }
        }

        let timestamp = timestamp.ok_or(SignatureError::MalformedHeader("missing timestamp"))?;
        if v1.is_empty() {
            return Err(SignatureError::MalformedHeader("missing v1 signature"));
        }
        Ok(Self { timestamp, v1 })
    }
}

/// Checks webhook bodies against the endpoint secret.
pub struct SignatureVerifier {
    secret: String,
    tolerance_secs: u64,
}

impl SignatureVerifier {
    /// A tolerance of `0` disables the timestamp check.
    pub fn new(secret: impl Into<String>, tolerance_secs: u64) -> Self {
        Self {
            secret: secret.into(),
            tolerance_secs,
        }
    }

    pub fn verify<'a>(
        &self,
        body: &'a [u8],
        header: &'a str,
    ) -> Result<VerifiedPayload<'a>, SignatureError> {
        self.verify_at(body, header, chrono::Utc::now().timestamp())
    }

    /// Same as [`verify`](Self::verify) against an explicit clock.
    pub fn verify_at<'a>(
        &self,
        body: &'a [u8],
        header: &'a str,
        now: i64,
    ) -> Result<VerifiedPayload<'a>, SignatureError> {
        let parsed = SignatureHeader::parse(header)?;

        let expected = signature_bytes(&self.secret, parsed.timestamp, body);
        let matched = parsed
            .v1
            .iter()
            .any(|candidate| bool::from(expected.as_slice().ct_eq(candidate)));
        if !matched {
            return Err(SignatureError::Mismatch);
        }

        if self.tolerance_secs > 0 {
            let age_secs = now.saturating_sub(parsed.timestamp);
            if age_secs.unsigned_abs() > self.tolerance_secs {
                return Err(SignatureError::OutsideTolerance { age_secs });
            }
        }

        Ok(VerifiedPayload::new(body, header))
    }
}

/// Hex `v1` signature for `body` sent at `timestamp`.
pub fn compute_signature(secret: &str, timestamp: i64, body: &[u8]) -> String {
    hex::encode(signature_bytes(secret, timestamp, body))
}

// The body goes into the MAC exactly as received, never via a lossy string.
fn signature_bytes(secret: &str, timestamp: i64, body: &[u8]) -> Vec<u8> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(body);
    mac.finalize().into_bytes().to_vec()
}
