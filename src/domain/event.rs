use {
    super::checkout::ORDER_ID_METADATA_KEY,
    super::error::PaymentError,
    serde::{Deserialize, Deserializer, Serialize},
    std::collections::HashMap,
};

/// Bus name under which successful payments are published.
pub const PAYMENT_SUCCEEDED: &str = "payment.succeeded";

pub const CHARGE_SUCCEEDED: &str = "charge.succeeded";

/// Request body whose signature has been checked.
///
/// Only the signature verifier can build one, which keeps envelopes from
/// being decoded out of unverified bytes.
#[derive(Debug, Clone, Copy)]
pub struct VerifiedPayload<'a> {
    body: &'a [u8],
    signature: &'a str,
}

impl<'a> VerifiedPayload<'a> {
    pub(crate) fn new(body: &'a [u8], signature: &'a str) -> Self {
        Self { body, signature }
    }

    pub fn body(&self) -> &'a [u8] {
        self.body
    }

    pub fn signature(&self) -> &'a str {
        self.signature
    }
}

/// Decoded webhook event. Closed over the types this service acts on, with
/// everything else collapsed into `Unrecognized`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEnvelope {
    ChargeSucceeded {
        event_id: Option<String>,
        charge: Charge,
    },
    Unrecognized {
        event_id: Option<String>,
        event_type: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Charge {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub metadata: HashMap<String, String>,
    #[serde(default)]
    pub receipt_url: Option<String>,
}

#[derive(Deserialize)]
struct RawEnvelope {
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "type")]
    event_type: String,
    data: RawEventData,
}

#[derive(Deserialize)]
struct RawEventData {
    // Only the types we act on need an object.
    #[serde(default)]
    object: Option<serde_json::Value>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<HashMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::deserialize(deserializer)?.unwrap_or_default())
}

impl WebhookEnvelope {
    pub fn decode(payload: VerifiedPayload<'_>) -> Result<Self, PaymentError> {
        let raw: RawEnvelope = serde_json::from_slice(payload.body())
            .map_err(|e| PaymentError::EnvelopeDecode(e.to_string()))?;

        match raw.event_type.as_str() {
            CHARGE_SUCCEEDED => {
                let object = raw.data.object.ok_or_else(|| {
                    PaymentError::EnvelopeDecode(format!("{CHARGE_SUCCEEDED} without data.object"))
                })?;
                let charge: Charge = serde_json::from_value(object).map_err(|e| {
                    PaymentError::EnvelopeDecode(format!("{CHARGE_SUCCEEDED} object: {e}"))
                })?;
                Ok(Self::ChargeSucceeded {
                    event_id: raw.id,
                    charge,
                })
            }
            _ => Ok(Self::Unrecognized {
                event_id: raw.id,
                event_type: raw.event_type,
            }),
        }
    }

    pub fn event_id(&self) -> Option<&str> {
        match self {
            Self::ChargeSucceeded { event_id, .. } | Self::Unrecognized { event_id, .. } => {
                event_id.as_deref()
            }
        }
    }

    pub fn event_type(&self) -> &str {
        match self {
            Self::ChargeSucceeded { .. } => CHARGE_SUCCEEDED,
            Self::Unrecognized { event_type, .. } => event_type,
        }
    }
}

/// Normalized event handed to order fulfilment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSucceededEvent {
    stripe_payment_id: String,
    order_id: String,
    receipt_url: Option<String>,
}

impl PaymentSucceededEvent {
    /// `None` when the charge carries no order id, i.e. it was not created
    /// through one of our checkout sessions.
    pub fn from_charge(charge: &Charge) -> Option<Self> {
        let order_id = charge.metadata.get(ORDER_ID_METADATA_KEY)?;
        Some(Self {
            stripe_payment_id: charge.id.clone(),
            order_id: order_id.clone(),
            receipt_url: charge.receipt_url.clone(),
        })
    }

    pub fn stripe_payment_id(&self) -> &str {
        &self.stripe_payment_id
    }

    pub fn order_id(&self) -> &str {
        &self.order_id
    }

    pub fn receipt_url(&self) -> Option<&str> {
        self.receipt_url.as_deref()
    }
}
