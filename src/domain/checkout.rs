use {
    super::error::PaymentError,
    super::money::{Currency, Money, MoneyAmount},
    serde::{Deserialize, Serialize},
};

/// Metadata key carrying the order id through the payment intent, so it can
/// be read back from the `charge.succeeded` webhook.
pub const ORDER_ID_METADATA_KEY: &str = "orderId";

/// Inbound order description, as received over HTTP or the bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCheckoutRequest {
    pub order_id: String,
    pub currency: String,
    pub items: Vec<LineItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    /// Unit price in major units.
    pub price: f64,
    pub quantity: i64,
}

/// One priced line as the processor sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceDescriptor {
    pub name: String,
    pub unit_amount: Money,
    pub quantity: u64,
}

/// Validated, processor-neutral session request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRequest {
    pub order_id: String,
    pub currency: Currency,
    pub line_items: Vec<PriceDescriptor>,
    pub success_url: String,
    pub cancel_url: String,
}

/// The only part of a created session handed back to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSessionResult {
    pub success_url: String,
    pub cancel_url: String,
    pub session_url: String,
}

impl OrderCheckoutRequest {
    /// Validates the order and prices every line in minor units.
    ///
    /// All violations are reported together, one per `; `-separated entry.
    pub fn into_session_request(
        self,
        success_url: &str,
        cancel_url: &str,
    ) -> Result<SessionRequest, PaymentError> {
        let mut violations = Vec::new();

        if self.order_id.trim().is_empty() {
            violations.push("orderId must not be empty".to_string());
        }

        let currency = match Currency::try_from(self.currency.as_str()) {
            Ok(c) => Some(c),
            Err(e) => {
                violations.push(describe(e));
                None
            }
        };

        if self.items.is_empty() {
            violations.push("items must not be empty".to_string());
        }

        let mut line_items = Vec::with_capacity(self.items.len());
        for (idx, item) in self.items.into_iter().enumerate() {
            let amount = match MoneyAmount::from_major(item.price) {
                Ok(a) => Some(a),
                Err(e) => {
                    violations.push(format!("items[{idx}]: {}", describe(e)));
                    None
                }
            };
            let quantity = match u64::try_from(item.quantity) {
                Ok(q) if q >= 1 => Some(q),
                _ => {
                    violations.push(format!(
                        "items[{idx}]: quantity must be at least 1, got: {}",
                        item.quantity
                    ));
                    None
                }
            };

            if let (Some(currency), Some(amount), Some(quantity)) = (&currency, amount, quantity) {
                line_items.push(PriceDescriptor {
                    name: item.name,
                    unit_amount: Money::new(amount, currency.clone()),
                    quantity,
                });
            }
        }

        match currency {
            Some(currency) if violations.is_empty() => Ok(SessionRequest {
                order_id: self.order_id,
                currency,
                line_items,
                success_url: success_url.to_string(),
                cancel_url: cancel_url.to_string(),
            }),
            _ => Err(PaymentError::Validation(violations.join("; "))),
        }
    }
}

fn describe(err: PaymentError) -> String {
    match err {
        PaymentError::Validation(msg) => msg,
        other => other.to_string(),
    }
}
