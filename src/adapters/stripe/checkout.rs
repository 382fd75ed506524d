use {
    super::upstream_error,
    crate::domain::{
        checkout::{ORDER_ID_METADATA_KEY, SessionRequest},
        error::PaymentError,
        provider::{CheckoutProvider, CreatedSession},
    },
    std::{collections::HashMap, future::Future, pin::Pin},
    stripe::{
        CheckoutSession, CheckoutSessionMode, Client, CreateCheckoutSession,
        CreateCheckoutSessionLineItems, CreateCheckoutSessionLineItemsPriceData,
        CreateCheckoutSessionLineItemsPriceDataProductData,
        CreateCheckoutSessionPaymentIntentData, Currency,
    },
};

/// Hosted checkout through the Stripe API.
pub struct StripeCheckout {
    client: Client,
}

impl StripeCheckout {
    pub fn new(secret_key: &str) -> Self {
        Self {
            client: Client::new(secret_key),
        }
    }
}

impl CheckoutProvider for StripeCheckout {
    fn create_session(
        &self,
        request: SessionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<CreatedSession, PaymentError>> + Send + '_>> {
        Box::pin(async move { self.create_session_inner(request).await })
    }
}

impl StripeCheckout {
    async fn create_session_inner(
        &self,
        request: SessionRequest,
    ) -> Result<CreatedSession, PaymentError> {
        let line_items = request
            .line_items
            .iter()
            .map(|item| {
                Ok(CreateCheckoutSessionLineItems {
                    quantity: Some(item.quantity),
                    price_data: Some(CreateCheckoutSessionLineItemsPriceData {
                        currency: convert_currency(item.unit_amount.currency().as_str())?,
                        unit_amount: Some(item.unit_amount.amount().minor()),
                        product_data: Some(CreateCheckoutSessionLineItemsPriceDataProductData {
                            name: item.name.clone(),
                            ..Default::default()
                        }),
                        ..Default::default()
                    }),
                    ..Default::default()
                })
            })
            .collect::<Result<Vec<_>, PaymentError>>()?;

        let mut metadata = HashMap::new();
        metadata.insert(ORDER_ID_METADATA_KEY.to_string(), request.order_id.clone());

        let mut params = CreateCheckoutSession::new();
        params.mode = Some(CheckoutSessionMode::Payment);
        params.success_url = Some(&request.success_url);
        params.cancel_url = Some(&request.cancel_url);
        params.line_items = Some(line_items);
        params.payment_intent_data = Some(CreateCheckoutSessionPaymentIntentData {
            metadata: Some(metadata),
            ..Default::default()
        });

        let session = CheckoutSession::create(&self.client, params)
            .await
            .map_err(upstream_error)?;

        tracing::debug!(session_id = %session.id, "stripe checkout session created");

        Ok(CreatedSession {
            url: session.url,
            success_url: session.success_url,
            cancel_url: session.cancel_url,
        })
    }
}

fn convert_currency(code: &str) -> Result<Currency, PaymentError> {
    code.parse::<Currency>()
        .map_err(|_| PaymentError::Validation(format!("unsupported currency: {code}")))
}
