//! NATS transport, wire-compatible with NestJS microservice clients.
//!
//! Events go out as `{"pattern", "data"}`. Requests arrive as
//! `{"pattern", "data", "id"}` and are answered on the reply subject with
//! `{"id", "response" | "err", "isDisposed": true}`.

use {
    crate::{
        AppState,
        adapters::api_errors::describe,
        domain::{
            checkout::{CheckoutSessionResult, OrderCheckoutRequest},
            error::PaymentError,
            publisher::{EventPublisher, PublishFuture},
        },
        services::checkout::create_payment_session,
    },
    async_nats::{Client, ServerAddr},
    futures::StreamExt,
    serde::{Deserialize, Serialize},
    tokio::sync::watch,
};

/// Message pattern for session creation by non-HTTP callers.
pub const CREATE_SESSION_PATTERN: &str = "create.payment.session";

pub async fn connect(servers: &[String]) -> Result<Client, PaymentError> {
    let addrs = servers
        .iter()
        .map(|s| {
            s.parse::<ServerAddr>()
                .map_err(|e| PaymentError::Transport(format!("invalid NATS server {s:?}: {e}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    async_nats::ConnectOptions::new()
        .name(env!("CARGO_PKG_NAME"))
        .connect(addrs.as_slice())
        .await
        .map_err(|e| PaymentError::Transport(format!("NATS connect: {e}")))
}

#[derive(Serialize)]
struct OutboundEvent<'a> {
    pattern: &'a str,
    data: &'a serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct InboundRequest {
    #[serde(default)]
    id: Option<String>,
    data: serde_json::Value,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Reply<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(flatten)]
    body: ReplyBody<T>,
    is_disposed: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "lowercase")]
enum ReplyBody<T: Serialize> {
    Response(T),
    Err(RpcError),
}

#[derive(Serialize)]
struct RpcError {
    status: u16,
    message: String,
}

/// Publishes over a shared client connection.
#[derive(Clone)]
pub struct NatsPublisher {
    client: Client,
}

impl NatsPublisher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl EventPublisher for NatsPublisher {
    fn publish(&self, pattern: &str, data: serde_json::Value) -> PublishFuture {
        let client = self.client.clone();
        let subject = pattern.to_string();
        Box::pin(async move {
            let bytes = serde_json::to_vec(&OutboundEvent {
                pattern: &subject,
                data: &data,
            })?;
            client
                .publish(subject, bytes.into())
                .await
                .map_err(|e| PaymentError::Publish(e.to_string()))
        })
    }
}

/// Serve `create.payment.session` requests until shutdown.
pub async fn run_session_responder(
    client: Client,
    state: AppState,
    mut shutdown: watch::Receiver<bool>,
) -> Result<(), PaymentError> {
    let mut subscriber = client
        .subscribe(CREATE_SESSION_PATTERN)
        .await
        .map_err(|e| PaymentError::Transport(format!("subscribe {CREATE_SESSION_PATTERN}: {e}")))?;

    tracing::info!(subject = CREATE_SESSION_PATTERN, "session responder started");

    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                tracing::info!("session responder shutting down");
                return Ok(());
            }
            message = subscriber.next() => {
                let Some(message) = message else {
                    tracing::warn!("session subscription closed");
                    return Ok(());
                };
                let client = client.clone();
                let state = state.clone();
                tokio::spawn(async move {
                    if let Err(e) = respond(&client, &state, message).await {
                        tracing::error!(error = %e, "failed to answer {CREATE_SESSION_PATTERN}");
                    }
                });
            }
        }
    }
}

async fn respond(
    client: &Client,
    state: &AppState,
    message: async_nats::Message,
) -> Result<(), PaymentError> {
    let (id, outcome) = answer(state, &message.payload).await;

    let Some(reply_to) = message.reply else {
        // Sent as an event; nobody is waiting for the result.
        if let Err(e) = outcome {
            tracing::warn!(error = %e, "{CREATE_SESSION_PATTERN} event failed");
        }
        return Ok(());
    };

    client
        .publish(reply_to, encode_reply(id, outcome)?.into())
        .await
        .map_err(|e| PaymentError::Publish(e.to_string()))
}

/// Decode a `create.payment.session` payload and run the session builder.
///
/// Returns the request id, if the caller sent one, alongside the outcome.
/// Undecodable payloads and orders fail as validation errors.
pub async fn answer(
    state: &AppState,
    payload: &[u8],
) -> (Option<String>, Result<CheckoutSessionResult, PaymentError>) {
    let req = match serde_json::from_slice::<InboundRequest>(payload) {
        Ok(req) => req,
        Err(e) => return (None, Err(PaymentError::Validation(e.to_string()))),
    };

    let outcome = match serde_json::from_value::<OrderCheckoutRequest>(req.data) {
        Ok(order) => create_payment_session(&*state.checkout, &state.redirects, order).await,
        Err(e) => Err(PaymentError::Validation(e.to_string())),
    };
    (req.id, outcome)
}

/// Reply bytes for a request, with errors carrying the HTTP status they
/// would have had on the REST route.
pub fn encode_reply(
    id: Option<String>,
    outcome: Result<CheckoutSessionResult, PaymentError>,
) -> Result<Vec<u8>, PaymentError> {
    let body = match outcome {
        Ok(result) => ReplyBody::Response(result),
        Err(e) => {
            let (status, _, message) = describe(&e);
            ReplyBody::Err(RpcError {
                status: status.as_u16(),
                message,
            })
        }
    };
    let reply = Reply {
        id,
        body,
        is_disposed: true,
    };
    Ok(serde_json::to_vec(&reply)?)
}
