pub mod adapters;
pub mod config;
pub mod domain;
pub mod services;

use {
    adapters::stripe::SignatureVerifier,
    config::RedirectUrls,
    domain::{provider::CheckoutProvider, publisher::EventPublisher},
    std::sync::Arc,
};

#[derive(Clone)]
pub struct AppState {
    pub checkout: Arc<dyn CheckoutProvider>,
    pub publisher: Arc<dyn EventPublisher>,
    pub verifier: Arc<SignatureVerifier>,
    pub redirects: Arc<RedirectUrls>,
}
