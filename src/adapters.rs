pub mod api_errors;
pub mod http;
pub mod nats;
pub mod stripe;
