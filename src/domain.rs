pub mod checkout;
pub mod error;
pub mod event;
pub mod money;
pub mod provider;
pub mod publisher;
