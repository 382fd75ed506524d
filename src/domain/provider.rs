use {
    super::checkout::SessionRequest,
    super::error::PaymentError,
    std::{future::Future, pin::Pin},
};

/// What the processor returns for a freshly created hosted session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreatedSession {
    pub url: Option<String>,
    pub success_url: Option<String>,
    pub cancel_url: Option<String>,
}

pub trait CheckoutProvider: Send + Sync {
    fn create_session(
        &self,
        request: SessionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<CreatedSession, PaymentError>> + Send + '_>>;
}
