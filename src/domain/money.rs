use {
    super::error::PaymentError,
    derive_more::Display,
    serde::{Deserialize, Serialize},
};

/// Amount in the currency's minor unit (cents for USD).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MoneyAmount(i64);

impl MoneyAmount {
    /// Converts a major-unit price into minor units as `round(major * 100)`.
    ///
    /// Totals downstream reconcile against exactly this rule, so it must not
    /// change. Halves round away from zero, which for the non-negative
    /// amounts accepted here means upward.
    pub fn from_major(major: f64) -> Result<Self, PaymentError> {
        if !major.is_finite() {
            return Err(PaymentError::Validation(format!(
                "price must be a finite number, got: {major}"
            )));
        }
        if major < 0.0 {
            return Err(PaymentError::Validation(format!(
                "price cannot be negative, got: {major}"
            )));
        }

        let minor = (major * 100.0).round();
        if minor > i64::MAX as f64 {
            return Err(PaymentError::Validation(format!(
                "price too large: {major}"
            )));
        }
        Ok(Self(minor as i64))
    }

    pub fn minor(&self) -> i64 {
        self.0
    }
}

/// Lowercase ISO 4217 code, as the processor expects it.
#[derive(Debug, Clone, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for Currency {
    type Error = PaymentError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let code = s.trim();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(PaymentError::Validation(format!(
                "currency must be a three-letter ISO 4217 code, got: {s:?}"
            )));
        }
        Ok(Self(code.to_ascii_lowercase()))
    }
}

impl TryFrom<String> for Currency {
    type Error = PaymentError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::try_from(s.as_str())
    }
}

impl From<Currency> for String {
    fn from(c: Currency) -> Self {
        c.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    amount: MoneyAmount,
    currency: Currency,
}

impl Money {
    pub fn new(amount: MoneyAmount, currency: Currency) -> Self {
        Self { amount, currency }
    }

    pub fn amount(&self) -> MoneyAmount {
        self.amount
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }
}
