use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::CheckoutConfig;

use super::domain::Money;
use super::form::ApplicationForm;

/// Whether the user pays half or all of the fee through the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMode {
    #[default]
    Partial,
    Full,
}

impl PaymentMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            PaymentMode::Partial => "partial",
            PaymentMode::Full => "full",
        }
    }
}

/// User-chosen payment parameters for one submission attempt.
#[derive(Debug, Clone, Copy, Default)]
pub struct PaymentSelection {
    pub mode: PaymentMode,
    pub use_wallet: bool,
}

impl PaymentSelection {
    /// Wallet offset sent to the backend: the fetched balance when opted in,
    /// zero otherwise. The gateway charge never subtracts it; the server
    /// applies the offset on its side.
    pub fn wallet_amount(&self, balance: Money) -> Money {
        if self.use_wallet {
            balance
        } else {
            Money::ZERO
        }
    }
}

/// Gateway charge for a submission attempt. Partial pays half the fee,
/// rounded up to the paisa.
pub fn charge_amount(fees: Money, mode: PaymentMode) -> Money {
    match mode {
        PaymentMode::Full => fees,
        PaymentMode::Partial => fees.halved_rounding_up(),
    }
}

/// Contact details pre-filled into the gateway's checkout UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutPrefill {
    pub email: String,
    pub contact: String,
    pub name: String,
}

/// Everything the external checkout UI is opened with. The amount is in
/// minor units (paise).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutRequest {
    pub description: String,
    pub image: String,
    pub currency: String,
    pub key: String,
    pub amount: u64,
    pub name: String,
    pub prefill: CheckoutPrefill,
    pub theme_color: String,
}

impl CheckoutRequest {
    pub fn build(config: &CheckoutConfig, form: &ApplicationForm, amount: Money) -> Self {
        Self {
            description: config.description.clone(),
            image: config.logo_url.clone(),
            currency: config.currency.clone(),
            key: config.key.clone(),
            amount: amount.paise(),
            name: config.merchant_name.clone(),
            prefill: CheckoutPrefill {
                email: form.email.clone(),
                contact: form.mobile.clone(),
                name: form.applicant_name(),
            },
            theme_color: config.theme_color.clone(),
        }
    }
}

/// Opaque transaction reference returned by a completed checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentReceipt {
    pub payment_id: String,
}

/// External, modal payment UI. The call suspends until the user completes,
/// cancels, or the gateway errors; cancellation and failure both block
/// submission.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn checkout(&self, request: CheckoutRequest) -> Result<PaymentReceipt, PaymentError>;
}

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("Payment was cancelled before completion")]
    Cancelled,
    #[error("Payment failed: {0}")]
    Gateway(String),
}
