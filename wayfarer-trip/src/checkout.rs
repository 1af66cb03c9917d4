use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use wayfarer_core::payment::{
    PaymentAdapter, PaymentAuthorization, PaymentCard, PaymentError, PaymentStatus,
};
use wayfarer_core::CoreError;

use crate::models::TripStatus;

/// Card number the simulated gateway always declines.
pub const DECLINE_TEST_CARD: &str = "4000000000000002";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutReceipt {
    pub trip_id: i64,
    pub payment_reference: String,
    pub amount_cents: i64,
    pub currency: String,
    pub card_last4: String,
    pub status: TripStatus,
}

impl CheckoutReceipt {
    pub fn new(trip_id: i64, status: TripStatus, authorization: PaymentAuthorization) -> Self {
        Self {
            trip_id,
            payment_reference: authorization.reference,
            amount_cents: authorization.amount_cents,
            currency: authorization.currency,
            card_last4: authorization.card_last4,
            status,
        }
    }
}

/// Failure of a flow that both changes a trip and takes payment.
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error(transparent)]
    Trip(#[from] CoreError),

    #[error(transparent)]
    Payment(#[from] PaymentError),
}

pub struct PaymentOrchestrator {
    adapter: Arc<dyn PaymentAdapter>,
}

impl PaymentOrchestrator {
    pub fn new(adapter: Arc<dyn PaymentAdapter>) -> Self {
        Self { adapter }
    }

    /// Validate the card as of `today`, then authorize the amount with the gateway.
    pub async fn authorize(
        &self,
        card: &PaymentCard,
        amount_cents: i64,
        currency: &str,
        today: NaiveDate,
    ) -> Result<PaymentAuthorization, PaymentError> {
        card.validate(today)?;
        if amount_cents <= 0 {
            return Err(PaymentError::InvalidCard("nothing to pay for".to_string()));
        }

        let authorization = self.adapter.authorize(card, amount_cents, currency).await?;
        if authorization.status != PaymentStatus::Authorized {
            return Err(PaymentError::Declined(format!(
                "card ending {} was not authorized",
                authorization.card_last4
            )));
        }

        tracing::info!(
            reference = %authorization.reference,
            amount_cents,
            card_last4 = %authorization.card_last4,
            "Payment authorized"
        );
        Ok(authorization)
    }

    /// Release an authorization whose trip could not be confirmed. Gateway failures are logged only.
    pub async fn void(&self, authorization: &PaymentAuthorization) {
        match self.adapter.void(authorization).await {
            Ok(()) => tracing::info!(reference = %authorization.reference, "Payment voided"),
            Err(e) => tracing::error!(
                reference = %authorization.reference,
                "Failed to void payment: {}",
                e
            ),
        }
    }
}

/// In-process gateway standing in for a real payment provider.
pub struct SimulatedPaymentAdapter;

#[async_trait::async_trait]
impl PaymentAdapter for SimulatedPaymentAdapter {
    async fn authorize(
        &self,
        card: &PaymentCard,
        amount_cents: i64,
        currency: &str,
    ) -> Result<PaymentAuthorization, PaymentError> {
        let status = if card.normalized_number() == DECLINE_TEST_CARD {
            PaymentStatus::Declined
        } else {
            PaymentStatus::Authorized
        };

        Ok(PaymentAuthorization {
            reference: format!("pay_{}", Uuid::new_v4().simple()),
            amount_cents,
            currency: currency.to_string(),
            card_last4: card.last4(),
            status,
            authorized_at: Utc::now(),
        })
    }

    async fn void(&self, authorization: &PaymentAuthorization) -> Result<(), PaymentError> {
        if !authorization.reference.starts_with("pay_") {
            return Err(PaymentError::Gateway(format!(
                "unknown authorization {}",
                authorization.reference
            )));
        }
        Ok(())
    }
}
