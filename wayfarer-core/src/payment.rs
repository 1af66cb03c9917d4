use async_trait::async_trait;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use wayfarer_shared::Masked;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Authorized,
    Declined,
}

/// Card details collected at the payment step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentCard {
    pub cardholder_name: String,
    pub card_number: Masked<String>,
    pub expiry_month: u32,
    pub expiry_year: i32,
    pub cvc: Masked<String>,
}

impl PaymentCard {
    /// Card number with spaces and dashes removed.
    pub fn normalized_number(&self) -> String {
        self.card_number
            .expose()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-'))
            .collect()
    }

    pub fn last4(&self) -> String {
        let digits: Vec<char> = self.normalized_number().chars().collect();
        let skip = digits.len().saturating_sub(4);
        digits[skip..].iter().collect()
    }

    /// Checks the card as of `today`. The card stays valid through the last day of its expiry month.
    pub fn validate(&self, today: NaiveDate) -> Result<(), PaymentError> {
        if self.cardholder_name.trim().is_empty() {
            return Err(PaymentError::InvalidCard("cardholder name is required".to_string()));
        }

        let digits = self.normalized_number();
        if digits.len() < 12 || digits.len() > 19 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(PaymentError::InvalidCard("card number must be 12-19 digits".to_string()));
        }
        if !luhn_valid(&digits) {
            return Err(PaymentError::InvalidCard("card number failed checksum".to_string()));
        }

        if !(1..=12).contains(&self.expiry_month) {
            return Err(PaymentError::InvalidCard("expiry month must be 1-12".to_string()));
        }
        if (self.expiry_year, self.expiry_month) < (today.year(), today.month()) {
            return Err(PaymentError::InvalidCard("card has expired".to_string()));
        }

        let cvc = self.cvc.expose();
        if !(3..=4).contains(&cvc.len()) || !cvc.chars().all(|c| c.is_ascii_digit()) {
            return Err(PaymentError::InvalidCard("cvc must be 3 or 4 digits".to_string()));
        }

        Ok(())
    }
}

/// Luhn mod-10 checksum over an all-digit string.
pub fn luhn_valid(digits: &str) -> bool {
    let mut sum = 0;
    for (i, c) in digits.chars().rev().enumerate() {
        let Some(mut d) = c.to_digit(10) else {
            return false;
        };
        if i % 2 == 1 {
            d *= 2;
            if d > 9 {
                d -= 9;
            }
        }
        sum += d;
    }
    sum % 10 == 0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentAuthorization {
    pub reference: String,
    pub amount_cents: i64,
    pub currency: String,
    pub card_last4: String,
    pub status: PaymentStatus,
    pub authorized_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("Invalid card: {0}")]
    InvalidCard(String),

    #[error("Payment declined: {0}")]
    Declined(String),

    #[error("Payment gateway failure: {0}")]
    Gateway(String),
}

#[async_trait]
pub trait PaymentAdapter: Send + Sync {
    /// Authorize `amount_cents` against the card.
    async fn authorize(
        &self,
        card: &PaymentCard,
        amount_cents: i64,
        currency: &str,
    ) -> Result<PaymentAuthorization, PaymentError>;

    /// Release an authorization that will not be captured.
    async fn void(&self, authorization: &PaymentAuthorization) -> Result<(), PaymentError>;
}
