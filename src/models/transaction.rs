//! Transaction data models and API response types.
//!
//! This module defines:
//! - The closed enumerations for currency, status and type
//! - `TransactionRecord`: a ledger entry as the store hands it over
//! - `TransactionView`: the response body for the transaction listing

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::round_money;

/// Currencies accepted by the ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Eur,
    Usd,
    Gbp,
    Chf,
    Cad,
    Aud,
}

impl Currency {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "EUR" => Some(Self::Eur),
            "USD" => Some(Self::Usd),
            "GBP" => Some(Self::Gbp),
            "CHF" => Some(Self::Chf),
            "CAD" => Some(Self::Cad),
            "AUD" => Some(Self::Aud),
            _ => None,
        }
    }
}

/// Lifecycle state of a payment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    #[default]
    Completed,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// Direction of the cash flow.
///
/// Amounts are always stored non-negative; whether a transaction adds to or
/// takes from the balance is decided by its type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Inbound payment
    #[default]
    Payin,
    /// Outbound settlement to a partner
    Payout,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Payin => "payin",
            Self::Payout => "payout",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "payin" => Some(Self::Payin),
            "payout" => Some(Self::Payout),
            _ => None,
        }
    }
}

/// A ledger entry as read from the transaction store.
///
/// Records are written upstream and never modified here. Any field may be
/// missing in the underlying store; a missing `status` or `type` does not
/// match a filter on that field, and a missing `amount` counts as zero in
/// sums.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionRecord {
    /// Store-assigned identifier
    pub id: Option<String>,

    /// Non-negative amount in `currency`
    pub amount: Option<Decimal>,

    pub currency: Option<Currency>,

    pub status: Option<TransactionStatus>,

    pub transaction_type: Option<TransactionType>,

    /// Pharmacy, clinic or other counterparty name
    pub partner: Option<String>,

    /// External reference or invoice number
    pub reference: Option<String>,

    /// When the payment happened, as opposed to when the row was written
    pub occurred_at: Option<DateTime<Utc>>,
}

impl TransactionRecord {
    /// Amount with the missing-value default applied.
    pub fn amount_or_zero(&self) -> Decimal {
        self.amount.unwrap_or(Decimal::ZERO)
    }
}

/// Transaction as returned by `GET /api/transactions`.
///
/// # JSON Example
///
/// ```json
/// {
///   "id": "0f8fad5b-d9cb-469f-a165-70867728950e",
///   "amount": 123.45,
///   "currency": "EUR",
///   "status": "completed",
///   "type": "payin",
///   "partner": "Pharmacie Centrale",
///   "reference": "INV-20251221-3",
///   "occurred_at": "2025-12-21T09:15:00Z"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionView {
    pub id: Option<String>,

    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,

    pub currency: Currency,

    pub status: TransactionStatus,

    #[serde(rename = "type")]
    pub transaction_type: TransactionType,

    pub partner: Option<String>,

    pub reference: Option<String>,

    pub occurred_at: Option<DateTime<Utc>>,
}

/// Convert a stored record into its API view.
///
/// Fills in defaults so the five core fields are never null:
/// amount `0`, currency `EUR`, status `completed`, type `payin`.
impl From<TransactionRecord> for TransactionView {
    fn from(record: TransactionRecord) -> Self {
        Self {
            amount: round_money(record.amount_or_zero()),
            id: record.id,
            currency: record.currency.unwrap_or_default(),
            status: record.status.unwrap_or_default(),
            transaction_type: record.transaction_type.unwrap_or_default(),
            partner: record.partner,
            reference: record.reference,
            occurred_at: record.occurred_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn view_fills_missing_fields_with_defaults() {
        let view = TransactionView::from(TransactionRecord::default());

        assert_eq!(view.amount, Decimal::ZERO);
        assert_eq!(view.currency, Currency::Eur);
        assert_eq!(view.status, TransactionStatus::Completed);
        assert_eq!(view.transaction_type, TransactionType::Payin);
        assert_eq!(view.partner, None);
    }

    #[test]
    fn view_serializes_type_key_and_numeric_amount() {
        let record = TransactionRecord {
            id: Some("abc".into()),
            amount: Some(dec!(42.5)),
            currency: Some(Currency::Chf),
            status: Some(TransactionStatus::Pending),
            transaction_type: Some(TransactionType::Payout),
            partner: Some("PharmaPlus Lyon".into()),
            ..Default::default()
        };

        let json = serde_json::to_value(TransactionView::from(record)).unwrap();

        assert_eq!(json["amount"], serde_json::json!(42.5));
        assert_eq!(json["currency"], "CHF");
        assert_eq!(json["status"], "pending");
        assert_eq!(json["type"], "payout");
        assert_eq!(json["occurred_at"], serde_json::Value::Null);
    }

    #[test]
    fn enum_text_round_trips_through_parse() {
        for currency in ["EUR", "USD", "GBP", "CHF", "CAD", "AUD"] {
            let parsed = Currency::parse(currency).unwrap();
            assert_eq!(serde_json::to_value(parsed).unwrap(), currency);
        }
        assert_eq!(TransactionStatus::parse("failed"), Some(TransactionStatus::Failed));
        assert_eq!(TransactionType::parse("refund"), None);
        assert_eq!(Currency::parse("eur"), None);
    }
}
