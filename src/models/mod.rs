//! Data models for ledger entries and derived dashboard metrics.
//!
//! Money is `rust_decimal::Decimal` throughout. All aggregates are rounded
//! with one rule, half away from zero, at the very end of a computation.

use rust_decimal::{Decimal, RoundingStrategy};

/// Derived metrics, buckets and placeholder payloads
pub mod metrics;
/// Transaction records and their API view
pub mod transaction;

/// Round a monetary value to cents.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Round a ratio to four decimal places.
pub fn round_rate(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero)
}
