//! Derived dashboard metrics.
//!
//! Nothing in here is persisted. Each value is recomputed from the ledger on
//! every request.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

/// Count and summed amount of a set of transactions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ActivitySummary {
    pub count: i64,

    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

impl ActivitySummary {
    pub fn new(count: i64, amount: Decimal) -> Self {
        Self { count, amount }
    }
}

/// Top-line metrics returned by `GET /api/metrics`.
///
/// # JSON Example
///
/// ```json
/// {
///   "available_balance": 12845.23,
///   "today": { "count": 42, "amount": 2456.7 },
///   "payouts_pending": { "count": 3, "amount": 1240.5 },
///   "success_rate": 0.94
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    /// Completed payins minus every payout, whatever its status
    #[serde(with = "rust_decimal::serde::float")]
    pub available_balance: Decimal,

    /// Everything that occurred since midnight UTC, both directions
    pub today: ActivitySummary,

    pub payouts_pending: ActivitySummary,

    /// Completed transactions over all transactions, in `[0, 1]`
    #[serde(with = "rust_decimal::serde::float")]
    pub success_rate: Decimal,
}

impl MetricsSnapshot {
    /// Placeholder served while no store is configured.
    pub fn offline() -> Self {
        Self {
            available_balance: Decimal::new(1_284_523, 2),
            today: ActivitySummary::new(42, Decimal::new(245_670, 2)),
            payouts_pending: ActivitySummary::new(3, Decimal::new(124_050, 2)),
            success_rate: Decimal::new(94, 2),
        }
    }

    /// Placeholder served when a query fails on an available store.
    pub fn degraded() -> Self {
        Self {
            available_balance: Decimal::new(1_000_000, 2),
            today: ActivitySummary::new(20, Decimal::new(150_000, 2)),
            payouts_pending: ActivitySummary::new(2, Decimal::new(80_000, 2)),
            success_rate: Decimal::new(92, 2),
        }
    }
}

/// One calendar day of the weekly rollup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeeklyBucket {
    /// Serialized as `YYYY-MM-DD`
    pub date: NaiveDate,

    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}
