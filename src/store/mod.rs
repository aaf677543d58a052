//! Read-only access to the transaction ledger.
//!
//! The aggregation service only ever talks to a [`TransactionStore`]. Queries
//! are expressed with [`TransactionFilter`], a small conjunctive filter over
//! type, status and occurrence time, so the service stays independent of the
//! backing database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::error::StoreError;
use crate::models::transaction::{TransactionRecord, TransactionStatus, TransactionType};

/// In-memory store for tests
#[cfg(test)]
pub mod memory;
/// PostgreSQL-backed store
pub mod postgres;

/// Conjunctive filter over transaction records.
///
/// Unset fields match everything, so `TransactionFilter::default()` selects
/// the whole ledger. Records missing the filtered field never match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    pub transaction_type: Option<TransactionType>,
    pub status: Option<TransactionStatus>,
    /// Inclusive lower bound on `occurred_at`
    pub occurred_since: Option<DateTime<Utc>>,
}

impl TransactionFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn of_type(mut self, transaction_type: TransactionType) -> Self {
        self.transaction_type = Some(transaction_type);
        self
    }

    pub fn with_status(mut self, status: TransactionStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn since(mut self, threshold: DateTime<Utc>) -> Self {
        self.occurred_since = Some(threshold);
        self
    }
}

/// What the connectivity probe found out about the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreProbe {
    pub database_name: String,
    /// At most ten collection (table) names
    pub collections: Vec<String>,
}

/// Queryable, read-only collection of transaction records.
///
/// Implementations are shared across all concurrent requests and must be
/// safe for parallel reads. Timeouts are the implementation's job and are
/// reported as [`StoreError::Timeout`].
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// False when the store is not configured or its handle is closed.
    ///
    /// A reachable but empty store is available.
    async fn is_available(&self) -> bool;

    /// Number of records matching `filter`.
    async fn count(&self, filter: &TransactionFilter) -> Result<i64, StoreError>;

    /// Sum of `amount` over matching records; zero when nothing matches.
    async fn sum(&self, filter: &TransactionFilter) -> Result<Decimal, StoreError>;

    /// Matching records, most recent `occurred_at` first.
    ///
    /// Records without `occurred_at` sort last. `limit: None` returns every
    /// match.
    async fn find(
        &self,
        filter: &TransactionFilter,
        limit: Option<i64>,
    ) -> Result<Vec<TransactionRecord>, StoreError>;

    /// Connectivity diagnostics for the `/test` endpoint.
    async fn probe(&self) -> Result<StoreProbe, StoreError>;
}
