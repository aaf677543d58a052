//! Business logic layer.
//!
//! Services are called by handlers and only depend on the
//! [`TransactionStore`](crate::store::TransactionStore) abstraction.

/// Metrics, latest transactions and weekly rollup
pub mod aggregation_service;
