//! In-memory [`TransactionStore`] used by tests.
//!
//! Can be switched into the unavailable state or made to fail every query,
//! which drives the aggregation service through its fallback paths.

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::{StoreProbe, TransactionFilter, TransactionStore};
use crate::error::StoreError;
use crate::models::transaction::TransactionRecord;

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Vec<TransactionRecord>,
    unavailable: bool,
    closed: bool,
    failing: bool,
}

impl MemoryStore {
    pub fn new(records: Vec<TransactionRecord>) -> Self {
        Self {
            records,
            ..Default::default()
        }
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Default::default()
        }
    }

    /// Store that reports itself available but whose handle is gone by the
    /// time a query runs.
    pub fn closed() -> Self {
        Self {
            closed: true,
            ..Default::default()
        }
    }

    /// Available store whose queries all fail.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Default::default()
        }
    }

    fn matching(&self, filter: &TransactionFilter) -> Result<Vec<&TransactionRecord>, StoreError> {
        if self.unavailable || self.closed {
            return Err(StoreError::Unavailable);
        }
        if self.failing {
            return Err(StoreError::Query(sqlx::Error::PoolTimedOut));
        }
        Ok(self.records.iter().filter(|r| matches(filter, r)).collect())
    }
}

fn matches(filter: &TransactionFilter, record: &TransactionRecord) -> bool {
    if filter
        .transaction_type
        .is_some_and(|wanted| record.transaction_type != Some(wanted))
    {
        return false;
    }
    if filter
        .status
        .is_some_and(|wanted| record.status != Some(wanted))
    {
        return false;
    }
    match (filter.occurred_since, record.occurred_at) {
        (None, _) => true,
        (Some(threshold), Some(at)) => at >= threshold,
        (Some(_), None) => false,
    }
}

#[async_trait]
impl TransactionStore for MemoryStore {
    async fn is_available(&self) -> bool {
        !self.unavailable
    }

    async fn count(&self, filter: &TransactionFilter) -> Result<i64, StoreError> {
        Ok(self.matching(filter)?.len() as i64)
    }

    async fn sum(&self, filter: &TransactionFilter) -> Result<Decimal, StoreError> {
        Ok(self
            .matching(filter)?
            .into_iter()
            .map(TransactionRecord::amount_or_zero)
            .sum())
    }

    async fn find(
        &self,
        filter: &TransactionFilter,
        limit: Option<i64>,
    ) -> Result<Vec<TransactionRecord>, StoreError> {
        let mut found: Vec<TransactionRecord> =
            self.matching(filter)?.into_iter().cloned().collect();
        // None sorts before Some, so reversing puts undated records last.
        found.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
        if let Some(limit) = limit {
            found.truncate(limit.max(0) as usize);
        }
        Ok(found)
    }

    async fn probe(&self) -> Result<StoreProbe, StoreError> {
        self.matching(&TransactionFilter::all())?;
        Ok(StoreProbe {
            database_name: "memory".to_string(),
            collections: vec!["transactions".to_string()],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::transaction::{TransactionStatus, TransactionType};
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn record(hour: Option<u32>, amount: Decimal, transaction_type: TransactionType) -> TransactionRecord {
        TransactionRecord {
            amount: Some(amount),
            transaction_type: Some(transaction_type),
            status: Some(TransactionStatus::Completed),
            occurred_at: hour.map(|h| Utc.with_ymd_and_hms(2025, 6, 2, h, 0, 0).unwrap()),
            ..Default::default()
        }
    }

    fn ledger() -> MemoryStore {
        MemoryStore::new(vec![
            record(Some(8), dec!(10.10), TransactionType::Payin),
            record(None, dec!(5), TransactionType::Payout),
            record(Some(12), dec!(20.20), TransactionType::Payout),
            TransactionRecord {
                occurred_at: Some(Utc.with_ymd_and_hms(2025, 6, 2, 10, 0, 0).unwrap()),
                ..Default::default()
            },
        ])
    }

    #[tokio::test]
    async fn count_and_sum_agree_with_find() {
        let store = ledger();
        let since = Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap();
        let filters = [
            TransactionFilter::all(),
            TransactionFilter::all().of_type(TransactionType::Payout),
            TransactionFilter::all().with_status(TransactionStatus::Completed),
            TransactionFilter::all().since(since),
        ];

        for filter in filters {
            let found = store.find(&filter, None).await.unwrap();
            let total: Decimal = found.iter().map(TransactionRecord::amount_or_zero).sum();

            assert_eq!(store.count(&filter).await.unwrap(), found.len() as i64);
            assert_eq!(store.sum(&filter).await.unwrap(), total);
        }
    }

    #[tokio::test]
    async fn find_orders_newest_first_with_undated_last() {
        let found = ledger().find(&TransactionFilter::all(), Some(10)).await.unwrap();
        let hours: Vec<_> = found.iter().map(|r| r.occurred_at.map(|at| at.format("%H").to_string())).collect();

        assert_eq!(
            hours,
            vec![Some("12".to_string()), Some("10".to_string()), Some("08".to_string()), None]
        );
    }

    #[tokio::test]
    async fn records_missing_a_field_do_not_match_filters_on_it() {
        let store = ledger();
        let filter = TransactionFilter::all().with_status(TransactionStatus::Completed);

        assert_eq!(store.count(&filter).await.unwrap(), 3);
        assert_eq!(store.count(&TransactionFilter::all()).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn failure_modes_are_distinct() {
        assert!(!MemoryStore::unavailable().is_available().await);
        assert!(MemoryStore::failing().is_available().await);
        assert!(MemoryStore::closed().is_available().await);

        let err = MemoryStore::failing().sum(&TransactionFilter::all()).await.unwrap_err();
        assert!(!err.is_unavailable());
    }
}
