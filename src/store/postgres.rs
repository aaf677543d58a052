//! PostgreSQL implementation of [`TransactionStore`].
//!
//! Reads the `transactions` table. Filters are rendered with
//! `sqlx::QueryBuilder` so every value is a bound parameter.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Postgres, QueryBuilder};
use std::future::Future;
use std::time::Duration;
use uuid::Uuid;

use super::{StoreProbe, TransactionFilter, TransactionStore};
use crate::db::DbPool;
use crate::error::StoreError;
use crate::models::transaction::{
    Currency, TransactionRecord, TransactionStatus, TransactionType,
};

const RECORD_COLUMNS: &str =
    "SELECT id, amount, currency, status, type, partner, reference, occurred_at FROM transactions";

/// Raw row of the `transactions` table.
///
/// Every column except `id` is nullable, matching ledgers written by
/// ingestion paths that omit fields.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TransactionRow {
    pub id: Uuid,
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
    pub status: Option<String>,
    #[sqlx(rename = "type")]
    pub transaction_type: Option<String>,
    pub partner: Option<String>,
    pub reference: Option<String>,
    pub occurred_at: Option<DateTime<Utc>>,
}

/// Parse an enum column, treating unknown text like a missing value.
fn parse_column<T>(
    id: &Uuid,
    column: &str,
    value: Option<String>,
    parse: fn(&str) -> Option<T>,
) -> Option<T> {
    let raw = value?;
    let parsed = parse(&raw);
    if parsed.is_none() {
        tracing::warn!(%id, column, value = %raw, "Unrecognised value, using default");
    }
    parsed
}

impl TryFrom<TransactionRow> for TransactionRecord {
    type Error = StoreError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        if let Some(amount) = row.amount {
            if amount.is_sign_negative() && !amount.is_zero() {
                return Err(StoreError::Decode(format!(
                    "transaction {} has negative amount {}",
                    row.id, amount
                )));
            }
        }

        Ok(Self {
            currency: parse_column(&row.id, "currency", row.currency, Currency::parse),
            status: parse_column(&row.id, "status", row.status, TransactionStatus::parse),
            transaction_type: parse_column(
                &row.id,
                "type",
                row.transaction_type,
                TransactionType::parse,
            ),
            id: Some(row.id.to_string()),
            amount: row.amount,
            partner: row.partner,
            reference: row.reference,
            occurred_at: row.occurred_at,
        })
    }
}

/// Append `WHERE ... AND ...` for every set condition of `filter`.
fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &TransactionFilter) {
    let mut separator = " WHERE ";

    if let Some(transaction_type) = filter.transaction_type {
        builder
            .push(separator)
            .push("type = ")
            .push_bind(transaction_type.as_str());
        separator = " AND ";
    }
    if let Some(status) = filter.status {
        builder
            .push(separator)
            .push("status = ")
            .push_bind(status.as_str());
        separator = " AND ";
    }
    if let Some(threshold) = filter.occurred_since {
        builder
            .push(separator)
            .push("occurred_at >= ")
            .push_bind(threshold);
    }
}

/// Transaction store backed by a PostgreSQL pool.
///
/// Without a pool the store reports itself unavailable and every query
/// fails with [`StoreError::Unavailable`].
#[derive(Debug, Clone)]
pub struct PgTransactionStore {
    pool: Option<DbPool>,
    query_timeout: Duration,
}

impl PgTransactionStore {
    pub fn new(pool: DbPool, query_timeout: Duration) -> Self {
        Self {
            pool: Some(pool),
            query_timeout,
        }
    }

    /// Store for demo mode, when no usable database URL is configured.
    pub fn unavailable() -> Self {
        Self {
            pool: None,
            query_timeout: Duration::ZERO,
        }
    }

    fn pool(&self) -> Result<&DbPool, StoreError> {
        self.pool.as_ref().ok_or(StoreError::Unavailable)
    }

    /// Run a query under the configured timeout.
    async fn timed<T>(
        &self,
        query: impl Future<Output = Result<T, sqlx::Error>> + Send,
    ) -> Result<T, StoreError> {
        match tokio::time::timeout(self.query_timeout, query).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(StoreError::Timeout(self.query_timeout)),
        }
    }
}

#[async_trait]
impl TransactionStore for PgTransactionStore {
    async fn is_available(&self) -> bool {
        matches!(&self.pool, Some(pool) if !pool.is_closed())
    }

    async fn count(&self, filter: &TransactionFilter) -> Result<i64, StoreError> {
        let pool = self.pool()?;
        let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM transactions");
        push_filter(&mut builder, filter);

        self.timed(builder.build_query_scalar::<i64>().fetch_one(pool))
            .await
    }

    async fn sum(&self, filter: &TransactionFilter) -> Result<Decimal, StoreError> {
        let pool = self.pool()?;
        let mut builder =
            QueryBuilder::new("SELECT COALESCE(SUM(COALESCE(amount, 0)), 0) FROM transactions");
        push_filter(&mut builder, filter);

        self.timed(builder.build_query_scalar::<Decimal>().fetch_one(pool))
            .await
    }

    async fn find(
        &self,
        filter: &TransactionFilter,
        limit: Option<i64>,
    ) -> Result<Vec<TransactionRecord>, StoreError> {
        let pool = self.pool()?;
        let mut builder = QueryBuilder::new(RECORD_COLUMNS);
        push_filter(&mut builder, filter);
        builder.push(" ORDER BY occurred_at DESC NULLS LAST");
        if let Some(limit) = limit {
            builder.push(" LIMIT ").push_bind(limit);
        }

        let rows = self
            .timed(builder.build_query_as::<TransactionRow>().fetch_all(pool))
            .await?;

        rows.into_iter().map(TransactionRecord::try_from).collect()
    }

    async fn probe(&self) -> Result<StoreProbe, StoreError> {
        let pool = self.pool()?;

        let database_name = self
            .timed(sqlx::query_scalar::<_, String>("SELECT current_database()::text").fetch_one(pool))
            .await?;

        let collections = self
            .timed(
                sqlx::query_scalar::<_, String>(
                    r#"
                    SELECT table_name::text
                    FROM information_schema.tables
                    WHERE table_schema = 'public'
                    ORDER BY table_name
                    LIMIT 10
                    "#,
                )
                .fetch_all(pool),
            )
            .await?;

        Ok(StoreProbe {
            database_name,
            collections,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn row() -> TransactionRow {
        TransactionRow {
            id: Uuid::nil(),
            amount: Some(dec!(19.99)),
            currency: Some("GBP".into()),
            status: Some("pending".into()),
            transaction_type: Some("payout".into()),
            partner: Some("Clinique St. Michel".into()),
            reference: Some("PO-20250602-1".into()),
            occurred_at: None,
        }
    }

    fn rendered(filter: &TransactionFilter) -> String {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM transactions");
        push_filter(&mut builder, filter);
        builder.sql().to_string()
    }

    #[test]
    fn empty_filter_renders_no_where_clause() {
        assert_eq!(
            rendered(&TransactionFilter::all()),
            "SELECT COUNT(*) FROM transactions"
        );
    }

    #[test]
    fn filter_conditions_are_joined_with_and() {
        let filter = TransactionFilter::all()
            .of_type(TransactionType::Payout)
            .with_status(TransactionStatus::Pending)
            .since(Utc::now());

        assert_eq!(
            rendered(&filter),
            "SELECT COUNT(*) FROM transactions WHERE type = $1 AND status = $2 AND occurred_at >= $3"
        );
    }

    #[test]
    fn row_decodes_into_typed_record() {
        let record = TransactionRecord::try_from(row()).unwrap();

        assert_eq!(record.id.as_deref(), Some("00000000-0000-0000-0000-000000000000"));
        assert_eq!(record.currency, Some(Currency::Gbp));
        assert_eq!(record.status, Some(TransactionStatus::Pending));
        assert_eq!(record.transaction_type, Some(TransactionType::Payout));
        assert_eq!(record.amount, Some(dec!(19.99)));
    }

    #[test]
    fn unknown_enum_text_decodes_as_missing() {
        let mut raw = row();
        raw.currency = Some("JPY".into());
        raw.status = None;

        let record = TransactionRecord::try_from(raw).unwrap();
        assert_eq!(record.currency, None);
        assert_eq!(record.status, None);
    }

    #[test]
    fn negative_amount_is_a_decode_error() {
        let mut raw = row();
        raw.amount = Some(dec!(-1));

        assert!(matches!(
            TransactionRecord::try_from(raw),
            Err(StoreError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn store_without_pool_is_unavailable() {
        let store = PgTransactionStore::unavailable();

        assert!(!store.is_available().await);
        assert!(matches!(
            store.count(&TransactionFilter::all()).await,
            Err(StoreError::Unavailable)
        ));
        assert!(matches!(store.probe().await, Err(StoreError::Unavailable)));
    }
}
