//! Aggregation service - dashboard metrics derived from the ledger.
//!
//! This service computes:
//! - The metrics snapshot (balance, today's activity, pending payouts,
//!   success rate)
//! - The latest transactions listing
//! - The 7-day rollup bucketed by calendar day
//!
//! # Degraded Operation
//!
//! None of these operations fail. Each one first checks whether the store is
//! available and serves fixed placeholder data if it is not. A query that
//! fails afterwards is logged and replaced by a second, distinct placeholder
//! (or an empty listing for the latest transactions).
//!
//! # Time
//!
//! The reference clock is UTC. Callers pass `now` explicitly; handlers use
//! `Utc::now()`.

use chrono::{DateTime, Days, Duration, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;

use crate::error::StoreError;
use crate::models::metrics::{ActivitySummary, MetricsSnapshot, WeeklyBucket};
use crate::models::transaction::{
    Currency, TransactionStatus, TransactionType, TransactionView,
};
use crate::models::{round_money, round_rate};
use crate::store::{TransactionFilter, TransactionStore};

/// Listing size when the caller does not ask for one.
pub const DEFAULT_LATEST_LIMIT: i64 = 5;

/// Upper bound on the listing size.
pub const MAX_LATEST_LIMIT: i64 = 500;

/// Days covered by the weekly rollup, today included.
pub const WEEKLY_DAYS: usize = 7;

/// Counterparties used for placeholder rows.
pub const PLACEHOLDER_PARTNERS: [&str; 5] = [
    "Pharmacie Centrale",
    "Clinique St. Michel",
    "PharmaPlus Lyon",
    "Hôpital Sainte-Anne",
    "Centre Dentaire Azur",
];

/// Why an aggregation is serving placeholder data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fallback {
    /// The store is not configured or its handle has been closed.
    Offline,
    /// A query failed on a store that reported itself available.
    Degraded,
}

impl Fallback {
    /// Classify a store failure and log it.
    fn from_error(operation: &str, err: &StoreError) -> Self {
        if err.is_unavailable() {
            log_offline(operation);
            Fallback::Offline
        } else {
            tracing::warn!(operation, error = %err, "Store query failed, serving fallback");
            Fallback::Degraded
        }
    }
}

fn log_offline(operation: &str) {
    tracing::debug!(operation, "Transaction store unavailable, serving placeholders");
}

/// Midnight UTC of the day containing `now`.
pub fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    midnight(now.date_naive())
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Compute the dashboard metrics snapshot.
///
/// # Formulas
///
/// - `available_balance`: completed payins minus all payouts. Payouts count
///   whatever their status, pending and failed included.
/// - `today`: every transaction since midnight UTC. Both directions add to
///   the amount.
/// - `payouts_pending`: payouts in the pending state.
/// - `success_rate`: completed over total, with the total floored at 1 so an
///   empty ledger yields 0.
///
/// Money is rounded to 2 places and the rate to 4, half away from zero.
pub async fn metrics_snapshot(store: &dyn TransactionStore, now: DateTime<Utc>) -> MetricsSnapshot {
    if !store.is_available().await {
        log_offline("metrics");
        return MetricsSnapshot::offline();
    }

    match compute_metrics(store, now).await {
        Ok(snapshot) => snapshot,
        Err(err) => match Fallback::from_error("metrics", &err) {
            Fallback::Offline => MetricsSnapshot::offline(),
            Fallback::Degraded => MetricsSnapshot::degraded(),
        },
    }
}

async fn compute_metrics(
    store: &dyn TransactionStore,
    now: DateTime<Utc>,
) -> Result<MetricsSnapshot, StoreError> {
    let completed_payins = TransactionFilter::all()
        .of_type(TransactionType::Payin)
        .with_status(TransactionStatus::Completed);
    let payouts = TransactionFilter::all().of_type(TransactionType::Payout);
    let today = TransactionFilter::all().since(start_of_day(now));
    let pending_payouts = payouts.with_status(TransactionStatus::Pending);
    let completed = TransactionFilter::all().with_status(TransactionStatus::Completed);
    let everything = TransactionFilter::all();

    let (
        payin_total,
        payout_total,
        today_count,
        today_amount,
        pending_count,
        pending_amount,
        completed_count,
        total_count,
    ) = tokio::try_join!(
        store.sum(&completed_payins),
        store.sum(&payouts),
        store.count(&today),
        store.sum(&today),
        store.count(&pending_payouts),
        store.sum(&pending_payouts),
        store.count(&completed),
        store.count(&everything),
    )?;

    let success_rate = Decimal::from(completed_count) / Decimal::from(total_count.max(1));

    Ok(MetricsSnapshot {
        available_balance: round_money(payin_total - payout_total),
        today: ActivitySummary::new(today_count, round_money(today_amount)),
        payouts_pending: ActivitySummary::new(pending_count, round_money(pending_amount)),
        success_rate: round_rate(success_rate),
    })
}

/// List the most recent transactions, newest `occurred_at` first.
///
/// `limit` is capped at [`MAX_LATEST_LIMIT`]. While the store is offline the
/// listing is filled with `limit` placeholder rows; a failing query yields an
/// empty listing instead.
pub async fn latest_transactions(
    store: &dyn TransactionStore,
    limit: i64,
    now: DateTime<Utc>,
) -> Vec<TransactionView> {
    let limit = limit.clamp(0, MAX_LATEST_LIMIT);

    if !store.is_available().await {
        log_offline("latest_transactions");
        return placeholder_transactions(limit, now);
    }

    match store.find(&TransactionFilter::all(), Some(limit)).await {
        Ok(records) => records.into_iter().map(TransactionView::from).collect(),
        Err(err) => match Fallback::from_error("latest_transactions", &err) {
            Fallback::Offline => placeholder_transactions(limit, now),
            Fallback::Degraded => Vec::new(),
        },
    }
}

/// Deterministic demo rows cycling through partners, statuses and types.
fn placeholder_transactions(limit: i64, now: DateTime<Utc>) -> Vec<TransactionView> {
    const STATUSES: [TransactionStatus; 3] = [
        TransactionStatus::Completed,
        TransactionStatus::Pending,
        TransactionStatus::Failed,
    ];
    const TYPES: [TransactionType; 2] = [TransactionType::Payin, TransactionType::Payout];

    let day = now.format("%Y%m%d").to_string();
    (0..limit)
        .map(|i| {
            let slot = i as usize;
            TransactionView {
                id: Some(i.to_string()),
                amount: Decimal::new(12_345, 2) + Decimal::from(i),
                currency: Currency::Eur,
                status: STATUSES[slot % STATUSES.len()],
                transaction_type: TYPES[slot % TYPES.len()],
                partner: Some(PLACEHOLDER_PARTNERS[slot % PLACEHOLDER_PARTNERS.len()].to_string()),
                reference: Some(format!("INV-{day}-{i}")),
                occurred_at: Some(now - Duration::hours(i)),
            }
        })
        .collect()
}

/// Sum transaction amounts per calendar day over the last seven days.
///
/// Always returns [`WEEKLY_DAYS`] buckets, oldest first, ending today (UTC).
/// Every transaction since midnight of the first day counts, whatever its
/// type or status. The query has no upper bound, so transactions dated after
/// today are fetched too, but they are deliberately left out of the output
/// rather than given an extra bucket: the rollup is always exactly seven
/// days.
pub async fn weekly_rollup(store: &dyn TransactionStore, now: DateTime<Utc>) -> Vec<WeeklyBucket> {
    let first_day = now.date_naive() - Days::new(WEEKLY_DAYS as u64 - 1);

    if !store.is_available().await {
        log_offline("weekly_rollup");
        return placeholder_week(first_day, Fallback::Offline);
    }

    match bucket_week(store, first_day).await {
        Ok(amounts) => week_dates(first_day)
            .zip(amounts)
            .map(|(date, amount)| WeeklyBucket {
                date,
                amount: round_money(amount),
            })
            .collect(),
        Err(err) => placeholder_week(first_day, Fallback::from_error("weekly_rollup", &err)),
    }
}

async fn bucket_week(
    store: &dyn TransactionStore,
    first_day: NaiveDate,
) -> Result<[Decimal; WEEKLY_DAYS], StoreError> {
    let mut amounts = [Decimal::ZERO; WEEKLY_DAYS];
    let filter = TransactionFilter::all().since(midnight(first_day));

    for record in store.find(&filter, None).await? {
        let Some(occurred_at) = record.occurred_at else {
            continue;
        };
        let offset = (occurred_at.date_naive() - first_day).num_days();
        match usize::try_from(offset).ok().filter(|&o| o < WEEKLY_DAYS) {
            Some(slot) => amounts[slot] += record.amount_or_zero(),
            None => tracing::debug!(%occurred_at, "Transaction outside weekly window, skipped"),
        }
    }

    Ok(amounts)
}

fn week_dates(first_day: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    (0..WEEKLY_DAYS as u64).map(move |i| first_day + Days::new(i))
}

/// Rising placeholder bars: 300 per day step offline, 250 when degraded.
fn placeholder_week(first_day: NaiveDate, fallback: Fallback) -> Vec<WeeklyBucket> {
    let step = match fallback {
        Fallback::Offline => Decimal::from(300),
        Fallback::Degraded => Decimal::from(250),
    };

    week_dates(first_day)
        .zip(1i64..)
        .map(|(date, n)| WeeklyBucket {
            date,
            amount: step * Decimal::from(n),
        })
        .collect()
}
