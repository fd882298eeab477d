use crate::core::account::AccountId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single directed money transfer between two accounts.
///
/// This is the atomic unit of the analysis graph. Transactions are
/// immutable once parsed; detectors hold clones of the transactions
/// that evidence each ring.
///
/// # Examples
///
/// ```
/// use fraud_ring_engine::core::account::AccountId;
/// use fraud_ring_engine::core::transaction::Transaction;
/// use chrono::{TimeZone, Utc};
///
/// let tx = Transaction::new(
///     "T1",
///     AccountId::new("A"),
///     AccountId::new("B"),
///     250.0,
///     Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
/// );
/// assert_eq!(tx.amount, 250.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Identifier unique within the batch.
    pub transaction_id: String,
    /// The account the money leaves.
    pub sender: AccountId,
    /// The account the money reaches.
    pub receiver: AccountId,
    /// Transferred amount. Non-negative and finite.
    pub amount: f64,
    /// When the transfer happened, normalized to UTC.
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        transaction_id: impl Into<String>,
        sender: AccountId,
        receiver: AccountId,
        amount: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            sender,
            receiver,
            amount,
            timestamp,
        }
    }
}

/// Total time span of a transaction slice in hours. 0.0 when empty.
pub fn span_hours(txs: &[Transaction]) -> f64 {
    let mut it = txs.iter().map(|tx| tx.timestamp);
    let first = match it.next() {
        Some(ts) => ts,
        None => return 0.0,
    };
    let (mut min, mut max) = (first, first);
    for ts in it {
        if ts < min {
            min = ts;
        }
        if ts > max {
            max = ts;
        }
    }
    (max - min).num_seconds() as f64 / 3600.0
}

/// `max(amount) / min(amount)` across a transaction slice.
///
/// Returns 0.0 for an empty slice and `+inf` when the minimum amount is
/// zero, so callers comparing against a ratio ceiling reject it.
pub fn amount_ratio(txs: &[Transaction]) -> f64 {
    if txs.is_empty() {
        return 0.0;
    }
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for tx in txs {
        min = min.min(tx.amount);
        max = max.max(tx.amount);
    }
    if min == 0.0 {
        return f64::INFINITY;
    }
    max / min
}

/// Round half away from zero to `dp` decimal places.
pub fn round_dp(value: f64, dp: i32) -> f64 {
    let factor = 10f64.powi(dp);
    (value * factor).round() / factor
}
