//! Synthetic transaction networks for benchmarks, demos and the CLI
//! `generate` command.
//!
//! Random traffic alone rarely trips the detectors; seeded cycle
//! motifs give test datasets something to find. None of this is used
//! by the analysis pipeline itself.

use crate::core::account::AccountId;
use crate::core::transaction::Transaction;
use chrono::{Duration, TimeZone, Utc};
use rand::Rng;

/// Configuration for generating a random transaction network.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Number of ordinary accounts.
    pub account_count: usize,
    /// Number of random background transactions.
    pub transaction_count: usize,
    /// Minimum transfer amount.
    pub min_amount: f64,
    /// Maximum transfer amount.
    pub max_amount: f64,
    /// Random timestamps spread across this many hours.
    pub span_hours: i64,
    /// Number of triangle-cycle motifs injected on fresh accounts.
    pub seeded_cycles: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            account_count: 50,
            transaction_count: 200,
            min_amount: 50.0,
            max_amount: 5_000.0,
            span_hours: 7 * 24,
            seeded_cycles: 0,
        }
    }
}

/// Generate a random transaction network for testing.
pub fn generate_random_network(config: &NetworkConfig) -> Vec<Transaction> {
    let mut rng = rand::thread_rng();
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

    let accounts: Vec<AccountId> = (0..config.account_count.max(2))
        .map(|i| AccountId::new(format!("ACC-{i:04}")))
        .collect();

    let mut transactions = Vec::with_capacity(config.transaction_count + config.seeded_cycles * 3);

    for i in 0..config.transaction_count {
        let sender_idx = rng.gen_range(0..accounts.len());
        let mut receiver_idx = rng.gen_range(0..accounts.len());
        while receiver_idx == sender_idx {
            receiver_idx = rng.gen_range(0..accounts.len());
        }

        let amount = rng.gen_range(config.min_amount..config.max_amount);
        let offset_minutes = rng.gen_range(0..config.span_hours.max(1) * 60);

        transactions.push(Transaction::new(
            format!("TX-{i:05}"),
            accounts[sender_idx].clone(),
            accounts[receiver_idx].clone(),
            (amount * 100.0).round() / 100.0,
            base + Duration::minutes(offset_minutes),
        ));
    }

    for c in 0..config.seeded_cycles {
        let members = [
            AccountId::new(format!("MULE-{c:03}-A")),
            AccountId::new(format!("MULE-{c:03}-B")),
            AccountId::new(format!("MULE-{c:03}-C")),
        ];
        let start = base + Duration::hours(rng.gen_range(0..config.span_hours.max(1)));
        let amount: f64 = rng.gen_range(500.0..1_000.0);
        let amount = (amount * 100.0).round() / 100.0;

        for (leg, pair) in [(0, (0, 1)), (1, (1, 2)), (2, (2, 0))] {
            transactions.push(Transaction::new(
                format!("MULE-{c:03}-T{leg}"),
                members[pair.0].clone(),
                members[pair.1].clone(),
                amount,
                start + Duration::hours(leg as i64),
            ));
        }
    }

    transactions
}

/// Render a transaction list as CSV text accepted by the ingestor.
pub fn to_csv(transactions: &[Transaction]) -> String {
    let mut out = String::from("transaction_id,sender_id,receiver_id,amount,timestamp\n");
    for tx in transactions {
        out.push_str(&format!(
            "{},{},{},{:.2},{}\n",
            tx.transaction_id,
            tx.sender,
            tx.receiver,
            tx.amount,
            tx.timestamp.format("%Y-%m-%d %H:%M:%S"),
        ));
    }
    out
}
