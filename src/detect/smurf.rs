use crate::core::account::AccountId;
use crate::core::transaction::{round_dp, Transaction};
use crate::detect::ring::{FanDirection, Ring, RingKind};
use crate::graph::transaction_graph::TransactionGraph;
use chrono::Duration;
use std::collections::{BTreeSet, HashMap};

pub const MIN_COUNTERPARTIES: usize = 10;
pub const WINDOW_HOURS: i64 = 72;
pub const DIVERSITY_THRESHOLD: f64 = 0.7;
pub const VARIANCE_THRESHOLD: f64 = 0.5;

/// Flag hubs that touch at least 10 distinct counterparties within
/// some sliding 72-hour window, separately for fan-out and fan-in.
///
/// Hubs are visited in ascending id order; a hub can emit up to two
/// rings, fan-out first. The retained window is the one with the most
/// distinct counterparties (the earliest such window on ties).
pub fn detect_smurfing(graph: &TransactionGraph) -> Vec<Ring> {
    let mut rings = Vec::new();

    for node in graph.all_nodes() {
        if let Some(ring) = check_fan(graph, node, graph.outgoing(node), FanDirection::FanOut) {
            rings.push(ring);
        }
        if let Some(ring) = check_fan(graph, node, graph.incoming(node), FanDirection::FanIn) {
            rings.push(ring);
        }
    }

    rings
}

fn counterparty(tx: &Transaction, direction: FanDirection) -> &AccountId {
    match direction {
        FanDirection::FanOut => &tx.receiver,
        FanDirection::FanIn => &tx.sender,
    }
}

fn check_fan(
    graph: &TransactionGraph,
    hub: &AccountId,
    tx_indices: &[usize],
    direction: FanDirection,
) -> Option<Ring> {
    if tx_indices.len() < MIN_COUNTERPARTIES {
        return None;
    }

    let mut sorted: Vec<&Transaction> = tx_indices.iter().map(|&i| graph.tx(i)).collect();
    sorted.sort_by_key(|tx| tx.timestamp);

    let (left, right) = best_sliding_window(&sorted, direction)?;
    let window: Vec<Transaction> = sorted[left..right].iter().map(|tx| (*tx).clone()).collect();

    let counterparties: BTreeSet<AccountId> = window
        .iter()
        .map(|tx| counterparty(tx, direction).clone())
        .collect();

    let diversity = counterparties.len() as f64 / window.len() as f64;
    let amounts: Vec<f64> = window.iter().map(|tx| tx.amount).collect();
    let variance_ratio = variance_ratio(&amounts);
    let dampened = diversity > DIVERSITY_THRESHOLD || variance_ratio > VARIANCE_THRESHOLD;

    let mut members = Vec::with_capacity(1 + counterparties.len());
    members.push(hub.clone());
    members.extend(counterparties.iter().cloned());

    Some(Ring::new(
        members,
        window,
        RingKind::Smurf {
            hub: hub.clone(),
            direction,
            counterparty_count: counterparties.len(),
            diversity_score: round_dp(diversity, 4),
            variance_ratio: round_dp(variance_ratio, 4),
            dampened,
        },
    ))
}

/// Two-pointer scan for the 72-hour window with the most distinct
/// counterparties. Returns the `[left, right)` bounds into the
/// timestamp-sorted slice, or `None` when no window reaches the
/// counterparty minimum.
fn best_sliding_window(sorted: &[&Transaction], direction: FanDirection) -> Option<(usize, usize)> {
    let window_delta = Duration::hours(WINDOW_HOURS);
    let n = sorted.len();

    let mut best: Option<(usize, usize)> = None;
    let mut best_count = 0usize;
    let mut in_window: HashMap<&AccountId, usize> = HashMap::new();
    let mut right = 0usize;

    for left in 0..n {
        while right < n && sorted[right].timestamp - sorted[left].timestamp <= window_delta {
            *in_window
                .entry(counterparty(sorted[right], direction))
                .or_insert(0) += 1;
            right += 1;
        }

        if in_window.len() >= MIN_COUNTERPARTIES && in_window.len() > best_count {
            best_count = in_window.len();
            best = Some((left, right));
        }

        let leaving = counterparty(sorted[left], direction);
        if let Some(count) = in_window.get_mut(leaving) {
            *count -= 1;
            if *count == 0 {
                in_window.remove(leaving);
            }
        }
    }

    best
}

/// Population stdev over mean; 0 when fewer than two amounts or the
/// mean is zero.
fn variance_ratio(amounts: &[f64]) -> f64 {
    if amounts.len() < 2 {
        return 0.0;
    }
    let mean = amounts.iter().sum::<f64>() / amounts.len() as f64;
    if mean == 0.0 {
        return 0.0;
    }
    let variance =
        amounts.iter().map(|a| (a - mean).powi(2)).sum::<f64>() / amounts.len() as f64;
    variance.sqrt() / mean
}
