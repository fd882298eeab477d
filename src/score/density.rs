use crate::core::account::AccountId;
use crate::graph::transaction_graph::TransactionGraph;
use std::collections::{BTreeMap, BTreeSet};

pub const DENSITY_THRESHOLD: f64 = 0.3;
pub const DENSITY_MULTIPLIER: f64 = 0.8;

/// Local anomaly density multiplier per suspicious account.
///
/// An account surrounded mostly by clean accounts gets dampened:
/// multiplier 0.8 when fewer than 30% of its neighbours are themselves
/// suspicious (or when it has no neighbours at all), 1.0 otherwise.
pub fn density_adjustments(
    suspicious: &BTreeSet<AccountId>,
    graph: &TransactionGraph,
) -> BTreeMap<AccountId, f64> {
    let mut adjustments = BTreeMap::new();

    for account in suspicious {
        let mut neighbours: BTreeSet<&AccountId> = BTreeSet::new();
        for &i in graph.outgoing(account) {
            neighbours.insert(&graph.tx(i).receiver);
        }
        for &i in graph.incoming(account) {
            neighbours.insert(&graph.tx(i).sender);
        }

        if neighbours.is_empty() {
            adjustments.insert(account.clone(), DENSITY_MULTIPLIER);
            continue;
        }

        let suspicious_neighbours = neighbours
            .iter()
            .filter(|n| suspicious.contains(**n))
            .count();
        let density = suspicious_neighbours as f64 / neighbours.len() as f64;

        let multiplier = if density < DENSITY_THRESHOLD {
            DENSITY_MULTIPLIER
        } else {
            1.0
        };
        adjustments.insert(account.clone(), multiplier);
    }

    adjustments
}
