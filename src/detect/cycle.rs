use crate::core::account::AccountId;
use crate::core::transaction::{amount_ratio, round_dp, span_hours};
use crate::detect::ring::{Ring, RingKind};
use crate::detect::{indexed_span_hours, resolve_txs};
use crate::graph::transaction_graph::TransactionGraph;
use std::collections::HashSet;

pub const MIN_CYCLE_LEN: usize = 3;
pub const MAX_CYCLE_LEN: usize = 5;
pub const MAX_TIME_SPAN_HOURS: f64 = 72.0;
pub const MAX_AMOUNT_RATIO: f64 = 1.25;

/// Find all directed simple cycles of length 3–5 whose transactions
/// span at most 72 hours with a max/min amount ratio of at most 1.25.
///
/// # Algorithm
///
/// For each start node with both inbound and outbound edges, in
/// ascending id order, a bounded DFS closes cycles back to the start.
/// The DFS never steps to a node with id smaller than the start, so
/// every cycle is discovered exactly once, already rotated to its
/// lexicographically smallest member. Parallel edges between the same
/// ordered node pair collapse through the canonical-tuple set.
pub fn detect_cycles(graph: &TransactionGraph) -> Vec<Ring> {
    let mut seen_canonical: HashSet<Vec<AccountId>> = HashSet::new();
    let mut rings = Vec::new();

    for start in graph.all_nodes() {
        let can_cycle = graph
            .stats(start)
            .map(|s| s.in_degree > 0 && s.out_degree > 0)
            .unwrap_or(false);
        if !can_cycle {
            continue;
        }

        let mut path = vec![start.clone()];
        let mut tx_path: Vec<usize> = Vec::new();
        dfs(
            graph,
            start,
            &mut path,
            &mut tx_path,
            &mut seen_canonical,
            &mut rings,
        );
    }

    rings
}

/// Bounded DFS up to depth `MAX_CYCLE_LEN`.
fn dfs(
    graph: &TransactionGraph,
    start: &AccountId,
    path: &mut Vec<AccountId>,
    tx_path: &mut Vec<usize>,
    seen_canonical: &mut HashSet<Vec<AccountId>>,
    rings: &mut Vec<Ring>,
) {
    let current = path.last().expect("path never empty").clone();
    let depth = path.len();

    if depth > MAX_CYCLE_LEN {
        return;
    }

    for &ti in graph.outgoing(&current) {
        let neighbour = &graph.tx(ti).receiver;

        // Anything below the start is owned by a smaller start node.
        if neighbour < start {
            continue;
        }

        if neighbour == start && depth >= MIN_CYCLE_LEN {
            tx_path.push(ti);
            if validate_cycle(graph, tx_path) && !seen_canonical.contains(path.as_slice()) {
                seen_canonical.insert(path.clone());
                let txs = resolve_txs(graph, tx_path);
                let span = span_hours(&txs);
                let ratio = amount_ratio(&txs);
                rings.push(Ring::new(
                    path.clone(),
                    txs,
                    RingKind::Cycle {
                        cycle_length: path.len(),
                        time_span_hours: round_dp(span, 2),
                        amount_ratio: round_dp(ratio, 4),
                    },
                ));
            }
            tx_path.pop();
            continue;
        }

        if !path.contains(neighbour) && depth < MAX_CYCLE_LEN {
            tx_path.push(ti);
            // Cut branches that already span too long.
            if indexed_span_hours(graph, tx_path) <= MAX_TIME_SPAN_HOURS {
                path.push(neighbour.clone());
                dfs(graph, start, path, tx_path, seen_canonical, rings);
                path.pop();
            }
            tx_path.pop();
        }
    }
}

fn validate_cycle(graph: &TransactionGraph, tx_path: &[usize]) -> bool {
    if indexed_span_hours(graph, tx_path) > MAX_TIME_SPAN_HOURS {
        return false;
    }
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &i in tx_path {
        let amount = graph.tx(i).amount;
        min = min.min(amount);
        max = max.max(amount);
    }
    if min == 0.0 {
        return false;
    }
    max / min <= MAX_AMOUNT_RATIO
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transaction::Transaction;
    use chrono::{TimeZone, Utc};

    fn tx(id: &str, from: &str, to: &str, amount: f64, hour: u32) -> Transaction {
        Transaction::new(
            id,
            AccountId::new(from),
            AccountId::new(to),
            amount,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::hours(hour as i64),
        )
    }

    fn members(ring: &Ring) -> Vec<&str> {
        ring.members.iter().map(AccountId::as_str).collect()
    }

    #[test]
    fn test_triangle_cycle() {
        let graph = TransactionGraph::from_transactions(vec![
            tx("T1", "A", "B", 100.0, 0),
            tx("T2", "B", "C", 100.0, 6),
            tx("T3", "C", "A", 100.0, 12),
        ]);

        let rings = detect_cycles(&graph);
        assert_eq!(rings.len(), 1);
        assert_eq!(members(&rings[0]), vec!["A", "B", "C"]);
        match rings[0].kind {
            RingKind::Cycle {
                cycle_length,
                time_span_hours,
                amount_ratio,
            } => {
                assert_eq!(cycle_length, 3);
                assert_eq!(time_span_hours, 12.0);
                assert_eq!(amount_ratio, 1.0);
            }
            _ => panic!("expected cycle"),
        }
    }

    #[test]
    fn test_amount_ratio_violation() {
        let graph = TransactionGraph::from_transactions(vec![
            tx("T1", "A", "B", 100.0, 0),
            tx("T2", "B", "C", 100.0, 6),
            tx("T3", "C", "A", 200.0, 12),
        ]);
        assert!(detect_cycles(&graph).is_empty());
    }

    #[test]
    fn test_time_span_violation() {
        let graph = TransactionGraph::from_transactions(vec![
            tx("T1", "A", "B", 100.0, 0),
            tx("T2", "B", "C", 100.0, 40),
            tx("T3", "C", "A", 100.0, 80),
        ]);
        assert!(detect_cycles(&graph).is_empty());
    }

    #[test]
    fn test_two_node_cycle_not_reported() {
        let graph = TransactionGraph::from_transactions(vec![
            tx("T1", "A", "B", 100.0, 0),
            tx("T2", "B", "A", 100.0, 1),
        ]);
        assert!(detect_cycles(&graph).is_empty());
    }

    #[test]
    fn test_parallel_edges_collapse() {
        let graph = TransactionGraph::from_transactions(vec![
            tx("T1", "A", "B", 100.0, 0),
            tx("T2", "A", "B", 110.0, 1),
            tx("T3", "B", "C", 100.0, 6),
            tx("T4", "C", "A", 100.0, 12),
        ]);
        let rings = detect_cycles(&graph);
        assert_eq!(rings.len(), 1);
    }

    #[test]
    fn test_five_cycle_found_six_not() {
        let five = TransactionGraph::from_transactions(vec![
            tx("T1", "A", "B", 100.0, 0),
            tx("T2", "B", "C", 100.0, 1),
            tx("T3", "C", "D", 100.0, 2),
            tx("T4", "D", "E", 100.0, 3),
            tx("T5", "E", "A", 100.0, 4),
        ]);
        assert_eq!(detect_cycles(&five).len(), 1);

        let six = TransactionGraph::from_transactions(vec![
            tx("T1", "A", "B", 100.0, 0),
            tx("T2", "B", "C", 100.0, 1),
            tx("T3", "C", "D", 100.0, 2),
            tx("T4", "D", "E", 100.0, 3),
            tx("T5", "E", "F", 100.0, 4),
            tx("T6", "F", "A", 100.0, 5),
        ]);
        assert!(detect_cycles(&six).is_empty());
    }

    #[test]
    fn test_cycle_starts_at_smallest_member() {
        // Same triangle, fed in an order that makes C the first sender.
        let graph = TransactionGraph::from_transactions(vec![
            tx("T1", "C", "A", 100.0, 12),
            tx("T2", "B", "C", 100.0, 6),
            tx("T3", "A", "B", 100.0, 0),
        ]);
        let rings = detect_cycles(&graph);
        assert_eq!(rings.len(), 1);
        assert_eq!(members(&rings[0]), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_two_disjoint_cycles() {
        let graph = TransactionGraph::from_transactions(vec![
            tx("T1", "A", "B", 100.0, 0),
            tx("T2", "B", "C", 100.0, 1),
            tx("T3", "C", "A", 100.0, 2),
            tx("T4", "X", "Y", 50.0, 0),
            tx("T5", "Y", "Z", 50.0, 1),
            tx("T6", "Z", "X", 50.0, 2),
        ]);
        let rings = detect_cycles(&graph);
        assert_eq!(rings.len(), 2);
        // Enumeration order follows ascending start ids.
        assert_eq!(members(&rings[0]), vec!["A", "B", "C"]);
        assert_eq!(members(&rings[1]), vec!["X", "Y", "Z"]);
    }
}
