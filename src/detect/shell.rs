use crate::core::account::AccountId;
use crate::core::transaction::round_dp;
use crate::detect::ring::{Ring, RingKind};
use crate::detect::{indexed_span_hours, resolve_txs};
use crate::graph::transaction_graph::TransactionGraph;
use std::cmp::Reverse;
use std::collections::HashSet;

pub const MIN_PATH_LEN: usize = 4;
pub const MAX_PATH_LEN: usize = 8;
pub const INTERMEDIATE_DEGREE_MIN: usize = 2;
pub const INTERMEDIATE_DEGREE_MAX: usize = 3;
pub const MAX_TIME_SPAN_HOURS: f64 = 72.0;
pub const MAX_AMOUNT_RATIO: f64 = 3.0;
pub const MIN_TRANSACTION_AMOUNT: f64 = 100.0;

/// Find layered pass-through chains: acyclic paths of at least three
/// hops (4–8 accounts) whose intermediates have total degree 2–3,
/// every edge carrying at least 100, amounts within a 3.0 max/min
/// ratio, completing inside 72 hours. Two-hop relays do not qualify.
/// Only maximal chains survive post-processing.
pub fn detect_shell_chains(graph: &TransactionGraph) -> Vec<Ring> {
    let mut candidates = Vec::new();
    let mut seen_paths: HashSet<Vec<AccountId>> = HashSet::new();

    for start in graph.all_nodes() {
        let mut path = vec![start.clone()];
        let mut tx_path: Vec<usize> = Vec::new();
        explore(graph, &mut path, &mut tx_path, &mut candidates, &mut seen_paths);
    }

    keep_maximal_chains(candidates)
}

/// Depth-limited DFS building acyclic chains with constrained
/// intermediate degrees. Every prefix reaching the minimum length
/// that validates is emitted as a candidate; maximality is resolved
/// afterwards.
fn explore(
    graph: &TransactionGraph,
    path: &mut Vec<AccountId>,
    tx_path: &mut Vec<usize>,
    candidates: &mut Vec<Ring>,
    seen_paths: &mut HashSet<Vec<AccountId>>,
) {
    let current = path.last().expect("path never empty").clone();
    let depth = path.len();

    if depth >= MIN_PATH_LEN
        && !seen_paths.contains(path.as_slice())
        && validate_chain(graph, tx_path)
    {
        seen_paths.insert(path.clone());
        let tightness = compute_tightness(graph, path);
        candidates.push(Ring::new(
            path.clone(),
            resolve_txs(graph, tx_path),
            RingKind::Shell {
                path_length: path.len(),
                tightness_score: round_dp(tightness, 4),
            },
        ));
    }

    if depth >= MAX_PATH_LEN {
        return;
    }

    // A pass-through account keeps its footprint small; anything with
    // wider branching disqualifies every extension through it.
    if depth > 1 {
        let degree = graph.total_degree(&current);
        if !(INTERMEDIATE_DEGREE_MIN..=INTERMEDIATE_DEGREE_MAX).contains(&degree) {
            return;
        }
    }

    for &ti in graph.outgoing(&current) {
        let tx = graph.tx(ti);
        let neighbour = &tx.receiver;

        if path.contains(neighbour) {
            continue;
        }
        if tx.amount < MIN_TRANSACTION_AMOUNT {
            continue;
        }

        tx_path.push(ti);
        if indexed_span_hours(graph, tx_path) <= MAX_TIME_SPAN_HOURS {
            path.push(neighbour.clone());
            explore(graph, path, tx_path, candidates, seen_paths);
            path.pop();
        }
        tx_path.pop();
    }
}

fn validate_chain(graph: &TransactionGraph, tx_path: &[usize]) -> bool {
    if tx_path.is_empty() {
        return false;
    }
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
    if min <= 0.0 {
        return false;
    }
    max / min <= MAX_AMOUNT_RATIO
}

/// Structural tightness: `1 / avg(total_degree)` over the chain's
/// intermediate accounts. 1.0 when there are none.
fn compute_tightness(graph: &TransactionGraph, path: &[AccountId]) -> f64 {
    let intermediates = &path[1..path.len() - 1];
    if intermediates.is_empty() {
        return 1.0;
    }
    let total: usize = intermediates
        .iter()
        .map(|node| graph.stats(node).map(|s| s.total_degree()).unwrap_or(1))
        .sum();
    let avg = total as f64 / intermediates.len() as f64;
    if avg == 0.0 {
        return 1.0;
    }
    1.0 / avg
}

/// Discard every chain whose member sequence is a contiguous
/// subsequence of a longer kept chain. Walking candidates longest
/// first and registering each kept chain's subsequences keeps the
/// pass linear in the total subsequence count.
fn keep_maximal_chains(mut candidates: Vec<Ring>) -> Vec<Ring> {
    candidates.sort_by_key(|ring| Reverse(ring.members.len()));

    let mut kept = Vec::new();
    let mut covered: HashSet<Vec<AccountId>> = HashSet::new();

    for ring in candidates {
        if covered.contains(&ring.members) {
            continue;
        }

        let members = ring.members.clone();
        kept.push(ring);

        let n = members.len();
        for len in 2..=n {
            for start in 0..=(n - len) {
                covered.insert(members[start..start + len].to_vec());
            }
        }
    }

    kept
}
