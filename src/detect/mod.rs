pub mod cycle;
pub mod ring;
pub mod shell;
pub mod smurf;

use crate::core::transaction::Transaction;
use crate::graph::transaction_graph::TransactionGraph;

/// Time span in hours across a path of transaction indices.
pub(crate) fn indexed_span_hours(graph: &TransactionGraph, tx_path: &[usize]) -> f64 {
    let mut it = tx_path.iter().map(|&i| graph.tx(i).timestamp);
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

/// Materialize a path of transaction indices into owned transactions.
pub(crate) fn resolve_txs(graph: &TransactionGraph, tx_path: &[usize]) -> Vec<Transaction> {
    tx_path.iter().map(|&i| graph.tx(i).clone()).collect()
}
