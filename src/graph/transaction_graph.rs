use crate::core::account::AccountId;
use crate::core::transaction::Transaction;
use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashMap};

/// Per-account aggregate statistics, accumulated during graph build.
#[derive(Debug, Clone, Default)]
pub struct NodeStats {
    pub in_degree: usize,
    pub out_degree: usize,
    pub total_in_amount: f64,
    pub total_out_amount: f64,
    /// Every instant touching this account, in input order.
    pub timestamps: Vec<DateTime<Utc>>,
}

impl NodeStats {
    pub fn total_degree(&self) -> usize {
        self.in_degree + self.out_degree
    }
}

/// A directed graph of money transfers for one analysis batch.
///
/// Built once by the ingestor and read-only thereafter. Adjacency lists
/// hold indices into `transactions`, preserving input order per sender —
/// detector enumeration order depends on it.
///
/// # Examples
///
/// ```
/// use fraud_ring_engine::core::account::AccountId;
/// use fraud_ring_engine::core::transaction::Transaction;
/// use fraud_ring_engine::graph::transaction_graph::TransactionGraph;
/// use chrono::{TimeZone, Utc};
///
/// let mut graph = TransactionGraph::new();
/// graph.add_transaction(Transaction::new(
///     "T1",
///     AccountId::new("A"),
///     AccountId::new("B"),
///     100.0,
///     Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
/// ));
///
/// assert_eq!(graph.node_count(), 2);
/// assert_eq!(graph.transaction_count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TransactionGraph {
    transactions: Vec<Transaction>,
    /// sender -> indices into `transactions`, input order preserved
    adj_out: HashMap<AccountId, Vec<usize>>,
    /// receiver -> indices into `transactions`, input order preserved
    adj_in: HashMap<AccountId, Vec<usize>>,
    node_stats: HashMap<AccountId, NodeStats>,
    all_nodes: BTreeSet<AccountId>,
}

impl TransactionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a transaction, updating adjacency and per-node statistics.
    pub fn add_transaction(&mut self, tx: Transaction) {
        let idx = self.transactions.len();

        self.adj_out.entry(tx.sender.clone()).or_default().push(idx);
        self.adj_in.entry(tx.receiver.clone()).or_default().push(idx);

        self.all_nodes.insert(tx.sender.clone());
        self.all_nodes.insert(tx.receiver.clone());

        let sender_stats = self.node_stats.entry(tx.sender.clone()).or_default();
        sender_stats.out_degree += 1;
        sender_stats.total_out_amount += tx.amount;
        sender_stats.timestamps.push(tx.timestamp);

        let receiver_stats = self.node_stats.entry(tx.receiver.clone()).or_default();
        receiver_stats.in_degree += 1;
        receiver_stats.total_in_amount += tx.amount;
        receiver_stats.timestamps.push(tx.timestamp);

        self.transactions.push(tx);
    }

    /// Build a graph from an already-parsed transaction list.
    pub fn from_transactions(transactions: Vec<Transaction>) -> Self {
        let mut graph = Self::new();
        for tx in transactions {
            graph.add_transaction(tx);
        }
        graph
    }

    /// All transactions in input order.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Look up a transaction by its adjacency index.
    pub fn tx(&self, idx: usize) -> &Transaction {
        &self.transactions[idx]
    }

    /// Indices of outgoing transactions for an account, input order.
    pub fn outgoing(&self, account: &AccountId) -> &[usize] {
        self.adj_out.get(account).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Indices of incoming transactions for an account, input order.
    pub fn incoming(&self, account: &AccountId) -> &[usize] {
        self.adj_in.get(account).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Per-account statistics, if the account appears in the batch.
    pub fn stats(&self, account: &AccountId) -> Option<&NodeStats> {
        self.node_stats.get(account)
    }

    /// Combined in/out degree; 0 for unknown accounts.
    pub fn total_degree(&self, account: &AccountId) -> usize {
        self.node_stats
            .get(account)
            .map(NodeStats::total_degree)
            .unwrap_or(0)
    }

    /// Every account in the batch, in ascending id order.
    pub fn all_nodes(&self) -> &BTreeSet<AccountId> {
        &self.all_nodes
    }

    pub fn node_count(&self) -> usize {
        self.all_nodes.len()
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }
}
