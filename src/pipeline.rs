//! End-to-end analysis façade.
//!
//! This is the surface external collaborators (HTTP handlers, CLIs,
//! sinks) consume: a synchronous [`analyze`] over raw CSV text, the
//! [`Analysis`] it returns with read-only access to the parsed graph,
//! and the per-account [`account_detail`] drill-down.

use crate::core::account::AccountId;
use crate::core::error::AnalysisError;
use crate::core::transaction::round_dp;
use crate::detect::cycle::detect_cycles;
use crate::detect::ring::Ring;
use crate::detect::shell::detect_shell_chains;
use crate::detect::smurf::detect_smurfing;
use crate::graph::ingest::parse_csv;
use crate::graph::transaction_graph::TransactionGraph;
use crate::score::engine::run_scoring;
use crate::score::report::{AnalysisReport, FraudRing, SuspiciousAccount};
use chrono::{DateTime, Utc};
use log::info;
use serde::Serialize;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Instant;

/// The outcome of one analysis request: the scored report plus the
/// graph it was computed from. Both are immutable from here on.
#[derive(Debug)]
pub struct Analysis {
    pub graph: TransactionGraph,
    pub report: AnalysisReport,
}

/// Ingest a CSV batch and run the full detection and scoring pipeline.
///
/// Detectors run in the fixed cycle, smurf, shell order; ring ids
/// depend on it. Any panic inside detection or scoring surfaces as
/// [`AnalysisError::Internal`] — no partial result is ever returned.
pub fn analyze(text: &str) -> Result<Analysis, AnalysisError> {
    let started = Instant::now();
    let graph = parse_csv(text)?;

    let report = catch_unwind(AssertUnwindSafe(|| {
        let cycles = detect_cycles(&graph);
        let smurfs = detect_smurfing(&graph);
        let shells = detect_shell_chains(&graph);
        info!(
            "detectors found {} cycle / {} smurf / {} shell rings",
            cycles.len(),
            smurfs.len(),
            shells.len()
        );

        let mut rings: Vec<Ring> = cycles;
        rings.extend(smurfs);
        rings.extend(shells);
        run_scoring(&graph, rings)
    }))
    .map_err(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "detection pipeline panicked".to_string());
        AnalysisError::Internal(message)
    })?;

    info!(
        "analysis finished in {:.3}s",
        started.elapsed().as_secs_f64()
    );

    Ok(Analysis { graph, report })
}

/// One transfer as seen from a specific account.
#[derive(Debug, Clone, Serialize)]
pub struct DirectedTransfer {
    pub transaction_id: String,
    pub counterparty: AccountId,
    pub amount: f64,
    pub timestamp: DateTime<Utc>,
}

/// Degree and volume summary for one account.
#[derive(Debug, Clone, Serialize)]
pub struct AccountStats {
    pub in_degree: usize,
    pub out_degree: usize,
    pub total_in_amount: f64,
    pub total_out_amount: f64,
}

/// Deep-dive payload for a single account.
#[derive(Debug, Clone, Serialize)]
pub struct AccountDetail {
    pub account_id: AccountId,
    pub suspicion_score: f64,
    pub is_suspicious: bool,
    pub detected_patterns: Vec<String>,
    /// Human-readable explanations derived from the detected patterns.
    pub reasons: Vec<String>,
    pub rings: Vec<FraudRing>,
    pub stats: AccountStats,
    pub outgoing_transactions: Vec<DirectedTransfer>,
    pub incoming_transactions: Vec<DirectedTransfer>,
}

/// Build the drill-down view for one account, or `None` when the
/// account does not appear in the analyzed batch.
pub fn account_detail(analysis: &Analysis, account: &AccountId) -> Option<AccountDetail> {
    let graph = &analysis.graph;
    if !graph.all_nodes().contains(account) {
        return None;
    }

    let stats = graph.stats(account);
    let stats = AccountStats {
        in_degree: stats.map(|s| s.in_degree).unwrap_or(0),
        out_degree: stats.map(|s| s.out_degree).unwrap_or(0),
        total_in_amount: round_dp(stats.map(|s| s.total_in_amount).unwrap_or(0.0), 2),
        total_out_amount: round_dp(stats.map(|s| s.total_out_amount).unwrap_or(0.0), 2),
    };

    let mut outgoing: Vec<DirectedTransfer> = graph
        .outgoing(account)
        .iter()
        .map(|&i| {
            let tx = graph.tx(i);
            DirectedTransfer {
                transaction_id: tx.transaction_id.clone(),
                counterparty: tx.receiver.clone(),
                amount: tx.amount,
                timestamp: tx.timestamp,
            }
        })
        .collect();
    outgoing.sort_by_key(|t| t.timestamp);

    let mut incoming: Vec<DirectedTransfer> = graph
        .incoming(account)
        .iter()
        .map(|&i| {
            let tx = graph.tx(i);
            DirectedTransfer {
                transaction_id: tx.transaction_id.clone(),
                counterparty: tx.sender.clone(),
                amount: tx.amount,
                timestamp: tx.timestamp,
            }
        })
        .collect();
    incoming.sort_by_key(|t| t.timestamp);

    let suspicious = analysis.report.suspicious_account(account);
    let rings: Vec<FraudRing> = analysis
        .report
        .rings_for(account)
        .into_iter()
        .cloned()
        .collect();

    let reasons = suspicious
        .map(|sa| build_reasons(sa, rings.len(), outgoing.len() + incoming.len()))
        .unwrap_or_default();

    Some(AccountDetail {
        account_id: account.clone(),
        suspicion_score: suspicious.map(|sa| sa.suspicion_score).unwrap_or(0.0),
        is_suspicious: suspicious.is_some(),
        detected_patterns: suspicious
            .map(|sa| sa.detected_patterns.clone())
            .unwrap_or_default(),
        reasons,
        rings,
        stats,
        outgoing_transactions: outgoing,
        incoming_transactions: incoming,
    })
}

fn build_reasons(account: &SuspiciousAccount, ring_count: usize, total_txs: usize) -> Vec<String> {
    let mut reasons = Vec::new();
    for pattern in &account.detected_patterns {
        if let Some(length) = pattern.strip_prefix("cycle_length_") {
            reasons.push(format!("Part of a {length}-node circular money loop"));
        } else {
            match pattern.as_str() {
                "cycle" => reasons.push("Involved in circular transaction routing".to_string()),
                "smurfing" => reasons.push(
                    "Fan pattern: moving funds across many counterparties".to_string(),
                ),
                "shell" => {
                    reasons.push("Shell chain: layered pass-through transactions".to_string())
                }
                _ => {}
            }
        }
    }
    if ring_count > 1 {
        reasons.push(format!("Member of {ring_count} fraud rings simultaneously"));
    }
    if total_txs > 5 {
        reasons.push(format!(
            "High transaction velocity: {total_txs} transactions detected"
        ));
    }
    reasons
}
