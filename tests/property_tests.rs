use fraud_ring_engine::core::account::AccountId;
use fraud_ring_engine::core::transaction::{amount_ratio, span_hours, Transaction};
use fraud_ring_engine::detect::cycle::detect_cycles;
use fraud_ring_engine::detect::shell::detect_shell_chains;
use fraud_ring_engine::detect::smurf::detect_smurfing;
use fraud_ring_engine::graph::transaction_graph::TransactionGraph;
use fraud_ring_engine::pipeline::analyze;
use fraud_ring_engine::score::engine::run_scoring;
use fraud_ring_engine::simulation::synthetic::to_csv;
use proptest::prelude::*;
use chrono::{Duration, TimeZone, Utc};

/// Random account from a small pool (to increase pattern probability).
fn arb_account() -> impl Strategy<Value = AccountId> {
    prop::sample::select(vec![
        AccountId::new("A"),
        AccountId::new("B"),
        AccountId::new("C"),
        AccountId::new("D"),
        AccountId::new("E"),
        AccountId::new("F"),
    ])
}

/// Random amount, biased into the shell-eligible range.
fn arb_amount() -> impl Strategy<Value = f64> {
    (1u32..2_000u32).prop_map(|a| a as f64)
}

/// Random timestamp within a ~10-day horizon.
fn arb_hour() -> impl Strategy<Value = i64> {
    0i64..240
}

/// Random row (sender != receiver).
fn arb_row() -> impl Strategy<Value = (AccountId, AccountId, f64, i64)> {
    (arb_account(), arb_account(), arb_amount(), arb_hour())
        .prop_filter("sender must differ from receiver", |(sender, receiver, _, _)| {
            sender != receiver
        })
}

fn arb_batch() -> impl Strategy<Value = Vec<Transaction>> {
    prop::collection::vec(arb_row(), 1..60).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (sender, receiver, amount, hour))| {
                Transaction::new(
                    format!("T{i:04}"),
                    sender,
                    receiver,
                    amount,
                    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::hours(hour),
                )
            })
            .collect()
    })
}

fn run_pipeline(txs: &[Transaction]) -> fraud_ring_engine::score::report::AnalysisReport {
    let graph = TransactionGraph::from_transactions(txs.to_vec());
    let mut rings = detect_cycles(&graph);
    rings.extend(detect_smurfing(&graph));
    rings.extend(detect_shell_chains(&graph));
    run_scoring(&graph, rings)
}

fn is_ring_id(id: &str) -> bool {
    id.len() == 8 && id.starts_with("RING_") && id[5..].chars().all(|c| c.is_ascii_digit())
}

proptest! {
    // ===================================================================
    // INVARIANT 1: Every suspicion score is in [0, 100] at one decimal.
    // ===================================================================
    #[test]
    fn scores_bounded_and_rounded(txs in arb_batch()) {
        let report = run_pipeline(&txs);
        for sa in &report.suspicious_accounts {
            prop_assert!((0.0..=100.0).contains(&sa.suspicion_score));
            let tenths = sa.suspicion_score * 10.0;
            prop_assert!((tenths - tenths.round()).abs() < 1e-6);
        }
    }

    // ===================================================================
    // INVARIANT 2: Suspicious accounts sort by (-score, id), no dups.
    // ===================================================================
    #[test]
    fn suspicious_accounts_sorted_and_unique(txs in arb_batch()) {
        let report = run_pipeline(&txs);
        for pair in report.suspicious_accounts.windows(2) {
            let ordered = pair[0].suspicion_score > pair[1].suspicion_score
                || (pair[0].suspicion_score == pair[1].suspicion_score
                    && pair[0].account_id < pair[1].account_id);
            prop_assert!(ordered, "accounts out of order");
        }
    }

    // ===================================================================
    // INVARIANT 3: Rings sort by (-risk, ring_id); ids unique, RING_###.
    // ===================================================================
    #[test]
    fn rings_sorted_with_wellformed_ids(txs in arb_batch()) {
        let report = run_pipeline(&txs);
        for ring in &report.fraud_rings {
            prop_assert!(is_ring_id(&ring.ring_id), "bad ring id {}", ring.ring_id);
        }
        for pair in report.fraud_rings.windows(2) {
            prop_assert!(pair[0].ring_id != pair[1].ring_id);
            let ordered = pair[0].risk_score > pair[1].risk_score
                || (pair[0].risk_score == pair[1].risk_score
                    && pair[0].ring_id < pair[1].ring_id);
            prop_assert!(ordered, "rings out of order");
        }
    }

    // ===================================================================
    // INVARIANT 4: Ring members come from the graph; at least 3 of them.
    // ===================================================================
    #[test]
    fn ring_members_known_and_plural(txs in arb_batch()) {
        let graph = TransactionGraph::from_transactions(txs.clone());
        let report = run_pipeline(&txs);
        for ring in &report.fraud_rings {
            prop_assert!(ring.member_accounts.len() >= 3);
            for member in &ring.member_accounts {
                prop_assert!(graph.all_nodes().contains(member));
            }
        }
    }

    // ===================================================================
    // INVARIANT 5: Every cycle ring honours its detection constraints.
    // ===================================================================
    #[test]
    fn cycle_rings_honour_constraints(txs in arb_batch()) {
        let graph = TransactionGraph::from_transactions(txs.clone());
        for ring in detect_cycles(&graph) {
            prop_assert!((3..=5).contains(&ring.members.len()));
            prop_assert!(span_hours(&ring.transactions) <= 72.0);
            prop_assert!(amount_ratio(&ring.transactions) <= 1.25 + 1e-9);
        }
    }

    // ===================================================================
    // INVARIANT 6: Shell rings honour their constraints and maximality.
    // ===================================================================
    #[test]
    fn shell_rings_honour_constraints(txs in arb_batch()) {
        let graph = TransactionGraph::from_transactions(txs.clone());
        let shells = detect_shell_chains(&graph);
        for ring in &shells {
            prop_assert!((3..=8).contains(&ring.members.len()));
            prop_assert!(span_hours(&ring.transactions) <= 72.0);
            prop_assert!(amount_ratio(&ring.transactions) <= 3.0 + 1e-9);
            for tx in &ring.transactions {
                prop_assert!(tx.amount >= 100.0);
            }
            for node in &ring.members[1..ring.members.len() - 1] {
                let degree = graph.stats(node).map(|s| s.total_degree()).unwrap_or(0);
                prop_assert!((2..=3).contains(&degree));
            }
        }
        // No kept chain is a contiguous subsequence of another.
        for a in &shells {
            for b in &shells {
                if a.members.len() < b.members.len() {
                    let contained = b
                        .members
                        .windows(a.members.len())
                        .any(|w| w == a.members.as_slice());
                    prop_assert!(!contained, "non-maximal chain survived");
                }
            }
        }
    }

    // ===================================================================
    // INVARIANT 7: The full pipeline is byte-deterministic.
    // ===================================================================
    #[test]
    fn pipeline_is_deterministic(txs in arb_batch()) {
        let input = to_csv(&txs);
        let first = serde_json::to_string(&analyze(&input).unwrap().report).unwrap();
        let second = serde_json::to_string(&analyze(&input).unwrap().report).unwrap();
        prop_assert_eq!(first, second);
    }

    // ===================================================================
    // INVARIANT 8: Summary counts agree with the lists they summarize.
    // ===================================================================
    #[test]
    fn summary_counts_consistent(txs in arb_batch()) {
        let graph = TransactionGraph::from_transactions(txs.clone());
        let report = run_pipeline(&txs);
        prop_assert_eq!(
            report.summary.total_accounts_analyzed,
            graph.node_count()
        );
        prop_assert_eq!(
            report.summary.suspicious_accounts_flagged,
            report.suspicious_accounts.len()
        );
        prop_assert_eq!(
            report.summary.fraud_rings_detected,
            report.fraud_rings.len()
        );
    }
}
