//! Detect a fan-out smurfing hub spraying funds across a mule herd.
//!
//! Run with: `cargo run --example smurf_hub`

use fraud_ring_engine::prelude::*;

fn main() {
    let mut input =
        String::from("transaction_id,sender_id,receiver_id,amount,timestamp\n");
    for i in 0..14 {
        input.push_str(&format!(
            "T{i},HUB-MAIN,MULE-{:02},480,2024-03-01 {:02}:30:00\n",
            i + 1,
            i
        ));
    }

    let analysis = analyze(&input).expect("valid batch");
    let report = &analysis.report;

    for sa in &report.suspicious_accounts {
        println!(
            "{:<10} score {:>5.1}  patterns: {}",
            sa.account_id.to_string(),
            sa.suspicion_score,
            sa.detected_patterns.join(", "),
        );
    }

    let hub = AccountId::new("HUB-MAIN");
    if let Some(detail) = account_detail(&analysis, &hub) {
        println!("\nWhy {} is flagged:", hub);
        for reason in &detail.reasons {
            println!("  - {reason}");
        }
    }
}
