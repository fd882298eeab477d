//! Detect a textbook three-account routing loop.
//!
//! Run with: `cargo run --example triangle_cycle`

use fraud_ring_engine::prelude::*;

fn main() {
    let input = "transaction_id,sender_id,receiver_id,amount,timestamp\n\
                 T1,ACC-ALPHA,ACC-BETA,1000,2024-03-01 09:00:00\n\
                 T2,ACC-BETA,ACC-GAMMA,990,2024-03-01 14:30:00\n\
                 T3,ACC-GAMMA,ACC-ALPHA,985,2024-03-01 21:15:00\n\
                 T4,ACC-ALPHA,ACC-VENDOR,120,2024-03-02 08:00:00\n";

    let analysis = analyze(input).expect("valid batch");
    let report = &analysis.report;

    println!(
        "{} of {} accounts flagged, {} ring(s) detected\n",
        report.summary.suspicious_accounts_flagged,
        report.summary.total_accounts_analyzed,
        report.summary.fraud_rings_detected,
    );

    for ring in &report.fraud_rings {
        println!(
            "{} [{}] risk {:.1}",
            ring.ring_id, ring.pattern_type, ring.risk_score
        );
        for member in &ring.member_accounts {
            let score = report
                .suspicious_account(member)
                .map(|sa| sa.suspicion_score)
                .unwrap_or(0.0);
            println!("  {:<12} suspicion {:.1}", member.to_string(), score);
        }
    }
}
