//! fraud-ring-engine CLI
//!
//! Run the fraud detection pipeline from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Analyze a transaction batch
//! fraud-ring-engine analyze --input transactions.csv
//!
//! # Output as JSON, including the rendering layout
//! fraud-ring-engine analyze --input transactions.csv --format json --layout
//!
//! # Generate a random transaction network for testing
//! fraud-ring-engine generate --accounts 50 --transactions 300 --cycles 2
//! ```

use fraud_ring_engine::core::error::AnalysisError;
use fraud_ring_engine::pipeline::analyze;
use fraud_ring_engine::render::layout::{compute_layout, GraphLayout};
use fraud_ring_engine::score::report::{FraudRing, SuspiciousAccount};
use fraud_ring_engine::simulation::synthetic::{generate_random_network, to_csv, NetworkConfig};
use std::fs;
use std::process;
use std::time::Instant;

fn print_usage() {
    eprintln!(
        r#"fraud-ring-engine — money-muling ring detection and suspicion scoring

USAGE:
    fraud-ring-engine <COMMAND> [OPTIONS]

COMMANDS:
    analyze     Run the detection pipeline on a transaction CSV
    generate    Generate a random transaction network (for testing)
    help        Show this message

OPTIONS (analyze):
    --input <FILE>      Path to the transaction CSV file
    --format <FORMAT>   Output format: text (default) or json
    --layout            Include the rendering layout in JSON output

OPTIONS (generate):
    --accounts <N>      Number of accounts (default: 50)
    --transactions <N>  Number of background transactions (default: 200)
    --cycles <N>        Number of seeded cycle motifs (default: 0)
    --output <FILE>     Write to file instead of stdout

EXAMPLES:
    fraud-ring-engine analyze --input transactions.csv
    fraud-ring-engine analyze --input transactions.csv --format json --layout
    fraud-ring-engine generate --accounts 100 --transactions 500 --cycles 3"#
    );
}

/// JSON output schema: the core result object plus the fields this
/// adapter adds on top.
#[derive(serde::Serialize)]
struct AnalyzeOutput<'a> {
    suspicious_accounts: &'a [SuspiciousAccount],
    fraud_rings: &'a [FraudRing],
    summary: SummaryOutput,
    #[serde(skip_serializing_if = "Option::is_none")]
    graph_data: Option<GraphLayout>,
}

#[derive(serde::Serialize)]
struct SummaryOutput {
    total_accounts_analyzed: usize,
    suspicious_accounts_flagged: usize,
    fraud_rings_detected: usize,
    processing_time_seconds: f64,
}

fn load_text(path: &str) -> String {
    let bytes = fs::read(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{}': {}", path, e);
        process::exit(1);
    });
    String::from_utf8(bytes).unwrap_or_else(|_| {
        eprintln!("Error: {}", AnalysisError::BadEncoding);
        process::exit(1);
    })
}

fn cmd_analyze(args: &[String]) {
    let mut input_path = None;
    let mut format = "text".to_string();
    let mut with_layout = false;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => {
                i += 1;
                input_path = Some(args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--input requires a file path");
                    process::exit(1);
                }));
            }
            "--format" => {
                i += 1;
                format = args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--format requires 'text' or 'json'");
                    process::exit(1);
                });
            }
            "--layout" => {
                with_layout = true;
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let path = input_path.unwrap_or_else(|| {
        eprintln!("Error: --input <FILE> is required");
        process::exit(1);
    });

    let text = load_text(&path);
    let started = Instant::now();
    let analysis = analyze(&text).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        process::exit(1);
    });
    let elapsed = started.elapsed().as_secs_f64();
    let report = &analysis.report;

    if format == "json" {
        let output = AnalyzeOutput {
            suspicious_accounts: &report.suspicious_accounts,
            fraud_rings: &report.fraud_rings,
            summary: SummaryOutput {
                total_accounts_analyzed: report.summary.total_accounts_analyzed,
                suspicious_accounts_flagged: report.summary.suspicious_accounts_flagged,
                fraud_rings_detected: report.summary.fraud_rings_detected,
                processing_time_seconds: (elapsed * 10_000.0).round() / 10_000.0,
            },
            graph_data: with_layout.then(|| compute_layout(&analysis.graph, report)),
        };
        println!("{}", serde_json::to_string_pretty(&output).unwrap());
    } else {
        println!("=== Analysis Summary ===");
        println!("Accounts analyzed:   {}", report.summary.total_accounts_analyzed);
        println!("Accounts flagged:    {}", report.summary.suspicious_accounts_flagged);
        println!("Fraud rings:         {}", report.summary.fraud_rings_detected);
        println!("Processing time:     {:.3}s", elapsed);

        if !report.suspicious_accounts.is_empty() {
            println!("\n--- Suspicious Accounts ---");
            for sa in &report.suspicious_accounts {
                println!(
                    "  {:<20} score {:>5.1}  [{}]  {}",
                    sa.account_id,
                    sa.suspicion_score,
                    sa.detected_patterns.join(", "),
                    sa.ring_id,
                );
            }
        }

        if !report.fraud_rings.is_empty() {
            println!("\n--- Fraud Rings ---");
            for ring in &report.fraud_rings {
                let members: Vec<String> = ring
                    .member_accounts
                    .iter()
                    .map(|m| m.to_string())
                    .collect();
                println!(
                    "  {} [{}] risk {:.1}: {}",
                    ring.ring_id,
                    ring.pattern_type,
                    ring.risk_score,
                    members.join(" → "),
                );
            }
        }
    }
}

fn cmd_generate(args: &[String]) {
    let mut config = NetworkConfig::default();
    let mut output_path: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--accounts" => {
                i += 1;
                config.account_count = args
                    .get(i)
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(|| {
                        eprintln!("--accounts requires a number");
                        process::exit(1);
                    });
            }
            "--transactions" => {
                i += 1;
                config.transaction_count = args
                    .get(i)
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(|| {
                        eprintln!("--transactions requires a number");
                        process::exit(1);
                    });
            }
            "--cycles" => {
                i += 1;
                config.seeded_cycles = args
                    .get(i)
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(|| {
                        eprintln!("--cycles requires a number");
                        process::exit(1);
                    });
            }
            "--output" => {
                i += 1;
                output_path = Some(args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--output requires a file path");
                    process::exit(1);
                }));
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let transactions = generate_random_network(&config);
    let csv = to_csv(&transactions);

    if let Some(path) = output_path {
        fs::write(&path, &csv).unwrap_or_else(|e| {
            eprintln!("Error writing to '{}': {}", path, e);
            process::exit(1);
        });
        eprintln!(
            "Generated {} transactions across {} accounts → {}",
            transactions.len(),
            config.account_count,
            path
        );
    } else {
        print!("{}", csv);
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "analyze" => cmd_analyze(rest),
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
