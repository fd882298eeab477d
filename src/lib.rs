//! # fraud-ring-engine
//!
//! Money-muling ring detection and suspicion scoring for batches of
//! directed transfer records.
//!
//! Given a CSV batch of transactions, the engine builds a directed
//! account graph and searches it for three money-muling archetypes:
//! short circular routing loops, smurfing hubs that fan across many
//! counterparties, and layered pass-through shell chains. A
//! deterministic scoring pipeline then turns the detected rings into
//! per-account suspicion scores on [0, 100] and per-ring risk scores.
//!
//! ## Architecture
//!
//! - **core** — Foundational types: account ids, transactions, errors
//! - **graph** — CSV ingestion and the typed transaction graph
//! - **detect** — The ring model and the three pattern detectors
//! - **score** — Confidence engine, density guard, scoring pipeline
//! - **render** — Risk-sectioned layout for frontend rendering
//! - **simulation** — Synthetic network generation for testing
//! - **pipeline** — The `analyze` façade collaborators call

pub mod core;
pub mod detect;
pub mod graph;
pub mod pipeline;
pub mod render;
pub mod score;
pub mod simulation;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::core::account::AccountId;
    pub use crate::core::error::AnalysisError;
    pub use crate::core::transaction::Transaction;
    pub use crate::detect::ring::{FanDirection, PatternType, Ring, RingKind};
    pub use crate::graph::ingest::parse_csv;
    pub use crate::graph::transaction_graph::TransactionGraph;
    pub use crate::pipeline::{account_detail, analyze, Analysis};
    pub use crate::score::report::{AnalysisReport, FraudRing, Summary, SuspiciousAccount};
}
