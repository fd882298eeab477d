use crate::core::account::AccountId;
use crate::core::transaction::round_dp;
use crate::graph::transaction_graph::TransactionGraph;
use crate::score::report::{AnalysisReport, SuspiciousAccount};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

const GRID_CELL: f64 = 42.0;
const SECTION_GAP: f64 = 60.0;
const HIGH_RISK_MIN: f64 = 70.0;

/// Risk tier a node is bucketed into for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    NoRisk,
    LowRisk,
    HighRisk,
}

fn risk_tier(score: f64) -> RiskTier {
    if score <= 0.0 {
        RiskTier::NoRisk
    } else if score < HIGH_RISK_MIN {
        RiskTier::LowRisk
    } else {
        RiskTier::HighRisk
    }
}

/// One positioned node in the rendered graph.
#[derive(Debug, Clone, Serialize)]
pub struct LayoutNode {
    pub id: AccountId,
    pub x: f64,
    pub y: f64,
    pub suspicious: bool,
    pub suspicion_score: f64,
    pub patterns: Vec<String>,
    pub ring_id: Option<String>,
    pub in_degree: usize,
    pub out_degree: usize,
    pub risk_tier: RiskTier,
}

/// One rendered edge; transactions are deduplicated by id.
#[derive(Debug, Clone, Serialize)]
pub struct LayoutEdge {
    pub source: AccountId,
    pub target: AccountId,
    pub amount: f64,
    pub transaction_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionSummary {
    pub count: usize,
    pub label: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct RiskSections {
    pub no_risk: SectionSummary,
    pub low_risk: SectionSummary,
    pub high_risk: SectionSummary,
}

/// Rendering payload for the frontend: positioned nodes in three risk
/// sections plus deduplicated edges.
#[derive(Debug, Clone, Serialize)]
pub struct GraphLayout {
    pub nodes: Vec<LayoutNode>,
    pub edges: Vec<LayoutEdge>,
    pub risk_sections: RiskSections,
}

/// Lay the graph out in three side-by-side sections by risk tier.
///
/// Placement is fully deterministic: nodes are bucketed in ascending
/// id order, no-risk nodes stay id-ordered, low-risk nodes order by
/// ascending score then id, high-risk by descending score then id,
/// and each section fills a square-ish grid left to right.
pub fn compute_layout(graph: &TransactionGraph, report: &AnalysisReport) -> GraphLayout {
    let lookup: HashMap<&AccountId, &SuspiciousAccount> = report
        .suspicious_accounts
        .iter()
        .map(|sa| (&sa.account_id, sa))
        .collect();
    fn score(lookup: &HashMap<&AccountId, &SuspiciousAccount>, id: &AccountId) -> f64 {
        lookup.get(id).map(|sa| sa.suspicion_score).unwrap_or(0.0)
    }

    let mut no_risk: Vec<&AccountId> = Vec::new();
    let mut low_risk: Vec<&AccountId> = Vec::new();
    let mut high_risk: Vec<&AccountId> = Vec::new();
    for id in graph.all_nodes() {
        match risk_tier(score(&lookup, id)) {
            RiskTier::NoRisk => no_risk.push(id),
            RiskTier::LowRisk => low_risk.push(id),
            RiskTier::HighRisk => high_risk.push(id),
        }
    }

    low_risk.sort_by(|a, b| {
        score(&lookup, a)
            .total_cmp(&score(&lookup, b))
            .then_with(|| a.cmp(b))
    });
    high_risk.sort_by(|a, b| {
        score(&lookup, b)
            .total_cmp(&score(&lookup, a))
            .then_with(|| a.cmp(b))
    });

    let no_risk_width = section_width(no_risk.len());
    let low_risk_width = section_width(low_risk.len());
    let high_risk_width = section_width(high_risk.len());

    let no_risk_start =
        -((no_risk_width + low_risk_width + high_risk_width) / 2.0 + SECTION_GAP * 2.0);
    let low_risk_start = no_risk_start + no_risk_width + SECTION_GAP;
    let high_risk_start = low_risk_start + low_risk_width + SECTION_GAP;

    let mut positions: HashMap<&AccountId, (f64, f64)> = HashMap::new();
    for (section, start_x) in [
        (&no_risk, no_risk_start),
        (&low_risk, low_risk_start),
        (&high_risk, high_risk_start),
    ] {
        for (id, pos) in section.iter().zip(grid_positions(section.len(), start_x)) {
            positions.insert(*id, pos);
        }
    }

    let nodes: Vec<LayoutNode> = graph
        .all_nodes()
        .iter()
        .map(|id| {
            let (x, y) = positions.get(id).copied().unwrap_or((0.0, 0.0));
            let suspicious = lookup.get(id).copied();
            let score = suspicious.map(|sa| sa.suspicion_score).unwrap_or(0.0);
            let stats = graph.stats(id);
            LayoutNode {
                id: id.clone(),
                x: round_dp(x, 2),
                y: round_dp(y, 2),
                suspicious: suspicious.is_some(),
                suspicion_score: score,
                patterns: suspicious
                    .map(|sa| sa.detected_patterns.clone())
                    .unwrap_or_default(),
                ring_id: suspicious.map(|sa| sa.ring_id.clone()),
                in_degree: stats.map(|s| s.in_degree).unwrap_or(0),
                out_degree: stats.map(|s| s.out_degree).unwrap_or(0),
                risk_tier: risk_tier(score),
            }
        })
        .collect();

    let mut seen_edges: HashSet<&str> = HashSet::new();
    let mut edges = Vec::new();
    for tx in graph.transactions() {
        if !seen_edges.insert(tx.transaction_id.as_str()) {
            continue;
        }
        edges.push(LayoutEdge {
            source: tx.sender.clone(),
            target: tx.receiver.clone(),
            amount: tx.amount,
            transaction_id: tx.transaction_id.clone(),
            timestamp: tx.timestamp,
        });
    }

    GraphLayout {
        nodes,
        edges,
        risk_sections: RiskSections {
            no_risk: SectionSummary {
                count: no_risk.len(),
                label: "No Risk",
            },
            low_risk: SectionSummary {
                count: low_risk.len(),
                label: "Low Risk",
            },
            high_risk: SectionSummary {
                count: high_risk.len(),
                label: "High Risk",
            },
        },
    }
}

fn section_columns(n: usize) -> usize {
    ((n as f64).sqrt().ceil() as usize).max(1)
}

fn section_width(n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    section_columns(n) as f64 * GRID_CELL
}

/// Square-ish grid anchored at `start_x`, vertically centred.
fn grid_positions(n: usize, start_x: f64) -> Vec<(f64, f64)> {
    if n == 0 {
        return Vec::new();
    }
    let cols = section_columns(n);
    let rows = n.div_ceil(cols);
    let grid_height = (rows - 1) as f64 * GRID_CELL;
    let start_y = -grid_height / 2.0;

    (0..n)
        .map(|i| {
            let (row, col) = (i / cols, i % cols);
            (
                start_x + col as f64 * GRID_CELL,
                start_y + row as f64 * GRID_CELL,
            )
        })
        .collect()
}
