use crate::core::account::AccountId;
use crate::core::transaction::round_dp;
use crate::detect::ring::{PatternType, Ring, RingKind};
use crate::graph::transaction_graph::TransactionGraph;
use crate::score::confidence::structural_confidence;
use crate::score::density::density_adjustments;
use crate::score::report::{AnalysisReport, FraudRing, Summary, SuspiciousAccount};
use chrono::{DateTime, Duration, Utc};
use log::info;
use std::collections::{BTreeMap, BTreeSet, HashMap};

pub const WEIGHT_CYCLE: f64 = 40.0;
pub const WEIGHT_SMURF: f64 = 30.0;
pub const WEIGHT_SHELL: f64 = 25.0;
pub const WEIGHT_VELOCITY: f64 = 10.0;

pub const INTERACTION_BONUS_PER_PATTERN: f64 = 10.0;
pub const INTERACTION_BONUS_CYCLE_SMURF: f64 = 10.0;
pub const INTERACTION_BONUS_CYCLE_SHELL: f64 = 8.0;

const VELOCITY_WINDOW_HOURS: i64 = 24;
const VELOCITY_MAX_TXS: usize = 5;

/// Per-account bookkeeping accumulated from ring membership.
#[derive(Debug, Default)]
struct AccountEntry {
    /// Output tags: families plus `cycle_length_{n}`.
    tags: BTreeSet<String>,
    /// Distinct pattern families, for base weights and bonuses.
    families: BTreeSet<PatternType>,
    /// Unique ids of the rings this account belongs to.
    rings: BTreeSet<String>,
}

/// Run the scoring pipeline over the merged detector output.
///
/// `rings` must arrive in cycle, smurf, shell order — ring ids are
/// assigned positionally and are part of the output contract. The
/// stage order below is fixed: base weights, interaction bonuses,
/// confidence multiplier, density multiplier, percentile multiplier,
/// cap and round. Reordering changes observable scores.
pub fn run_scoring(graph: &TransactionGraph, mut rings: Vec<Ring>) -> AnalysisReport {
    // Ring id assignment and structural confidence.
    for (idx, ring) in rings.iter_mut().enumerate() {
        ring.ring_id = format!("RING_{:03}", idx + 1);
        ring.structural_confidence = structural_confidence(ring, graph);
    }

    // Pattern tags and ring membership per account.
    let mut accounts: BTreeMap<AccountId, AccountEntry> = BTreeMap::new();
    for ring in &rings {
        for member in &ring.members {
            let entry = accounts.entry(member.clone()).or_default();
            match &ring.kind {
                RingKind::Cycle { cycle_length, .. } => {
                    entry.tags.insert("cycle".to_string());
                    entry.tags.insert(format!("cycle_length_{cycle_length}"));
                    entry.families.insert(PatternType::Cycle);
                }
                RingKind::Smurf { .. } => {
                    entry.tags.insert("smurfing".to_string());
                    entry.families.insert(PatternType::Smurfing);
                }
                RingKind::Shell { .. } => {
                    entry.tags.insert("shell".to_string());
                    entry.families.insert(PatternType::Shell);
                }
            }
            entry.rings.insert(ring.ring_id.clone());
        }
    }

    if accounts.is_empty() {
        return AnalysisReport::empty(graph.node_count());
    }

    // Base weights, velocity bonus and interaction bonuses.
    let mut raw_scores: BTreeMap<AccountId, f64> = BTreeMap::new();
    for (account, entry) in &accounts {
        let mut score = 0.0;
        if entry.families.contains(&PatternType::Cycle) {
            score += WEIGHT_CYCLE;
        }
        if entry.families.contains(&PatternType::Smurfing) {
            score += WEIGHT_SMURF;
        }
        if entry.families.contains(&PatternType::Shell) {
            score += WEIGHT_SHELL;
        }
        if is_velocity_flagged(graph, account) {
            score += WEIGHT_VELOCITY;
        }

        let distinct = entry.families.len();
        if distinct > 1 {
            score += INTERACTION_BONUS_PER_PATTERN * distinct as f64;
        }
        if entry.families.contains(&PatternType::Cycle)
            && entry.families.contains(&PatternType::Smurfing)
        {
            score += INTERACTION_BONUS_CYCLE_SMURF;
        }
        if entry.families.contains(&PatternType::Cycle)
            && entry.families.contains(&PatternType::Shell)
        {
            score += INTERACTION_BONUS_CYCLE_SHELL;
        }

        raw_scores.insert(account.clone(), score);
    }

    // Confidence multiplier: average over the account's rings.
    let confidence_by_ring: HashMap<&str, f64> = rings
        .iter()
        .map(|ring| (ring.ring_id.as_str(), ring.structural_confidence))
        .collect();
    for (account, entry) in &accounts {
        let confidences: Vec<f64> = entry
            .rings
            .iter()
            .filter_map(|id| confidence_by_ring.get(id.as_str()).copied())
            .collect();
        let avg = if confidences.is_empty() {
            0.5
        } else {
            confidences.iter().sum::<f64>() / confidences.len() as f64
        };
        *raw_scores.get_mut(account).expect("account scored") *= 0.8 + 0.4 * avg;
    }

    // Density multiplier.
    let suspicious: BTreeSet<AccountId> = accounts.keys().cloned().collect();
    let density = density_adjustments(&suspicious, graph);
    for account in &suspicious {
        *raw_scores.get_mut(account).expect("account scored") *=
            density.get(account).copied().unwrap_or(1.0);
    }

    // Percentile normalization with upper-bound ranks, then cap.
    let mut sorted_scores: Vec<f64> = raw_scores.values().copied().collect();
    sorted_scores.sort_by(f64::total_cmp);
    let n = sorted_scores.len();

    let mut final_scores: BTreeMap<AccountId, f64> = BTreeMap::new();
    for (account, &score) in &raw_scores {
        let rank = sorted_scores.partition_point(|&s| s <= score);
        let percentile = rank as f64 / n as f64;
        let multiplier = (0.8 + 0.3 * percentile).clamp(0.85, 1.15);
        final_scores.insert(account.clone(), round_dp(score * multiplier, 1).min(100.0));
    }

    info!(
        "scored {} suspicious accounts across {} rings",
        accounts.len(),
        rings.len()
    );

    shape_report(graph, &rings, &accounts, &raw_scores, &final_scores)
}

/// More than 5 combined in/out transactions inside a 24-hour window.
/// A score bonus only; never reported as a pattern.
fn is_velocity_flagged(graph: &TransactionGraph, account: &AccountId) -> bool {
    let out = graph.outgoing(account);
    let inc = graph.incoming(account);
    if out.len() + inc.len() <= VELOCITY_MAX_TXS {
        return false;
    }

    let mut timestamps: Vec<DateTime<Utc>> = out
        .iter()
        .chain(inc.iter())
        .map(|&i| graph.tx(i).timestamp)
        .collect();
    timestamps.sort_unstable();

    let window = Duration::hours(VELOCITY_WINDOW_HOURS);
    let n = timestamps.len();
    let mut right = 0usize;
    for left in 0..n {
        while right < n && timestamps[right] - timestamps[left] <= window {
            right += 1;
        }
        if right - left > VELOCITY_MAX_TXS {
            return true;
        }
    }
    false
}

fn shape_report(
    graph: &TransactionGraph,
    rings: &[Ring],
    accounts: &BTreeMap<AccountId, AccountEntry>,
    raw_scores: &BTreeMap<AccountId, f64>,
    final_scores: &BTreeMap<AccountId, f64>,
) -> AnalysisReport {
    let mut suspicious_accounts: Vec<SuspiciousAccount> = accounts
        .iter()
        .map(|(account, entry)| SuspiciousAccount {
            account_id: account.clone(),
            suspicion_score: final_scores[account],
            detected_patterns: entry.tags.iter().cloned().collect(),
            ring_id: entry.rings.iter().next().cloned().unwrap_or_default(),
        })
        .collect();
    suspicious_accounts.sort_by(|a, b| {
        b.suspicion_score
            .total_cmp(&a.suspicion_score)
            .then_with(|| a.account_id.cmp(&b.account_id))
    });

    // Ring risk uses the pre-percentile raw scores.
    let mut fraud_rings: Vec<FraudRing> = rings
        .iter()
        .map(|ring| {
            let mean_raw = if ring.members.is_empty() {
                0.0
            } else {
                ring.members
                    .iter()
                    .map(|m| raw_scores.get(m).copied().unwrap_or(0.0))
                    .sum::<f64>()
                    / ring.members.len() as f64
            };
            let risk = round_dp(
                (mean_raw * ring.structural_confidence).min(100.0),
                1,
            );

            let mut member_accounts = ring.members.clone();
            member_accounts.sort();

            FraudRing {
                ring_id: ring.ring_id.clone(),
                member_accounts,
                pattern_type: ring.pattern_type(),
                risk_score: risk,
            }
        })
        .collect();
    fraud_rings.sort_by(|a, b| {
        b.risk_score
            .total_cmp(&a.risk_score)
            .then_with(|| a.ring_id.cmp(&b.ring_id))
    });

    let summary = Summary {
        total_accounts_analyzed: graph.node_count(),
        suspicious_accounts_flagged: suspicious_accounts.len(),
        fraud_rings_detected: fraud_rings.len(),
    };

    AnalysisReport {
        suspicious_accounts,
        fraud_rings,
        summary,
    }
}
