use crate::core::transaction::{amount_ratio, round_dp, span_hours};
use crate::detect::ring::Ring;
use crate::graph::transaction_graph::TransactionGraph;

const MAX_TIME_SPAN_HOURS: f64 = 72.0;

const TEMPORAL_WEIGHT: f64 = 0.4;
const AMOUNT_WEIGHT: f64 = 0.3;
const TIGHTNESS_WEIGHT: f64 = 0.3;

/// Structural confidence of a ring, in [0, 1].
///
/// Combines temporal compactness, amount uniformity and structural
/// tightness with fixed 0.4 / 0.3 / 0.3 weights, clamped and rounded
/// to four decimals.
pub fn structural_confidence(ring: &Ring, graph: &TransactionGraph) -> f64 {
    let temporal = temporal_score(ring);
    let amount = amount_score(ring);
    let tightness = tightness_score(ring, graph);

    let confidence =
        TEMPORAL_WEIGHT * temporal + AMOUNT_WEIGHT * amount + TIGHTNESS_WEIGHT * tightness;
    round_dp(confidence.clamp(0.0, 1.0), 4)
}

/// `max(0, 1 - span / 72)`; a ring without transactions spans nothing.
fn temporal_score(ring: &Ring) -> f64 {
    if ring.transactions.is_empty() {
        return 1.0;
    }
    (1.0 - span_hours(&ring.transactions) / MAX_TIME_SPAN_HOURS).max(0.0)
}

/// `max(0, 1 - (ratio - 1))`, preferring the ratio the detector
/// recorded. A zero amount anywhere forces the score to 0.
fn amount_score(ring: &Ring) -> f64 {
    let ratio = match ring.stored_amount_ratio() {
        Some(ratio) => ratio,
        None => {
            if ring.transactions.is_empty() {
                return 1.0;
            }
            amount_ratio(&ring.transactions)
        }
    };
    (1.0 - (ratio - 1.0)).max(0.0)
}

/// Stored tightness when the variant carries one; otherwise derived
/// from the members read as a chain, capped at 1.
fn tightness_score(ring: &Ring, graph: &TransactionGraph) -> f64 {
    if let Some(stored) = ring.stored_tightness() {
        return stored;
    }

    if ring.members.len() <= 2 {
        return 1.0;
    }
    let intermediates = &ring.members[1..ring.members.len() - 1];
    let total: usize = intermediates
        .iter()
        .map(|node| graph.stats(node).map(|s| s.total_degree()).unwrap_or(1))
        .sum();
    let avg = total as f64 / intermediates.len() as f64;
    if avg == 0.0 {
        return 1.0;
    }
    (1.0 / avg).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::account::AccountId;
    use crate::core::transaction::Transaction;
    use crate::detect::ring::{FanDirection, RingKind};
    use approx::assert_relative_eq;
    use chrono::{Duration, TimeZone, Utc};

    fn tx(id: &str, from: &str, to: &str, amount: f64, hour: i64) -> Transaction {
        Transaction::new(
            id,
            AccountId::new(from),
            AccountId::new(to),
            amount,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::hours(hour),
        )
    }

    fn triangle_graph() -> TransactionGraph {
        TransactionGraph::from_transactions(vec![
            tx("T1", "A", "B", 100.0, 0),
            tx("T2", "B", "C", 100.0, 6),
            tx("T3", "C", "A", 100.0, 12),
        ])
    }

    fn triangle_ring(graph: &TransactionGraph) -> Ring {
        Ring::new(
            vec![AccountId::new("A"), AccountId::new("B"), AccountId::new("C")],
            graph.transactions().to_vec(),
            RingKind::Cycle {
                cycle_length: 3,
                time_span_hours: 12.0,
                amount_ratio: 1.0,
            },
        )
    }

    #[test]
    fn test_triangle_confidence() {
        let graph = triangle_graph();
        let ring = triangle_ring(&graph);
        // temporal 1 - 12/72, amount 1.0, tightness 1/deg(B) = 0.5
        let expected = 0.4 * (1.0 - 12.0 / 72.0) + 0.3 * 1.0 + 0.3 * 0.5;
        assert_relative_eq!(
            structural_confidence(&ring, &graph),
            round_dp(expected, 4),
            epsilon = 1e-9
        );
        assert_eq!(structural_confidence(&ring, &graph), 0.7833);
    }

    #[test]
    fn test_stored_ratio_preferred() {
        let graph = triangle_graph();
        let mut ring = triangle_ring(&graph);
        if let RingKind::Cycle {
            ref mut amount_ratio,
            ..
        } = ring.kind
        {
            *amount_ratio = 2.0;
        }
        // amount score collapses to 0 even though the transactions agree.
        let expected = 0.4 * (1.0 - 12.0 / 72.0) + 0.3 * 0.5;
        assert_eq!(structural_confidence(&ring, &graph), round_dp(expected, 4));
    }

    #[test]
    fn test_smurf_uses_neutral_tightness() {
        let graph = triangle_graph();
        let ring = Ring::new(
            vec![AccountId::new("H"), AccountId::new("A"), AccountId::new("B")],
            Vec::new(),
            RingKind::Smurf {
                hub: AccountId::new("H"),
                direction: FanDirection::FanOut,
                counterparty_count: 10,
                diversity_score: 1.0,
                variance_ratio: 0.0,
                dampened: false,
            },
        );
        // No transactions: temporal 1, amount 1, tightness neutral 1.
        assert_eq!(structural_confidence(&ring, &graph), 1.0);
    }

    #[test]
    fn test_zero_amount_kills_amount_score() {
        let graph = TransactionGraph::from_transactions(vec![
            tx("T1", "A", "B", 0.0, 0),
            tx("T2", "B", "C", 100.0, 1),
        ]);
        let ring = Ring::new(
            vec![AccountId::new("A"), AccountId::new("B"), AccountId::new("C")],
            graph.transactions().to_vec(),
            RingKind::Shell {
                path_length: 3,
                tightness_score: 1.0,
            },
        );
        // temporal 1 - 1/72, amount 0, tightness stored 1.0
        let expected = 0.4 * (1.0 - 1.0 / 72.0) + 0.3;
        assert_eq!(structural_confidence(&ring, &graph), round_dp(expected, 4));
    }

    #[test]
    fn test_confidence_clamped() {
        let graph = triangle_graph();
        let ring = Ring::new(
            vec![AccountId::new("A"), AccountId::new("B")],
            vec![tx("T1", "A", "B", 100.0, 0), tx("T2", "B", "A", 100.0, 200)],
            RingKind::Shell {
                path_length: 2,
                tightness_score: 1.0,
            },
        );
        let confidence = structural_confidence(&ring, &graph);
        assert!((0.0..=1.0).contains(&confidence));
    }
}
