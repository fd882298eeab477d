use crate::core::account::AccountId;
use crate::core::transaction::Transaction;
use serde::Serialize;
use std::fmt;

/// The money-muling archetype a ring evidences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternType {
    Cycle,
    Smurfing,
    Shell,
}

impl PatternType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternType::Cycle => "cycle",
            PatternType::Smurfing => "smurfing",
            PatternType::Shell => "shell",
        }
    }
}

impl fmt::Display for PatternType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether a smurf hub distributes or collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FanDirection {
    FanOut,
    FanIn,
}

impl FanDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            FanDirection::FanOut => "fan_out",
            FanDirection::FanIn => "fan_in",
        }
    }
}

/// Pattern-specific payload of a detected ring.
#[derive(Debug, Clone)]
pub enum RingKind {
    Cycle {
        cycle_length: usize,
        time_span_hours: f64,
        amount_ratio: f64,
    },
    Smurf {
        hub: AccountId,
        direction: FanDirection,
        counterparty_count: usize,
        diversity_score: f64,
        variance_ratio: f64,
        /// High diversity or high amount variance weakens the smurfing
        /// read. Reported as-is; the scoring engine does not consume it.
        dampened: bool,
    },
    Shell {
        path_length: usize,
        tightness_score: f64,
    },
}

/// A detected subgraph evidencing one pattern.
///
/// Detectors fill `members`, `transactions` and the variant payload;
/// the scoring engine later attaches `ring_id` and
/// `structural_confidence`. For cycles and shells `members` is the
/// path in traversal order; for smurf rings it is the hub followed by
/// its sorted counterparties and must not be read as a chain.
#[derive(Debug, Clone)]
pub struct Ring {
    /// `RING_###`, assigned by the scoring engine.
    pub ring_id: String,
    pub members: Vec<AccountId>,
    /// The transactions that evidence this ring.
    pub transactions: Vec<Transaction>,
    /// In [0, 1], attached by the scoring engine.
    pub structural_confidence: f64,
    pub kind: RingKind,
}

impl Ring {
    pub fn new(members: Vec<AccountId>, transactions: Vec<Transaction>, kind: RingKind) -> Self {
        Self {
            ring_id: String::new(),
            members,
            transactions,
            structural_confidence: 0.0,
            kind,
        }
    }

    pub fn pattern_type(&self) -> PatternType {
        match self.kind {
            RingKind::Cycle { .. } => PatternType::Cycle,
            RingKind::Smurf { .. } => PatternType::Smurfing,
            RingKind::Shell { .. } => PatternType::Shell,
        }
    }

    /// The amount ratio recorded at detection time, when the variant
    /// carries one.
    pub fn stored_amount_ratio(&self) -> Option<f64> {
        match self.kind {
            RingKind::Cycle { amount_ratio, .. } => Some(amount_ratio),
            _ => None,
        }
    }

    /// The tightness recorded at detection time. Smurf rings answer a
    /// neutral 1.0 so their member layout is never misread as a chain.
    pub fn stored_tightness(&self) -> Option<f64> {
        match self.kind {
            RingKind::Cycle { .. } => None,
            RingKind::Smurf { .. } => Some(1.0),
            RingKind::Shell {
                tightness_score, ..
            } => Some(tightness_score),
        }
    }
}
