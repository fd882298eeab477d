use crate::core::account::AccountId;
use crate::detect::ring::PatternType;
use serde::Serialize;

/// One flagged account in the final result object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuspiciousAccount {
    pub account_id: AccountId,
    /// In [0, 100], one decimal.
    pub suspicion_score: f64,
    /// Sorted, unique pattern tags (families plus `cycle_length_{n}`).
    pub detected_patterns: Vec<String>,
    /// Lexicographically smallest ring this account belongs to;
    /// empty when none.
    pub ring_id: String,
}

/// One detected ring in the final result object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FraudRing {
    pub ring_id: String,
    /// Members in ascending id order.
    pub member_accounts: Vec<AccountId>,
    pub pattern_type: PatternType,
    /// In [0, 100], one decimal.
    pub risk_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total_accounts_analyzed: usize,
    pub suspicious_accounts_flagged: usize,
    pub fraud_rings_detected: usize,
}

/// The complete, deterministic output of one scoring run.
///
/// `suspicious_accounts` is ordered by descending score then id;
/// `fraud_rings` by descending risk then ring id. Collaborators add
/// `processing_time_seconds` on top when serving this object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub suspicious_accounts: Vec<SuspiciousAccount>,
    pub fraud_rings: Vec<FraudRing>,
    pub summary: Summary,
}

impl AnalysisReport {
    /// The empty result for a batch where nothing was flagged.
    pub fn empty(total_accounts_analyzed: usize) -> Self {
        Self {
            suspicious_accounts: Vec::new(),
            fraud_rings: Vec::new(),
            summary: Summary {
                total_accounts_analyzed,
                suspicious_accounts_flagged: 0,
                fraud_rings_detected: 0,
            },
        }
    }

    /// Look up a flagged account by id.
    pub fn suspicious_account(&self, account: &AccountId) -> Option<&SuspiciousAccount> {
        self.suspicious_accounts
            .iter()
            .find(|sa| &sa.account_id == account)
    }

    /// All rings a given account belongs to.
    pub fn rings_for(&self, account: &AccountId) -> Vec<&FraudRing> {
        self.fraud_rings
            .iter()
            .filter(|ring| ring.member_accounts.contains(account))
            .collect()
    }
}
