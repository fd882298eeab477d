use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for an account in the transaction network.
///
/// An account can represent a retail customer, a merchant, a mule
/// account, or any entity that sends or receives transfers. Identifiers
/// are opaque strings taken verbatim from the input batch; their `Ord`
/// is the lexicographic order every detector enumerates in.
///
/// # Examples
///
/// ```
/// use fraud_ring_engine::core::account::AccountId;
///
/// let a = AccountId::new("ACC-001");
/// let b = AccountId::new("ACC-002");
/// assert!(a < b);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Create a new account identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the string representation of this account ID.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
