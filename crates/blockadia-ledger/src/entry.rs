//! Ledger entry records.
//!
//! One [`LedgerEntry`] is appended per successful credit or debit. Entries
//! are never modified or removed.

use serde::{Deserialize, Serialize};

use blockadia_types::ResourceWallet;

/// Whether an entry added to or took from the wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Resources entered the wallet.
    Credit,
    /// Resources left the wallet.
    Debit,
}

/// Why the wallet changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryReason {
    /// A villager delivered cargo at the drop point.
    Delivery,
    /// A staffed building produced on its timer.
    Production,
    /// The UI spent resources (building placement and similar).
    Spend,
    /// Cost of starting a recruitment.
    Recruit,
    /// Cost of starting an upgrade.
    Upgrade,
}

/// A single wallet mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Monotonic sequence number, starting at 1.
    pub seq: u64,
    /// Simulation time in milliseconds when the entry was recorded.
    pub at_ms: u64,
    /// Credit or debit.
    pub direction: Direction,
    /// Why.
    pub reason: EntryReason,
    /// The amounts moved. Never all zero.
    pub amounts: ResourceWallet,
}

impl LedgerEntry {
    /// Whether this entry added resources.
    pub const fn is_credit(&self) -> bool {
        matches!(self.direction, Direction::Credit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_serializes_reason_snake_case() {
        let entry = LedgerEntry {
            seq: 1,
            at_ms: 2_000,
            direction: Direction::Credit,
            reason: EntryReason::Production,
            amounts: ResourceWallet::new(0, 0, 4, 0),
        };
        let json = serde_json::to_string(&entry).unwrap_or_default();
        assert!(json.contains("\"production\""));
        assert!(json.contains("\"credit\""));
        assert!(entry.is_credit());
    }
}
