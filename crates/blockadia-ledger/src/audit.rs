//! Balance verification over the entry log.
//!
//! Replays every entry on top of the opening wallet and compares the result
//! with the live counters. Sums are taken in `u64` so a long run cannot
//! overflow the accumulator.

use blockadia_types::{ResourceKind, ResourceWallet};

use crate::entry::{Direction, LedgerEntry};

/// One counter whose replayed value disagrees with the wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Imbalance {
    /// The counter.
    pub kind: ResourceKind,
    /// Opening plus credits minus debits.
    pub expected: i64,
    /// The live wallet value.
    pub actual: u32,
}

/// Outcome of [`verify_balance`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditResult {
    /// The log explains the wallet exactly.
    Balanced,
    /// At least one counter disagrees.
    Imbalanced(Vec<Imbalance>),
}

impl AuditResult {
    /// Whether the audit passed.
    pub const fn is_balanced(&self) -> bool {
        matches!(self, Self::Balanced)
    }
}

/// Replay `entries` on `opening` and compare against `wallet`.
pub fn verify_balance(
    opening: ResourceWallet,
    entries: &[LedgerEntry],
    wallet: ResourceWallet,
) -> AuditResult {
    let imbalances: Vec<Imbalance> = ResourceKind::ALL
        .into_iter()
        .filter_map(|kind| {
            let expected = entries
                .iter()
                .fold(i64::from(opening.get(kind)), |acc, entry| {
                    let amount = i64::from(entry.amounts.get(kind));
                    match entry.direction {
                        Direction::Credit => acc.saturating_add(amount),
                        Direction::Debit => acc.saturating_sub(amount),
                    }
                });
            let actual = wallet.get(kind);
            (expected != i64::from(actual)).then_some(Imbalance {
                kind,
                expected,
                actual,
            })
        })
        .collect();

    if imbalances.is_empty() {
        AuditResult::Balanced
    } else {
        AuditResult::Imbalanced(imbalances)
    }
}
