//! The settlement wallet and its recording methods.

use tracing::debug;

use blockadia_types::{ResourceKind, ResourceWallet};

use crate::audit::{self, AuditResult};
use crate::entry::{Direction, EntryReason, LedgerEntry};
use crate::LedgerError;

/// The settlement's resource wallet plus the log of every change to it.
///
/// Single-threaded: a credit and a debit can never interleave, so each call
/// either applies fully or not at all.
#[derive(Debug, Clone)]
pub struct Ledger {
    /// Counters as of the last entry.
    wallet: ResourceWallet,
    /// Counters at construction time.
    opening: ResourceWallet,
    /// All entries, in insertion order.
    entries: Vec<LedgerEntry>,
    /// Sequence number of the last entry.
    last_seq: u64,
}

impl Ledger {
    /// Create a ledger holding `opening`.
    pub const fn new(opening: ResourceWallet) -> Self {
        Self {
            wallet: opening,
            opening,
            entries: Vec::new(),
            last_seq: 0,
        }
    }

    /// Current counters.
    pub const fn wallet(&self) -> ResourceWallet {
        self.wallet
    }

    /// Counters the ledger was created with.
    pub const fn opening(&self) -> ResourceWallet {
        self.opening
    }

    /// Read one counter.
    pub const fn balance(&self, kind: ResourceKind) -> u32 {
        self.wallet.get(kind)
    }

    /// All recorded entries.
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// Number of recorded entries.
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded yet.
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add `amounts` to the wallet and return the new counters.
    ///
    /// # Errors
    ///
    /// [`LedgerError::EmptyTransfer`] for an all-zero bundle and
    /// [`LedgerError::Overflow`] if a counter would exceed `u32::MAX`.
    pub fn credit(
        &mut self,
        at_ms: u64,
        reason: EntryReason,
        amounts: ResourceWallet,
    ) -> Result<ResourceWallet, LedgerError> {
        if amounts.is_empty() {
            return Err(LedgerError::EmptyTransfer);
        }
        let next = self.wallet.checked_add(&amounts).ok_or_else(|| {
            let kind = ResourceKind::ALL
                .into_iter()
                .find(|k| self.wallet.get(*k).checked_add(amounts.get(*k)).is_none())
                .unwrap_or(ResourceKind::Wood);
            LedgerError::Overflow { kind }
        })?;
        self.apply(at_ms, Direction::Credit, reason, amounts, next);
        Ok(next)
    }

    /// Take `amounts` from the wallet and return the new counters.
    ///
    /// Nothing is applied unless every counter covers its share.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InsufficientFunds`] naming the first short counter, or
    /// [`LedgerError::EmptyTransfer`] for an all-zero bundle.
    pub fn debit(
        &mut self,
        at_ms: u64,
        reason: EntryReason,
        amounts: ResourceWallet,
    ) -> Result<ResourceWallet, LedgerError> {
        if amounts.is_empty() {
            return Err(LedgerError::EmptyTransfer);
        }
        if let Some(kind) = self.wallet.first_shortfall(&amounts) {
            return Err(LedgerError::InsufficientFunds {
                kind,
                available: self.wallet.get(kind),
                requested: amounts.get(kind),
            });
        }
        let next = self
            .wallet
            .checked_sub(&amounts)
            .ok_or(LedgerError::InsufficientFunds {
                kind: ResourceKind::Wood,
                available: self.wallet.wood,
                requested: amounts.wood,
            })?;
        self.apply(at_ms, Direction::Debit, reason, amounts, next);
        Ok(next)
    }

    /// Verify that the entry log explains the current wallet.
    pub fn audit(&self) -> AuditResult {
        audit::verify_balance(self.opening, &self.entries, self.wallet)
    }

    fn apply(
        &mut self,
        at_ms: u64,
        direction: Direction,
        reason: EntryReason,
        amounts: ResourceWallet,
        next: ResourceWallet,
    ) {
        self.last_seq = self.last_seq.saturating_add(1);
        self.entries.push(LedgerEntry {
            seq: self.last_seq,
            at_ms,
            direction,
            reason,
            amounts,
        });
        self.wallet = next;
        debug!(
            seq = self.last_seq,
            ?direction,
            ?reason,
            wood = next.wood,
            stone = next.stone,
            gold = next.gold,
            metal = next.metal,
            "ledger updated"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn starting() -> Ledger {
        Ledger::new(ResourceWallet::new(200, 100, 100, 50))
    }

    #[test]
    fn credit_adds_and_records() {
        let mut ledger = starting();
        let result = ledger.credit(
            10,
            EntryReason::Delivery,
            ResourceWallet::single(ResourceKind::Wood, 10),
        );
        assert_eq!(result.ok().map(|w| w.wood), Some(210));
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.entries().first().map(|e| e.seq), Some(1));
    }

    #[test]
    fn debit_is_all_or_nothing() {
        let mut ledger = starting();
        let result = ledger.debit(0, EntryReason::Spend, ResourceWallet::new(50, 0, 0, 51));
        assert_eq!(
            result,
            Err(LedgerError::InsufficientFunds {
                kind: ResourceKind::Metal,
                available: 50,
                requested: 51,
            })
        );
        assert_eq!(ledger.wallet(), ResourceWallet::new(200, 100, 100, 50));
        assert!(ledger.is_empty());
    }

    #[test]
    fn debit_to_exactly_zero_is_allowed() {
        let mut ledger = starting();
        let result = ledger.debit(0, EntryReason::Spend, ResourceWallet::new(200, 100, 100, 50));
        assert_eq!(result.ok(), Some(ResourceWallet::ZERO));
    }

    #[test]
    fn empty_transfers_are_rejected() {
        let mut ledger = starting();
        assert_eq!(
            ledger.credit(0, EntryReason::Production, ResourceWallet::ZERO),
            Err(LedgerError::EmptyTransfer)
        );
        assert_eq!(
            ledger.debit(0, EntryReason::Spend, ResourceWallet::ZERO),
            Err(LedgerError::EmptyTransfer)
        );
    }

    #[test]
    fn credit_overflow_names_counter() {
        let mut ledger = Ledger::new(ResourceWallet::new(0, u32::MAX, 0, 0));
        assert_eq!(
            ledger.credit(0, EntryReason::Delivery, ResourceWallet::new(1, 1, 0, 0)),
            Err(LedgerError::Overflow {
                kind: ResourceKind::Stone
            })
        );
    }

    #[test]
    fn counters_never_negative_across_mixed_sequence() {
        let mut ledger = starting();
        let ops = [
            (true, ResourceWallet::new(10, 0, 0, 0)),
            (false, ResourceWallet::new(210, 0, 0, 0)),
            (false, ResourceWallet::new(1, 0, 0, 0)),
            (true, ResourceWallet::new(0, 0, 4, 0)),
            (false, ResourceWallet::new(0, 100, 104, 50)),
            (false, ResourceWallet::new(0, 0, 1, 0)),
        ];
        for (at, (is_credit, amounts)) in (0_u64..).zip(ops) {
            let _ = if is_credit {
                ledger.credit(at, EntryReason::Delivery, amounts)
            } else {
                ledger.debit(at, EntryReason::Spend, amounts)
            };
        }
        assert_eq!(ledger.wallet(), ResourceWallet::ZERO);
        assert!(ledger.audit().is_balanced());
    }
}
