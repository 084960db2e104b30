//! Resource ledger for the Blockadia settlement.
//!
//! The settlement owns a single four-counter wallet (wood, stone, gold,
//! metal). Every change to it goes through the [`Ledger`], which is the final
//! authority on affordability: a debit that would drive any counter below
//! zero is rejected before anything is applied.
//!
//! # Modules
//!
//! - [`ledger`] -- The [`Ledger`] struct: wallet plus recording methods.
//! - [`entry`] -- [`LedgerEntry`] records appended for every mutation.
//! - [`audit`] -- Balance verification over the entry log.
//!
//! # Balance Law
//!
//! For every resource R:
//!
//! ```text
//! opening(R) + sum(credits for R) - sum(debits for R) == wallet(R)
//! ```
//!
//! # Usage
//!
//! ```
//! use blockadia_ledger::{EntryReason, Ledger};
//! use blockadia_types::{ResourceKind, ResourceWallet};
//!
//! let mut ledger = Ledger::new(ResourceWallet::new(200, 100, 100, 50));
//! ledger
//!     .credit(1_000, EntryReason::Delivery, ResourceWallet::single(ResourceKind::Wood, 10))
//!     .ok();
//! assert_eq!(ledger.wallet().wood, 210);
//!
//! // Gold is short, so nothing is taken.
//! assert!(ledger.debit(1_000, EntryReason::Spend, ResourceWallet::new(0, 0, 500, 0)).is_err());
//! assert_eq!(ledger.wallet().wood, 210);
//! assert!(ledger.audit().is_balanced());
//! ```

pub mod audit;
pub mod entry;
pub mod ledger;

pub use audit::{AuditResult, Imbalance};
pub use entry::{Direction, EntryReason, LedgerEntry};
pub use ledger::Ledger;

use blockadia_types::ResourceKind;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors returned when a wallet mutation is refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// A debit asked for more than the wallet holds.
    #[error("insufficient {kind:?}: have {available}, need {requested}")]
    InsufficientFunds {
        /// The first counter that falls short.
        kind: ResourceKind,
        /// What the wallet holds.
        available: u32,
        /// What the debit asked for.
        requested: u32,
    },

    /// The amounts bundle was all zeros.
    #[error("ledger transfer amounts must not all be zero")]
    EmptyTransfer,

    /// A credit would overflow a counter.
    #[error("credit would overflow the {kind:?} counter")]
    Overflow {
        /// The counter that would overflow.
        kind: ResourceKind,
    },
}
