//! Fruit inventory, community market, and exchange ledger for the
//! Mindforest garden.
//!
//! Harvested fruit is the garden's only currency. It enters through
//! harvests and leaves through community trades; every movement is
//! recorded in an append-only [`Ledger`] so the inventory can be checked
//! against its history at any time. The ledger never panics; it returns
//! errors.
//!
//! # Modules
//!
//! - [`inventory`] -- The non-negative fruit counter.
//! - [`ledger`] -- Append-only entry log and the balance check.
//! - [`market`] -- Offered and collected community fruit, plus the
//!   starter pool.
//! - [`exchange`] -- Harvest credits and atomic trades that plant a
//!   friendship tree.

pub mod exchange;
pub mod inventory;
pub mod ledger;
pub mod market;

// Re-export primary types at crate root.
pub use exchange::{Exchange, TradeReceipt};
pub use inventory::Inventory;
pub use ledger::{BalanceCheck, Ledger};
pub use market::{Market, STARTER_FRUIT_COST, STARTER_FRUIT_IDS, starter_fruits};

use mindforest_types::{FruitId, LedgerEntryId, LedgerEntryType};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors raised while moving fruit.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// Entries must move at least one fruit.
    #[error("{0:?} entry amount must be non-zero")]
    ZeroAmount(LedgerEntryType),

    /// A debit exceeded the balance.
    #[error("cannot remove {amount} fruit from a balance of {balance}")]
    InsufficientFruit {
        /// Balance before the debit.
        balance: u32,
        /// Requested debit.
        amount: u32,
    },

    /// A credit would overflow the counter.
    #[error("adding {amount} fruit to a balance of {balance} overflows")]
    Overflow {
        /// Balance before the credit.
        balance: u32,
        /// Requested credit.
        amount: u32,
    },

    /// Replaying the log drove the balance below zero.
    #[error("ledger goes negative at entry {entry_id}")]
    NegativeBalance {
        /// The first debit that could not be covered.
        entry_id: LedgerEntryId,
    },

    /// An internal error that should not occur in normal operation.
    #[error("internal ledger error: {0}")]
    InternalError(&'static str),
}

/// Reasons a trade was refused. No state changes when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TradeError {
    /// The inventory cannot cover the fruit's cost.
    #[error("insufficient fruit: cost {cost}, balance {balance}")]
    InsufficientFunds {
        /// Price of the fruit.
        cost: u32,
        /// Current inventory balance.
        balance: u32,
    },

    /// The fruit is not (or no longer) offered.
    #[error("community fruit {0} is not available")]
    FruitUnavailable(FruitId),

    /// Bookkeeping failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl TradeError {
    /// Message suitable for showing to the user.
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::InsufficientFunds { .. } => {
                "Not enough fruit yet. Return to your forest, wait for a tree to bear fruit, \
                 and harvest it."
            }
            Self::FruitUnavailable(_) => "This insight has already found a home.",
            Self::Ledger(_) => "The exchange is unavailable right now. Please try again.",
        }
    }
}
