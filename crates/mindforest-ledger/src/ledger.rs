//! Append-only log of fruit movements.
//!
//! Every change to the inventory produces one [`LedgerEntry`]: harvests
//! credit, trades debit, and a restored session opens with a single
//! `Opening` credit carrying the persisted balance. Entries are never
//! modified or removed.
//!
//! The balance check is the garden's conservation law:
//!
//! ```text
//! inventory == sum(credits) - sum(debits)
//! ```

use mindforest_types::{FruitId, LedgerEntry, LedgerEntryId, LedgerEntryType, TreeId};

use crate::LedgerError;

/// The result of comparing the ledger against an inventory balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceCheck {
    /// The inventory equals credits minus debits.
    Balanced,
    /// The inventory disagrees with the log.
    Mismatch {
        /// Balance derived from the entries.
        ledger: u32,
        /// Balance held by the inventory.
        inventory: u32,
    },
}

/// In-memory log of fruit movements for one garden session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    /// All entries, in insertion order.
    entries: Vec<LedgerEntry>,
}

impl Ledger {
    /// Create an empty ledger.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// A ledger whose history starts from a persisted balance.
    ///
    /// A zero balance produces an empty ledger.
    pub fn opening(balance: u32, at_ms: u64) -> Self {
        let mut ledger = Self::new();
        if balance > 0 {
            ledger.entries.push(LedgerEntry {
                id: LedgerEntryId::new(),
                entry_type: LedgerEntryType::Opening,
                amount: balance,
                at_ms,
                tree_id: None,
                fruit_id: None,
            });
        }
        ledger
    }

    /// Number of entries.
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the ledger has no entries.
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// Record a harvest credit for `tree_id`.
    pub fn record_harvest(
        &mut self,
        tree_id: TreeId,
        amount: u32,
        at_ms: u64,
    ) -> Result<&LedgerEntry, LedgerError> {
        self.record(LedgerEntryType::Harvest, amount, at_ms, Some(tree_id), None)
    }

    /// Record a trade debit for `fruit_id`.
    pub fn record_trade(
        &mut self,
        fruit_id: FruitId,
        amount: u32,
        at_ms: u64,
    ) -> Result<&LedgerEntry, LedgerError> {
        self.record(LedgerEntryType::Trade, amount, at_ms, None, Some(fruit_id))
    }

    fn record(
        &mut self,
        entry_type: LedgerEntryType,
        amount: u32,
        at_ms: u64,
        tree_id: Option<TreeId>,
        fruit_id: Option<FruitId>,
    ) -> Result<&LedgerEntry, LedgerError> {
        if amount == 0 {
            return Err(LedgerError::ZeroAmount(entry_type));
        }
        self.entries.push(LedgerEntry {
            id: LedgerEntryId::new(),
            entry_type,
            amount,
            at_ms,
            tree_id,
            fruit_id,
        });
        self.entries
            .last()
            .ok_or(LedgerError::InternalError("failed to retrieve entry after append"))
    }

    /// Balance implied by the log: credits minus debits.
    pub fn balance(&self) -> Result<u32, LedgerError> {
        self.entries.iter().try_fold(0_u32, |balance, entry| {
            if entry.entry_type.is_credit() {
                balance
                    .checked_add(entry.amount)
                    .ok_or(LedgerError::Overflow {
                        balance,
                        amount: entry.amount,
                    })
            } else {
                balance
                    .checked_sub(entry.amount)
                    .ok_or(LedgerError::NegativeBalance { entry_id: entry.id })
            }
        })
    }

    /// Compare the log against an inventory balance.
    pub fn verify(&self, inventory: u32) -> Result<BalanceCheck, LedgerError> {
        let ledger = self.balance()?;
        if ledger == inventory {
            Ok(BalanceCheck::Balanced)
        } else {
            tracing::warn!(ledger, inventory, "Ledger balance disagrees with inventory");
            Ok(BalanceCheck::Mismatch { ledger, inventory })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_ledger_is_balanced_at_zero() {
        let ledger = Ledger::new();
        assert_eq!(ledger.balance(), Ok(0));
        assert_eq!(ledger.verify(0), Ok(BalanceCheck::Balanced));
        assert!(Ledger::opening(0, 5).is_empty());
    }

    #[test]
    fn credits_minus_debits() {
        let mut ledger = Ledger::opening(2, 0);
        assert!(ledger.record_harvest(TreeId::new(), 1, 10).is_ok());
        assert!(ledger.record_harvest(TreeId::new(), 3, 20).is_ok());
        assert!(ledger.record_trade(FruitId::new(), 4, 30).is_ok());

        assert_eq!(ledger.len(), 4);
        assert_eq!(ledger.balance(), Ok(2));
        assert_eq!(ledger.verify(2), Ok(BalanceCheck::Balanced));
        assert_eq!(
            ledger.verify(7),
            Ok(BalanceCheck::Mismatch {
                ledger: 2,
                inventory: 7
            })
        );
    }

    #[test]
    fn entries_carry_their_references() {
        let mut ledger = Ledger::new();
        let tree = TreeId::new();
        let fruit = FruitId::new();
        let harvest = ledger.record_harvest(tree, 1, 10).map(Clone::clone);
        let trade = ledger.record_trade(fruit, 1, 11).map(Clone::clone);

        let harvest = harvest.ok();
        assert_eq!(harvest.as_ref().and_then(|e| e.tree_id), Some(tree));
        assert_eq!(harvest.as_ref().and_then(|e| e.fruit_id), None);
        let trade = trade.ok();
        assert_eq!(trade.as_ref().map(|e| e.entry_type), Some(LedgerEntryType::Trade));
        assert_eq!(trade.and_then(|e| e.fruit_id), Some(fruit));
    }

    #[test]
    fn zero_amounts_are_rejected() {
        let mut ledger = Ledger::new();
        assert_eq!(
            ledger.record_harvest(TreeId::new(), 0, 1).err(),
            Some(LedgerError::ZeroAmount(LedgerEntryType::Harvest))
        );
        assert!(ledger.is_empty());
    }

    #[test]
    fn overdrawn_log_is_reported() {
        let mut ledger = Ledger::new();
        let entry_id = ledger.record_trade(FruitId::new(), 1, 1).map(|e| e.id);
        assert_eq!(
            ledger.balance().err(),
            entry_id.ok().map(|entry_id| LedgerError::NegativeBalance { entry_id })
        );
    }
}
