//! The fruit counter.
//!
//! The inventory is never negative: debits are checked and fail without
//! changing the balance.

use serde::{Deserialize, Serialize};

use crate::LedgerError;

/// Harvested fruit available for trading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inventory(u32);

impl Inventory {
    /// An inventory holding `fruit`.
    pub const fn new(fruit: u32) -> Self {
        Self(fruit)
    }

    /// Current balance.
    pub const fn balance(self) -> u32 {
        self.0
    }

    /// Whether `cost` can be paid.
    pub const fn can_afford(self, cost: u32) -> bool {
        self.0 >= cost
    }

    /// Add `amount` fruit and return the new balance.
    pub fn credit(&mut self, amount: u32) -> Result<u32, LedgerError> {
        self.0 = self.0.checked_add(amount).ok_or(LedgerError::Overflow {
            balance: self.0,
            amount,
        })?;
        Ok(self.0)
    }

    /// Remove `amount` fruit and return the new balance.
    pub fn debit(&mut self, amount: u32) -> Result<u32, LedgerError> {
        self.0 = self
            .0
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientFruit {
                balance: self.0,
                amount,
            })?;
        Ok(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credit_and_debit() {
        let mut inv = Inventory::default();
        assert_eq!(inv.credit(1), Ok(1));
        assert_eq!(inv.credit(2), Ok(3));
        assert_eq!(inv.debit(3), Ok(0));
        assert!(inv.can_afford(0));
        assert!(!inv.can_afford(1));
    }

    #[test]
    fn overdraw_leaves_balance_alone() {
        let mut inv = Inventory::new(1);
        assert_eq!(
            inv.debit(2),
            Err(LedgerError::InsufficientFruit {
                balance: 1,
                amount: 2
            })
        );
        assert_eq!(inv.balance(), 1);
    }

    #[test]
    fn overflow_leaves_balance_alone() {
        let mut inv = Inventory::new(u32::MAX);
        assert!(inv.credit(1).is_err());
        assert_eq!(inv.balance(), u32::MAX);
    }

    #[test]
    fn serializes_as_plain_number() {
        let json = serde_json::to_string(&Inventory::new(4)).unwrap_or_default();
        assert_eq!(json, "4");
    }
}
