//! Harvest credits and community trades.
//!
//! [`Exchange`] keeps the inventory, the market, and the ledger in step.
//! A trade either applies every effect or none:
//!
//! 1. inventory is debited by the fruit's cost,
//! 2. the fruit moves from the pool to the collection,
//! 3. the user's completed-trade counter goes up by one,
//! 4. a friendship tree anchored to the fruit is planted.
//!
//! All preconditions are checked before the first mutation.

use mindforest_growth::{HarvestReceipt, sprout};
use mindforest_species::SpeciesCatalog;
use mindforest_types::{CommunityFruit, FruitId, Tree, TreeAnchor, UserState};

use crate::inventory::Inventory;
use crate::ledger::{BalanceCheck, Ledger};
use crate::market::Market;
use crate::{LedgerError, TradeError};

/// Everything a successful trade produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeReceipt {
    /// The acquired fruit.
    pub fruit: CommunityFruit,
    /// The newly planted friendship tree. The caller adds it to the forest.
    pub tree: Tree,
    /// Inventory balance after paying.
    pub balance: u32,
}

/// Fruit currency, community market, and their shared ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Exchange {
    inventory: Inventory,
    market: Market,
    ledger: Ledger,
}

impl Exchange {
    /// A fresh exchange with an empty inventory.
    pub const fn new(market: Market) -> Self {
        Self {
            inventory: Inventory::new(0),
            market,
            ledger: Ledger::new(),
        }
    }

    /// Rebuild an exchange from a persisted balance.
    pub fn restore(balance: u32, market: Market, at_ms: u64) -> Self {
        Self {
            inventory: Inventory::new(balance),
            market,
            ledger: Ledger::opening(balance, at_ms),
        }
    }

    /// Current fruit balance.
    pub const fn balance(&self) -> u32 {
        self.inventory.balance()
    }

    /// The community market.
    pub const fn market(&self) -> &Market {
        &self.market
    }

    /// The fruit ledger.
    pub const fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Verify the inventory against the ledger.
    pub fn verify(&self) -> Result<BalanceCheck, LedgerError> {
        self.ledger.verify(self.inventory.balance())
    }

    /// Credit a harvest and return the new balance.
    pub fn credit_harvest(
        &mut self,
        receipt: HarvestReceipt,
        at_ms: u64,
    ) -> Result<u32, LedgerError> {
        let mut next = self.inventory;
        let balance = next.credit(receipt.fruit)?;
        self.ledger
            .record_harvest(receipt.tree_id, receipt.fruit, at_ms)?;
        self.inventory = next;
        tracing::debug!(
            tree_id = %receipt.tree_id,
            fruit = receipt.fruit,
            balance,
            "Harvest credited"
        );
        Ok(balance)
    }

    /// Buy a community fruit.
    ///
    /// On success the friendship species from `catalog` is planted
    /// regardless of its unlock condition; the trade itself is what
    /// unlocks it.
    pub fn trade(
        &mut self,
        fruit_id: FruitId,
        user: &mut UserState,
        catalog: &SpeciesCatalog,
        now_ms: u64,
    ) -> Result<TradeReceipt, TradeError> {
        let cost = self
            .market
            .offer(fruit_id)
            .ok_or(TradeError::FruitUnavailable(fruit_id))?
            .cost;
        if !self.inventory.can_afford(cost) {
            return Err(TradeError::InsufficientFunds {
                cost,
                balance: self.inventory.balance(),
            });
        }
        let completed_trades = user
            .completed_trades
            .checked_add(1)
            .ok_or(LedgerError::InternalError("completed trade counter overflow"))?;

        let mut next = self.inventory;
        let balance = next.debit(cost)?;
        if cost > 0 {
            self.ledger.record_trade(fruit_id, cost, now_ms)?;
        }
        self.inventory = next;
        user.completed_trades = completed_trades;

        let fruit = self
            .market
            .collect(fruit_id)
            .cloned()
            .ok_or(TradeError::FruitUnavailable(fruit_id))?;
        let tree = sprout(
            catalog.friendship_species(),
            TreeAnchor::CommunityFruit(fruit_id),
            now_ms,
        );

        tracing::info!(
            %fruit_id,
            author = %fruit.author,
            cost,
            balance,
            tree_id = %tree.id,
            "Community fruit traded"
        );

        Ok(TradeReceipt {
            fruit,
            tree,
            balance,
        })
    }
}
