//! The community market: a pool of tradeable insights and the user's
//! collection of acquired ones.
//!
//! A fruit lives in exactly one of the two lists. Trading moves it from
//! the pool to the collection; nothing moves it back.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use mindforest_types::{CommunityFruit, FruitId};

/// Price of every starter fruit.
pub const STARTER_FRUIT_COST: u32 = 1;

/// Stable identifiers of the starter fruits, so a restored collection can
/// be subtracted from a freshly seeded pool.
pub const STARTER_FRUIT_IDS: [FruitId; 3] = [
    FruitId(Uuid::from_u128(0x0190_0000_0000_7000_8000_0000_0000_0cf1)),
    FruitId(Uuid::from_u128(0x0190_0000_0000_7000_8000_0000_0000_0cf2)),
    FruitId(Uuid::from_u128(0x0190_0000_0000_7000_8000_0000_0000_0cf3)),
];

/// The three insights every new market starts with.
pub fn starter_fruits() -> Vec<CommunityFruit> {
    let [zen, stoic, spirit] = STARTER_FRUIT_IDS;
    vec![
        CommunityFruit {
            id: zen,
            author: "ZenWalker".to_owned(),
            insight: "Holding on to anger is like grasping a hot coal to throw at someone \
                      else; you are the one who gets burned."
                .to_owned(),
            cost: STARTER_FRUIT_COST,
        },
        CommunityFruit {
            id: stoic,
            author: "StoicGirl".to_owned(),
            insight: "We suffer more often in imagination than in reality.".to_owned(),
            cost: STARTER_FRUIT_COST,
        },
        CommunityFruit {
            id: spirit,
            author: "ForestSpirit".to_owned(),
            insight: "Nature does not hurry, yet everything is accomplished.".to_owned(),
            cost: STARTER_FRUIT_COST,
        },
    ]
}

/// Available and collected community fruit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Market {
    available: Vec<CommunityFruit>,
    collected: Vec<CommunityFruit>,
}

impl Market {
    /// A market offering `pool` with nothing collected yet.
    pub const fn new(pool: Vec<CommunityFruit>) -> Self {
        Self {
            available: pool,
            collected: Vec::new(),
        }
    }

    /// Rebuild a market from a persisted collection.
    ///
    /// Fruits already collected are removed from `pool`.
    pub fn restore(pool: Vec<CommunityFruit>, collected: Vec<CommunityFruit>) -> Self {
        let available = pool
            .into_iter()
            .filter(|fruit| !collected.iter().any(|c| c.id == fruit.id))
            .collect();
        Self {
            available,
            collected,
        }
    }

    /// Fruit still offered, in pool order.
    pub fn available(&self) -> &[CommunityFruit] {
        &self.available
    }

    /// Fruit the user has acquired, oldest first.
    pub fn collected(&self) -> &[CommunityFruit] {
        &self.collected
    }

    /// Look up an offered fruit.
    pub fn offer(&self, id: FruitId) -> Option<&CommunityFruit> {
        self.available.iter().find(|f| f.id == id)
    }

    /// Look up a collected fruit.
    pub fn collected_fruit(&self, id: FruitId) -> Option<&CommunityFruit> {
        self.collected.iter().find(|f| f.id == id)
    }

    /// Move an offered fruit into the collection.
    ///
    /// Returns `None` when the fruit is not offered.
    pub(crate) fn collect(&mut self, id: FruitId) -> Option<&CommunityFruit> {
        let index = self.available.iter().position(|f| f.id == id)?;
        let fruit = self.available.remove(index);
        self.collected.push(fruit);
        self.collected.last()
    }
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn starter_pool_has_three_cheap_fruits() {
        let fruits = starter_fruits();
        assert_eq!(fruits.len(), 3);
        assert!(fruits.iter().all(|f| f.cost == 1));
        assert_eq!(
            fruits.iter().map(|f| f.id).collect::<Vec<_>>(),
            STARTER_FRUIT_IDS.to_vec()
        );
    }

    #[test]
    fn collecting_moves_the_fruit() {
        let mut market = Market::new(starter_fruits());
        let [first, ..] = STARTER_FRUIT_IDS;

        assert_eq!(market.collect(first).map(|f| f.author.as_str()), Some("ZenWalker"));
        assert!(market.offer(first).is_none());
        assert!(market.collected_fruit(first).is_some());
        assert_eq!(market.available().len(), 2);

        assert!(market.collect(first).is_none());
        assert_eq!(market.collected().len(), 1);
    }

    #[test]
    fn restore_subtracts_the_collection() {
        let pool = starter_fruits();
        let collected: Vec<_> = pool.iter().skip(1).take(1).cloned().collect();
        let market = Market::restore(pool, collected);
        assert_eq!(market.available().len(), 2);
        assert!(market.offer(STARTER_FRUIT_IDS[1]).is_none());
        assert!(market.collected_fruit(STARTER_FRUIT_IDS[1]).is_some());
    }
}
