//! The garden session: one user's forest, wisdom archive, fruit, and
//! entitlements, plus every action that changes them.
//!
//! A [`Garden`] is a single logical actor. Callers share it behind one
//! async mutex, so the tick loop and user actions take turns and no action
//! ever sees another half-applied.

use std::sync::Arc;

use serde::Serialize;
use ts_rs::TS;

use mindforest_growth::{GrowthSettings, Grove, TickReport, plant_or_default};
use mindforest_ledger::{BalanceCheck, Exchange, LedgerError, Market, TradeError, TradeReceipt};
use mindforest_species::{
    BASELINE_UNLOCKED, KeywordRecommender, SpeciesCatalog, SpeciesRecommender, is_unlocked,
};
use mindforest_types::{
    CommunityFruit, ExtractedWisdom, FruitId, SpeciesDefinition, SpeciesId, Tree, TreeAnchor,
    TreeId, UserState, Wisdom,
};

use crate::clock::day_of;

/// Label for a friendship tree whose fruit is missing from the collection.
const FRIENDSHIP_LABEL: &str = "Friendship";

/// Label for a reflection tree whose wisdom record is missing.
const GROWTH_LABEL: &str = "Growth";

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// A tree together with its display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ForestEntry {
    /// The tree.
    pub tree: Tree,
    /// Custom name, else fruit author or wisdom title.
    pub label: String,
}

/// A catalog entry and whether this user may plant it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SpeciesListing {
    /// The species definition.
    pub species: SpeciesDefinition,
    /// Whether the user has unlocked it.
    pub unlocked: bool,
}

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GardenStats {
    /// Harvested fruit available for trading.
    pub inventory: u32,
    /// Community fruit acquired so far.
    pub collected: u32,
    /// Trees in the forest.
    pub trees: u32,
    /// Wisdom records in the archive.
    pub wisdom: u32,
    /// Completed community trades.
    pub completed_trades: u32,
    /// Whether the speed boost is held.
    pub has_speed_boost: bool,
}

/// Result of turning a reflection into a wisdom record and a tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ReflectionOutcome {
    /// The archived wisdom.
    pub wisdom: Wisdom,
    /// The tree planted for it.
    pub tree: Tree,
    /// The species the recommender suggested. Differs from
    /// `tree.species` when the suggestion was locked.
    pub recommended: SpeciesId,
}

/// Result of a successful harvest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct HarvestOutcome {
    /// The tree after harvesting.
    pub tree: Tree,
    /// Fruit credited.
    pub fruit: u32,
    /// Inventory balance afterwards.
    pub balance: u32,
}

/// Persisted state a garden is rebuilt from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GardenSnapshot {
    /// Trees, oldest first.
    pub trees: Vec<Tree>,
    /// Wisdom records, oldest first.
    pub wisdom: Vec<Wisdom>,
    /// Fruit balance.
    pub inventory: u32,
    /// Community fruit already acquired.
    pub collected: Vec<CommunityFruit>,
    /// Entitlement and social state.
    pub user: UserState,
}

// ---------------------------------------------------------------------------
// Garden
// ---------------------------------------------------------------------------

/// One user's garden session.
pub struct Garden {
    catalog: Arc<SpeciesCatalog>,
    recommender: Arc<dyn SpeciesRecommender>,
    grove: Grove,
    exchange: Exchange,
    user: UserState,
    wisdom: Vec<Wisdom>,
}

impl core::fmt::Debug for Garden {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Garden")
            .field("trees", &self.grove.len())
            .field("wisdom", &self.wisdom.len())
            .field("balance", &self.exchange.balance())
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

impl Garden {
    /// An empty garden for a new user, offering `pool` in the market.
    pub fn new(settings: GrowthSettings, pool: Vec<CommunityFruit>) -> Self {
        Self {
            catalog: Arc::new(SpeciesCatalog::standard().clone()),
            recommender: Arc::new(KeywordRecommender::standard()),
            grove: Grove::new(settings),
            exchange: Exchange::new(Market::new(pool)),
            user: UserState::with_baseline(BASELINE_UNLOCKED),
            wisdom: Vec::new(),
        }
    }

    /// Rebuild a garden from persisted state.
    ///
    /// Collected fruit is removed from `pool`; the persisted balance opens
    /// the ledger at `now_ms`.
    pub fn restore(
        snapshot: GardenSnapshot,
        settings: GrowthSettings,
        pool: Vec<CommunityFruit>,
        now_ms: u64,
    ) -> Self {
        let GardenSnapshot {
            trees,
            wisdom,
            inventory,
            collected,
            user,
        } = snapshot;
        tracing::info!(
            trees = trees.len(),
            wisdom = wisdom.len(),
            inventory,
            collected = collected.len(),
            "Garden restored"
        );
        Self {
            catalog: Arc::new(SpeciesCatalog::standard().clone()),
            recommender: Arc::new(KeywordRecommender::standard()),
            grove: Grove::from_trees(trees, settings),
            exchange: Exchange::restore(inventory, Market::restore(pool, collected), now_ms),
            user,
            wisdom,
        }
    }

    /// Replace the species catalog used for new plantings.
    #[must_use]
    pub fn with_catalog(mut self, catalog: Arc<SpeciesCatalog>) -> Self {
        self.catalog = catalog;
        self
    }

    /// Replace the species recommendation strategy.
    #[must_use]
    pub fn with_recommender(mut self, recommender: Arc<dyn SpeciesRecommender>) -> Self {
        self.recommender = recommender;
        self
    }

    // --- Growth ---

    /// Advance every due tree at `now_ms`.
    pub fn tick(&mut self, now_ms: u64) -> TickReport {
        self.grove.tick(now_ms, self.user.has_speed_boost)
    }

    /// Harvest a fruiting tree and credit its fruit.
    ///
    /// Returns `Ok(None)` when the tree is unknown or not fruiting; nothing
    /// changes in that case.
    pub fn harvest(
        &mut self,
        tree_id: TreeId,
        now_ms: u64,
    ) -> Result<Option<HarvestOutcome>, LedgerError> {
        let exchange = &mut self.exchange;
        let settled = self.grove.harvest(tree_id, now_ms, |receipt| {
            exchange
                .credit_harvest(receipt, now_ms)
                .map(|balance| (receipt.fruit, balance))
        })?;
        let Some((fruit, balance)) = settled else {
            tracing::debug!(%tree_id, "Harvest ignored, tree is not fruiting");
            return Ok(None);
        };
        let tree = self
            .grove
            .get(tree_id)
            .cloned()
            .ok_or(LedgerError::InternalError("harvested tree vanished"))?;
        tracing::info!(%tree_id, fruit, balance, "Tree harvested");
        Ok(Some(HarvestOutcome {
            tree,
            fruit,
            balance,
        }))
    }

    // --- Exchange ---

    /// Buy a community fruit and plant its friendship tree.
    pub fn trade(&mut self, fruit_id: FruitId, now_ms: u64) -> Result<TradeReceipt, TradeError> {
        let receipt = self
            .exchange
            .trade(fruit_id, &mut self.user, &self.catalog, now_ms)?;
        self.grove.insert(receipt.tree.clone());
        Ok(receipt)
    }

    // --- Reflection ---

    /// Archive an extracted reflection and plant a tree for it.
    ///
    /// The recommended species is planted when unlocked; otherwise the
    /// default species is.
    pub fn plant_reflection(
        &mut self,
        extracted: ExtractedWisdom,
        now_ms: u64,
    ) -> ReflectionOutcome {
        let wisdom = Wisdom::from_extracted(extracted, day_of(now_ms));
        let recommended = self.recommender.recommend_for_wisdom(&wisdom);
        let tree = plant_or_default(
            &self.catalog,
            TreeAnchor::Wisdom(wisdom.id),
            recommended,
            &self.user,
            now_ms,
        );
        tracing::info!(
            wisdom_id = %wisdom.id,
            tree_id = %tree.id,
            %recommended,
            planted = %tree.species,
            "Reflection planted"
        );
        self.wisdom.push(wisdom.clone());
        self.grove.insert(tree.clone());
        ReflectionOutcome {
            wisdom,
            tree,
            recommended,
        }
    }

    /// Set or clear a tree's custom name.
    pub fn rename(&mut self, tree_id: TreeId, name: &str) -> Option<Tree> {
        self.grove.rename(tree_id, name).cloned()
    }

    // --- Entitlements ---

    /// Record a species purchase. Returns `false` if already owned.
    pub fn grant_species(&mut self, species: SpeciesId) -> bool {
        let added = self.user.purchased.insert(species);
        if added {
            tracing::info!(%species, "Species purchased");
        }
        added
    }

    /// Turn the global speed boost on or off.
    pub fn set_speed_boost(&mut self, enabled: bool) {
        if self.user.has_speed_boost != enabled {
            tracing::info!(enabled, "Speed boost changed");
        }
        self.user.has_speed_boost = enabled;
    }

    // --- Queries ---

    /// The species catalog.
    pub fn catalog(&self) -> &SpeciesCatalog {
        &self.catalog
    }

    /// Entitlement and social state.
    pub const fn user(&self) -> &UserState {
        &self.user
    }

    /// All trees, oldest first.
    pub fn trees(&self) -> &[Tree] {
        self.grove.trees()
    }

    /// One tree by id.
    pub fn tree(&self, id: TreeId) -> Option<&Tree> {
        self.grove.get(id)
    }

    /// Current fruit balance.
    pub const fn balance(&self) -> u32 {
        self.exchange.balance()
    }

    /// Trees with their display labels, oldest first.
    pub fn forest(&self) -> Vec<ForestEntry> {
        self.grove
            .trees()
            .iter()
            .map(|tree| ForestEntry {
                label: self.label(tree),
                tree: tree.clone(),
            })
            .collect()
    }

    fn label(&self, tree: &Tree) -> String {
        if let Some(name) = &tree.custom_name {
            return name.clone();
        }
        match tree.anchor {
            TreeAnchor::CommunityFruit(fruit_id) => self
                .exchange
                .market()
                .collected_fruit(fruit_id)
                .map_or_else(|| FRIENDSHIP_LABEL.to_owned(), |f| f.author.clone()),
            TreeAnchor::Wisdom(wisdom_id) => self
                .wisdom
                .iter()
                .find(|w| w.id == wisdom_id)
                .map_or_else(|| GROWTH_LABEL.to_owned(), |w| w.title.clone()),
        }
    }

    /// Every catalog species with its unlock state.
    pub fn species(&self) -> Vec<SpeciesListing> {
        self.catalog
            .iter()
            .map(|def| SpeciesListing {
                unlocked: is_unlocked(def, &self.user),
                species: def.clone(),
            })
            .collect()
    }

    /// Wisdom records, newest first.
    pub fn wisdom_archive(&self) -> Vec<Wisdom> {
        self.wisdom.iter().rev().cloned().collect()
    }

    /// Community fruit still offered.
    pub fn market(&self) -> &[CommunityFruit] {
        self.exchange.market().available()
    }

    /// Community fruit acquired so far.
    pub fn collected(&self) -> &[CommunityFruit] {
        self.exchange.market().collected()
    }

    /// Headline numbers.
    pub fn stats(&self) -> GardenStats {
        GardenStats {
            inventory: self.exchange.balance(),
            collected: count(self.collected().len()),
            trees: count(self.grove.len()),
            wisdom: count(self.wisdom.len()),
            completed_trades: self.user.completed_trades,
            has_speed_boost: self.user.has_speed_boost,
        }
    }

    /// Check the fruit balance against the ledger.
    pub fn verify_ledger(&self) -> Result<BalanceCheck, LedgerError> {
        self.exchange.verify()
    }

    /// Capture the persistable state.
    pub fn snapshot(&self) -> GardenSnapshot {
        GardenSnapshot {
            trees: self.grove.trees().to_vec(),
            wisdom: self.wisdom.clone(),
            inventory: self.exchange.balance(),
            collected: self.collected().to_vec(),
            user: self.user.clone(),
        }
    }
}

fn count(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use mindforest_ledger::{STARTER_FRUIT_IDS, starter_fruits};
    use mindforest_types::Stage;

    use super::*;

    const MINUTE: u64 = 60_000;

    fn garden() -> Garden {
        Garden::new(GrowthSettings::default(), starter_fruits())
    }

    fn reflection(title: &str, situation: &str, insight: &str) -> ExtractedWisdom {
        ExtractedWisdom {
            title: title.to_owned(),
            situation: situation.to_owned(),
            insight: insight.to_owned(),
        }
    }

    /// Tick until `tree_id` is fruiting.
    fn grow_to_fruit(garden: &mut Garden, tree_id: TreeId, start_ms: u64) -> u64 {
        let mut now = start_ms;
        for _ in 0..3 {
            now += MINUTE + 1;
            garden.tick(now);
        }
        assert_eq!(garden.tree(tree_id).map(|t| t.stage), Some(Stage::Fruiting));
        now
    }

    #[test]
    fn reflection_plants_recommended_species() {
        let mut garden = garden();
        let outcome = garden.plant_reflection(
            reflection("Cool Head", "A tense meeting.", "Anger passes if I let it."),
            1_700_000_000_000,
        );
        assert_eq!(outcome.recommended, SpeciesId::Pine);
        assert_eq!(outcome.tree.species, SpeciesId::Pine);
        assert_eq!(outcome.tree.anchor, TreeAnchor::Wisdom(outcome.wisdom.id));
        assert_eq!(garden.trees().len(), 1);
        assert_eq!(garden.wisdom_archive().len(), 1);
    }

    #[test]
    fn locked_recommendation_falls_back_to_oak() {
        let mut garden = garden();
        let outcome = garden.plant_reflection(
            reflection("Bright", "A good day.", "Joy is worth noticing."),
            0,
        );
        assert_eq!(outcome.recommended, SpeciesId::Cherry);
        assert_eq!(outcome.tree.species, SpeciesId::Oak);
    }

    #[test]
    fn custom_recommender_is_used() {
        let mut garden = garden().with_recommender(Arc::new(|_: &str| SpeciesId::Lotus));
        garden.grant_species(SpeciesId::Lotus);
        let outcome = garden.plant_reflection(reflection("t", "s", "i"), 0);
        assert_eq!(outcome.tree.species, SpeciesId::Lotus);
    }

    #[test]
    fn full_cycle_harvest_then_trade() {
        let mut garden = garden();
        let tree_id = garden
            .plant_reflection(reflection("Patience", "Waiting.", "Seeds take time."), 0)
            .tree
            .id;

        // Trading with an empty inventory is refused.
        let [fruit_id, ..] = STARTER_FRUIT_IDS;
        assert!(matches!(
            garden.trade(fruit_id, 1),
            Err(TradeError::InsufficientFunds { .. })
        ));

        let now = grow_to_fruit(&mut garden, tree_id, 0);
        let harvested = garden.harvest(tree_id, now).unwrap().unwrap();
        assert_eq!(harvested.fruit, 1);
        assert_eq!(harvested.balance, 1);
        assert_eq!(harvested.tree.stage, Stage::Mature);
        assert_eq!(garden.harvest(tree_id, now).unwrap(), None);

        let receipt = garden.trade(fruit_id, now + 1).unwrap();
        assert_eq!(receipt.tree.species, SpeciesId::Cherry);
        assert_eq!(garden.trees().len(), 2);
        assert_eq!(garden.balance(), 0);
        assert_eq!(garden.user().completed_trades, 1);
        assert_eq!(garden.verify_ledger().unwrap(), BalanceCheck::Balanced);

        let stats = garden.stats();
        assert_eq!(stats.collected, 1);
        assert_eq!(stats.trees, 2);
        assert_eq!(stats.inventory, 0);
    }

    #[test]
    fn harvesting_young_tree_is_noop() {
        let mut garden = garden();
        let tree = garden.plant_reflection(reflection("t", "s", "i"), 0).tree;
        assert_eq!(garden.harvest(tree.id, 10).unwrap(), None);
        assert_eq!(garden.balance(), 0);
        assert_eq!(garden.tree(tree.id), Some(&tree));
    }

    #[test]
    fn speed_boost_applies_to_ticks() {
        let mut garden = garden();
        let tree_id = garden.plant_reflection(reflection("t", "s", "i"), 0).tree.id;
        assert!(!garden.tick(MINUTE / 2 + 1).changed());

        garden.set_speed_boost(true);
        assert!(garden.tick(MINUTE / 2 + 1).changed());
        assert_eq!(garden.tree(tree_id).map(|t| t.stage), Some(Stage::Growing));
    }

    #[test]
    fn labels_follow_anchor_and_custom_name() {
        let mut garden = garden();
        let tree_id = garden
            .plant_reflection(reflection("Still Water", "s", "i"), 0)
            .tree
            .id;
        let now = grow_to_fruit(&mut garden, tree_id, 0);
        garden.harvest(tree_id, now).unwrap();
        let [fruit_id, ..] = STARTER_FRUIT_IDS;
        garden.trade(fruit_id, now).unwrap();

        let labels: Vec<String> = garden.forest().into_iter().map(|e| e.label).collect();
        assert_eq!(labels, vec!["Still Water".to_owned(), "ZenWalker".to_owned()]);

        garden.rename(tree_id, "My Oak");
        let first = garden.forest().into_iter().next().map(|e| e.label);
        assert_eq!(first.as_deref(), Some("My Oak"));
    }

    #[test]
    fn archive_is_newest_first() {
        let mut garden = garden();
        garden.plant_reflection(reflection("first", "s", "i"), 0);
        garden.plant_reflection(reflection("second", "s", "i"), 1);
        let titles: Vec<String> = garden
            .wisdom_archive()
            .into_iter()
            .map(|w| w.title)
            .collect();
        assert_eq!(titles, vec!["second".to_owned(), "first".to_owned()]);
    }

    #[test]
    fn species_listing_reflects_entitlements() {
        let mut garden = garden();
        let unlocked = |g: &Garden, id: SpeciesId| {
            g.species()
                .into_iter()
                .find(|l| l.species.id == id)
                .is_some_and(|l| l.unlocked)
        };
        assert_eq!(garden.species().len(), 10);
        assert!(unlocked(&garden, SpeciesId::Oak));
        assert!(!unlocked(&garden, SpeciesId::Redwood));
        assert!(garden.grant_species(SpeciesId::Redwood));
        assert!(!garden.grant_species(SpeciesId::Redwood));
        assert!(unlocked(&garden, SpeciesId::Redwood));
    }

    #[test]
    fn snapshot_round_trips_through_restore() {
        let mut garden = garden();
        let tree_id = garden.plant_reflection(reflection("t", "s", "i"), 0).tree.id;
        let now = grow_to_fruit(&mut garden, tree_id, 0);
        garden.harvest(tree_id, now).unwrap();
        let [fruit_id, ..] = STARTER_FRUIT_IDS;
        garden.trade(fruit_id, now).unwrap();
        garden.set_speed_boost(true);

        let restored = Garden::restore(
            garden.snapshot(),
            GrowthSettings::default(),
            starter_fruits(),
            now,
        );
        assert_eq!(restored.trees(), garden.trees());
        assert_eq!(restored.market().len(), 2);
        assert_eq!(restored.collected().len(), 1);
        assert_eq!(restored.stats(), garden.stats());
        assert_eq!(restored.verify_ledger().unwrap(), BalanceCheck::Balanced);
    }
}
