//! The owned forest collection.
//!
//! [`Grove`] holds the ordered tree list and applies the pure functions of
//! [`lifecycle`](crate::lifecycle) to it. A tick builds the next collection
//! from a read-only view and then replaces the old one in a single
//! assignment, so readers never observe a half-updated forest.

use mindforest_types::{Tree, TreeId};

use crate::lifecycle::{self, GrowthSettings, StageTransition, TickOutcome};
use crate::planting::normalize_name;

/// A receipt for one harvested tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HarvestReceipt {
    /// The harvested tree.
    pub tree_id: TreeId,
    /// Fruit to credit.
    pub fruit: u32,
}

/// Summary of a tick applied to a [`Grove`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Stage changes, in forest order.
    pub transitions: Vec<StageTransition>,
    /// Fruiting trees whose `has_produced` flag was repaired.
    pub normalized: Vec<TreeId>,
}

impl TickReport {
    /// Whether the tick changed any tree.
    pub const fn changed(&self) -> bool {
        !self.transitions.is_empty() || !self.normalized.is_empty()
    }

    /// IDs of every tree touched by the tick.
    pub fn touched(&self) -> impl Iterator<Item = TreeId> + '_ {
        self.transitions
            .iter()
            .map(|t| t.tree_id)
            .chain(self.normalized.iter().copied())
    }
}

/// Ordered collection of the user's trees plus the growth tunables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grove {
    trees: Vec<Tree>,
    settings: GrowthSettings,
}

impl Grove {
    /// Create an empty grove.
    pub const fn new(settings: GrowthSettings) -> Self {
        Self {
            trees: Vec::new(),
            settings,
        }
    }

    /// Create a grove from restored trees, keeping their order.
    pub const fn from_trees(trees: Vec<Tree>, settings: GrowthSettings) -> Self {
        Self { trees, settings }
    }

    /// The growth tunables.
    pub const fn settings(&self) -> &GrowthSettings {
        &self.settings
    }

    /// All trees, oldest first.
    pub fn trees(&self) -> &[Tree] {
        &self.trees
    }

    /// Look up one tree.
    pub fn get(&self, id: TreeId) -> Option<&Tree> {
        self.trees.iter().find(|t| t.id == id)
    }

    /// Number of trees.
    pub const fn len(&self) -> usize {
        self.trees.len()
    }

    /// Whether the grove has no trees.
    pub const fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    /// Add a newly planted tree at the end.
    pub fn insert(&mut self, tree: Tree) {
        self.trees.push(tree);
    }

    /// Advance every tree that is due at `now_ms`.
    pub fn tick(&mut self, now_ms: u64, has_speed_boost: bool) -> TickReport {
        let TickOutcome {
            trees,
            transitions,
            normalized,
        } = lifecycle::tick(&self.trees, now_ms, &self.settings, has_speed_boost);

        for t in &transitions {
            tracing::debug!(tree_id = %t.tree_id, from = %t.from, to = %t.to, "Tree advanced");
        }

        self.trees = trees;
        TickReport {
            transitions,
            normalized,
        }
    }

    /// Harvest one tree, committing only if `settle` accepts the receipt.
    ///
    /// Returns `Ok(None)` when the tree is unknown or not fruiting. When
    /// `settle` fails the tree is left untouched and its error is returned.
    pub fn harvest<T, E>(
        &mut self,
        id: TreeId,
        now_ms: u64,
        settle: impl FnOnce(HarvestReceipt) -> Result<T, E>,
    ) -> Result<Option<T>, E> {
        let Some(slot) = self.trees.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        let Some(harvested) = lifecycle::harvest(slot, now_ms, self.settings.harvest_yield) else {
            return Ok(None);
        };
        let settled = settle(HarvestReceipt {
            tree_id: id,
            fruit: harvested.fruit,
        })?;
        *slot = harvested.tree;
        Ok(Some(settled))
    }

    /// Set or clear a tree's custom name. Returns the updated tree, or
    /// `None` when no tree has that id.
    pub fn rename(&mut self, id: TreeId, name: &str) -> Option<&Tree> {
        let slot = self.trees.iter_mut().find(|t| t.id == id)?;
        slot.custom_name = normalize_name(name);
        Some(slot)
    }
}

#[cfg(test)]
mod tests {
    use mindforest_species::SpeciesCatalog;
    use mindforest_types::{SpeciesId, Stage, TreeAnchor, WisdomId};

    use super::*;
    use crate::lifecycle::HarvestYield;
    use crate::planting::sprout;

    fn oak_at(now_ms: u64) -> Tree {
        sprout(
            SpeciesCatalog::standard().lookup(SpeciesId::Oak),
            TreeAnchor::Wisdom(WisdomId::new()),
            now_ms,
        )
    }

    #[test]
    fn oak_walks_through_every_stage() {
        let mut grove = Grove::new(GrowthSettings::default());
        let tree = oak_at(0);
        let id = tree.id;
        grove.insert(tree);

        let mut now = 0_u64;
        for expected in [Stage::Growing, Stage::Mature, Stage::Fruiting] {
            now = now.saturating_add(61_000);
            let report = grove.tick(now, false);
            assert_eq!(report.transitions.len(), 1);
            assert_eq!(grove.get(id).map(|t| t.stage), Some(expected));
        }
        assert_eq!(grove.get(id).map(|t| t.has_produced), Some(true));

        // Fruiting waits for a harvest.
        let report = grove.tick(now.saturating_add(1_000_000), false);
        assert!(!report.changed());
    }

    #[test]
    fn tick_timeline_matches_worked_example() {
        let mut grove = Grove::new(GrowthSettings::default());
        let tree = oak_at(0);
        let id = tree.id;
        grove.insert(tree);

        assert!(!grove.tick(60_000, false).changed());
        assert!(grove.tick(61_000, false).changed());
        assert!(!grove.tick(62_000, false).changed());
        assert_eq!(grove.get(id).map(|t| t.stage), Some(Stage::Growing));
        assert_eq!(grove.get(id).map(|t| t.stage_started_at_ms), Some(61_000));
    }

    fn receipt(grove: &mut Grove, id: TreeId, now_ms: u64) -> Option<HarvestReceipt> {
        grove
            .harvest(id, now_ms, Ok::<_, ()>)
            .ok()
            .flatten()
    }

    #[test]
    fn harvest_only_applies_to_fruiting_trees() {
        let mut grove = Grove::new(GrowthSettings::default());
        let mut fruiting = oak_at(0);
        fruiting.stage = Stage::Fruiting;
        fruiting.has_produced = true;
        let ripe = fruiting.id;
        let young = oak_at(0);
        let young_id = young.id;
        grove.insert(fruiting);
        grove.insert(young);

        assert_eq!(receipt(&mut grove, young_id, 5), None);
        assert_eq!(receipt(&mut grove, TreeId::new(), 5), None);
        assert_eq!(
            receipt(&mut grove, ripe, 5),
            Some(HarvestReceipt {
                tree_id: ripe,
                fruit: 1
            })
        );
        assert_eq!(grove.get(ripe).map(|t| t.stage), Some(Stage::Mature));
        // A second harvest in the same instant is a no-op.
        assert_eq!(receipt(&mut grove, ripe, 5), None);
    }

    #[test]
    fn failed_settlement_leaves_tree_fruiting() {
        let mut fruiting = oak_at(0);
        fruiting.stage = Stage::Fruiting;
        fruiting.has_produced = true;
        let id = fruiting.id;
        let mut grove = Grove::from_trees(vec![fruiting], GrowthSettings::default());

        let result = grove.harvest(id, 9, |_| Err::<(), _>("ledger full"));
        assert_eq!(result, Err("ledger full"));
        assert_eq!(grove.get(id).map(|t| t.stage), Some(Stage::Fruiting));
    }

    #[test]
    fn species_yield_policy_flows_through() {
        let settings = GrowthSettings {
            harvest_yield: HarvestYield::Species,
            ..GrowthSettings::default()
        };
        let mut tree = sprout(
            SpeciesCatalog::standard().lookup(SpeciesId::Redwood),
            TreeAnchor::Wisdom(WisdomId::new()),
            0,
        );
        tree.stage = Stage::Fruiting;
        let id = tree.id;
        let mut grove = Grove::from_trees(vec![tree], settings);
        assert_eq!(receipt(&mut grove, id, 1).map(|r| r.fruit), Some(3));
    }

    #[test]
    fn rename_sets_and_clears() {
        let tree = oak_at(0);
        let id = tree.id;
        let mut grove = Grove::from_trees(vec![tree], GrowthSettings::default());

        let renamed = grove.rename(id, "  Patience ").and_then(|t| t.custom_name.clone());
        assert_eq!(renamed, Some("Patience".to_owned()));

        let cleared = grove.rename(id, "").map(|t| t.custom_name.clone());
        assert_eq!(cleared, Some(None));

        assert!(grove.rename(TreeId::new(), "ghost").is_none());
    }

    #[test]
    fn insertion_order_is_preserved() {
        let mut grove = Grove::default();
        let ids: Vec<TreeId> = (0..4_u64)
            .map(|i| {
                let tree = oak_at(i);
                let id = tree.id;
                grove.insert(tree);
                id
            })
            .collect();
        grove.tick(1_000_000, true);
        assert_eq!(grove.trees().iter().map(|t| t.id).collect::<Vec<_>>(), ids);
        assert_eq!(grove.len(), 4);
    }
}
