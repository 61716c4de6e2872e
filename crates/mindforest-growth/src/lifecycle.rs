//! Stage advancement and harvest for individual trees.
//!
//! Everything here is a pure function of a tree, a timestamp, and the
//! [`GrowthSettings`]. Functions return a new [`Tree`] instead of mutating,
//! so a tick can be computed over a snapshot of the forest and swapped in
//! whole by the owner.
//!
//! A tree advances at most one stage per tick, and only when the time spent
//! in its current stage strictly exceeds the stage duration:
//!
//! ```text
//! duration = base_stage_duration_ms
//!          * species_snapshot.growth_multiplier
//!          * (speed_boost_multiplier if the user holds the boost, else 1)
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use mindforest_types::{Stage, Tree, TreeId};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default time a tree spends in one stage at baseline speed (one minute).
pub const DEFAULT_STAGE_DURATION_MS: u64 = 60_000;

/// Default global duration factor applied while the speed boost is held.
pub const DEFAULT_SPEED_BOOST_MULTIPLIER: Decimal = Decimal::from_parts(5, 0, 0, false, 1);

/// Fruit granted per harvest under [`HarvestYield::Flat`].
pub const FLAT_HARVEST_YIELD: u32 = 1;

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// How many fruit a harvest credits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HarvestYield {
    /// Every harvest credits exactly one fruit.
    #[default]
    Flat,
    /// A harvest credits the `fruit_yield` of the tree's species snapshot.
    Species,
}

impl HarvestYield {
    /// Fruit credited for harvesting `tree` under this policy.
    pub const fn fruit_for(self, tree: &Tree) -> u32 {
        match self {
            Self::Flat => FLAT_HARVEST_YIELD,
            Self::Species => tree.species_snapshot.fruit_yield,
        }
    }
}

/// Tunables of the growth engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrowthSettings {
    /// Time spent in one stage at multiplier `1.0`, in milliseconds.
    pub base_stage_duration_ms: u64,
    /// Global duration factor while the user holds the speed boost.
    pub speed_boost_multiplier: Decimal,
    /// Harvest yield policy.
    pub harvest_yield: HarvestYield,
}

impl Default for GrowthSettings {
    fn default() -> Self {
        Self {
            base_stage_duration_ms: DEFAULT_STAGE_DURATION_MS,
            speed_boost_multiplier: DEFAULT_SPEED_BOOST_MULTIPLIER,
            harvest_yield: HarvestYield::Flat,
        }
    }
}

impl GrowthSettings {
    /// Duration of one stage for `tree`, in milliseconds.
    ///
    /// Saturates instead of overflowing, so an absurd configuration yields
    /// a tree that never advances rather than a panic.
    pub fn stage_duration(&self, tree: &Tree, has_speed_boost: bool) -> Decimal {
        let global = if has_speed_boost {
            self.speed_boost_multiplier
        } else {
            Decimal::ONE
        };
        Decimal::from(self.base_stage_duration_ms)
            .saturating_mul(tree.species_snapshot.growth_multiplier)
            .saturating_mul(global)
    }
}

// ---------------------------------------------------------------------------
// Advancement
// ---------------------------------------------------------------------------

/// One stage change produced by a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageTransition {
    /// The tree that changed.
    pub tree_id: TreeId,
    /// Stage before the tick.
    pub from: Stage,
    /// Stage after the tick.
    pub to: Stage,
}

/// A change to one tree produced by [`advance`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Growth {
    /// The updated tree.
    pub tree: Tree,
    /// The stage change, or `None` when a fruiting tree with
    /// `has_produced = false` was only repaired.
    pub transition: Option<StageTransition>,
}

/// Evaluate one tree at `now_ms`. Returns `None` when nothing changes.
///
/// Fruiting trees never advance; they wait for a harvest. A clock that
/// runs behind `stage_started_at_ms` counts as zero elapsed time, so the
/// stage start never moves backwards.
pub fn advance(
    tree: &Tree,
    now_ms: u64,
    settings: &GrowthSettings,
    has_speed_boost: bool,
) -> Option<Growth> {
    let Some(next) = tree.stage.next() else {
        if tree.has_produced {
            return None;
        }
        return Some(Growth {
            tree: Tree {
                has_produced: true,
                ..tree.clone()
            },
            transition: None,
        });
    };

    let elapsed = Decimal::from(now_ms.saturating_sub(tree.stage_started_at_ms));
    if elapsed <= settings.stage_duration(tree, has_speed_boost) {
        return None;
    }

    Some(Growth {
        tree: Tree {
            stage: next,
            stage_started_at_ms: now_ms,
            has_produced: tree.has_produced || next == Stage::Fruiting,
            ..tree.clone()
        },
        transition: Some(StageTransition {
            tree_id: tree.id,
            from: tree.stage,
            to: next,
        }),
    })
}

/// Outcome of one tick over a whole forest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// The forest after the tick, in input order.
    pub trees: Vec<Tree>,
    /// Stage changes, in input order.
    pub transitions: Vec<StageTransition>,
    /// Fruiting trees whose `has_produced` flag was repaired.
    pub normalized: Vec<TreeId>,
}

impl TickOutcome {
    /// Whether the tick changed any tree.
    pub const fn changed(&self) -> bool {
        !self.transitions.is_empty() || !self.normalized.is_empty()
    }
}

/// Evaluate every tree at `now_ms`.
///
/// The input slice is read only; the returned collection replaces it.
pub fn tick(
    trees: &[Tree],
    now_ms: u64,
    settings: &GrowthSettings,
    has_speed_boost: bool,
) -> TickOutcome {
    let mut outcome = TickOutcome {
        trees: Vec::with_capacity(trees.len()),
        ..TickOutcome::default()
    };

    for tree in trees {
        match advance(tree, now_ms, settings, has_speed_boost) {
            None => outcome.trees.push(tree.clone()),
            Some(Growth {
                tree,
                transition: Some(transition),
            }) => {
                outcome.transitions.push(transition);
                outcome.trees.push(tree);
            }
            Some(Growth {
                tree,
                transition: None,
            }) => {
                outcome.normalized.push(tree.id);
                outcome.trees.push(tree);
            }
        }
    }

    outcome
}

// ---------------------------------------------------------------------------
// Harvest
// ---------------------------------------------------------------------------

/// A completed harvest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Harvest {
    /// The tree after harvesting, back at [`Stage::Mature`].
    pub tree: Tree,
    /// Fruit to credit to the inventory.
    pub fruit: u32,
}

/// Harvest a fruiting tree at `now_ms`.
///
/// Returns `None` for a tree in any other stage; harvesting is then a
/// no-op. A harvested tree returns to `Mature` with its stage clock reset
/// and must grow back into `Fruiting` before the next harvest.
pub fn harvest(tree: &Tree, now_ms: u64, policy: HarvestYield) -> Option<Harvest> {
    if tree.stage != Stage::Fruiting {
        return None;
    }
    Some(Harvest {
        fruit: policy.fruit_for(tree),
        tree: Tree {
            stage: Stage::Mature,
            stage_started_at_ms: now_ms,
            has_produced: false,
            ..tree.clone()
        },
    })
}

#[cfg(test)]
#[allow(clippy::panic, clippy::arithmetic_side_effects)]
mod tests {
    use mindforest_species::SpeciesCatalog;
    use mindforest_types::{SpeciesId, TreeAnchor, WisdomId};

    use super::*;
    use crate::planting::sprout;

    fn tree(species: SpeciesId, stage: Stage, stage_started_at_ms: u64) -> Tree {
        let mut tree = sprout(
            SpeciesCatalog::standard().lookup(species),
            TreeAnchor::Wisdom(WisdomId::new()),
            0,
        );
        tree.stage = stage;
        tree.stage_started_at_ms = stage_started_at_ms;
        tree
    }

    #[test]
    fn boost_default_is_one_half() {
        assert_eq!(DEFAULT_SPEED_BOOST_MULTIPLIER, Decimal::new(5, 1));
    }

    #[test]
    fn duration_combines_all_factors() {
        let settings = GrowthSettings::default();
        let oak = tree(SpeciesId::Oak, Stage::Sapling, 0);
        let lotus = tree(SpeciesId::Lotus, Stage::Sapling, 0);
        let bonsai = tree(SpeciesId::Bonsai, Stage::Sapling, 0);

        assert_eq!(settings.stage_duration(&oak, false), Decimal::from(60_000));
        assert_eq!(settings.stage_duration(&oak, true), Decimal::from(30_000));
        assert_eq!(settings.stage_duration(&lotus, false), Decimal::from(90_000));
        assert_eq!(settings.stage_duration(&lotus, true), Decimal::from(45_000));
        assert_eq!(settings.stage_duration(&bonsai, false), Decimal::from(42_000));
    }

    #[test]
    fn advances_only_after_strictly_exceeding_duration() {
        let settings = GrowthSettings::default();
        let sapling = tree(SpeciesId::Oak, Stage::Sapling, 0);

        assert_eq!(advance(&sapling, 60_000, &settings, false), None);

        let Some(Growth {
            tree: grown,
            transition: Some(transition),
        }) = advance(&sapling, 61_000, &settings, false)
        else {
            panic!("sapling should advance at 61s");
        };
        assert_eq!(grown.stage, Stage::Growing);
        assert_eq!(grown.stage_started_at_ms, 61_000);
        assert_eq!(transition.from, Stage::Sapling);
        assert_eq!(transition.to, Stage::Growing);

        // The stage clock restarted, so one more second is not enough.
        assert_eq!(advance(&grown, 62_000, &settings, false), None);
    }

    #[test]
    fn advances_one_stage_even_after_long_absence() {
        let settings = GrowthSettings::default();
        let sapling = tree(SpeciesId::Oak, Stage::Sapling, 0);
        let grown = advance(&sapling, 10 * 60 * 60 * 1000, &settings, false);
        assert_eq!(grown.map(|g| g.tree.stage), Some(Stage::Growing));
    }

    #[test]
    fn speed_boost_halves_the_wait() {
        let settings = GrowthSettings::default();
        let sapling = tree(SpeciesId::Oak, Stage::Sapling, 0);
        assert_eq!(advance(&sapling, 31_000, &settings, false), None);
        assert!(advance(&sapling, 31_000, &settings, true).is_some());
    }

    #[test]
    fn entering_fruiting_marks_produced() {
        let settings = GrowthSettings::default();
        let mature = tree(SpeciesId::Oak, Stage::Mature, 0);
        let Some(growth) = advance(&mature, 60_001, &settings, false) else {
            panic!("mature tree should start fruiting");
        };
        assert_eq!(growth.tree.stage, Stage::Fruiting);
        assert!(growth.tree.has_produced);
    }

    #[test]
    fn fruiting_never_advances_and_is_normalized() {
        let settings = GrowthSettings::default();
        let mut fruiting = tree(SpeciesId::Oak, Stage::Fruiting, 0);
        fruiting.has_produced = true;
        assert_eq!(advance(&fruiting, u64::MAX, &settings, true), None);

        fruiting.has_produced = false;
        let Some(repaired) = advance(&fruiting, 1, &settings, false) else {
            panic!("fruiting tree without the flag should be repaired");
        };
        assert_eq!(repaired.transition, None);
        assert_eq!(repaired.tree.stage, Stage::Fruiting);
        assert!(repaired.tree.has_produced);
        assert_eq!(repaired.tree.stage_started_at_ms, 0);
    }

    #[test]
    fn clock_behind_stage_start_does_not_advance() {
        let settings = GrowthSettings::default();
        let sapling = tree(SpeciesId::Oak, Stage::Sapling, 500_000);
        assert_eq!(advance(&sapling, 1_000, &settings, true), None);
    }

    #[test]
    fn tick_reports_transitions_and_keeps_order() {
        let settings = GrowthSettings::default();
        let ready = tree(SpeciesId::Oak, Stage::Sapling, 0);
        let waiting = tree(SpeciesId::Redwood, Stage::Sapling, 0);
        let mut broken = tree(SpeciesId::Pine, Stage::Fruiting, 0);
        broken.has_produced = false;
        let forest = vec![ready.clone(), waiting.clone(), broken.clone()];

        let outcome = tick(&forest, 61_000, &settings, false);

        assert!(outcome.changed());
        assert_eq!(outcome.trees.len(), 3);
        assert_eq!(
            outcome.trees.iter().map(|t| t.id).collect::<Vec<_>>(),
            vec![ready.id, waiting.id, broken.id]
        );
        assert_eq!(
            outcome.transitions,
            vec![StageTransition {
                tree_id: ready.id,
                from: Stage::Sapling,
                to: Stage::Growing,
            }]
        );
        assert_eq!(outcome.normalized, vec![broken.id]);
        // Input untouched.
        assert_eq!(forest[0].stage, Stage::Sapling);
    }

    #[test]
    fn quiet_tick_changes_nothing() {
        let settings = GrowthSettings::default();
        let forest = vec![tree(SpeciesId::Oak, Stage::Growing, 10_000)];
        let outcome = tick(&forest, 20_000, &settings, false);
        assert!(!outcome.changed());
        assert_eq!(outcome.trees, forest);
    }

    #[test]
    fn harvest_returns_tree_to_mature() {
        let mut fruiting = tree(SpeciesId::Lotus, Stage::Fruiting, 0);
        fruiting.has_produced = true;

        let Some(done) = harvest(&fruiting, 99_000, HarvestYield::Flat) else {
            panic!("fruiting tree should be harvestable");
        };
        assert_eq!(done.fruit, 1);
        assert_eq!(done.tree.stage, Stage::Mature);
        assert_eq!(done.tree.stage_started_at_ms, 99_000);
        assert!(!done.tree.has_produced);
        assert_eq!(done.tree.planted_at_ms, fruiting.planted_at_ms);
    }

    #[test]
    fn species_policy_uses_snapshot_yield() {
        let fruiting = tree(SpeciesId::Lotus, Stage::Fruiting, 0);
        let done = harvest(&fruiting, 1, HarvestYield::Species);
        assert_eq!(done.map(|h| h.fruit), Some(3));
    }

    #[test]
    fn harvest_outside_fruiting_is_noop() {
        for stage in [Stage::Sapling, Stage::Growing, Stage::Mature] {
            assert_eq!(harvest(&tree(SpeciesId::Oak, stage, 0), 1, HarvestYield::Flat), None);
        }
    }

    #[test]
    fn yield_policy_deserializes_snake_case() {
        let policy: HarvestYield = serde_json::from_str("\"species\"").unwrap_or_default();
        assert_eq!(policy, HarvestYield::Species);
    }
}
