//! Row shapes of the `trees`, `wisdom` and `user_stats` tables and their
//! conversion to and from garden types.
//!
//! Trees are stored by species id only. On fetch the species definition is
//! re-joined from the current catalog, so the snapshot embedded in a
//! restored tree always reflects the running build.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use sqlx::types::Json;
use uuid::Uuid;

use mindforest_species::SpeciesCatalog;
use mindforest_types::{
    CommunityFruit, FruitId, SpeciesId, Stage, Tree, TreeAnchor, TreeId, UserState, Wisdom,
    WisdomId,
};

use crate::error::DbError;

const ANCHOR_WISDOM: &str = "wisdom";
const ANCHOR_FRUIT: &str = "community_fruit";

/// Timestamps above `i64::MAX` ms are clamped; they are far past any
/// realistic clock.
fn ms_to_db(ms: u64) -> i64 {
    i64::try_from(ms).unwrap_or(i64::MAX)
}

fn ms_from_db(table: &'static str, column: &str, ms: i64) -> Result<u64, DbError> {
    u64::try_from(ms).map_err(|e| DbError::Corrupt {
        table,
        reason: format!("{column} = {ms}: {e}"),
    })
}

fn count_to_db(n: u32) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

fn count_from_db(column: &str, n: i32) -> Result<u32, DbError> {
    u32::try_from(n).map_err(|e| DbError::Corrupt {
        table: "user_stats",
        reason: format!("{column} = {n}: {e}"),
    })
}

// ---------------------------------------------------------------------------
// trees
// ---------------------------------------------------------------------------

/// A row from the `trees` table.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct TreeRow {
    /// Tree identifier.
    pub id: Uuid,
    /// `wisdom` or `community_fruit`.
    pub anchor_kind: String,
    /// Wisdom or fruit identifier, per `anchor_kind`.
    pub anchor_id: Uuid,
    /// Lifecycle stage name.
    pub stage: String,
    /// Planting time in Unix milliseconds.
    pub planted_at_ms: i64,
    /// Current stage start in Unix milliseconds.
    pub stage_started_at_ms: i64,
    /// Last watering in Unix milliseconds.
    pub last_watered_at_ms: i64,
    /// Species key.
    pub species: String,
    /// Whether the current fruiting cycle has been counted.
    pub has_produced: bool,
    /// User-assigned name.
    pub custom_name: Option<String>,
}

impl TreeRow {
    /// Flatten a tree for storage.
    pub fn from_tree(tree: &Tree) -> Self {
        let (anchor_kind, anchor_id) = match tree.anchor {
            TreeAnchor::Wisdom(id) => (ANCHOR_WISDOM, id.into_inner()),
            TreeAnchor::CommunityFruit(id) => (ANCHOR_FRUIT, id.into_inner()),
        };
        Self {
            id: tree.id.into_inner(),
            anchor_kind: anchor_kind.to_owned(),
            anchor_id,
            stage: tree.stage.as_str().to_owned(),
            planted_at_ms: ms_to_db(tree.planted_at_ms),
            stage_started_at_ms: ms_to_db(tree.stage_started_at_ms),
            last_watered_at_ms: ms_to_db(tree.last_watered_at_ms),
            species: tree.species.as_str().to_owned(),
            has_produced: tree.has_produced,
            custom_name: tree.custom_name.clone(),
        }
    }

    /// Rebuild the tree, re-joining the species definition from `catalog`.
    ///
    /// A species name the build no longer knows falls back to the catalog
    /// default. A stage that started before the tree was planted marks the
    /// row corrupt.
    pub fn into_tree(self, catalog: &SpeciesCatalog) -> Result<Tree, DbError> {
        let anchor = match self.anchor_kind.as_str() {
            ANCHOR_WISDOM => TreeAnchor::Wisdom(WisdomId(self.anchor_id)),
            ANCHOR_FRUIT => TreeAnchor::CommunityFruit(FruitId(self.anchor_id)),
            other => {
                return Err(DbError::Corrupt {
                    table: "trees",
                    reason: format!("unknown anchor_kind {other:?}"),
                });
            }
        };
        let stage: Stage = self.stage.parse().map_err(|e| DbError::Corrupt {
            table: "trees",
            reason: format!("{e}"),
        })?;
        let planted_at_ms = ms_from_db("trees", "planted_at_ms", self.planted_at_ms)?;
        let stage_started_at_ms =
            ms_from_db("trees", "stage_started_at_ms", self.stage_started_at_ms)?;
        let last_watered_at_ms =
            ms_from_db("trees", "last_watered_at_ms", self.last_watered_at_ms)?;
        if stage_started_at_ms < planted_at_ms {
            return Err(DbError::Corrupt {
                table: "trees",
                reason: format!(
                    "stage_started_at_ms {stage_started_at_ms} precedes \
                     planted_at_ms {planted_at_ms}"
                ),
            });
        }
        let definition = match self.species.parse::<SpeciesId>() {
            Ok(id) => catalog.lookup(id),
            Err(e) => {
                tracing::warn!(
                    tree_id = %self.id,
                    error = %e,
                    "Unknown stored species, using default"
                );
                catalog.default_species()
            }
        };

        Ok(Tree {
            id: TreeId(self.id),
            anchor,
            stage,
            planted_at_ms,
            stage_started_at_ms,
            last_watered_at_ms,
            species: definition.id,
            species_snapshot: definition.clone(),
            has_produced: self.has_produced,
            custom_name: self.custom_name,
        })
    }
}

// ---------------------------------------------------------------------------
// wisdom
// ---------------------------------------------------------------------------

/// A row from the `wisdom` table.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct WisdomRow {
    /// Wisdom identifier.
    pub id: Uuid,
    /// Short poetic title.
    pub title: String,
    /// Originating situation.
    pub situation: String,
    /// Extracted insight.
    pub insight: String,
    /// Day the reflection was completed.
    pub created_on: NaiveDate,
}

impl From<&Wisdom> for WisdomRow {
    fn from(w: &Wisdom) -> Self {
        Self {
            id: w.id.into_inner(),
            title: w.title.clone(),
            situation: w.situation.clone(),
            insight: w.insight.clone(),
            created_on: w.created_on,
        }
    }
}

impl From<WisdomRow> for Wisdom {
    fn from(row: WisdomRow) -> Self {
        Self {
            id: WisdomId(row.id),
            title: row.title,
            situation: row.situation,
            insight: row.insight,
            created_on: row.created_on,
        }
    }
}

// ---------------------------------------------------------------------------
// user_stats
// ---------------------------------------------------------------------------

/// A row from the `user_stats` table.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct UserStatsRow {
    /// Harvested fruit balance.
    pub inventory: i32,
    /// Number of community fruit collected.
    pub collected: i32,
    /// Completed community trades.
    pub completed_trades: i32,
    /// Baseline-unlocked species names.
    pub unlocked_species: Vec<String>,
    /// Purchased species names.
    pub purchased_species: Vec<String>,
    /// Whether the speed boost is held.
    pub has_speed_boost: bool,
    /// Collected community fruit.
    pub my_collection: Json<Vec<CommunityFruit>>,
}

/// The parts of a garden kept in `user_stats`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserStats {
    /// Harvested fruit balance.
    pub inventory: u32,
    /// Collected community fruit.
    pub collected: Vec<CommunityFruit>,
    /// Entitlement and social state.
    pub user: UserState,
}

impl UserStatsRow {
    /// The row `ensure_user_stats` inserts for a new user.
    pub fn new_user(baseline: impl IntoIterator<Item = SpeciesId>) -> Self {
        Self {
            inventory: 0,
            collected: 0,
            completed_trades: 0,
            unlocked_species: species_names(baseline),
            purchased_species: Vec::new(),
            has_speed_boost: false,
            my_collection: Json(Vec::new()),
        }
    }

    /// Flatten garden state for storage.
    pub fn from_stats(inventory: u32, collected: &[CommunityFruit], user: &UserState) -> Self {
        Self {
            inventory: count_to_db(inventory),
            collected: i32::try_from(collected.len()).unwrap_or(i32::MAX),
            completed_trades: count_to_db(user.completed_trades),
            unlocked_species: species_names(user.baseline_unlocked.iter().copied()),
            purchased_species: species_names(user.purchased.iter().copied()),
            has_speed_boost: user.has_speed_boost,
            my_collection: Json(collected.to_vec()),
        }
    }

    /// Rebuild garden state. Unknown species names are dropped with a
    /// warning.
    pub fn into_stats(self) -> Result<UserStats, DbError> {
        Ok(UserStats {
            inventory: count_from_db("inventory", self.inventory)?,
            user: UserState {
                baseline_unlocked: parse_species(&self.unlocked_species),
                purchased: parse_species(&self.purchased_species),
                has_speed_boost: self.has_speed_boost,
                completed_trades: count_from_db("completed_trades", self.completed_trades)?,
            },
            collected: self.my_collection.0,
        })
    }
}

fn species_names(species: impl IntoIterator<Item = SpeciesId>) -> Vec<String> {
    species.into_iter().map(|s| s.as_str().to_owned()).collect()
}

fn parse_species(names: &[String]) -> BTreeSet<SpeciesId> {
    names
        .iter()
        .filter_map(|name| {
            name.parse()
                .inspect_err(|e| tracing::warn!(error = %e, "Dropping unknown stored species"))
                .ok()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use mindforest_growth::sprout;
    use mindforest_ledger::starter_fruits;
    use mindforest_species::BASELINE_UNLOCKED;

    use super::*;

    fn catalog() -> &'static SpeciesCatalog {
        SpeciesCatalog::standard()
    }

    #[test]
    fn tree_row_rejoins_species_from_catalog() {
        let mut tree = sprout(
            catalog().lookup(SpeciesId::Willow),
            TreeAnchor::CommunityFruit(FruitId::new()),
            1_000,
        );
        tree.stage = Stage::Fruiting;
        tree.has_produced = true;
        tree.custom_name = Some("Letting go".to_owned());

        let row = TreeRow::from_tree(&tree);
        assert_eq!(row.anchor_kind, "community_fruit");
        assert_eq!(row.stage, "fruiting");
        assert_eq!(row.species, "willow");

        let restored = row.into_tree(catalog());
        assert_eq!(restored.ok(), Some(tree));
    }

    #[test]
    fn unknown_species_falls_back_to_default() {
        let tree = sprout(
            catalog().lookup(SpeciesId::Pine),
            TreeAnchor::Wisdom(WisdomId::new()),
            0,
        );
        let mut row = TreeRow::from_tree(&tree);
        row.species = "baobab".to_owned();
        let restored = row.into_tree(catalog()).ok();
        assert_eq!(restored.map(|t| t.species), Some(SpeciesId::Oak));
    }

    #[test]
    fn corrupt_tree_rows_are_rejected() {
        let tree = sprout(
            catalog().lookup(SpeciesId::Oak),
            TreeAnchor::Wisdom(WisdomId::new()),
            0,
        );

        let mut bad_stage = TreeRow::from_tree(&tree);
        bad_stage.stage = "withered".to_owned();
        assert!(matches!(
            bad_stage.into_tree(catalog()),
            Err(DbError::Corrupt { table: "trees", .. })
        ));

        let mut bad_time = TreeRow::from_tree(&tree);
        bad_time.planted_at_ms = -1;
        assert!(bad_time.into_tree(catalog()).is_err());

        let mut bad_anchor = TreeRow::from_tree(&tree);
        bad_anchor.anchor_kind = "gift".to_owned();
        assert!(bad_anchor.into_tree(catalog()).is_err());
    }

    #[test]
    fn stage_started_before_planting_is_corrupt() {
        let tree = sprout(
            catalog().lookup(SpeciesId::Maple),
            TreeAnchor::Wisdom(WisdomId::new()),
            5_000,
        );
        let mut row = TreeRow::from_tree(&tree);
        row.stage_started_at_ms = 4_999;
        assert!(matches!(
            row.into_tree(catalog()),
            Err(DbError::Corrupt { table: "trees", .. })
        ));

        // A stage starting in the planting instant is fine.
        let same_instant = TreeRow::from_tree(&tree);
        assert_eq!(same_instant.into_tree(catalog()).ok(), Some(tree));
    }

    #[test]
    fn new_user_row_unlocks_baseline() {
        let stats = UserStatsRow::new_user(BASELINE_UNLOCKED).into_stats().ok();
        let Some(stats) = stats else {
            assert!(stats.is_some());
            return;
        };
        assert_eq!(stats.inventory, 0);
        assert_eq!(stats.user.baseline_unlocked.len(), BASELINE_UNLOCKED.len());
        assert!(stats.user.purchased.is_empty());
        assert!(stats.collected.is_empty());
    }

    #[test]
    fn stats_row_round_trips_garden_state() {
        let mut user = UserState::with_baseline(BASELINE_UNLOCKED);
        user.purchased.insert(SpeciesId::Lotus);
        user.has_speed_boost = true;
        user.completed_trades = 2;
        let collected: Vec<CommunityFruit> = starter_fruits().into_iter().take(2).collect();

        let row = UserStatsRow::from_stats(3, &collected, &user);
        assert_eq!(row.collected, 2);
        assert!(row.purchased_species.contains(&"lotus".to_owned()));

        let stats = row.into_stats().ok();
        assert_eq!(
            stats,
            Some(UserStats {
                inventory: 3,
                collected,
                user,
            })
        );
    }

    #[test]
    fn unknown_stored_species_are_dropped() {
        let mut row = UserStatsRow::new_user([SpeciesId::Oak]);
        row.purchased_species = vec!["dragonfruit".to_owned(), "olive".to_owned()];
        let purchased = row.into_stats().map(|s| s.user.purchased).unwrap_or_default();
        assert_eq!(purchased.into_iter().collect::<Vec<_>>(), vec![SpeciesId::Olive]);
    }
}
