//! Creating trees from the species catalog.
//!
//! Planting is the only place a [`Tree`] is born. The species definition is
//! copied into the tree at this point and never refreshed afterwards.

use mindforest_species::{SpeciesCatalog, is_unlocked};
use mindforest_types::{
    SpeciesDefinition, SpeciesId, Stage, Tree, TreeAnchor, TreeId, UnlockCondition, UserState,
};

/// Longest custom name kept after trimming, in characters.
pub const MAX_CUSTOM_NAME_CHARS: usize = 40;

/// A planting request for a species the user has not unlocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("species {species} is locked ({condition:?} unlock)")]
pub struct PlantRejected {
    /// The requested species.
    pub species: SpeciesId,
    /// The unlock condition the user does not satisfy.
    pub condition: UnlockCondition,
}

/// Create a sapling of `definition` at `now_ms` without any unlock check.
pub fn sprout(definition: &SpeciesDefinition, anchor: TreeAnchor, now_ms: u64) -> Tree {
    Tree {
        id: TreeId::new(),
        anchor,
        stage: Stage::Sapling,
        planted_at_ms: now_ms,
        stage_started_at_ms: now_ms,
        last_watered_at_ms: now_ms,
        species: definition.id,
        species_snapshot: definition.clone(),
        has_produced: false,
        custom_name: None,
    }
}

/// Plant `species` for `user`, refusing species the user cannot plant.
pub fn plant(
    catalog: &SpeciesCatalog,
    anchor: TreeAnchor,
    species: SpeciesId,
    user: &UserState,
    now_ms: u64,
) -> Result<Tree, PlantRejected> {
    let definition = catalog.lookup(species);
    if !is_unlocked(definition, user) {
        return Err(PlantRejected {
            species,
            condition: definition.unlock_condition,
        });
    }
    Ok(sprout(definition, anchor, now_ms))
}

/// Plant `requested` if the user may, otherwise the catalog's default
/// species. Never fails.
pub fn plant_or_default(
    catalog: &SpeciesCatalog,
    anchor: TreeAnchor,
    requested: SpeciesId,
    user: &UserState,
    now_ms: u64,
) -> Tree {
    plant(catalog, anchor, requested, user, now_ms).unwrap_or_else(|rejected| {
        tracing::debug!(
            requested = %rejected.species,
            fallback = %catalog.default_species().id,
            "Requested species is locked, planting default"
        );
        sprout(catalog.default_species(), anchor, now_ms)
    })
}

/// Normalize a user-supplied tree name.
///
/// Surrounding whitespace is trimmed and the name is cut to
/// [`MAX_CUSTOM_NAME_CHARS`]. A blank name clears the custom name.
pub fn normalize_name(name: &str) -> Option<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(MAX_CUSTOM_NAME_CHARS).collect())
}
