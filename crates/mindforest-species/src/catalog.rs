//! The species catalog: a fixed mapping from [`SpeciesId`] to its
//! [`SpeciesDefinition`].
//!
//! The process-wide catalog is built once on first use
//! ([`SpeciesCatalog::standard`]) and never mutated. Custom catalogs can be
//! assembled with [`SpeciesCatalog::from_definitions`], which validates that
//! every identifier is covered so [`SpeciesCatalog::lookup`] stays total.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use rust_decimal::Decimal;

use mindforest_types::{
    ColorPalette, EmotionTag, Rarity, SpeciesDefinition, SpeciesId, UnlockCondition,
};

use crate::CatalogError;

/// Species planted whenever a request cannot be honored.
pub const DEFAULT_SPECIES: SpeciesId = SpeciesId::Oak;

/// Species planted as the result of a successful trade.
pub const FRIENDSHIP_SPECIES: SpeciesId = SpeciesId::Cherry;

/// Species every new user can plant without a purchase.
pub const BASELINE_UNLOCKED: [SpeciesId; 5] = [
    SpeciesId::Oak,
    SpeciesId::Willow,
    SpeciesId::Pine,
    SpeciesId::Maple,
    SpeciesId::Bamboo,
];

static STANDARD: LazyLock<SpeciesCatalog> = LazyLock::new(|| {
    let entries = standard_definitions()
        .into_iter()
        .map(|def| (def.id, def))
        .collect();
    SpeciesCatalog {
        entries,
        fallback: oak(),
    }
});

/// Immutable registry of species definitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeciesCatalog {
    entries: BTreeMap<SpeciesId, SpeciesDefinition>,
    /// Copy of the default species entry, so lookups never need to fail.
    fallback: SpeciesDefinition,
}

impl SpeciesCatalog {
    /// The process-wide catalog of the ten standard species.
    pub fn standard() -> &'static Self {
        &STANDARD
    }

    /// Build and validate a catalog from explicit definitions.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if a species is missing or duplicated, or
    /// if any definition breaks a trait invariant (empty emotion tags,
    /// non-positive multiplier, zero yield, purchase id without a purchase
    /// unlock or the reverse).
    pub fn from_definitions(
        definitions: impl IntoIterator<Item = SpeciesDefinition>,
    ) -> Result<Self, CatalogError> {
        let mut entries = BTreeMap::new();
        for def in definitions {
            validate_definition(&def)?;
            let id = def.id;
            if entries.insert(id, def).is_some() {
                return Err(CatalogError::DuplicateSpecies(id));
            }
        }

        if let Some(missing) = SpeciesId::ALL
            .into_iter()
            .find(|id| !entries.contains_key(id))
        {
            return Err(CatalogError::MissingSpecies(missing));
        }

        let fallback = entries
            .get(&DEFAULT_SPECIES)
            .cloned()
            .ok_or(CatalogError::MissingSpecies(DEFAULT_SPECIES))?;

        Ok(Self { entries, fallback })
    }

    /// Return a copy of this catalog with one definition replaced.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the replacement is invalid.
    pub fn with_definition(&self, definition: SpeciesDefinition) -> Result<Self, CatalogError> {
        let mut definitions: BTreeMap<SpeciesId, SpeciesDefinition> = self.entries.clone();
        definitions.insert(definition.id, definition);
        Self::from_definitions(definitions.into_values())
    }

    /// Look up a species. Total over [`SpeciesId`].
    pub fn lookup(&self, id: SpeciesId) -> &SpeciesDefinition {
        self.entries.get(&id).unwrap_or(&self.fallback)
    }

    /// The fallback species (oak).
    pub const fn default_species(&self) -> &SpeciesDefinition {
        &self.fallback
    }

    /// The species planted for a completed trade.
    pub fn friendship_species(&self) -> &SpeciesDefinition {
        self.lookup(FRIENDSHIP_SPECIES)
    }

    /// All definitions in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &SpeciesDefinition> {
        self.entries.values()
    }

    /// Number of species in the catalog.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog is empty. A validated catalog never is.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn validate_definition(def: &SpeciesDefinition) -> Result<(), CatalogError> {
    if def.emotion_tags.is_empty() {
        return Err(CatalogError::EmptyEmotionTags(def.id));
    }
    if def.growth_multiplier <= Decimal::ZERO {
        return Err(CatalogError::NonPositiveMultiplier {
            species: def.id,
            multiplier: def.growth_multiplier,
        });
    }
    if def.fruit_yield == 0 {
        return Err(CatalogError::ZeroYield(def.id));
    }
    let needs_purchase_id = def.unlock_condition == UnlockCondition::Purchase;
    if needs_purchase_id != def.purchase_id.is_some() {
        return Err(CatalogError::PurchaseIdMismatch(def.id));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Standard species data
// ---------------------------------------------------------------------------

fn palette(colors: [&str; 6]) -> ColorPalette {
    let [sapling, growing, mature, fruiting, trunk, fruit] = colors;
    ColorPalette {
        sapling: sapling.to_owned(),
        growing: growing.to_owned(),
        mature: mature.to_owned(),
        fruiting: fruiting.to_owned(),
        trunk: trunk.to_owned(),
        fruit: fruit.to_owned(),
    }
}

fn tags<const N: usize>(tags: [EmotionTag; N]) -> BTreeSet<EmotionTag> {
    tags.into_iter().collect()
}

fn oak() -> SpeciesDefinition {
    SpeciesDefinition {
        id: SpeciesId::Oak,
        display_name: "Resilient Oak".to_owned(),
        emotion_tags: tags([EmotionTag::Stress, EmotionTag::Growth]),
        rarity: Rarity::Common,
        growth_multiplier: Decimal::ONE,
        fruit_yield: 1,
        unlock_condition: UnlockCondition::Free,
        purchase_id: None,
        palette: palette(["#10B981", "#059669", "#047857", "#065F46", "#795548", "#FB923C"]),
    }
}

/// The ten standard species, in catalog order.
pub fn standard_definitions() -> Vec<SpeciesDefinition> {
    vec![
        oak(),
        SpeciesDefinition {
            id: SpeciesId::Willow,
            display_name: "Supple Willow".to_owned(),
            emotion_tags: tags([EmotionTag::Sadness, EmotionTag::Peace]),
            rarity: Rarity::Common,
            growth_multiplier: Decimal::ONE,
            fruit_yield: 1,
            unlock_condition: UnlockCondition::Free,
            purchase_id: None,
            palette: palette(["#38BDF8", "#0EA5E9", "#0284C7", "#0369A1", "#A1887F", "#FBBF24"]),
        },
        SpeciesDefinition {
            id: SpeciesId::Pine,
            display_name: "Enduring Pine".to_owned(),
            emotion_tags: tags([EmotionTag::Anger, EmotionTag::Growth]),
            rarity: Rarity::Common,
            growth_multiplier: Decimal::ONE,
            fruit_yield: 1,
            unlock_condition: UnlockCondition::Free,
            purchase_id: None,
            palette: palette(["#22C55E", "#16A34A", "#15803D", "#166534", "#5D4037", "#F97316"]),
        },
        SpeciesDefinition {
            id: SpeciesId::Cherry,
            display_name: "Friendship Cherry".to_owned(),
            emotion_tags: tags([EmotionTag::Joy, EmotionTag::Gratitude]),
            rarity: Rarity::Common,
            growth_multiplier: Decimal::new(8, 1),
            fruit_yield: 2,
            unlock_condition: UnlockCondition::Social,
            purchase_id: None,
            palette: palette(["#F472B6", "#EC4899", "#DB2777", "#BE185D", "#8D6E63", "#F59E0B"]),
        },
        SpeciesDefinition {
            id: SpeciesId::Maple,
            display_name: "Changing Maple".to_owned(),
            emotion_tags: tags([EmotionTag::Anxiety, EmotionTag::Growth]),
            rarity: Rarity::Common,
            growth_multiplier: Decimal::ONE,
            fruit_yield: 1,
            unlock_condition: UnlockCondition::Free,
            purchase_id: None,
            palette: palette(["#F97316", "#EA580C", "#C2410C", "#9A3412", "#6D4C41", "#EAB308"]),
        },
        SpeciesDefinition {
            id: SpeciesId::Bamboo,
            display_name: "Nimble Bamboo".to_owned(),
            emotion_tags: tags([EmotionTag::Stress, EmotionTag::Flexibility]),
            rarity: Rarity::Common,
            growth_multiplier: Decimal::new(12, 1),
            fruit_yield: 1,
            unlock_condition: UnlockCondition::Free,
            purchase_id: None,
            palette: palette(["#84CC16", "#65A30D", "#4D7C0F", "#3F6212", "#4A7C59", "#84CC16"]),
        },
        SpeciesDefinition {
            id: SpeciesId::Lotus,
            display_name: "Serene Lotus".to_owned(),
            emotion_tags: tags([EmotionTag::Peace, EmotionTag::Clarity]),
            rarity: Rarity::Rare,
            growth_multiplier: Decimal::new(15, 1),
            fruit_yield: 3,
            unlock_condition: UnlockCondition::Purchase,
            purchase_id: Some("lotus_seed".to_owned()),
            palette: palette(["#C084FC", "#A855F7", "#9333EA", "#7E22CE", "#BA68C8", "#D8B4FE"]),
        },
        SpeciesDefinition {
            id: SpeciesId::Olive,
            display_name: "Peaceful Olive".to_owned(),
            emotion_tags: tags([EmotionTag::Peace, EmotionTag::Gratitude]),
            rarity: Rarity::Rare,
            growth_multiplier: Decimal::new(13, 1),
            fruit_yield: 2,
            unlock_condition: UnlockCondition::Purchase,
            purchase_id: Some("olive_sapling".to_owned()),
            palette: palette(["#A3E635", "#84CC16", "#65A30D", "#4D7C0F", "#8BC34A", "#D9F99D"]),
        },
        SpeciesDefinition {
            id: SpeciesId::Bonsai,
            display_name: "Refined Bonsai".to_owned(),
            emotion_tags: tags([EmotionTag::Patience, EmotionTag::Growth]),
            rarity: Rarity::Rare,
            growth_multiplier: Decimal::new(7, 1),
            fruit_yield: 2,
            unlock_condition: UnlockCondition::Purchase,
            purchase_id: Some("bonsai_kit".to_owned()),
            palette: palette(["#6EE7B7", "#34D399", "#10B981", "#059669", "#795548", "#FDE68A"]),
        },
        SpeciesDefinition {
            id: SpeciesId::Redwood,
            display_name: "Steadfast Redwood".to_owned(),
            emotion_tags: tags([EmotionTag::Resilience, EmotionTag::Growth]),
            rarity: Rarity::Rare,
            growth_multiplier: Decimal::TWO,
            fruit_yield: 3,
            unlock_condition: UnlockCondition::Purchase,
            purchase_id: Some("redwood_seed".to_owned()),
            palette: palette(["#DC2626", "#B91C1C", "#991B1B", "#7F1D1D", "#4A2511", "#FCA5A5"]),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_catalog_passes_validation() {
        let rebuilt = SpeciesCatalog::from_definitions(standard_definitions());
        assert_eq!(rebuilt.as_ref().ok(), Some(SpeciesCatalog::standard()));
    }

    #[test]
    fn lookup_is_total() {
        let catalog = SpeciesCatalog::standard();
        for id in SpeciesId::ALL {
            assert_eq!(catalog.lookup(id).id, id);
        }
        assert_eq!(catalog.len(), SpeciesId::ALL.len());
    }

    #[test]
    fn default_and_friendship_species() {
        let catalog = SpeciesCatalog::standard();
        assert_eq!(catalog.default_species().id, SpeciesId::Oak);
        assert_eq!(
            catalog.default_species().unlock_condition,
            UnlockCondition::Free
        );
        assert_eq!(catalog.friendship_species().id, SpeciesId::Cherry);
        assert_eq!(
            catalog.friendship_species().unlock_condition,
            UnlockCondition::Social
        );
    }

    #[test]
    fn purchase_species_carry_product_ids() {
        let catalog = SpeciesCatalog::standard();
        assert_eq!(
            catalog.lookup(SpeciesId::Lotus).purchase_id.as_deref(),
            Some("lotus_seed")
        );
        assert_eq!(catalog.lookup(SpeciesId::Willow).purchase_id, None);
    }

    #[test]
    fn missing_species_is_rejected() {
        let defs = standard_definitions()
            .into_iter()
            .filter(|d| d.id != SpeciesId::Bonsai);
        assert_eq!(
            SpeciesCatalog::from_definitions(defs).err(),
            Some(CatalogError::MissingSpecies(SpeciesId::Bonsai))
        );
    }

    #[test]
    fn duplicate_species_is_rejected() {
        let mut defs = standard_definitions();
        defs.push(oak());
        assert_eq!(
            SpeciesCatalog::from_definitions(defs).err(),
            Some(CatalogError::DuplicateSpecies(SpeciesId::Oak))
        );
    }

    #[test]
    fn invalid_traits_are_rejected() {
        let catalog = SpeciesCatalog::standard();

        let mut no_tags = oak();
        no_tags.emotion_tags.clear();
        assert_eq!(
            catalog.with_definition(no_tags).err(),
            Some(CatalogError::EmptyEmotionTags(SpeciesId::Oak))
        );

        let mut frozen = oak();
        frozen.growth_multiplier = Decimal::ZERO;
        assert!(matches!(
            catalog.with_definition(frozen),
            Err(CatalogError::NonPositiveMultiplier { .. })
        ));

        let mut barren = oak();
        barren.fruit_yield = 0;
        assert_eq!(
            catalog.with_definition(barren).err(),
            Some(CatalogError::ZeroYield(SpeciesId::Oak))
        );

        let mut stray_product = oak();
        stray_product.purchase_id = Some("oak_seed".to_owned());
        assert_eq!(
            catalog.with_definition(stray_product).err(),
            Some(CatalogError::PurchaseIdMismatch(SpeciesId::Oak))
        );
    }

    #[test]
    fn with_definition_leaves_original_untouched() {
        let catalog = SpeciesCatalog::standard();
        let mut faster = oak();
        faster.growth_multiplier = Decimal::new(5, 1);
        let edited = catalog.with_definition(faster);
        assert!(edited.is_ok());
        assert_eq!(
            catalog.lookup(SpeciesId::Oak).growth_multiplier,
            Decimal::ONE
        );
        assert_eq!(
            edited
                .map(|c| c.default_species().growth_multiplier)
                .ok(),
            Some(Decimal::new(5, 1))
        );
    }
}
