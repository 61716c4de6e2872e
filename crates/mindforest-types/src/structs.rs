//! Core records of the Mindforest garden: species definitions, trees,
//! wisdom, community fruit, and the per-user entitlement state.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{
    EmotionTag, LedgerEntryType, MessageRole, Rarity, SpeciesId, Stage, UnlockCondition,
};
use crate::ids::{FruitId, LedgerEntryId, TreeId, WisdomId};

// ---------------------------------------------------------------------------
// Species
// ---------------------------------------------------------------------------

/// Presentation colors for a species, one per stage plus trunk and fruit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ColorPalette {
    /// Canopy color while a sapling.
    pub sapling: String,
    /// Canopy color while growing.
    pub growing: String,
    /// Canopy color when mature.
    pub mature: String,
    /// Canopy color while fruiting.
    pub fruiting: String,
    /// Trunk color.
    pub trunk: String,
    /// Fruit color.
    pub fruit: String,
}

impl ColorPalette {
    /// Canopy color for the given stage.
    pub fn for_stage(&self, stage: Stage) -> &str {
        match stage {
            Stage::Sapling => &self.sapling,
            Stage::Growing => &self.growing,
            Stage::Mature => &self.mature,
            Stage::Fruiting => &self.fruiting,
        }
    }
}

/// The immutable trait record of one species.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SpeciesDefinition {
    /// Catalog key.
    pub id: SpeciesId,
    /// Human-readable name.
    pub display_name: String,
    /// Emotions this species stands for. Never empty in a valid catalog.
    pub emotion_tags: BTreeSet<EmotionTag>,
    /// Rarity tier.
    pub rarity: Rarity,
    /// Stage duration scale. `1.0` is baseline, larger is slower.
    #[ts(as = "String")]
    pub growth_multiplier: Decimal,
    /// Fruit granted per harvest under the species yield policy.
    pub fruit_yield: u32,
    /// Policy gating who may plant this species.
    pub unlock_condition: UnlockCondition,
    /// Store product that unlocks the species. Present iff the unlock
    /// condition is [`UnlockCondition::Purchase`].
    pub purchase_id: Option<String>,
    /// Presentation colors.
    pub palette: ColorPalette,
}

// ---------------------------------------------------------------------------
// Trees
// ---------------------------------------------------------------------------

/// What a tree commemorates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum TreeAnchor {
    /// A wisdom record distilled from one of the user's reflections.
    Wisdom(WisdomId),
    /// A community fruit acquired through a trade.
    CommunityFruit(FruitId),
}

/// A planted tree.
///
/// `species_snapshot` is a frozen copy of the catalog entry at planting
/// time; later catalog edits never reach existing trees. Only the stage
/// fields (`stage`, `stage_started_at_ms`, `has_produced`) change during
/// growth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Tree {
    /// Unique tree identifier.
    pub id: TreeId,
    /// The wisdom record or community fruit this tree commemorates.
    pub anchor: TreeAnchor,
    /// Current lifecycle stage.
    pub stage: Stage,
    /// Planting time in Unix milliseconds. Never changes.
    pub planted_at_ms: u64,
    /// Time the current stage began, in Unix milliseconds.
    pub stage_started_at_ms: u64,
    /// Last watering time in Unix milliseconds. Not consulted by growth.
    pub last_watered_at_ms: u64,
    /// Species key.
    pub species: SpeciesId,
    /// Species definition as it was when the tree was planted.
    pub species_snapshot: SpeciesDefinition,
    /// Whether the current fruiting cycle has been counted.
    pub has_produced: bool,
    /// Optional user-assigned name.
    pub custom_name: Option<String>,
}

// ---------------------------------------------------------------------------
// Reflection artifacts
// ---------------------------------------------------------------------------

/// One message of a reflection conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Message {
    /// Who wrote the message.
    pub role: MessageRole,
    /// Message body.
    pub text: String,
    /// Send time in Unix milliseconds.
    pub timestamp_ms: u64,
}

/// The triple produced by summarizing a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ExtractedWisdom {
    /// Short poetic title.
    pub title: String,
    /// One-sentence summary of the originating situation.
    pub situation: String,
    /// The extracted insight.
    pub insight: String,
}

/// A wisdom record. Created once per completed reflection, never edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Wisdom {
    /// Unique identifier.
    pub id: WisdomId,
    /// Short poetic title.
    pub title: String,
    /// Summary of the originating situation.
    pub situation: String,
    /// The extracted insight.
    pub insight: String,
    /// Day the reflection was completed.
    pub created_on: NaiveDate,
}

impl Wisdom {
    /// Build a wisdom record from an extracted triple.
    pub fn from_extracted(extracted: ExtractedWisdom, created_on: NaiveDate) -> Self {
        Self {
            id: WisdomId::new(),
            title: extracted.title,
            situation: extracted.situation,
            insight: extracted.insight,
            created_on,
        }
    }
}

/// A tradeable insight contributed by another user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CommunityFruit {
    /// Unique identifier.
    pub id: FruitId,
    /// Author label shown with the insight.
    pub author: String,
    /// The insight text.
    pub insight: String,
    /// Price in harvested fruit.
    pub cost: u32,
}

// ---------------------------------------------------------------------------
// User state
// ---------------------------------------------------------------------------

/// Entitlement and social state consulted by the unlock resolver and the
/// growth engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct UserState {
    /// Species unlocked for this user without a purchase.
    pub baseline_unlocked: BTreeSet<SpeciesId>,
    /// Species bought through the store.
    pub purchased: BTreeSet<SpeciesId>,
    /// Whether the user holds the global growth speed boost.
    pub has_speed_boost: bool,
    /// Number of completed community trades.
    pub completed_trades: u32,
}

impl UserState {
    /// A user with the given baseline unlocks and nothing else.
    pub fn with_baseline(baseline: impl IntoIterator<Item = SpeciesId>) -> Self {
        Self {
            baseline_unlocked: baseline.into_iter().collect(),
            ..Self::default()
        }
    }
}

/// One movement of harvested-fruit currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LedgerEntry {
    /// Unique identifier.
    pub id: LedgerEntryId,
    /// Credit or debit category.
    pub entry_type: LedgerEntryType,
    /// Units moved. Always positive.
    pub amount: u32,
    /// Time of the movement in Unix milliseconds.
    pub at_ms: u64,
    /// Harvested tree for credits.
    pub tree_id: Option<TreeId>,
    /// Acquired fruit for debits.
    pub fruit_id: Option<FruitId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_serializes_tagged() {
        let id = WisdomId::new();
        let json = serde_json::to_value(TreeAnchor::Wisdom(id)).unwrap_or_default();
        assert_eq!(json["kind"], "wisdom");
        assert_eq!(json["id"], id.to_string());
    }

    #[test]
    fn palette_picks_stage_color() {
        let palette = ColorPalette {
            sapling: "#1".to_owned(),
            growing: "#2".to_owned(),
            mature: "#3".to_owned(),
            fruiting: "#4".to_owned(),
            trunk: "#5".to_owned(),
            fruit: "#6".to_owned(),
        };
        assert_eq!(palette.for_stage(Stage::Mature), "#3");
        assert_eq!(palette.for_stage(Stage::Fruiting), "#4");
    }

    #[test]
    fn baseline_user_has_no_purchases() {
        let user = UserState::with_baseline([SpeciesId::Oak, SpeciesId::Pine]);
        assert_eq!(user.baseline_unlocked.len(), 2);
        assert!(user.purchased.is_empty());
        assert!(!user.has_speed_boost);
        assert_eq!(user.completed_trades, 0);
    }
}
