//! Enumeration types for the Mindforest garden.
//!
//! All enums serialize in `snake_case` so persisted rows and the web client
//! share one spelling (`"sapling"`, `"oak"`, `"purchase"`).

use core::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Error returned when a stored string does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value:?}")]
pub struct UnknownVariant {
    /// Which enum was being parsed.
    pub kind: &'static str,
    /// The offending input.
    pub value: String,
}

// ---------------------------------------------------------------------------
// Lifecycle stage
// ---------------------------------------------------------------------------

/// One of the four lifecycle phases of a tree.
///
/// Transitions are strictly linear (`Sapling -> Growing -> Mature ->
/// Fruiting`). Harvesting returns a fruiting tree to `Mature`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Stage {
    /// Freshly planted.
    Sapling,
    /// Past the first stage duration.
    Growing,
    /// Fully grown, waiting to bear fruit.
    Mature,
    /// Carrying fruit ready for harvest.
    Fruiting,
}

impl Stage {
    /// Every stage in lifecycle order.
    pub const ALL: [Self; 4] = [Self::Sapling, Self::Growing, Self::Mature, Self::Fruiting];

    /// The stage reached by a timed advance, or `None` for `Fruiting`, which
    /// only leaves through a harvest.
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Sapling => Some(Self::Growing),
            Self::Growing => Some(Self::Mature),
            Self::Mature => Some(Self::Fruiting),
            Self::Fruiting => None,
        }
    }

    /// Stable lowercase name used in storage.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sapling => "sapling",
            Self::Growing => "growing",
            Self::Mature => "mature",
            Self::Fruiting => "fruiting",
        }
    }
}

impl core::fmt::Display for Stage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "stage",
                value: s.to_owned(),
            })
    }
}

// ---------------------------------------------------------------------------
// Species identity
// ---------------------------------------------------------------------------

/// Identifier of a tree species.
///
/// The identifier space is closed: every value has exactly one entry in a
/// validated species catalog, so lookups never miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum SpeciesId {
    /// Resilient oak, the universal default.
    Oak,
    /// Supple willow, for sadness.
    Willow,
    /// Enduring pine, for anger.
    Pine,
    /// Friendship cherry, unlocked by trading.
    Cherry,
    /// Changing maple, for anxiety.
    Maple,
    /// Nimble bamboo, for stress.
    Bamboo,
    /// Serene lotus (purchasable).
    Lotus,
    /// Peaceful olive (purchasable).
    Olive,
    /// Refined bonsai (purchasable).
    Bonsai,
    /// Steadfast redwood (purchasable).
    Redwood,
}

impl SpeciesId {
    /// Every species identifier.
    pub const ALL: [Self; 10] = [
        Self::Oak,
        Self::Willow,
        Self::Pine,
        Self::Cherry,
        Self::Maple,
        Self::Bamboo,
        Self::Lotus,
        Self::Olive,
        Self::Bonsai,
        Self::Redwood,
    ];

    /// Stable lowercase name used in storage.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Oak => "oak",
            Self::Willow => "willow",
            Self::Pine => "pine",
            Self::Cherry => "cherry",
            Self::Maple => "maple",
            Self::Bamboo => "bamboo",
            Self::Lotus => "lotus",
            Self::Olive => "olive",
            Self::Bonsai => "bonsai",
            Self::Redwood => "redwood",
        }
    }
}

impl core::fmt::Display for SpeciesId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpeciesId {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|species| species.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "species",
                value: s.to_owned(),
            })
    }
}

/// How rare a species is. Presentation uses it for glow effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Rarity {
    /// Available to everyone.
    Common,
    /// Paid species.
    Rare,
    /// Event or achievement species.
    Epic,
}

/// The policy gating whether a user may plant a species.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum UnlockCondition {
    /// Always plantable.
    Free,
    /// Plantable once bought (or baseline-unlocked).
    Purchase,
    /// Plantable after completing at least one trade.
    Social,
    /// Plantable when granted through the baseline-unlocked set.
    Achievement,
}

/// Emotion associated with a species.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum EmotionTag {
    /// Anger.
    Anger,
    /// Sadness.
    Sadness,
    /// Anxiety.
    Anxiety,
    /// Stress.
    Stress,
    /// Joy.
    Joy,
    /// Peace.
    Peace,
    /// Gratitude.
    Gratitude,
    /// Growth.
    Growth,
    /// Flexibility.
    Flexibility,
    /// Clarity.
    Clarity,
    /// Patience.
    Patience,
    /// Resilience.
    Resilience,
}

// ---------------------------------------------------------------------------
// Conversation & ledger
// ---------------------------------------------------------------------------

/// Author of a reflection message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum MessageRole {
    /// The person reflecting.
    User,
    /// The AI listener.
    Model,
}

/// Category of an inventory ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum LedgerEntryType {
    /// Fruit credited by harvesting a tree.
    Harvest,
    /// Fruit debited to acquire a community fruit.
    Trade,
    /// Balance carried over from a restored session.
    Opening,
}

impl LedgerEntryType {
    /// Whether entries of this type add to the balance.
    pub const fn is_credit(self) -> bool {
        matches!(self, Self::Harvest | Self::Opening)
    }
}
