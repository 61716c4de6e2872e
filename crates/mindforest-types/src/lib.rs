//! Shared type definitions for the Mindforest garden.
//!
//! This crate is the single source of truth for records that cross crate
//! boundaries. Types flow to the web client as `TypeScript` via `ts-rs`.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for trees, wisdom, fruit, users
//! - [`enums`] -- Stages, species identifiers, rarity, unlock conditions
//! - [`structs`] -- Species definitions, trees, wisdom, community fruit,
//!   user entitlement state, ledger entries

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{
    EmotionTag, LedgerEntryType, MessageRole, Rarity, SpeciesId, Stage, UnknownVariant,
    UnlockCondition,
};
pub use ids::{FruitId, LedgerEntryId, TreeId, UserId, WisdomId};
pub use structs::{
    ColorPalette, CommunityFruit, ExtractedWisdom, LedgerEntry, Message, SpeciesDefinition, Tree,
    TreeAnchor, UserState, Wisdom,
};
