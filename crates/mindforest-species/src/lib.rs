//! Species catalog, unlock rules, and species recommendation.
//!
//! # Modules
//!
//! - [`catalog`] -- The fixed [`SpeciesCatalog`] with total lookup and the
//!   standard ten-species data set.
//! - [`unlock`] -- Planting eligibility from unlock conditions and the
//!   user's entitlement state.
//! - [`recommend`] -- The pluggable [`SpeciesRecommender`] strategy and the
//!   keyword heuristic shipped by default.

pub mod catalog;
pub mod recommend;
pub mod unlock;

// Re-export primary types at crate root.
pub use catalog::{BASELINE_UNLOCKED, DEFAULT_SPECIES, FRIENDSHIP_SPECIES, SpeciesCatalog};
pub use recommend::{KeywordRecommender, KeywordRule, SpeciesRecommender};
pub use unlock::{can_plant, is_unlocked, plantable_species};

use mindforest_types::SpeciesId;
use rust_decimal::Decimal;

/// Errors raised while assembling a species catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// A species identifier has no definition.
    #[error("species {0} has no definition")]
    MissingSpecies(SpeciesId),

    /// A species identifier was defined twice.
    #[error("species {0} is defined more than once")]
    DuplicateSpecies(SpeciesId),

    /// A species has no emotion tags.
    #[error("species {0} has no emotion tags")]
    EmptyEmotionTags(SpeciesId),

    /// A species has a zero or negative growth multiplier.
    #[error("species {species} has non-positive growth multiplier {multiplier}")]
    NonPositiveMultiplier {
        /// The offending species.
        species: SpeciesId,
        /// The configured multiplier.
        multiplier: Decimal,
    },

    /// A species yields no fruit.
    #[error("species {0} has a zero fruit yield")]
    ZeroYield(SpeciesId),

    /// A purchase id is present without a purchase unlock, or missing on a
    /// purchase species.
    #[error("species {0} purchase id does not match its unlock condition")]
    PurchaseIdMismatch(SpeciesId),
}
