//! Growth engine for the Mindforest garden.
//!
//! Trees move through `Sapling -> Growing -> Mature -> Fruiting`. A
//! harvest returns a fruiting tree to `Mature`, so only the last two stages
//! repeat. Stage timing is driven by the species snapshot a tree carries,
//! never by the live catalog.
//!
//! # Modules
//!
//! - [`lifecycle`] -- Pure stage advancement, tick, and harvest over
//!   individual trees and tree slices.
//! - [`planting`] -- Tree creation with unlock checks and default-species
//!   fallback.
//! - [`grove`] -- The owned, ordered forest collection that applies ticks
//!   and harvests in place.

pub mod grove;
pub mod lifecycle;
pub mod planting;

pub use grove::{Grove, HarvestReceipt, TickReport};
pub use lifecycle::{
    DEFAULT_SPEED_BOOST_MULTIPLIER, DEFAULT_STAGE_DURATION_MS, FLAT_HARVEST_YIELD, Growth,
    GrowthSettings, Harvest, HarvestYield, StageTransition, TickOutcome, advance, harvest, tick,
};
pub use planting::{
    MAX_CUSTOM_NAME_CHARS, PlantRejected, normalize_name, plant, plant_or_default, sprout,
};
