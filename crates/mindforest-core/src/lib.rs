//! Garden session, configuration, clock, and tick loop for the Mindforest
//! garden.
//!
//! This crate composes the growth engine, the species catalog, and the
//! exchange ledger into one [`Garden`] per user, and drives it in real
//! time.
//!
//! # Modules
//!
//! - [`config`] -- YAML configuration with serde defaults and environment
//!   overrides.
//! - [`clock`] -- Wall-clock and manual clocks in Unix milliseconds.
//! - [`garden`] -- The garden session: reflections, harvests, trades,
//!   entitlements, and read views.
//! - [`runner`] -- The tokio interval loop that ticks the garden until
//!   shutdown.

pub mod clock;
pub mod config;
pub mod garden;
pub mod runner;

pub use clock::{Clock, ManualClock, SystemClock, day_of};
pub use config::{ConfigError, DEFAULT_USER_ID, MindforestConfig};
pub use garden::{
    ForestEntry, Garden, GardenSnapshot, GardenStats, HarvestOutcome, ReflectionOutcome,
    SpeciesListing,
};
pub use runner::{NoOpCallback, RunSummary, TickCallback, run_ticks};
