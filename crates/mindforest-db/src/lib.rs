//! `PostgreSQL` persistence for the Mindforest garden.
//!
//! The in-memory garden is authoritative. This crate loads it at startup
//! and mirrors changes back in the background.
//!
//! ```text
//! Garden action (in memory, under the session lock)
//!     |
//!     +-- Mirror::{trees, wisdom, stats} --> mpsc queue --> writer task --> GardenStore
//!                                                                           |-- trees
//!                                                                           |-- wisdom
//!                                                                           +-- user_stats
//! ```
//!
//! # Modules
//!
//! - [`postgres`] -- connection pool and migrations
//! - [`rows`] -- table row shapes and conversions
//! - [`garden_store`] -- queries keyed by user id
//! - [`mirror`] -- ordered background writes
//! - [`error`] -- shared error type

pub mod error;
pub mod garden_store;
pub mod mirror;
pub mod postgres;
pub mod rows;

pub use error::DbError;
pub use garden_store::GardenStore;
pub use mirror::Mirror;
pub use postgres::{PostgresConfig, PostgresPool};
pub use rows::{TreeRow, UserStats, UserStatsRow, WisdomRow};
