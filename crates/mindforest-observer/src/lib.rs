//! HTTP API for the Mindforest garden.
//!
//! An Axum server exposing the forest, species catalog, wisdom archive,
//! and community market, plus the actions that change them: harvesting,
//! renaming, trading, planting reflections, and entitlement grants.
//!
//! All handlers share one [`AppState`] whose garden lives behind the same
//! async mutex as the growth loop. Errors are returned as JSON bodies of
//! the form `{ "error", "status" }`.

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

pub use error::ObserverError;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use state::AppState;
