//! REST API endpoint handlers.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/api/forest` | Trees with display labels |
//! | `GET` | `/api/species` | Catalog with unlock state |
//! | `GET` | `/api/wisdom` | Wisdom archive, newest first |
//! | `GET` | `/api/market` | Offered and collected community fruit |
//! | `GET` | `/api/stats` | Headline numbers |
//! | `POST` | `/api/trees/{id}/harvest` | Harvest a fruiting tree |
//! | `PUT` | `/api/trees/{id}/name` | Set or clear a custom name |
//! | `POST` | `/api/market/{id}/trade` | Buy a community fruit |
//! | `POST` | `/api/reflections` | Extract wisdom and plant a tree |
//! | `POST` | `/api/entitlements/species/{id}` | Record a species purchase |
//! | `PUT` | `/api/entitlements/speed-boost` | Toggle the speed boost |
//!
//! Every mutation commits in memory first and then queues the changed rows
//! on the [`Mirror`](mindforest_db::Mirror) before releasing the garden
//! lock, so writes reach the database in the order the garden made them.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use uuid::Uuid;

use mindforest_types::{FruitId, Message, SpeciesId, TreeId};

use crate::error::ObserverError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// Body of `PUT /api/trees/{id}/name`.
#[derive(Debug, serde::Deserialize)]
pub struct RenameRequest {
    /// New name. Blank clears the custom name.
    #[serde(default)]
    pub name: String,
}

/// Body of `POST /api/reflections`.
#[derive(Debug, serde::Deserialize)]
pub struct ReflectionRequest {
    /// The conversation to distill.
    pub messages: Vec<Message>,
}

/// Body of `PUT /api/entitlements/speed-boost`.
#[derive(Debug, serde::Deserialize)]
pub struct SpeedBoostRequest {
    /// Whether the boost should be held.
    pub enabled: bool,
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// List every tree with its label, oldest first.
pub async fn get_forest(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let forest = state.garden.lock().await.forest();
    Json(serde_json::json!({
        "count": forest.len(),
        "trees": forest,
    }))
}

/// List the species catalog with this user's unlock state.
pub async fn get_species(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let species = state.garden.lock().await.species();
    Json(serde_json::json!({
        "count": species.len(),
        "species": species,
    }))
}

/// List the wisdom archive, newest first.
pub async fn get_wisdom(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let wisdom = state.garden.lock().await.wisdom_archive();
    Json(serde_json::json!({
        "count": wisdom.len(),
        "wisdom": wisdom,
    }))
}

/// List offered and collected community fruit with the current balance.
pub async fn get_market(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let garden = state.garden.lock().await;
    Json(serde_json::json!({
        "balance": garden.balance(),
        "available": garden.market(),
        "collected": garden.collected(),
    }))
}

/// Headline numbers for the dashboard.
pub async fn get_stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.garden.lock().await.stats())
}

// ---------------------------------------------------------------------------
// Trees
// ---------------------------------------------------------------------------

/// Harvest a fruiting tree.
///
/// 404 when the tree does not exist, 409 when it is not fruiting.
pub async fn harvest_tree(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, ObserverError> {
    let tree_id = TreeId(parse_uuid(&id_str)?);
    let now_ms = state.now_ms();

    let mut garden = state.garden.lock().await;
    if garden.tree(tree_id).is_none() {
        return Err(ObserverError::NotFound(format!("tree {tree_id}")));
    }
    let outcome = garden
        .harvest(tree_id, now_ms)?
        .ok_or_else(|| ObserverError::Conflict(format!("tree {tree_id} is not fruiting")))?;

    state.mirror.trees(vec![outcome.tree.clone()]);
    state.persist_stats(&garden);
    Ok(Json(outcome))
}

/// Set or clear a tree's custom name.
pub async fn rename_tree(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
    Json(body): Json<RenameRequest>,
) -> Result<impl IntoResponse, ObserverError> {
    let tree_id = TreeId(parse_uuid(&id_str)?);

    let mut garden = state.garden.lock().await;
    let tree = garden
        .rename(tree_id, &body.name)
        .ok_or_else(|| ObserverError::NotFound(format!("tree {tree_id}")))?;

    state.mirror.trees(vec![tree.clone()]);
    drop(garden);
    Ok(Json(tree))
}

// ---------------------------------------------------------------------------
// Market
// ---------------------------------------------------------------------------

/// Buy a community fruit, planting a friendship tree.
pub async fn trade_fruit(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, ObserverError> {
    let fruit_id = FruitId(parse_uuid(&id_str)?);
    let now_ms = state.now_ms();

    let mut garden = state.garden.lock().await;
    let receipt = garden.trade(fruit_id, now_ms)?;

    state.mirror.trees(vec![receipt.tree.clone()]);
    state.persist_stats(&garden);
    Ok(Json(serde_json::json!({
        "fruit": receipt.fruit,
        "tree": receipt.tree,
        "balance": receipt.balance,
    })))
}

// ---------------------------------------------------------------------------
// Reflections
// ---------------------------------------------------------------------------

/// Distill a conversation into wisdom and plant a tree for it.
///
/// Extraction runs before the garden lock is taken; if it fails nothing is
/// created.
pub async fn create_reflection(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ReflectionRequest>,
) -> Result<impl IntoResponse, ObserverError> {
    let extractor = state
        .extractor
        .as_ref()
        .ok_or(ObserverError::ExtractorUnavailable)?;
    let extracted = extractor.extract(&body.messages).await?;

    let now_ms = state.now_ms();
    let mut garden = state.garden.lock().await;
    let outcome = garden.plant_reflection(extracted, now_ms);

    state.mirror.wisdom(outcome.wisdom.clone());
    state.mirror.trees(vec![outcome.tree.clone()]);
    drop(garden);
    Ok(Json(outcome))
}

// ---------------------------------------------------------------------------
// Entitlements
// ---------------------------------------------------------------------------

/// Record a species purchase.
pub async fn grant_species(
    State(state): State<Arc<AppState>>,
    Path(species_str): Path<String>,
) -> Result<impl IntoResponse, ObserverError> {
    let species: SpeciesId = species_str
        .parse()
        .map_err(|e| ObserverError::BadRequest(format!("{e}")))?;

    let mut garden = state.garden.lock().await;
    let granted = garden.grant_species(species);
    if granted {
        state.persist_stats(&garden);
    }
    Ok(Json(serde_json::json!({
        "species": species,
        "granted": granted,
    })))
}

/// Turn the speed boost on or off.
pub async fn set_speed_boost(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SpeedBoostRequest>,
) -> impl IntoResponse {
    let mut garden = state.garden.lock().await;
    garden.set_speed_boost(body.enabled);
    state.persist_stats(&garden);
    Json(serde_json::json!({
        "has_speed_boost": garden.user().has_speed_boost,
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_uuid(s: &str) -> Result<Uuid, ObserverError> {
    s.parse::<Uuid>()
        .map_err(|e| ObserverError::InvalidUuid(format!("{s}: {e}")))
}
