//! Garden persistence keyed by user id.
//!
//! Mirrors the in-memory garden into three tables: `trees` (upserted in
//! batches), `wisdom` (insert-once), and `user_stats` (one row per user).

use sqlx::PgPool;
use sqlx::types::Json;

use mindforest_core::GardenSnapshot;
use mindforest_species::{BASELINE_UNLOCKED, SpeciesCatalog};
use mindforest_types::{Tree, UserId, Wisdom};

use crate::error::DbError;
use crate::rows::{TreeRow, UserStats, UserStatsRow, WisdomRow};

/// Operations on the `trees`, `wisdom` and `user_stats` tables.
pub struct GardenStore<'a> {
    pool: &'a PgPool,
}

impl<'a> GardenStore<'a> {
    /// Create a new garden store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Trees
    // =========================================================================

    /// Insert or update every tree in one statement.
    ///
    /// The planting-time columns (`anchor_*`, `planted_at_ms`, `species`)
    /// are written once and never overwritten. A row whose stored stage
    /// started later than the incoming one is left alone, so a stale copy
    /// of a tree never rolls it back.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the upsert fails.
    pub async fn upsert_trees(&self, user_id: UserId, trees: &[Tree]) -> Result<(), DbError> {
        if trees.is_empty() {
            return Ok(());
        }

        let len = trees.len();
        let mut ids = Vec::with_capacity(len);
        let mut anchor_kinds = Vec::with_capacity(len);
        let mut anchor_ids = Vec::with_capacity(len);
        let mut stages = Vec::with_capacity(len);
        let mut planted = Vec::with_capacity(len);
        let mut stage_started = Vec::with_capacity(len);
        let mut watered = Vec::with_capacity(len);
        let mut species = Vec::with_capacity(len);
        let mut produced = Vec::with_capacity(len);
        let mut names: Vec<Option<String>> = Vec::with_capacity(len);

        for row in trees.iter().map(TreeRow::from_tree) {
            ids.push(row.id);
            anchor_kinds.push(row.anchor_kind);
            anchor_ids.push(row.anchor_id);
            stages.push(row.stage);
            planted.push(row.planted_at_ms);
            stage_started.push(row.stage_started_at_ms);
            watered.push(row.last_watered_at_ms);
            species.push(row.species);
            produced.push(row.has_produced);
            names.push(row.custom_name);
        }

        sqlx::query(
            r"INSERT INTO trees (user_id, id, anchor_kind, anchor_id, stage, planted_at_ms,
                                 stage_started_at_ms, last_watered_at_ms, species,
                                 has_produced, custom_name)
              SELECT $1, * FROM UNNEST($2::UUID[], $3::TEXT[], $4::UUID[], $5::TEXT[],
                                       $6::BIGINT[], $7::BIGINT[], $8::BIGINT[], $9::TEXT[],
                                       $10::BOOLEAN[], $11::TEXT[])
              ON CONFLICT (user_id, id) DO UPDATE SET
                stage = EXCLUDED.stage,
                stage_started_at_ms = EXCLUDED.stage_started_at_ms,
                last_watered_at_ms = EXCLUDED.last_watered_at_ms,
                has_produced = EXCLUDED.has_produced,
                custom_name = EXCLUDED.custom_name
              WHERE trees.stage_started_at_ms <= EXCLUDED.stage_started_at_ms",
        )
        .bind(user_id.into_inner())
        .bind(&ids)
        .bind(&anchor_kinds)
        .bind(&anchor_ids)
        .bind(&stages)
        .bind(&planted)
        .bind(&stage_started)
        .bind(&watered)
        .bind(&species)
        .bind(&produced)
        .bind(&names)
        .execute(self.pool)
        .await?;

        tracing::debug!(user_id = %user_id, count = len, "Upserted trees");
        Ok(())
    }

    /// Fetch a user's trees in planting order.
    ///
    /// Species definitions are re-joined from `catalog`. Rows that no longer
    /// map onto a tree are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn fetch_trees(
        &self,
        user_id: UserId,
        catalog: &SpeciesCatalog,
    ) -> Result<Vec<Tree>, DbError> {
        let rows = sqlx::query_as::<_, TreeRow>(
            r"SELECT id, anchor_kind, anchor_id, stage, planted_at_ms, stage_started_at_ms,
                     last_watered_at_ms, species, has_produced, custom_name
              FROM trees
              WHERE user_id = $1
              ORDER BY planted_at_ms ASC, created_at ASC",
        )
        .bind(user_id.into_inner())
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let id = row.id;
                row.into_tree(catalog)
                    .inspect_err(|e| {
                        tracing::warn!(tree_id = %id, error = %e, "Skipping stored tree");
                    })
                    .ok()
            })
            .collect())
    }

    // =========================================================================
    // Wisdom
    // =========================================================================

    /// Insert a wisdom record. Records are never edited, so a repeated
    /// insert is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the insert fails.
    pub async fn insert_wisdom(&self, user_id: UserId, wisdom: &Wisdom) -> Result<(), DbError> {
        let row = WisdomRow::from(wisdom);
        sqlx::query(
            r"INSERT INTO wisdom (user_id, id, title, situation, insight, created_on)
              VALUES ($1, $2, $3, $4, $5, $6)
              ON CONFLICT (user_id, id) DO NOTHING",
        )
        .bind(user_id.into_inner())
        .bind(row.id)
        .bind(&row.title)
        .bind(&row.situation)
        .bind(&row.insight)
        .bind(row.created_on)
        .execute(self.pool)
        .await?;

        tracing::debug!(user_id = %user_id, wisdom_id = %wisdom.id, "Inserted wisdom");
        Ok(())
    }

    /// Fetch a user's wisdom records, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn fetch_wisdom(&self, user_id: UserId) -> Result<Vec<Wisdom>, DbError> {
        let rows = sqlx::query_as::<_, WisdomRow>(
            r"SELECT id, title, situation, insight, created_on
              FROM wisdom
              WHERE user_id = $1
              ORDER BY created_at ASC",
        )
        .bind(user_id.into_inner())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Wisdom::from).collect())
    }

    // =========================================================================
    // User stats
    // =========================================================================

    /// Fetch a user's stats row, if one exists.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn fetch_user_stats(
        &self,
        user_id: UserId,
    ) -> Result<Option<UserStatsRow>, DbError> {
        let row = sqlx::query_as::<_, UserStatsRow>(
            r"SELECT inventory, collected, completed_trades, unlocked_species,
                     purchased_species, has_speed_boost, my_collection
              FROM user_stats
              WHERE user_id = $1",
        )
        .bind(user_id.into_inner())
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    /// Insert or replace a user's stats row.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the upsert fails.
    pub async fn upsert_user_stats(
        &self,
        user_id: UserId,
        row: &UserStatsRow,
    ) -> Result<(), DbError> {
        sqlx::query(
            r"INSERT INTO user_stats (user_id, inventory, collected, completed_trades,
                                      unlocked_species, purchased_species, has_speed_boost,
                                      my_collection, updated_at)
              VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW())
              ON CONFLICT (user_id) DO UPDATE SET
                inventory = EXCLUDED.inventory,
                collected = EXCLUDED.collected,
                completed_trades = EXCLUDED.completed_trades,
                unlocked_species = EXCLUDED.unlocked_species,
                purchased_species = EXCLUDED.purchased_species,
                has_speed_boost = EXCLUDED.has_speed_boost,
                my_collection = EXCLUDED.my_collection,
                updated_at = NOW()",
        )
        .bind(user_id.into_inner())
        .bind(row.inventory)
        .bind(row.collected)
        .bind(row.completed_trades)
        .bind(&row.unlocked_species)
        .bind(&row.purchased_species)
        .bind(row.has_speed_boost)
        .bind(Json(&row.my_collection.0))
        .execute(self.pool)
        .await?;

        tracing::debug!(user_id = %user_id, inventory = row.inventory, "Upserted user stats");
        Ok(())
    }

    /// Return the user's stats row, creating the default one (baseline
    /// species unlocked, nothing else) if it is missing.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if a query fails.
    pub async fn ensure_user_stats(&self, user_id: UserId) -> Result<UserStatsRow, DbError> {
        let fresh = UserStatsRow::new_user(BASELINE_UNLOCKED);
        sqlx::query(
            r"INSERT INTO user_stats (user_id, unlocked_species)
              VALUES ($1, $2)
              ON CONFLICT (user_id) DO NOTHING",
        )
        .bind(user_id.into_inner())
        .bind(&fresh.unlocked_species)
        .execute(self.pool)
        .await?;

        Ok(self.fetch_user_stats(user_id).await?.unwrap_or(fresh))
    }

    // =========================================================================
    // Whole garden
    // =========================================================================

    /// Load everything needed to restore a user's garden.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a query fails or the stats row is corrupt.
    pub async fn load_snapshot(
        &self,
        user_id: UserId,
        catalog: &SpeciesCatalog,
    ) -> Result<GardenSnapshot, DbError> {
        let UserStats {
            inventory,
            collected,
            user,
        } = self.ensure_user_stats(user_id).await?.into_stats()?;
        let trees = self.fetch_trees(user_id, catalog).await?;
        let wisdom = self.fetch_wisdom(user_id).await?;

        tracing::info!(
            user_id = %user_id,
            trees = trees.len(),
            wisdom = wisdom.len(),
            inventory,
            "Loaded garden from PostgreSQL"
        );

        Ok(GardenSnapshot {
            trees,
            wisdom,
            inventory,
            collected,
            user,
        })
    }

    /// Write a full garden snapshot.
    ///
    /// Every write is an idempotent upsert, so a failed save can simply be
    /// repeated.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] on the first failed write.
    pub async fn save_snapshot(
        &self,
        user_id: UserId,
        snapshot: &GardenSnapshot,
    ) -> Result<(), DbError> {
        for wisdom in &snapshot.wisdom {
            self.insert_wisdom(user_id, wisdom).await?;
        }
        self.upsert_trees(user_id, &snapshot.trees).await?;
        let stats =
            UserStatsRow::from_stats(snapshot.inventory, &snapshot.collected, &snapshot.user);
        self.upsert_user_stats(user_id, &stats).await
    }
}
