//! Planting eligibility: whether a user may plant a given species.
//!
//! Eligibility is a pure function of the species' [`UnlockCondition`] and
//! the user's [`UserState`]. An ineligible request is never an error; the
//! caller falls back to the default species.

use mindforest_types::{SpeciesDefinition, SpeciesId, UnlockCondition, UserState};

use crate::catalog::SpeciesCatalog;

/// Whether `user` may plant `species` from `catalog`.
pub fn can_plant(catalog: &SpeciesCatalog, species: SpeciesId, user: &UserState) -> bool {
    is_unlocked(catalog.lookup(species), user)
}

/// Whether a specific definition is unlocked for `user`.
///
/// - `Free`: always.
/// - `Purchase`: bought, or part of the baseline-unlocked set.
/// - `Social`: at least one completed trade.
/// - `Achievement`: only through the baseline-unlocked set.
pub fn is_unlocked(definition: &SpeciesDefinition, user: &UserState) -> bool {
    match definition.unlock_condition {
        UnlockCondition::Free => true,
        UnlockCondition::Purchase => {
            user.purchased.contains(&definition.id)
                || user.baseline_unlocked.contains(&definition.id)
        }
        UnlockCondition::Social => user.completed_trades > 0,
        UnlockCondition::Achievement => user.baseline_unlocked.contains(&definition.id),
    }
}

/// All species `user` may currently plant, in catalog order.
pub fn plantable_species(catalog: &SpeciesCatalog, user: &UserState) -> Vec<SpeciesId> {
    catalog
        .iter()
        .filter(|def| is_unlocked(def, user))
        .map(|def| def.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use mindforest_types::Rarity;

    use super::*;
    use crate::catalog::BASELINE_UNLOCKED;

    fn fresh_user() -> UserState {
        UserState::with_baseline(BASELINE_UNLOCKED)
    }

    #[test]
    fn oak_is_always_plantable() {
        let catalog = SpeciesCatalog::standard();
        let mut veteran = fresh_user();
        veteran.completed_trades = 12;
        veteran.has_speed_boost = true;
        for user in [UserState::default(), fresh_user(), veteran] {
            assert!(can_plant(catalog, SpeciesId::Oak, &user));
        }
    }

    #[test]
    fn purchase_species_need_a_purchase() {
        let catalog = SpeciesCatalog::standard();
        let mut user = fresh_user();
        assert!(!can_plant(catalog, SpeciesId::Lotus, &user));

        user.purchased.insert(SpeciesId::Lotus);
        assert!(can_plant(catalog, SpeciesId::Lotus, &user));
        assert!(!can_plant(catalog, SpeciesId::Redwood, &user));
    }

    #[test]
    fn baseline_unlock_covers_purchase_species() {
        let catalog = SpeciesCatalog::standard();
        let user = UserState::with_baseline([SpeciesId::Olive]);
        assert!(can_plant(catalog, SpeciesId::Olive, &user));
    }

    #[test]
    fn social_species_need_a_completed_trade() {
        let catalog = SpeciesCatalog::standard();
        let mut user = fresh_user();
        assert!(!can_plant(catalog, SpeciesId::Cherry, &user));
        user.completed_trades = 1;
        assert!(can_plant(catalog, SpeciesId::Cherry, &user));
    }

    #[test]
    fn achievement_species_follow_baseline_set() {
        let mut badge = SpeciesCatalog::standard().lookup(SpeciesId::Bonsai).clone();
        badge.unlock_condition = UnlockCondition::Achievement;
        badge.purchase_id = None;
        badge.rarity = Rarity::Epic;

        let mut user = fresh_user();
        user.purchased.insert(SpeciesId::Bonsai);
        assert!(!is_unlocked(&badge, &user));

        user.baseline_unlocked.insert(SpeciesId::Bonsai);
        assert!(is_unlocked(&badge, &user));
    }

    #[test]
    fn fresh_user_can_plant_the_free_species() {
        let catalog = SpeciesCatalog::standard();
        assert_eq!(
            plantable_species(catalog, &fresh_user()),
            vec![
                SpeciesId::Oak,
                SpeciesId::Willow,
                SpeciesId::Pine,
                SpeciesId::Maple,
                SpeciesId::Bamboo,
            ]
        );
    }
}
