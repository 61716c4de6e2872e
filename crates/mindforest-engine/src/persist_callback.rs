//! Tick callback that mirrors grown trees to the database.

use mindforest_core::{Garden, TickCallback};
use mindforest_db::Mirror;
use mindforest_growth::TickReport;
use mindforest_types::Tree;
use tracing::debug;

/// Callback that hands every tree a tick touched to the [`Mirror`].
pub struct PersistCallback {
    mirror: Mirror,
}

impl PersistCallback {
    /// Create a callback writing through `mirror`.
    pub const fn new(mirror: Mirror) -> Self {
        Self { mirror }
    }
}

impl TickCallback for PersistCallback {
    fn on_tick(&mut self, report: &TickReport, garden: &Garden) {
        if !report.changed() {
            return;
        }
        let trees = touched_trees(report, garden);
        debug!(count = trees.len(), "Mirroring grown trees");
        self.mirror.trees(trees);
    }
}

/// Current state of every tree the tick changed, in report order.
pub fn touched_trees(report: &TickReport, garden: &Garden) -> Vec<Tree> {
    report
        .touched()
        .filter_map(|id| garden.tree(id).cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use mindforest_growth::GrowthSettings;
    use mindforest_ledger::starter_fruits;
    use mindforest_types::{ExtractedWisdom, Stage, UserId};

    use super::*;

    fn reflection(title: &str) -> ExtractedWisdom {
        ExtractedWisdom {
            title: title.to_owned(),
            situation: "s".to_owned(),
            insight: "i".to_owned(),
        }
    }

    #[test]
    fn only_changed_trees_are_collected() {
        let mut garden = Garden::new(GrowthSettings::default(), starter_fruits());
        let early = garden.plant_reflection(reflection("early"), 0).tree.id;
        let late = garden.plant_reflection(reflection("late"), 50_000).tree.id;

        let report = garden.tick(61_000);
        let trees = touched_trees(&report, &garden);

        assert_eq!(trees.len(), 1);
        assert_eq!(trees.first().map(|t| t.id), Some(early));
        assert_eq!(trees.first().map(|t| t.stage), Some(Stage::Growing));
        assert!(garden.tree(late).is_some_and(|t| t.stage == Stage::Sapling));
    }

    #[tokio::test]
    async fn quiet_ticks_write_nothing() {
        let mut garden = Garden::new(GrowthSettings::default(), starter_fruits());
        garden.plant_reflection(reflection("x"), 0);
        let report = garden.tick(1_000);
        assert!(!report.changed());
        assert!(touched_trees(&report, &garden).is_empty());

        let mut callback = PersistCallback::new(Mirror::disabled(UserId::new()));
        callback.on_tick(&report, &garden);
    }
}
