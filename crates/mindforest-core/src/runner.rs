//! The growth tick loop.
//!
//! [`run_ticks`] wakes every `tick_interval`, locks the shared [`Garden`],
//! advances it to the clock's current time, and hands the report to a
//! [`TickCallback`] while the lock is still held. The loop ends when the
//! shutdown signal flips to `true` or its sender is dropped.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio::time::MissedTickBehavior;
use tracing::info;

use mindforest_growth::TickReport;

use crate::clock::Clock;
use crate::garden::Garden;

/// Callback invoked after every tick.
///
/// Runs with the garden lock held, so implementations should only spawn
/// work (such as persistence writes) and return.
pub trait TickCallback: Send {
    /// Called after a tick completes.
    fn on_tick(&mut self, report: &TickReport, garden: &Garden);
}

/// A no-op tick callback for testing.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _report: &TickReport, _garden: &Garden) {}
}

/// Totals for one run of the loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Ticks executed.
    pub ticks: u64,
    /// Stage transitions across all ticks.
    pub transitions: u64,
}

/// Drive the garden until `shutdown` fires.
pub async fn run_ticks(
    garden: Arc<Mutex<Garden>>,
    clock: Arc<dyn Clock>,
    tick_interval: Duration,
    mut shutdown: watch::Receiver<bool>,
    callback: &mut dyn TickCallback,
) -> RunSummary {
    let mut summary = RunSummary::default();
    let mut interval = tokio::time::interval(tick_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(
        tick_interval_ms = u64::try_from(tick_interval.as_millis()).unwrap_or(u64::MAX),
        "Growth loop starting"
    );

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
                continue;
            }
        }

        let mut garden = garden.lock().await;
        let report = garden.tick(clock.now_ms());
        callback.on_tick(&report, &garden);
        drop(garden);

        summary.ticks = summary.ticks.saturating_add(1);
        summary.transitions = summary
            .transitions
            .saturating_add(u64::try_from(report.transitions.len()).unwrap_or(u64::MAX));
    }

    info!(
        ticks = summary.ticks,
        transitions = summary.transitions,
        "Growth loop stopped"
    );
    summary
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use mindforest_growth::GrowthSettings;
    use mindforest_ledger::starter_fruits;
    use mindforest_types::{ExtractedWisdom, Stage};

    use super::*;
    use crate::clock::ManualClock;

    struct Recorder(Vec<usize>);

    impl TickCallback for Recorder {
        fn on_tick(&mut self, report: &TickReport, _garden: &Garden) {
            self.0.push(report.transitions.len());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn loop_ticks_until_shutdown() {
        let mut garden = Garden::new(GrowthSettings::default(), starter_fruits());
        let tree_id = garden
            .plant_reflection(
                ExtractedWisdom {
                    title: "t".to_owned(),
                    situation: "s".to_owned(),
                    insight: "i".to_owned(),
                },
                0,
            )
            .tree
            .id;
        let garden = Arc::new(Mutex::new(garden));
        let clock: Arc<dyn Clock> = Arc::new(ManualClock::new(61_000));
        let (tx, rx) = watch::channel(false);

        let loop_garden = Arc::clone(&garden);
        let handle = tokio::spawn(async move {
            let mut recorder = Recorder(Vec::new());
            let summary = run_ticks(
                loop_garden,
                clock,
                Duration::from_millis(2_000),
                rx,
                &mut recorder,
            )
            .await;
            (summary, recorder.0)
        });

        tokio::time::sleep(Duration::from_millis(5_000)).await;
        tx.send(true).unwrap();
        let (summary, per_tick) = handle.await.unwrap();

        assert!(summary.ticks >= 2);
        assert_eq!(summary.transitions, 1);
        assert_eq!(per_tick.first(), Some(&1));
        let stage = garden.lock().await.tree(tree_id).map(|t| t.stage);
        assert_eq!(stage, Some(Stage::Growing));
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_sender_stops_the_loop() {
        let garden = Arc::new(Mutex::new(Garden::new(
            GrowthSettings::default(),
            starter_fruits(),
        )));
        let (tx, rx) = watch::channel(false);
        drop(tx);
        let summary = run_ticks(
            garden,
            Arc::new(ManualClock::new(0)),
            Duration::from_millis(10),
            rx,
            &mut NoOpCallback,
        )
        .await;
        // The first interval tick fires immediately, before the closed
        // channel is noticed, or not at all.
        assert!(summary.ticks <= 1);
    }
}
