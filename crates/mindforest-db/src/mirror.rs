//! Background persistence through a single ordered writer.
//!
//! Garden actions commit in memory first and then queue a copy of the
//! changed state on a [`Mirror`]. One writer task drains the queue and
//! applies the writes one at a time, in the order they were queued. Callers
//! queue while still holding the garden lock, so the database sees changes
//! to a row in the same order the garden made them. A failed write is
//! logged with `warn!` and never rolls back or blocks the garden.
//!
//! ```text
//! handler / tick callback --> Mirror::trees ---+
//!                             Mirror::stats ---+--> mpsc queue --> writer --> GardenStore
//!                             Mirror::flush ---+         (one write at a time)
//! ```

use std::future::Future;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use mindforest_core::GardenSnapshot;
use mindforest_types::{CommunityFruit, Tree, UserId, UserState, Wisdom};

use crate::error::DbError;
use crate::garden_store::GardenStore;
use crate::postgres::PostgresPool;
use crate::rows::UserStatsRow;

// ---------------------------------------------------------------------------
// Queue
// ---------------------------------------------------------------------------

/// One queued database write.
#[derive(Debug)]
pub(crate) enum Write {
    Trees(Vec<Tree>),
    Wisdom(Wisdom),
    Stats(UserStatsRow),
    Snapshot(GardenSnapshot),
}

impl Write {
    const fn kind(&self) -> &'static str {
        match self {
            Self::Trees(_) => "trees",
            Self::Wisdom(_) => "wisdom",
            Self::Stats(_) => "user_stats",
            Self::Snapshot(_) => "snapshot",
        }
    }
}

#[derive(Debug)]
enum Command {
    Write(Write),
    /// Acknowledged once every earlier write has been applied.
    Flush(oneshot::Sender<()>),
}

/// Where the writer applies queued writes.
pub(crate) trait Sink: Send + Sync + 'static {
    fn apply(
        &self,
        user_id: UserId,
        write: Write,
    ) -> impl Future<Output = Result<(), DbError>> + Send;
}

impl Sink for PostgresPool {
    fn apply(
        &self,
        user_id: UserId,
        write: Write,
    ) -> impl Future<Output = Result<(), DbError>> + Send {
        let pool = self.clone();
        async move {
            let store = GardenStore::new(pool.pool());
            match write {
                Write::Trees(trees) => store.upsert_trees(user_id, &trees).await,
                Write::Wisdom(wisdom) => store.insert_wisdom(user_id, &wisdom).await,
                Write::Stats(row) => store.upsert_user_stats(user_id, &row).await,
                Write::Snapshot(snapshot) => store.save_snapshot(user_id, &snapshot).await,
            }
        }
    }
}

async fn drain<S: Sink>(sink: S, user_id: UserId, mut rx: mpsc::UnboundedReceiver<Command>) {
    while let Some(command) = rx.recv().await {
        match command {
            Command::Write(write) => {
                let what = write.kind();
                if let Err(e) = sink.apply(user_id, write).await {
                    tracing::warn!(
                        user_id = %user_id,
                        what,
                        error = %e,
                        "Persistence write failed"
                    );
                }
            }
            Command::Flush(ack) => {
                if ack.send(()).is_err() {
                    tracing::debug!(user_id = %user_id, "Flush requester went away");
                }
            }
        }
    }
    tracing::debug!(user_id = %user_id, "Persistence writer stopped");
}

// ---------------------------------------------------------------------------
// Mirror
// ---------------------------------------------------------------------------

/// Queue of background writes for one user's garden.
///
/// Clones share the same writer. Every write method returns whether the
/// write was queued: `false` when persistence is disabled, there is
/// nothing to write, or the writer has stopped.
#[derive(Debug, Clone)]
pub struct Mirror {
    tx: Option<mpsc::UnboundedSender<Command>>,
    user_id: UserId,
}

impl Mirror {
    /// Mirror writes for `user_id` into `pool`.
    ///
    /// Spawns the writer task, so this must run inside a tokio runtime.
    pub fn new(pool: PostgresPool, user_id: UserId) -> Self {
        Self::with_sink(pool, user_id).0
    }

    /// A mirror that drops every write (in-memory only sessions).
    pub const fn disabled(user_id: UserId) -> Self {
        Self { tx: None, user_id }
    }

    pub(crate) fn with_sink<S: Sink>(sink: S, user_id: UserId) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let writer = tokio::spawn(drain(sink, user_id, rx));
        (
            Self {
                tx: Some(tx),
                user_id,
            },
            writer,
        )
    }

    /// Whether writes reach a database.
    pub const fn is_enabled(&self) -> bool {
        self.tx.is_some()
    }

    /// The user whose rows are written.
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Upsert changed trees.
    pub fn trees(&self, trees: Vec<Tree>) -> bool {
        if trees.is_empty() {
            return false;
        }
        self.queue(Write::Trees(trees))
    }

    /// Insert a new wisdom record.
    pub fn wisdom(&self, wisdom: Wisdom) -> bool {
        self.queue(Write::Wisdom(wisdom))
    }

    /// Replace the stats row.
    pub fn stats(&self, inventory: u32, collected: &[CommunityFruit], user: &UserState) -> bool {
        let row = UserStatsRow::from_stats(inventory, collected, user);
        self.queue(Write::Stats(row))
    }

    /// Write a whole garden.
    pub fn snapshot(&self, snapshot: GardenSnapshot) -> bool {
        self.queue(Write::Snapshot(snapshot))
    }

    /// Wait until every write queued before this call has been applied.
    ///
    /// Returns at once for a disabled mirror or a stopped writer.
    pub async fn flush(&self) {
        let Some(tx) = &self.tx else {
            return;
        };
        let (ack, done) = oneshot::channel();
        if tx.send(Command::Flush(ack)).is_err() {
            return;
        }
        if done.await.is_err() {
            tracing::warn!(user_id = %self.user_id, "Persistence writer stopped before flush");
        }
    }

    fn queue(&self, write: Write) -> bool {
        let Some(tx) = &self.tx else {
            return false;
        };
        let what = write.kind();
        if tx.send(Command::Write(write)).is_err() {
            tracing::warn!(
                user_id = %self.user_id,
                what,
                "Persistence writer stopped, write dropped"
            );
            return false;
        }
        true
    }
}
