//! Leaderboard poller
//!
//! Owns the rank snapshot between ticks. Each tick fetches the sheet, hands the
//! rows and the previous snapshot to the engine, stores the new snapshot, and
//! publishes a [`LeaderboardView`] to subscribers. Teams whose rank changed are
//! highlighted for a fixed window, after which the poller clears the flags on
//! its own schedule.

use chrono::{DateTime, Utc};
use leaderboard_engine::{
    compute_from_sheet, LeaderboardEntry, LeaderboardUpdate, RankMovement, RankSnapshot,
};
use serde::Serialize;
use std::collections::BTreeSet;
use std::future::Future;
use tokio::sync::watch;
use tokio::time::{interval, sleep_until, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::PollConfig;
use crate::error::Result;
use crate::source::RowSource;

/// What the presentation layer sees after each tick
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardView {
    /// Entries sorted by rank
    pub entries: Vec<LeaderboardEntry>,

    /// Teams to flag as "rank changed"; emptied when the highlight window ends
    pub highlighted: BTreeSet<String>,

    /// Time of the last successful refresh
    pub last_updated: Option<DateTime<Utc>>,

    /// Error from the most recent tick, cleared by the next successful one
    pub last_error: Option<String>,

    /// Ticks attempted so far
    pub ticks: u64,
}

impl LeaderboardView {
    pub fn is_highlighted(&self, team_id: &str) -> bool {
        self.highlighted.contains(team_id)
    }
}

pub struct LeaderboardPoller<S> {
    config: PollConfig,
    source: S,
    snapshot: RankSnapshot,
    view: LeaderboardView,
    highlight_deadline: Option<Instant>,
    publisher: watch::Sender<LeaderboardView>,
}

impl<S: RowSource> LeaderboardPoller<S> {
    pub fn new(source: S, config: PollConfig) -> Self {
        let (publisher, _) = watch::channel(LeaderboardView::default());
        Self {
            config,
            source,
            snapshot: RankSnapshot::new(),
            view: LeaderboardView::default(),
            highlight_deadline: None,
            publisher,
        }
    }

    /// Receive every published view
    pub fn subscribe(&self) -> watch::Receiver<LeaderboardView> {
        self.publisher.subscribe()
    }

    pub fn view(&self) -> &LeaderboardView {
        &self.view
    }

    pub fn snapshot(&self) -> &RankSnapshot {
        &self.snapshot
    }

    /// When the current highlight window ends, if one is open
    pub fn highlight_deadline(&self) -> Option<Instant> {
        self.highlight_deadline
    }

    /// Fetch, recompute, and publish once.
    ///
    /// A failed fetch leaves the standings and snapshot untouched; only
    /// `last_error` changes.
    pub async fn tick(&mut self) -> Result<&LeaderboardView> {
        self.view.ticks += 1;

        let sheet = match self.source.fetch().await {
            Ok(sheet) => sheet,
            Err(err) => {
                warn!(
                    "Leaderboard refresh failed, keeping previous standings: {}",
                    err
                );
                self.view.last_error = Some(err.to_string());
                self.publish();
                return Err(err);
            }
        };

        let update = compute_from_sheet(&sheet, &self.snapshot);
        log_changes(&update);

        let LeaderboardUpdate {
            entries,
            changed_team_ids,
            new_ranks,
        } = update;
        info!(
            "Leaderboard refreshed: {} teams, {} rank changes",
            entries.len(),
            changed_team_ids.len()
        );

        self.snapshot = new_ranks;
        self.view.entries = entries;
        self.view.last_updated = Some(Utc::now());
        self.view.last_error = None;

        if !changed_team_ids.is_empty() {
            self.view.highlighted = changed_team_ids;
            self.highlight_deadline = Some(Instant::now() + self.config.highlight_duration());
        }

        self.publish();
        Ok(&self.view)
    }

    /// End the highlight window
    pub fn clear_highlights(&mut self) {
        self.highlight_deadline = None;
        if self.view.highlighted.is_empty() {
            return;
        }

        debug!(
            "Clearing highlight for {} teams",
            self.view.highlighted.len()
        );
        self.view.highlighted.clear();
        self.publish();
    }

    /// Poll until `shutdown` resolves.
    ///
    /// The first tick runs immediately. Ticks never overlap: a slow fetch
    /// delays the next tick instead of stacking up. A tick in progress when
    /// shutdown fires is allowed to finish.
    pub async fn run<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let mut ticker = interval(self.config.poll_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            "Polling {} every {:?}",
            self.source.describe(),
            self.config.poll_interval()
        );

        loop {
            let deadline = self.highlight_deadline;

            tokio::select! {
                _ = &mut shutdown => {
                    info!(
                        "Leaderboard poller stopping after {} ticks",
                        self.view.ticks
                    );
                    break;
                }
                _ = ticker.tick() => {
                    // failures are logged and recorded in the view by `tick`
                    let _ = self.tick().await;
                }
                _ = highlight_expiry(deadline) => {
                    self.clear_highlights();
                }
            }
        }
    }

    fn publish(&self) {
        self.publisher.send_replace(self.view.clone());
    }
}

async fn highlight_expiry(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

fn log_changes(update: &LeaderboardUpdate) {
    let moved = update
        .entries
        .iter()
        .filter(|entry| update.changed_team_ids.contains(entry.team_id()));

    for entry in moved {
        let direction = match entry.movement() {
            RankMovement::Improved => "up",
            RankMovement::Declined => "down",
            RankMovement::Unchanged => "nowhere",
        };
        info!(
            "Team {} moved {} from #{} to #{} ({} solved)",
            entry.team_id(),
            direction,
            entry.previous_rank,
            entry.rank,
            entry.stats.problems_solved
        );
    }
}
