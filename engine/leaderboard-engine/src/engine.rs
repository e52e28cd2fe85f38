//! Ranking and rank-diff computation

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

use crate::aggregation::group_by_team;
use crate::ranking::rank_order;
use crate::sheet::SheetData;
use crate::types::{LeaderboardEntry, RankSnapshot, SubmissionRow, TeamStat};

/// Result of one leaderboard computation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardUpdate {
    /// Entries sorted by rank, ascending
    pub entries: Vec<LeaderboardEntry>,

    /// Teams whose rank differs from the previous snapshot
    pub changed_team_ids: BTreeSet<String>,

    /// Snapshot to pass into the next computation
    pub new_ranks: RankSnapshot,
}

impl LeaderboardUpdate {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, team_id: &str) -> Option<&LeaderboardEntry> {
        self.entries.iter().find(|entry| entry.team_id() == team_id)
    }
}

/// Rank every team in `rows` and diff the ranks against `previous`.
///
/// `previous` is only used to fill in `previous_rank` and detect changes; it
/// never influences the order. Nothing is flagged as changed when `previous`
/// is empty, and teams absent from `previous` are never flagged.
pub fn compute_leaderboard(rows: &[SubmissionRow], previous: &RankSnapshot) -> LeaderboardUpdate {
    let mut standings: Vec<TeamStat> = group_by_team(rows)
        .into_iter()
        .map(|(team_id, team_rows)| {
            TeamStat::aggregate(team_id, team_rows.iter().copied())
        })
        .collect();
    standings.sort_by(rank_order);

    let first_computation = previous.is_empty();
    let mut update = LeaderboardUpdate::default();

    for (index, stats) in standings.into_iter().enumerate() {
        let rank = index + 1;
        let prior = previous.get(&stats.team_id);

        if !first_computation && prior.is_some_and(|prior_rank| prior_rank != rank) {
            update.changed_team_ids.insert(stats.team_id.clone());
        }

        update.new_ranks.insert(stats.team_id.clone(), rank);
        update.entries.push(LeaderboardEntry {
            stats,
            rank,
            previous_rank: prior.unwrap_or(rank),
        });
    }

    debug!(
        "Computed leaderboard: {} rows, {} teams, {} rank changes",
        rows.len(),
        update.entries.len(),
        update.changed_team_ids.len()
    );

    update
}

/// Decode the rows of a fetched sheet and rank them
pub fn compute_from_sheet(sheet: &SheetData, previous: &RankSnapshot) -> LeaderboardUpdate {
    compute_leaderboard(&sheet.submission_rows(), previous)
}
