//! # LeaderboardEngine
//!
//! Turns the flat table of competition submissions into a ranked leaderboard.
//!
//! Every call recomputes the standings from scratch: rows are grouped per team,
//! correct submissions are aggregated into a [`TeamStat`], the stats are put into
//! a strict total order, and the resulting ranks are compared against the
//! caller's previous [`RankSnapshot`] to find the teams whose position changed.
//! The engine holds no state of its own; the caller keeps the snapshot between
//! polls.

pub mod aggregation;
pub mod engine;
pub mod error;
pub mod ranking;
pub mod sheet;
pub mod time;
pub mod types;

#[cfg(test)]
mod tests;

pub use aggregation::group_by_team;
pub use engine::{compute_from_sheet, compute_leaderboard, LeaderboardUpdate};
pub use error::RowError;
pub use ranking::{compare_team_ids, rank_order};
pub use sheet::{
    SheetData, PROBLEM_COLUMN, REQUIRED_COLUMNS, STATUS_COLUMN, TEAM_ID_COLUMN, TIME_COLUMN,
};
pub use time::{format_submission_time, parse_submission_time};
pub use types::{
    LeaderboardEntry, MedalTier, RankMovement, RankSnapshot, SubmissionRow, SubmissionStatus,
    TeamStat,
};

/// Current version of the leaderboard engine
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
