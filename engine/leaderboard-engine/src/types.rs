use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::time::parse_submission_time;

/// Review status of a submission, as written in the sheet's `Status` column
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubmissionStatus {
    NotReviewed,
    InReview,
    Incorrect,
    Correct,
    /// Any other cell content, kept verbatim (after trimming)
    Unrecognized(String),
}

impl SubmissionStatus {
    /// Parse a status cell. Surrounding whitespace is ignored; matching is case-sensitive.
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "Not Reviewed" => SubmissionStatus::NotReviewed,
            "In Review" => SubmissionStatus::InReview,
            "Incorrect" => SubmissionStatus::Incorrect,
            "Correct" => SubmissionStatus::Correct,
            other => SubmissionStatus::Unrecognized(other.to_string()),
        }
    }

    pub fn is_correct(&self) -> bool {
        matches!(self, SubmissionStatus::Correct)
    }

    /// Label as it appears in the sheet
    pub fn as_str(&self) -> &str {
        match self {
            SubmissionStatus::NotReviewed => "Not Reviewed",
            SubmissionStatus::InReview => "In Review",
            SubmissionStatus::Incorrect => "Incorrect",
            SubmissionStatus::Correct => "Correct",
            SubmissionStatus::Unrecognized(raw) => raw,
        }
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One submission row from the sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRow {
    pub team_id: String,
    pub problem: String,
    /// Raw `Time` cell; parsed lazily because the sheet stores text or serial numbers
    pub time: String,
    pub status: SubmissionStatus,
}

impl SubmissionRow {
    pub fn new(
        team_id: impl Into<String>,
        problem: impl Into<String>,
        time: impl Into<String>,
        status: SubmissionStatus,
    ) -> Self {
        Self {
            team_id: team_id.into(),
            problem: problem.into(),
            time: time.into(),
            status,
        }
    }

    /// Parsed submission time, `None` when the cell is not a recognizable timestamp
    pub fn submitted_at(&self) -> Option<DateTime<Utc>> {
        parse_submission_time(&self.time)
    }
}

/// Aggregated standing of one team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamStat {
    pub team_id: String,
    /// Distinct problems with at least one correct submission
    pub problems_solved: usize,
    /// Problem of the most recent correct submission, empty if none
    pub last_problem: String,
    pub last_submission_time: Option<DateTime<Utc>>,
}

impl TeamStat {
    /// Stats for a team with no correct submissions
    pub fn empty(team_id: impl Into<String>) -> Self {
        Self {
            team_id: team_id.into(),
            problems_solved: 0,
            last_problem: String::new(),
            last_submission_time: None,
        }
    }
}

/// A ranked team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    #[serde(flatten)]
    pub stats: TeamStat,
    /// 1-based position
    pub rank: usize,
    /// Rank from the previous computation, or `rank` when the team is new
    pub previous_rank: usize,
}

impl LeaderboardEntry {
    pub fn team_id(&self) -> &str {
        &self.stats.team_id
    }

    pub fn movement(&self) -> RankMovement {
        RankMovement::between(self.previous_rank, self.rank)
    }

    pub fn medal(&self) -> Option<MedalTier> {
        MedalTier::for_rank(self.rank)
    }
}

/// Direction a team moved between two computations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RankMovement {
    Improved,
    Declined,
    Unchanged,
}

impl RankMovement {
    pub fn between(previous_rank: usize, rank: usize) -> Self {
        use std::cmp::Ordering;
        match previous_rank.cmp(&rank) {
            Ordering::Greater => RankMovement::Improved,
            Ordering::Less => RankMovement::Declined,
            Ordering::Equal => RankMovement::Unchanged,
        }
    }
}

/// Podium placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MedalTier {
    Gold,
    Silver,
    Bronze,
}

impl MedalTier {
    pub fn for_rank(rank: usize) -> Option<Self> {
        match rank {
            1 => Some(MedalTier::Gold),
            2 => Some(MedalTier::Silver),
            3 => Some(MedalTier::Bronze),
            _ => None,
        }
    }
}

/// Team -> rank mapping produced by one computation and consumed by the next
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RankSnapshot {
    ranks: HashMap<String, usize>,
}

impl RankSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, team_id: &str) -> Option<usize> {
        self.ranks.get(team_id).copied()
    }

    pub fn insert(&mut self, team_id: impl Into<String>, rank: usize) {
        self.ranks.insert(team_id.into(), rank);
    }

    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.ranks.iter().map(|(team, rank)| (team.as_str(), *rank))
    }
}

impl<S: Into<String>> FromIterator<(S, usize)> for RankSnapshot {
    fn from_iter<I: IntoIterator<Item = (S, usize)>>(iter: I) -> Self {
        Self {
            ranks: iter
                .into_iter()
                .map(|(team, rank)| (team.into(), rank))
                .collect(),
        }
    }
}
