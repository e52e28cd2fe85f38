//! Per-team aggregation of submission rows

use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use tracing::trace;

use crate::types::{SubmissionRow, TeamStat};

/// Group rows by trimmed team id, keeping teams in order of first appearance.
///
/// Rows with an empty team id are dropped.
pub fn group_by_team(rows: &[SubmissionRow]) -> Vec<(&str, Vec<&SubmissionRow>)> {
    let mut index_by_team: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, Vec<&SubmissionRow>)> = Vec::new();

    for row in rows {
        let team_id = row.team_id.trim();
        if team_id.is_empty() {
            trace!(
                "Dropping submission for problem {:?} without a team",
                row.problem
            );
            continue;
        }

        match index_by_team.get(team_id).copied() {
            Some(index) => groups[index].1.push(row),
            None => {
                index_by_team.insert(team_id, groups.len());
                groups.push((team_id, vec![row]));
            }
        }
    }

    groups
}

impl TeamStat {
    /// Aggregate one team's rows.
    ///
    /// Only `Correct` rows count. The most recent correct row is the first one
    /// holding the latest parsed time; an unparseable time sorts as the oldest
    /// possible, so it only wins when no correct row has a readable time, and
    /// then `last_submission_time` stays `None`.
    pub fn aggregate<'a, I>(team_id: impl Into<String>, rows: I) -> Self
    where
        I: IntoIterator<Item = &'a SubmissionRow>,
    {
        let mut solved: HashSet<&str> = HashSet::new();
        let mut latest: Option<(&SubmissionRow, Option<DateTime<Utc>>)> = None;

        for row in rows.into_iter().filter(|row| row.status.is_correct()) {
            solved.insert(row.problem.trim());

            let submitted_at = row.submitted_at();
            let newer = match &latest {
                Some((_, best)) => submitted_at > *best,
                None => true,
            };
            if newer {
                latest = Some((row, submitted_at));
            }
        }

        let mut stats = TeamStat::empty(team_id);
        stats.problems_solved = solved.len();
        if let Some((row, submitted_at)) = latest {
            stats.last_problem = row.problem.trim().to_string();
            stats.last_submission_time = submitted_at;
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SubmissionStatus::{Correct, InReview, Incorrect};
    use chrono::TimeZone;

    fn row(
        team: &str,
        problem: &str,
        time: &str,
        status: crate::SubmissionStatus,
    ) -> SubmissionRow {
        SubmissionRow::new(team, problem, time, status)
    }

    #[test]
    fn test_grouping_preserves_first_appearance() {
        let rows = vec![
            row("7", "A", "", Correct),
            row("3", "A", "", Correct),
            row(" 7 ", "B", "", Incorrect),
            row("", "C", "", Correct),
            row("  ", "C", "", Correct),
        ];

        let groups = group_by_team(&rows);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "7");
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[1].0, "3");
        assert_eq!(groups[1].1.len(), 1);
    }

    #[test]
    fn test_distinct_problems_counted_once() {
        let rows = vec![
            row("1", "A", "2025-03-30 10:00:00", Correct),
            row("1", "A", "2025-03-30 11:00:00", Correct),
            row("1", "B", "2025-03-30 09:00:00", Correct),
        ];

        let stats = TeamStat::aggregate("1", &rows);
        assert_eq!(stats.problems_solved, 2);
        assert_eq!(stats.last_problem, "A");
        assert_eq!(
            stats.last_submission_time,
            Some(Utc.with_ymd_and_hms(2025, 3, 30, 11, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_only_correct_rows_count() {
        let rows = vec![
            row("1", "A", "2025-03-30 10:00:00", Incorrect),
            row("1", "B", "2025-03-30 11:00:00", InReview),
        ];

        let stats = TeamStat::aggregate("1", &rows);
        assert_eq!(stats, TeamStat::empty("1"));
    }

    #[test]
    fn test_tie_on_time_keeps_first_row() {
        let rows = vec![
            row("1", "A", "2025-03-30 10:00:00", Correct),
            row("1", "B", "2025-03-30 10:00:00", Correct),
        ];

        assert_eq!(TeamStat::aggregate("1", &rows).last_problem, "A");
    }

    #[test]
    fn test_unparseable_time_counts_but_never_wins() {
        let rows = vec![
            row("1", "A", "not a time", Correct),
            row("1", "B", "2025-03-30 10:00:00", Correct),
            row("1", "C", "", Correct),
        ];

        let stats = TeamStat::aggregate("1", &rows);
        assert_eq!(stats.problems_solved, 3);
        assert_eq!(stats.last_problem, "B");
        assert!(stats.last_submission_time.is_some());
    }

    #[test]
    fn test_all_times_unparseable() {
        let rows = vec![row("1", "A", "garbage", Correct), row("1", "B", "", Correct)];

        let stats = TeamStat::aggregate("1", &rows);
        assert_eq!(stats.problems_solved, 2);
        assert_eq!(stats.last_problem, "A");
        assert_eq!(stats.last_submission_time, None);
    }
}
