//! Cross-module properties of the leaderboard computation

use proptest::prelude::*;
use std::collections::HashSet;

use crate::{compute_leaderboard, RankSnapshot, SubmissionRow, SubmissionStatus};

fn status_strategy() -> impl Strategy<Value = SubmissionStatus> {
    prop_oneof![
        Just(SubmissionStatus::NotReviewed),
        Just(SubmissionStatus::InReview),
        Just(SubmissionStatus::Incorrect),
        Just(SubmissionStatus::Correct),
        Just(SubmissionStatus::Correct),
    ]
}

fn time_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        (0u32..24, 0u32..60)
            .prop_map(|(h, m)| format!("2025-03-30 {:02}:{:02}:00", h, m)),
        (45700u32..45760).prop_map(|serial| serial.to_string()),
        Just(String::new()),
        Just("not a time".to_string()),
    ]
}

fn row_strategy() -> impl Strategy<Value = SubmissionRow> {
    (
        prop_oneof![
            (0u32..12).prop_map(|id| id.to_string()),
            Just("Team X".to_string()),
            Just(String::new()),
        ],
        prop_oneof![Just("A"), Just("B"), Just("C"), Just("D")],
        time_strategy(),
        status_strategy(),
    )
        .prop_map(|(team, problem, time, status)| {
            SubmissionRow::new(team, problem, time, status)
        })
}

fn rows_strategy() -> impl Strategy<Value = Vec<SubmissionRow>> {
    prop::collection::vec(row_strategy(), 0..40)
}

fn distinct_teams(rows: &[SubmissionRow]) -> usize {
    rows.iter()
        .map(|row| row.team_id.trim())
        .filter(|team| !team.is_empty())
        .collect::<HashSet<_>>()
        .len()
}

proptest! {
    #[test]
    fn prop_deterministic(rows in rows_strategy(), previous_rows in rows_strategy()) {
        let previous = compute_leaderboard(&previous_rows, &RankSnapshot::new()).new_ranks;

        let a = compute_leaderboard(&rows, &previous);
        let b = compute_leaderboard(&rows, &previous);
        prop_assert_eq!(a, b);
    }

    #[test]
    fn prop_ranks_are_contiguous(rows in rows_strategy()) {
        let update = compute_leaderboard(&rows, &RankSnapshot::new());
        let n = distinct_teams(&rows);

        prop_assert_eq!(update.entries.len(), n);
        prop_assert_eq!(update.new_ranks.len(), n);
        let ranks: Vec<usize> = update.entries.iter().map(|entry| entry.rank).collect();
        prop_assert_eq!(ranks, (1..=n).collect::<Vec<_>>());

        for (team_id, rank) in update.new_ranks.iter() {
            prop_assert_eq!(update.entry(team_id).map(|entry| entry.rank), Some(rank));
        }
    }

    #[test]
    fn prop_solved_counts_never_increase_down_the_board(rows in rows_strategy()) {
        let update = compute_leaderboard(&rows, &RankSnapshot::new());
        for pair in update.entries.windows(2) {
            prop_assert!(pair[0].stats.problems_solved >= pair[1].stats.problems_solved);
        }
    }

    #[test]
    fn prop_first_call_flags_nothing(rows in rows_strategy()) {
        let update = compute_leaderboard(&rows, &RankSnapshot::new());
        prop_assert!(update.changed_team_ids.is_empty());
        for entry in &update.entries {
            prop_assert_eq!(entry.previous_rank, entry.rank);
        }
    }

    #[test]
    fn prop_changed_teams_match_rank_diff(
        rows in rows_strategy(),
        previous_rows in rows_strategy(),
    ) {
        let previous = compute_leaderboard(&previous_rows, &RankSnapshot::new()).new_ranks;
        let update = compute_leaderboard(&rows, &previous);

        for entry in &update.entries {
            let moved = previous.get(entry.team_id()).is_some_and(|rank| rank != entry.rank);
            prop_assert_eq!(update.changed_team_ids.contains(entry.team_id()), moved);
        }
        prop_assert!(update
            .changed_team_ids
            .iter()
            .all(|team| update.new_ranks.get(team).is_some()));
    }

    #[test]
    fn prop_row_order_does_not_change_the_board(rows in rows_strategy()) {
        let mut reversed = rows.clone();
        reversed.reverse();

        let forward = compute_leaderboard(&rows, &RankSnapshot::new());
        let backward = compute_leaderboard(&reversed, &RankSnapshot::new());

        let order = |update: &crate::LeaderboardUpdate| {
            update
                .entries
                .iter()
                .map(|entry| (entry.team_id().to_string(), entry.stats.problems_solved))
                .collect::<Vec<_>>()
        };
        prop_assert_eq!(order(&forward), order(&backward));
    }
}

#[test]
fn test_two_correct_rows_for_one_problem_count_once() {
    let rows = vec![
        SubmissionRow::new("1", "A", "2025-03-30 10:00:00", SubmissionStatus::Correct),
        SubmissionRow::new("1", "A", "2025-03-30 10:30:00", SubmissionStatus::Correct),
        SubmissionRow::new("1", "B", "2025-03-30 11:00:00", SubmissionStatus::Correct),
    ];

    let update = compute_leaderboard(&rows, &RankSnapshot::new());
    assert_eq!(update.entries[0].stats.problems_solved, 2);
    assert_eq!(update.entries[0].stats.last_problem, "B");
}

#[test]
fn test_malformed_input_never_panics() {
    let rows = vec![
        SubmissionRow::new("", "", "", SubmissionStatus::Correct),
        SubmissionRow::new(
            "  ",
            "A",
            "'",
            SubmissionStatus::Unrecognized("??".to_string()),
        ),
        SubmissionRow::new("1", "", "-1e400", SubmissionStatus::Correct),
        SubmissionRow::new("1", "A", "1e400", SubmissionStatus::Correct),
    ];

    let update = compute_leaderboard(&rows, &RankSnapshot::new());
    assert_eq!(update.entries.len(), 1);
    assert_eq!(update.entries[0].stats.problems_solved, 2);
    assert_eq!(update.entries[0].stats.last_submission_time, None);
}
