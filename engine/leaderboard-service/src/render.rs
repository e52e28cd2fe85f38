//! Plain-text rendering of a leaderboard view

use leaderboard_engine::{format_submission_time, LeaderboardEntry, MedalTier, RankMovement};
use std::fmt::Write;

use crate::poller::LeaderboardView;

const HEADER: [&str; 6] = [
    "Rank",
    "Team",
    "Solved",
    "Last Problem",
    "Last Correct",
    "Move",
];

/// Render the view as a fixed-width table, one row per team.
///
/// Highlighted teams are marked with `*` and podium places get a medal label.
pub fn render_table(view: &LeaderboardView) -> String {
    if view.entries.is_empty() {
        return match &view.last_error {
            Some(error) => format!("No leaderboard data ({})\n", error),
            None => "No leaderboard data\n".to_string(),
        };
    }

    let rows: Vec<[String; 6]> = view
        .entries
        .iter()
        .map(|entry| {
            let highlighted = view.is_highlighted(entry.team_id());
            table_row(entry, highlighted)
        })
        .collect();

    let mut widths = HEADER.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, &HEADER.map(str::to_string), &widths);
    let rule_width = widths.iter().sum::<usize>() + 2 * (widths.len() - 1);
    out.push_str(&"-".repeat(rule_width));
    out.push('\n');
    for row in &rows {
        push_line(&mut out, row, &widths);
    }

    if let Some(error) = &view.last_error {
        let _ = writeln!(out, "(stale: {})", error);
    }
    out
}

fn table_row(entry: &LeaderboardEntry, highlighted: bool) -> [String; 6] {
    let rank = match entry.medal() {
        Some(medal) => format!("{} {}", entry.rank, medal_label(medal)),
        None => entry.rank.to_string(),
    };
    let team = if highlighted {
        format!("{} *", entry.team_id())
    } else {
        entry.team_id().to_string()
    };

    [
        rank,
        team,
        entry.stats.problems_solved.to_string(),
        if entry.stats.last_problem.is_empty() {
            "-".to_string()
        } else {
            entry.stats.last_problem.clone()
        },
        format_submission_time(entry.stats.last_submission_time),
        movement_label(entry),
    ]
}

fn medal_label(medal: MedalTier) -> &'static str {
    match medal {
        MedalTier::Gold => "(gold)",
        MedalTier::Silver => "(silver)",
        MedalTier::Bronze => "(bronze)",
    }
}

fn movement_label(entry: &LeaderboardEntry) -> String {
    match entry.movement() {
        RankMovement::Improved => format!("+{}", entry.previous_rank - entry.rank),
        RankMovement::Declined => format!("-{}", entry.rank - entry.previous_rank),
        RankMovement::Unchanged => "=".to_string(),
    }
}

fn push_line(out: &mut String, cells: &[String; 6], widths: &[usize; 6]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}
