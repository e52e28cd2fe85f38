//! Total order over team standings

use std::cmp::Ordering;

use crate::types::TeamStat;

/// Ordering used to rank teams, best first.
///
/// 1. More problems solved.
/// 2. Earlier most-recent correct submission.
/// 3. A known submission time beats an unknown one.
/// 4. Team id, see [`compare_team_ids`].
///
/// Team ids are unique within one computation, so no two teams compare equal.
pub fn rank_order(a: &TeamStat, b: &TeamStat) -> Ordering {
    b.problems_solved
        .cmp(&a.problems_solved)
        .then_with(|| match (a.last_submission_time, b.last_submission_time) {
            (Some(a_time), Some(b_time)) => a_time.cmp(&b_time),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| compare_team_ids(&a.team_id, &b.team_id))
}

/// Numeric-aware team id comparison.
///
/// Ids that parse as unsigned integers compare by value and come before every
/// other id; the rest compare lexicographically. Equal values written
/// differently (`7` and `007`) fall back to the string comparison.
pub fn compare_team_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(a_num), Ok(b_num)) => a_num.cmp(&b_num).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}
