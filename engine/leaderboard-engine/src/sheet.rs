//! The `{headers, data}` payload returned by the sheet fetch

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::trace;

use crate::error::RowError;
use crate::types::{SubmissionRow, SubmissionStatus};

pub const TEAM_ID_COLUMN: &str = "Team ID";
pub const PROBLEM_COLUMN: &str = "Problem";
pub const TIME_COLUMN: &str = "Time";
pub const STATUS_COLUMN: &str = "Status";

/// Columns the leaderboard needs; any other column is ignored
pub const REQUIRED_COLUMNS: [&str; 4] = [
    TEAM_ID_COLUMN,
    PROBLEM_COLUMN,
    TIME_COLUMN,
    STATUS_COLUMN,
];

/// Raw sheet contents: a header row plus one map per data row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SheetData {
    #[serde(default)]
    pub headers: Vec<String>,

    #[serde(default, deserialize_with = "deserialize_cells")]
    pub data: Vec<HashMap<String, String>>,
}

/// Cells are text in the sheet, but a date-formatted cell can come back as a
/// JSON number. Everything is normalized to its text form.
fn deserialize_cells<'de, D>(deserializer: D) -> Result<Vec<HashMap<String, String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let rows: Vec<HashMap<String, Value>> = Vec::deserialize(deserializer)?;
    Ok(rows
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|(column, value)| (column, cell_text(value)))
                .collect()
        })
        .collect())
}

fn cell_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl SheetData {
    pub fn new(headers: Vec<String>, data: Vec<HashMap<String, String>>) -> Self {
        Self { headers, data }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Required columns that are not present in the header row
    pub fn missing_columns(&self) -> Vec<&'static str> {
        REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|column| {
                !self
                    .headers
                    .iter()
                    .any(|header| header.trim() == *column)
            })
            .collect()
    }

    /// Decode every usable row. Rows without a team are skipped.
    pub fn submission_rows(&self) -> Vec<SubmissionRow> {
        self.data
            .iter()
            .enumerate()
            .filter_map(|(index, cells)| match decode_row(index, cells) {
                Ok(row) => Some(row),
                Err(err) => {
                    trace!("Skipping sheet row: {}", err);
                    None
                }
            })
            .collect()
    }

    /// Raw rows submitted by one team
    pub fn rows_for_team(&self, team_id: &str) -> Vec<&HashMap<String, String>> {
        let wanted = team_id.trim();
        self.data
            .iter()
            .filter(|cells| {
                cells
                    .get(TEAM_ID_COLUMN)
                    .is_some_and(|team| team.trim() == wanted)
            })
            .collect()
    }
}

fn decode_row(index: usize, cells: &HashMap<String, String>) -> Result<SubmissionRow, RowError> {
    let team_id = cells
        .get(TEAM_ID_COLUMN)
        .ok_or(RowError::MissingTeamId { row: index })?;
    let team_id = team_id.trim();
    if team_id.is_empty() {
        return Err(RowError::BlankTeamId { row: index });
    }

    let cell = |column: &str| cells.get(column).map(String::as_str).unwrap_or_default();

    Ok(SubmissionRow::new(
        team_id,
        cell(PROBLEM_COLUMN).trim(),
        cell(TIME_COLUMN),
        SubmissionStatus::parse(cell(STATUS_COLUMN)),
    ))
}
