//! Shared fixtures for service tests

use async_trait::async_trait;
use leaderboard_engine::{SheetData, REQUIRED_COLUMNS};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::error::{Result, ServiceError};
use crate::source::RowSource;

/// Build a sheet from `(team, problem, time, status)` tuples
pub fn sheet(rows: &[(&str, &str, &str, &str)]) -> SheetData {
    let headers = REQUIRED_COLUMNS
        .iter()
        .map(|column| column.to_string())
        .collect();
    let data = rows
        .iter()
        .map(|(team, problem, time, status)| {
            REQUIRED_COLUMNS
                .iter()
                .zip([team, problem, time, status])
                .map(|(column, value)| (column.to_string(), value.to_string()))
                .collect::<HashMap<_, _>>()
        })
        .collect();
    SheetData::new(headers, data)
}

/// Source that replays a fixed list of responses
pub struct ScriptedSource {
    responses: Mutex<VecDeque<Result<SheetData>>>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn new(responses: Vec<Result<SheetData>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RowSource for ScriptedSource {
    async fn fetch(&self) -> Result<SheetData> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.responses.lock().unwrap().pop_front();
        next.unwrap_or_else(|| {
            Err(ServiceError::Config(
                "scripted source exhausted".to_string(),
            ))
        })
    }

    fn describe(&self) -> String {
        "scripted".to_string()
    }
}
