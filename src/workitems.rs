//! Input work-item queue and outcome reporting.
//!
//! Inputs use the same layout as a local Robocorp work-item file: a JSON list
//! of objects, each with a `payload` object and an optional `files` map.
//!
//! ```json
//! [
//!   { "payload": { "search_term": "Olympics", "number_of_months": 2 } },
//!   { "payload": { "search_term": "climate" } }
//! ]
//! ```
//!
//! Each item is released as done or failed; the outcomes are written back as
//! JSON next to the other crawler output.

use crate::error::Result;
use crate::models::SearchRequest;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// File name of the outcome report inside the crawler output directory.
pub const OUTCOMES_FILENAME: &str = "work_items_output.json";

/// One queued unit of work.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct WorkItem {
    #[serde(default)]
    pub payload: Value,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub files: BTreeMap<String, String>,
}

impl WorkItem {
    pub fn from_request(request: &SearchRequest) -> Self {
        Self {
            payload: serde_json::to_value(request).unwrap_or(Value::Null),
            files: BTreeMap::new(),
        }
    }

    /// Read the search parameters, applying defaults for missing keys.
    pub fn request(&self) -> Result<SearchRequest> {
        match &self.payload {
            Value::Null => Ok(SearchRequest::default()),
            payload => Ok(serde_json::from_value(payload.clone())?),
        }
    }
}

/// Load the input queue from `path`, or a single item built from `fallback`.
#[instrument(level = "info", skip(fallback))]
pub async fn load_inputs(path: Option<&Path>, fallback: &SearchRequest) -> Result<Vec<WorkItem>> {
    let Some(path) = path else {
        info!(search_term = %fallback.search_term, "No work-item file; using a single item");
        return Ok(vec![WorkItem::from_request(fallback)]);
    };

    let raw = fs::read_to_string(path).await?;
    let items: Vec<WorkItem> = serde_json::from_str(&raw)?;
    info!(count = items.len(), "Loaded work items");
    Ok(items)
}

/// Final state of a processed work item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ItemState {
    Done,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemException {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
}

/// Outcome of one work item, as written to the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkItemOutcome {
    pub payload: Value,
    pub state: ItemState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exception: Option<ItemException>,
    /// Rows exported for this item.
    pub records: usize,
}

impl WorkItemOutcome {
    pub fn done(item: &WorkItem, records: usize) -> Self {
        Self {
            payload: item.payload.clone(),
            state: ItemState::Done,
            exception: None,
            records,
        }
    }

    pub fn failed(item: &WorkItem, error: &dyn std::error::Error) -> Self {
        Self {
            payload: item.payload.clone(),
            state: ItemState::Failed,
            exception: Some(ItemException {
                kind: "APPLICATION".to_string(),
                message: error.to_string(),
            }),
            records: 0,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.state == ItemState::Failed
    }
}

/// Write all outcomes to `path` as pretty-printed JSON.
#[instrument(level = "info", skip_all, fields(path = %path.display(), count = outcomes.len()))]
pub async fn write_outcomes(path: &Path, outcomes: &[WorkItemOutcome]) -> Result<()> {
    let json = serde_json::to_string_pretty(outcomes)?;
    fs::write(path, json).await?;
    info!("Wrote work-item outcomes");
    Ok(())
}
