//! Core domain types for a SheetWriter run.

use serde_json::Value;

use crate::error::{Result, SheetWriterError};

/// Row holding the two prompts (1-based, like the spreadsheet UI).
pub const PROMPT_ROW: u32 = 2;

/// First row that may receive results. Rows above are headers/prompts.
pub const FIRST_RESULT_ROW: u32 = 4;

/// Number of columns in a result row (A–E).
pub const RESULT_COLUMNS: usize = 5;

// ---------------------------------------------------------------------------
// PromptRecord
// ---------------------------------------------------------------------------

/// The prompt pair read from [`PROMPT_ROW`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptRecord {
    /// Research prompt (column A).
    pub investigate: String,
    /// Writing prompt (column B).
    pub write: String,
}

impl PromptRecord {
    /// Build from raw row cells. Missing cells become empty strings.
    pub fn from_cells(cells: &[String]) -> Self {
        let cell = |i: usize| cells.get(i).cloned().unwrap_or_default();
        Self {
            investigate: cell(0),
            write: cell(1),
        }
    }
}

// ---------------------------------------------------------------------------
// GenerationResult
// ---------------------------------------------------------------------------

/// Output of the two-stage generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    pub investigation: String,
    pub article: String,
    /// Character count of `article` (Unicode scalar values, not bytes).
    pub char_count: usize,
}

impl GenerationResult {
    pub fn new(investigation: String, article: String) -> Self {
        let char_count = article.chars().count();
        Self {
            investigation,
            article,
            char_count,
        }
    }
}

// ---------------------------------------------------------------------------
// ResultRow
// ---------------------------------------------------------------------------

/// One persisted result, laid out across columns A–E.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRow {
    /// Column A. Left empty by the pipeline; reserved for manual review marks.
    pub status_marker: String,
    /// Column B, rendered in JST.
    pub timestamp: String,
    pub investigation: String,
    pub article: String,
    pub char_count: usize,
}

impl ResultRow {
    /// Assemble a fresh row with an empty status marker.
    pub fn new(timestamp: String, result: GenerationResult) -> Self {
        Self {
            status_marker: String::new(),
            timestamp,
            investigation: result.investigation,
            article: result.article,
            char_count: result.char_count,
        }
    }

    /// Cell values in column order, ready for a ranged write.
    pub fn cells(&self) -> Vec<Value> {
        vec![
            Value::String(self.status_marker.clone()),
            Value::String(self.timestamp.clone()),
            Value::String(self.investigation.clone()),
            Value::String(self.article.clone()),
            Value::from(self.char_count),
        ]
    }

    /// Parse a row read back from the store.
    pub fn from_cells(cells: &[String]) -> Result<Self> {
        if cells.len() < RESULT_COLUMNS {
            return Err(SheetWriterError::parse(format!(
                "result row has {} cells, expected {RESULT_COLUMNS}",
                cells.len()
            )));
        }
        let char_count = cells[4].trim().parse::<usize>().map_err(|e| {
            SheetWriterError::parse(format!("invalid char count {:?}: {e}", cells[4]))
        })?;
        Ok(Self {
            status_marker: cells[0].clone(),
            timestamp: cells[1].clone(),
            investigation: cells[2].clone(),
            article: cells[3].clone(),
            char_count,
        })
    }
}

/// Render a JSON cell value the way the Sheets API's formatted values read back.
pub fn cell_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
