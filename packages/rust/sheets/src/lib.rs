//! Spreadsheet-backed prompt and result storage.
//!
//! This crate provides:
//! - [`PromptStore`] — the contract the pipeline depends on
//! - [`SheetsClient`] — Google Sheets transport implementing it
//! - [`MemoryStore`] — an in-process grid for tests and dry runs
//!
//! **Row layout:** row 1 headers, row 2 prompts (A = research, B = writing),
//! row 3 reserved, results from row 4 down in columns A–E.
//!
//! **Single writer:** [`PromptStore::next_row_index`] is a plain read. Two
//! concurrent runs against one sheet can pick the same row and the later
//! write wins. Callers must not run the pipeline concurrently on one sheet.

mod client;
mod memory;

use sheetwriter_shared::{FIRST_RESULT_ROW, PROMPT_ROW, PromptRecord, Result, ResultRow};
use tracing::debug;

pub use client::SheetsClient;
pub use memory::MemoryStore;

/// Storage operations used by a pipeline run.
#[allow(async_fn_in_trait)]
pub trait PromptStore {
    /// Read the prompt pair. Short rows yield empty prompts, never an error.
    async fn read_prompts(&self) -> Result<PromptRecord>;

    /// Index of the row the next result goes to.
    async fn next_row_index(&self) -> Result<u32>;

    /// Overwrite columns A–E of `row` with `result`.
    async fn write_result(&self, row: u32, result: &ResultRow) -> Result<()>;
}

/// Single-cell access, used by the connectivity check.
#[allow(async_fn_in_trait)]
pub trait CellStore {
    async fn write_cell(&self, a1: &str, value: &str) -> Result<()>;
    async fn read_cell(&self, a1: &str) -> Result<Option<String>>;
}

/// Row cursor rule: append after the last populated row, never above
/// [`FIRST_RESULT_ROW`].
pub fn next_row_for(populated_rows: usize) -> u32 {
    let next = u32::try_from(populated_rows).unwrap_or(u32::MAX - 1) + 1;
    next.max(FIRST_RESULT_ROW)
}

/// A1 range covering the five result columns of `row`.
pub fn result_range(row: u32) -> String {
    format!("A{row}:E{row}")
}

impl PromptStore for SheetsClient {
    async fn read_prompts(&self) -> Result<PromptRecord> {
        let cells = self.row_values(PROMPT_ROW).await?;
        debug!(cells = cells.len(), "prompt row read");
        Ok(PromptRecord::from_cells(&cells))
    }

    async fn next_row_index(&self) -> Result<u32> {
        let populated = self.get_all_values().await?.len();
        let next = next_row_for(populated);
        debug!(populated, next, "row cursor computed");
        Ok(next)
    }

    async fn write_result(&self, row: u32, result: &ResultRow) -> Result<()> {
        self.update(&result_range(row), vec![result.cells()]).await
    }
}

impl CellStore for SheetsClient {
    async fn write_cell(&self, a1: &str, value: &str) -> Result<()> {
        self.update(a1, vec![vec![serde_json::Value::String(value.to_string())]])
            .await
    }

    async fn read_cell(&self, a1: &str) -> Result<Option<String>> {
        self.acell(a1).await
    }
}
