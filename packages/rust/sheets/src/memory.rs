//! In-memory grid with the same read semantics as the Sheets values API.

use std::sync::{Mutex, MutexGuard};

use sheetwriter_shared::{
    PROMPT_ROW, PromptRecord, Result, ResultRow, SheetWriterError, cell_to_string,
};

use crate::{CellStore, PromptStore, next_row_for};

/// A spreadsheet held in memory. Rows and columns are 1-based in the API,
/// 0-based in storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    grid: Mutex<Vec<Vec<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from existing rows (row 1 first).
    pub fn with_rows<R, C>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        let grid: Vec<Vec<String>> = rows
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();
        Self {
            grid: Mutex::new(grid),
        }
    }

    /// Row contents with trailing empty cells dropped.
    pub fn row_values(&self, row: u32) -> Vec<String> {
        let grid = self.lock();
        let mut cells = row
            .checked_sub(1)
            .and_then(|i| grid.get(i as usize))
            .cloned()
            .unwrap_or_default();
        while cells.last().is_some_and(String::is_empty) {
            cells.pop();
        }
        cells
    }

    /// Number of rows up to and including the last non-empty one.
    pub fn populated_rows(&self) -> usize {
        let grid = self.lock();
        grid.iter()
            .rposition(|row| row.iter().any(|c| !c.is_empty()))
            .map_or(0, |i| i + 1)
    }

    fn set_row(&self, row: u32, first_col: usize, values: Vec<String>) -> Result<()> {
        let index = row
            .checked_sub(1)
            .ok_or_else(|| SheetWriterError::Sheets("row index must be 1-based".into()))?
            as usize;
        let mut grid = self.lock();
        if grid.len() <= index {
            grid.resize(index + 1, Vec::new());
        }
        let cells = &mut grid[index];
        let end = first_col + values.len();
        if cells.len() < end {
            cells.resize(end, String::new());
        }
        for (offset, value) in values.into_iter().enumerate() {
            cells[first_col + offset] = value;
        }
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Vec<String>>> {
        self.grid.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Parse a single-cell A1 reference like `B12` into (row, 0-based column).
fn parse_a1(a1: &str) -> Result<(u32, usize)> {
    let split = a1
        .find(|c: char| c.is_ascii_digit())
        .ok_or_else(|| SheetWriterError::parse(format!("invalid cell reference {a1:?}")))?;
    let (letters, digits) = a1.split_at(split);
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(SheetWriterError::parse(format!("invalid cell reference {a1:?}")));
    }
    let column = letters
        .chars()
        .try_fold(0usize, |acc, c| {
            let digit = c.to_ascii_uppercase() as usize - 'A' as usize + 1;
            acc.checked_mul(26)?.checked_add(digit)
        })
        .ok_or_else(|| SheetWriterError::parse(format!("column out of range in {a1:?}")))?
        - 1;
    let row = digits
        .parse::<u32>()
        .map_err(|e| SheetWriterError::parse(format!("invalid cell reference {a1:?}: {e}")))?;
    Ok((row, column))
}

impl PromptStore for MemoryStore {
    async fn read_prompts(&self) -> Result<PromptRecord> {
        Ok(PromptRecord::from_cells(&self.row_values(PROMPT_ROW)))
    }

    async fn next_row_index(&self) -> Result<u32> {
        Ok(next_row_for(self.populated_rows()))
    }

    async fn write_result(&self, row: u32, result: &ResultRow) -> Result<()> {
        let cells = result.cells().iter().map(cell_to_string).collect();
        self.set_row(row, 0, cells)
    }
}

impl CellStore for MemoryStore {
    async fn write_cell(&self, a1: &str, value: &str) -> Result<()> {
        let (row, column) = parse_a1(a1)?;
        self.set_row(row, column, vec![value.to_string()])
    }

    async fn read_cell(&self, a1: &str) -> Result<Option<String>> {
        let (row, column) = parse_a1(a1)?;
        Ok(self
            .row_values(row)
            .get(column)
            .filter(|v| !v.is_empty())
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use sheetwriter_shared::GenerationResult;

    use super::*;

    fn sample_row() -> ResultRow {
        ResultRow::new(
            "2024-01-01 09:00:00".into(),
            GenerationResult::new("findings".into(), "final article".into()),
        )
    }

    #[tokio::test]
    async fn short_prompt_rows_default_to_empty() {
        let store = MemoryStore::with_rows([vec!["header"], vec!["only research"]]);
        let prompts = store.read_prompts().await.unwrap();
        assert_eq!(prompts.investigate, "only research");
        assert_eq!(prompts.write, "");

        let empty = MemoryStore::new();
        assert_eq!(empty.read_prompts().await.unwrap(), PromptRecord::default());
    }

    #[tokio::test]
    async fn empty_sheet_starts_at_row_four() {
        assert_eq!(MemoryStore::new().next_row_index().await.unwrap(), 4);

        let three = MemoryStore::with_rows([vec!["h"], vec!["a", "b"], vec!["x"]]);
        assert_eq!(three.next_row_index().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn ten_rows_append_at_eleven() {
        let rows: Vec<Vec<String>> = (1..=10).map(|i| vec![format!("r{i}")]).collect();
        let store = MemoryStore::with_rows(rows);
        assert_eq!(store.next_row_index().await.unwrap(), 11);
    }

    #[tokio::test]
    async fn gaps_are_counted_not_reused() {
        // Row 5 is blank but row 6 is populated: next row is 7.
        let store = MemoryStore::with_rows([
            vec!["h"],
            vec!["p"],
            vec![""],
            vec!["r4"],
            vec![""],
            vec!["r6"],
        ]);
        assert_eq!(store.next_row_index().await.unwrap(), 7);
    }

    #[tokio::test]
    async fn written_row_reads_back_identically() {
        let store = MemoryStore::new();
        let row = sample_row();
        store.write_result(4, &row).await.unwrap();

        let read = store.row_values(4);
        assert_eq!(
            read,
            vec!["", "2024-01-01 09:00:00", "findings", "final article", "13"]
        );
        assert_eq!(ResultRow::from_cells(&read).unwrap(), row);
    }

    #[tokio::test]
    async fn write_replaces_existing_cells() {
        let store = MemoryStore::with_rows([
            vec!["h"],
            vec!["p"],
            vec![""],
            vec!["old", "old", "old", "old", "1", "keep"],
        ]);
        store.write_result(4, &sample_row()).await.unwrap();
        let read = store.row_values(4);
        assert_eq!(read[2], "findings");
        assert_eq!(read[5], "keep");
    }

    #[tokio::test]
    async fn cells_round_trip_through_a1() {
        let store = MemoryStore::new();
        store.write_cell("A1", "connected").await.unwrap();
        assert_eq!(store.read_cell("A1").await.unwrap().as_deref(), Some("connected"));
        assert_eq!(store.read_cell("B1").await.unwrap(), None);
        assert!(store.read_cell("11").await.is_err());
    }

    #[test]
    fn parse_a1_handles_multi_letter_columns() {
        assert_eq!(parse_a1("A1").unwrap(), (1, 0));
        assert_eq!(parse_a1("e4").unwrap(), (4, 4));
        assert_eq!(parse_a1("AA10").unwrap(), (10, 26));
    }

    #[tokio::test]
    async fn overlong_column_is_rejected() {
        let a1 = format!("{}1", "Z".repeat(20));
        assert!(matches!(parse_a1(&a1), Err(SheetWriterError::Parse { .. })));

        let store = MemoryStore::new();
        assert!(store.read_cell(&a1).await.is_err());
        assert!(store.write_cell(&a1, "x").await.is_err());
    }
}
