//! Connectivity check: write a marker to A1, read B1, report both.

use tracing::{error, info, instrument};

use sheetwriter_notify::Notifier;
use sheetwriter_sheets::CellStore;
use sheetwriter_shared::Result;

/// Text written to A1 by the check.
pub const CHECK_MARKER: &str = "接続成功！";

/// Cell the marker is written to.
pub const MARKER_CELL: &str = "A1";

/// Cell read back by the check.
pub const PROBE_CELL: &str = "B1";

/// Outcome of a connectivity check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub marker: String,
    /// `None` when B1 is empty.
    pub probe_value: Option<String>,
}

impl CheckReport {
    /// B1 as displayed to humans.
    pub fn probe_display(&self) -> &str {
        self.probe_value.as_deref().unwrap_or("(empty)")
    }
}

/// Run the check and notify the outcome either way.
#[instrument(skip_all)]
pub async fn run_check<C, N>(store: &C, notifier: &N) -> Result<CheckReport>
where
    C: CellStore,
    N: Notifier,
{
    match probe(store).await {
        Ok(report) => {
            notifier
                .notify(&format!(
                    "✅ Spreadsheet connection verified\n{MARKER_CELL}: {}\n{PROBE_CELL}: {}",
                    report.marker,
                    report.probe_display()
                ))
                .await;
            Ok(report)
        }
        Err(e) => {
            error!(error = %e, "connectivity check failed");
            notifier
                .notify(&format!("❌ Spreadsheet connection check failed\n{e}"))
                .await;
            Err(e)
        }
    }
}

async fn probe<C: CellStore>(store: &C) -> Result<CheckReport> {
    store.write_cell(MARKER_CELL, CHECK_MARKER).await?;
    info!(cell = MARKER_CELL, "marker written");
    let probe_value = store.read_cell(PROBE_CELL).await?;
    Ok(CheckReport {
        marker: CHECK_MARKER.to_string(),
        probe_value,
    })
}
