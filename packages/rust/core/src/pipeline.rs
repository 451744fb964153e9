//! End-to-end run: prompts → research → article → result row → notification.
//!
//! ```text
//! Init → PromptsLoaded → Investigated → Written → Persisted → Notified
//!   └──────────────── any error ─────────────────┘→ failure notice → Err
//! ```
//!
//! Every step awaits the previous one; nothing runs concurrently. A failure at
//! any step sends one failure notice and returns the error unchanged. Nothing
//! is retried and nothing is written unless both model calls succeed.

use std::fmt;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::{error, info, instrument};

use sheetwriter_llm::Generator;
use sheetwriter_notify::Notifier;
use sheetwriter_sheets::PromptStore;
use sheetwriter_shared::{GenerationResult, PromptRecord, Result, ResultRow, Settings, SheetWriterError};

use crate::timestamp::format_jst;

/// Options for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Heading placed between the writing prompt and the research output.
    pub investigation_label: String,
    /// Source of "now" for the result timestamp.
    pub clock: fn() -> DateTime<Utc>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

impl From<&Settings> for PipelineConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            investigation_label: settings.prompts.investigation_label.clone(),
            clock: Utc::now,
        }
    }
}

/// Last step a run completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    PromptsLoaded,
    Investigated,
    Written,
    Persisted,
    Notified,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::PromptsLoaded => "prompts loaded",
            Self::Investigated => "investigated",
            Self::Written => "article written",
            Self::Persisted => "row persisted",
            Self::Notified => "notified",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary of a successful run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Row the result was written to.
    pub row: u32,
    /// Persisted JST timestamp.
    pub timestamp: String,
    /// Character count of the article.
    pub char_count: usize,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when the run completes successfully.
    fn done(&self, report: &RunReport);
    /// Called when the run fails, after the failure notice was sent.
    fn failed(&self, stage: Stage, error: &SheetWriterError);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn done(&self, _report: &RunReport) {}
    fn failed(&self, _stage: Stage, _error: &SheetWriterError) {}
}

/// Run the full pipeline.
///
/// 1. Read the prompt row
/// 2. Research with search enabled
/// 3. Write the article from the research, search disabled
/// 4. Append the result row
/// 5. Notify success (or, on any error, notify failure and return it)
#[instrument(skip_all)]
pub async fn run_pipeline<S, G, N>(
    store: &S,
    generator: &G,
    notifier: &N,
    config: &PipelineConfig,
    progress: &dyn ProgressReporter,
) -> Result<RunReport>
where
    S: PromptStore,
    G: Generator,
    N: Notifier,
{
    let start = Instant::now();
    let mut stage = Stage::Init;

    match execute(store, generator, config, progress, &mut stage, start).await {
        Ok(report) => {
            progress.phase("Sending notification");
            notifier.notify(&success_message(&report)).await;
            info!(
                row = report.row,
                chars = report.char_count,
                elapsed_ms = report.elapsed.as_millis() as u64,
                stage = %Stage::Notified,
                "pipeline complete"
            );
            progress.done(&report);
            Ok(report)
        }
        Err(e) => {
            error!(%stage, error = %e, "pipeline failed");
            notifier.notify(&failure_message(stage, &e)).await;
            progress.failed(stage, &e);
            Err(e)
        }
    }
}

async fn execute<S, G>(
    store: &S,
    generator: &G,
    config: &PipelineConfig,
    progress: &dyn ProgressReporter,
    stage: &mut Stage,
    start: Instant,
) -> Result<RunReport>
where
    S: PromptStore,
    G: Generator,
{
    // --- Phase 1: Prompts ---
    progress.phase("Loading prompts");
    let prompts = store.read_prompts().await?;
    info!(
        investigate_chars = prompts.investigate.chars().count(),
        write_chars = prompts.write.chars().count(),
        "prompts loaded"
    );
    *stage = Stage::PromptsLoaded;

    // --- Phase 2: Research ---
    progress.phase("Researching (web search enabled)");
    let investigation = generator.generate(&prompts.investigate, true).await?;
    *stage = Stage::Investigated;

    // --- Phase 3: Article ---
    progress.phase("Writing article");
    let write_prompt = build_write_prompt(&prompts, &investigation, &config.investigation_label);
    let article = generator.generate(&write_prompt, false).await?;
    let result = GenerationResult::new(investigation, article);
    info!(chars = result.char_count, "article generated");
    *stage = Stage::Written;

    // --- Phase 4: Persist ---
    progress.phase("Saving result");
    let row = store.next_row_index().await?;
    let timestamp = format_jst((config.clock)());
    let char_count = result.char_count;
    store
        .write_result(row, &ResultRow::new(timestamp.clone(), result))
        .await?;
    info!(row, %timestamp, "result row written");
    *stage = Stage::Persisted;

    Ok(RunReport {
        row,
        timestamp,
        char_count,
        elapsed: start.elapsed(),
    })
}

/// Writing prompt: the user's instructions followed by the labeled research.
pub fn build_write_prompt(prompts: &PromptRecord, investigation: &str, label: &str) -> String {
    format!("{}\n\n{label}\n{investigation}", prompts.write)
}

/// Notification text for a successful run.
pub fn success_message(report: &RunReport) -> String {
    format!(
        "✅ Article saved to row {}\nTime: {} (JST)\nCharacters: {}",
        report.row, report.timestamp, report.char_count
    )
}

/// Notification text for a failed run.
pub fn failure_message(stage: Stage, error: &SheetWriterError) -> String {
    format!("❌ Article generation failed (last completed step: {stage})\n{error}")
}
