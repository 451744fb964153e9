//! Shared types, error model, and configuration for SheetWriter.
//!
//! This crate is the foundation depended on by all other SheetWriter crates.
//! It provides:
//! - [`SheetWriterError`] — the unified error type
//! - Domain types ([`PromptRecord`], [`GenerationResult`], [`ResultRow`])
//! - Configuration ([`Settings`], [`Credentials`], [`AppConfig`], settings loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CheckConfig, Credentials, ModelSettings, NotifySettings, PromptSettings, Secret,
    ServiceAccountInfo, Settings, SheetAccess, SheetSettings, config_dir, config_file_path,
    init_settings, load_settings, load_settings_from,
};
pub use error::{Result, SheetWriterError};
pub use types::{
    FIRST_RESULT_ROW, GenerationResult, PROMPT_ROW, PromptRecord, RESULT_COLUMNS, ResultRow,
    cell_to_string,
};
