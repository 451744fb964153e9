//! CLI command definitions, routing, and tracing setup.

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use sheetwriter_core::check::run_check;
use sheetwriter_core::pipeline::{PipelineConfig, ProgressReporter, RunReport, Stage, run_pipeline};
use sheetwriter_core::preflight::{early_notifier, notify_on_error, prepare_check, prepare_run};
use sheetwriter_llm::AnthropicClient;
use sheetwriter_sheets::SheetsClient;
use sheetwriter_shared::{
    Credentials, NotifySettings, SheetWriterError, config_file_path, init_settings,
    load_settings,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// SheetWriter — research and write articles from spreadsheet prompts.
#[derive(Parser)]
#[command(
    name = "sheetwriter",
    version,
    about = "Generate an article from spreadsheet prompts and append it to the sheet.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Defaults to `run` when omitted.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Run the research → write → save → notify pipeline.
    Run,

    /// Verify spreadsheet access: write A1, read B1, notify.
    Check,

    /// Settings file management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Write a settings file with defaults.
    Init,
    /// Show resolved settings and which environment values are present.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "sheetwriter=info",
        1 => "sheetwriter=debug",
        _ => "sheetwriter=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command.unwrap_or(Command::Run) {
        Command::Run => cmd_run().await,
        Command::Check => cmd_check().await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

async fn cmd_run() -> Result<()> {
    let credentials = Credentials::from_env();
    let early = early_notifier(&credentials, &NotifySettings::default());
    let config = prepare_run(load_settings(), &credentials, &early).await?;
    let notifier = early_notifier(&credentials, &config.settings.notify);

    info!(
        spreadsheet = %config.sheet.spreadsheet_id,
        model = %config.settings.model.id,
        webhook = config.webhook_url.is_some(),
        "starting run"
    );

    let store = notify_on_error(
        &notifier,
        SheetsClient::connect(&config.sheet, &config.settings.sheet).await,
    )
    .await?;
    let generator = notify_on_error(
        &notifier,
        AnthropicClient::new(config.api_key.clone(), &config.settings.model),
    )
    .await?;

    let reporter = CliProgress::new();
    let pipeline_config = PipelineConfig::from(&config.settings);
    let report = run_pipeline(&store, &generator, &notifier, &pipeline_config, &reporter).await?;

    println!();
    println!("  Article saved!");
    println!("  Row:        {}", report.row);
    println!("  Timestamp:  {} (JST)", report.timestamp);
    println!("  Characters: {}", report.char_count);
    println!("  Time:       {:.1}s", report.elapsed.as_secs_f64());
    println!();

    Ok(())
}

async fn cmd_check() -> Result<()> {
    let credentials = Credentials::from_env();
    let early = early_notifier(&credentials, &NotifySettings::default());
    let config = prepare_check(load_settings(), &credentials, &early).await?;
    let notifier = early_notifier(&credentials, &config.settings.notify);

    let store = notify_on_error(
        &notifier,
        SheetsClient::connect(&config.sheet, &config.settings.sheet).await,
    )
    .await?;

    let report = run_check(&store, &notifier).await?;

    println!("  Wrote {:?} to A1 of '{}'", report.marker, store.sheet_title());
    println!("  B1: {}", report.probe_display());

    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_settings()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let settings = load_settings()?;
    println!("# {}", config_file_path()?.display());
    println!("{}", toml::to_string_pretty(&settings)?);

    let credentials = Credentials::from_env();
    let present = |set: bool| if set { "set" } else { "missing" };
    println!("# environment");
    println!("GCP_SERVICE_ACCOUNT_JSON  {}", present(credentials.service_account_json.is_some()));
    println!("GOOGLE_OAUTH_ACCESS_TOKEN {}", present(credentials.access_token.is_some()));
    println!("SPREADSHEET_ID            {}", present(credentials.spreadsheet_id.is_some()));
    println!("ANTHROPIC_API_KEY         {}", present(credentials.api_key.is_some()));
    println!("SLACK_WEBHOOK_URL         {}", present(credentials.webhook_url.is_some()));
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.println(format!("  → {name}"));
        self.spinner.set_message(name.to_string());
    }

    fn done(&self, _report: &RunReport) {
        self.spinner.finish_and_clear();
    }

    fn failed(&self, stage: Stage, _error: &SheetWriterError) {
        self.spinner
            .abandon_with_message(format!("failed after step: {stage}"));
    }
}
