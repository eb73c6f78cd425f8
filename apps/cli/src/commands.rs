//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chronicle_client::RateLimiter;
use chronicle_core::{BiographyRecord, Pipeline, PipelineStage, ProgressReporter};
use chronicle_shared::{
    AppConfig, config_file_path, init_config_at, load_config, load_config_from,
};
use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Chronicle: structured biographies of historical figures.
#[derive(Parser)]
#[command(
    name = "chronicle",
    version,
    about = "Look up historical figures and assemble structured biography records.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Path to the config file (defaults to ~/.chronicle/chronicle.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
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
    /// Assemble a biography record for a person.
    Lookup {
        /// Free-text name of the person.
        query: String,

        /// Print the record as JSON instead of a summary.
        #[arg(long)]
        json: bool,
    },

    /// List article titles starting with a prefix.
    Suggest {
        /// Name prefix to complete.
        prefix: String,

        /// Maximum number of suggestions (defaults to search.suggest_limit).
        #[arg(short, long)]
        limit: Option<u32>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

fn filter_directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "chronicle=info",
        1 => "chronicle=debug",
        _ => "chronicle=trace",
    }
}

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(cli.verbose)));

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
    let config_path = cli.config.as_deref();
    match cli.command {
        Command::Lookup { query, json } => cmd_lookup(config_path, &query, json).await,
        Command::Suggest { prefix, limit } => cmd_suggest(config_path, &prefix, limit).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(config_path),
            ConfigAction::Show => cmd_config_show(config_path),
        },
    }
}

fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    Ok(config)
}

fn build_pipeline(config: &AppConfig) -> Result<Pipeline> {
    let limiter = Arc::new(RateLimiter::from_config(&config.rate_limit));
    Ok(Pipeline::from_config(config, limiter)?)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_lookup(config_path: Option<&Path>, query: &str, json: bool) -> Result<()> {
    let config = resolve_config(config_path)?;
    let pipeline = build_pipeline(&config)?;

    info!(query, "looking up");

    let reporter = CliProgress::new();
    let record = pipeline.assemble(query, &reporter).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        print_summary(&record);
    }

    Ok(())
}

fn print_summary(record: &BiographyRecord) {
    let missing = || "unknown".to_string();
    let join = |items: Vec<String>| {
        if items.is_empty() {
            missing()
        } else {
            items.join(", ")
        }
    };

    println!();
    println!("  {}", record.name());
    if let Some(description) = record.description() {
        println!("  {description}");
    }
    println!();
    println!(
        "  Born:        {}",
        record.birth_date().map_or_else(missing, |d| d.to_string())
    );
    if let Some(place) = record.birth_place() {
        println!("               {place}");
    }
    println!(
        "  Died:        {}",
        record.death_date().map_or_else(missing, |d| d.to_string())
    );
    if let Some(place) = record.death_place() {
        println!("               {place}");
    }
    if let Some(age) = record.age_at_death() {
        println!("  Age:         {age}");
    }
    println!(
        "  Nationality: {}",
        record.nationality().map_or_else(missing, str::to_string)
    );
    println!(
        "  Occupations: {}",
        join(record.occupations().iter().cloned().collect())
    );
    println!(
        "  Categories:  {}",
        join(record.categories().iter().map(|t| t.label().to_string()).collect())
    );
    println!("  Quality:     {:.2}", record.quality_score());
    if let Some(url) = record.page_url() {
        println!("  Source:      {url}");
    }
    println!();
    println!("  {}", record.summary());
    if !record.warnings().is_empty() {
        println!();
        println!("  Warnings:");
        for warning in record.warnings() {
            println!("    - {warning}");
        }
    }
    println!();
}

async fn cmd_suggest(config_path: Option<&Path>, prefix: &str, limit: Option<u32>) -> Result<()> {
    let config = resolve_config(config_path)?;
    let pipeline = build_pipeline(&config)?;
    let client = pipeline.client();
    let limit = limit.unwrap_or(client.config().suggest_limit);

    info!(prefix, limit, "fetching suggestions");

    let names = client.suggest(prefix, limit).await?;
    if names.is_empty() {
        println!("No suggestions for '{prefix}'.");
    }
    for name in names {
        println!("{name}");
    }
    Ok(())
}

fn cmd_config_init(config_path: Option<&Path>) -> Result<()> {
    let path = match config_path {
        Some(path) => path.to_path_buf(),
        None => config_file_path()?,
    };
    if path.exists() {
        return Err(eyre!("config already exists at '{}'", path.display()));
    }
    init_config_at(&path)?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config = resolve_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
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
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .map(|style| {
                style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            })
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        spinner.set_style(style);
        spinner.enable_steady_tick(Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn stage(&self, stage: &PipelineStage) {
        match stage {
            PipelineStage::Done | PipelineStage::Failed(_) => self.spinner.finish_and_clear(),
            _ => self.spinner.set_message(stage.to_string()),
        }
    }

    fn done(&self, _record: &BiographyRecord) {
        self.spinner.finish_and_clear();
    }
}
