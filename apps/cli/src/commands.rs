//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use notebookify_core::{BatchReport, ConvertedFile, ProgressReporter, RandomIds};
use notebookify_shared::{
    AppConfig, ConvertConfig, NotebookError, WriterStrategy, init_config, load_config,
    load_config_from,
};
use tracing::{debug, info};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// notebookify: turn annotated scripts into Jupyter notebooks.
#[derive(Parser)]
#[command(
    name = "notebookify",
    version,
    about = "Convert scripts with # COMMAND / # MAGIC / # %% cell markers into .ipynb notebooks.",
    long_about = None,
    args_conflicts_with_subcommands = true,
    subcommand_negates_reqs = true,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (defaults to ~/.notebookify/notebookify.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub convert: ConvertArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Conversion arguments (the default command).
#[derive(Args, Debug)]
pub(crate) struct ConvertArgs {
    /// A script, or a folder of scripts.
    #[arg(required = true)]
    pub path: Option<PathBuf>,

    /// Output directory for .ipynb files (defaults to a sibling `notebooks` folder).
    #[arg(short, long)]
    pub outdir: Option<PathBuf>,

    /// Recursively convert scripts in subfolders.
    #[arg(short, long)]
    pub recursive: bool,

    /// Input file extension (defaults to `py`).
    #[arg(long)]
    pub ext: Option<String>,

    /// Notebook writer: auto, structured, or plain.
    #[arg(long)]
    pub writer: Option<WriterStrategy>,
}

impl ConvertArgs {
    /// Merge flags over the loaded config.
    pub(crate) fn to_convert_config(&self, app: &AppConfig) -> ConvertConfig {
        let mut config = ConvertConfig::from(app);
        if let Some(ext) = &self.ext {
            config.extension = ext.trim_start_matches('.').to_string();
        }
        if self.recursive {
            config.recursive = true;
        }
        if let Some(dir) = &self.outdir {
            config.output_dir = Some(dir.clone());
        }
        if let Some(writer) = self.writer {
            config.writer = writer;
        }
        config
    }
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
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

/// Initialize tracing based on CLI flags. Logs go to stderr.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "notebookify=info",
        1 => "notebookify=debug",
        _ => "notebookify=trace",
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
pub(crate) fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Some(Command::Config { action }) => {
            match action {
                ConfigAction::Init => cmd_config_init()?,
                ConfigAction::Show => cmd_config_show(cli.config.as_deref())?,
            }
            Ok(ExitCode::SUCCESS)
        }
        None => cmd_convert(&cli.convert, cli.config.as_deref()),
    }
}

/// Exit status for errors that stop a batch before it starts.
pub(crate) fn exit_code_for(err: &NotebookError) -> u8 {
    match err {
        NotebookError::NotFound { .. } | NotebookError::OutputDir { .. } => 2,
        _ => 1,
    }
}

fn load_app_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    Ok(config)
}

fn cmd_convert(args: &ConvertArgs, config_path: Option<&Path>) -> Result<ExitCode> {
    let path = args
        .path
        .as_deref()
        .ok_or_else(|| eyre!("missing <PATH>: pass a script or a folder of scripts"))?;

    let app = load_app_config(config_path)?;
    let config = args.to_convert_config(&app);
    debug!(?config, "resolved conversion config");

    info!(
        path = %path.display(),
        recursive = config.recursive,
        writer = ?config.writer,
        "converting"
    );

    let plan = match notebookify_core::plan(path, &config) {
        Ok(plan) => plan,
        Err(e) => {
            eprintln!("{e}");
            return Ok(ExitCode::from(exit_code_for(&e)));
        }
    };

    let reporter = CliProgress::new();
    let report = notebookify_core::run_batch(&plan, &config, &mut RandomIds, &reporter);

    if !report.failed.is_empty() {
        eprintln!(
            "{} converted, {} failed",
            report.converted.len(),
            report.failed.len()
        );
    }

    Ok(ExitCode::from(exit_code_for_report(&report)))
}

/// Exit status once a batch has run: success if anything converted.
pub(crate) fn exit_code_for_report(report: &BatchReport) -> u8 {
    if report.any_converted() { 0 } else { 1 }
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config = load_app_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif bar.
///
/// Result lines go to stdout; the bar draws on stderr and hides itself when
/// stderr is not a terminal.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} [{pos}/{len}] {wide_msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Self { bar }
    }
}

impl ProgressReporter for CliProgress {
    fn started(&self, total: usize) {
        self.bar.set_length(total as u64);
    }

    fn converted(&self, file: &ConvertedFile, _current: usize, _total: usize) {
        self.bar.inc(1);
        self.bar.set_message(file.input.display().to_string());
        self.bar.suspend(|| {
            println!(
                "Converted: {} -> {}",
                file.input.display(),
                file.output.display()
            );
        });
    }

    fn failed(&self, input: &Path, _error: &NotebookError, _current: usize, _total: usize) {
        self.bar.inc(1);
        self.bar.set_message(format!("failed: {}", input.display()));
    }

    fn done(&self, _report: &BatchReport) {
        self.bar.finish_and_clear();
    }
}
