//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use nbpress_core::{ConvertConfig, ConvertResult, ProgressReporter};
use nbpress_shared::{AppConfig, ArtifactPaths, filtered_path, init_config, load_config};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// nbpress: notebook to PDF, outputs only.
#[derive(Parser)]
#[command(
    name = "nbpress",
    version,
    about = "Render a Jupyter notebook to PDF with code cells hidden, keeping markdown and outputs.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Defaults to `convert` on the configured input.
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
    /// Strip code and render the notebook to PDF.
    Convert(ConvertArgs),

    /// Strip code sources and write the filtered notebook, without rendering.
    Strip {
        /// Notebook to filter (defaults to the configured input).
        input: Option<PathBuf>,

        /// Filtered notebook path (defaults to <input>_filtered.ipynb).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Arguments for `convert`.
#[derive(Args, Default)]
pub(crate) struct ConvertArgs {
    /// Notebook to convert (defaults to the configured input).
    pub input: Option<PathBuf>,

    /// PDF to write (defaults to <input>.pdf, or the configured output).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Keep the filtered notebook and HTML after success.
    #[arg(long)]
    pub keep_intermediates: bool,

    /// Fail instead of installing playwright when it is missing.
    #[arg(long)]
    pub no_install: bool,
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

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    // Progress goes to the spinner, so logs stay quiet unless asked for.
    let filter = match cli.verbose {
        0 => "nbpress=warn",
        1 => "nbpress=info",
        2 => "nbpress=debug",
        _ => "nbpress=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
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
    match cli.command {
        None => cmd_convert(ConvertArgs::default()).await,
        Some(Command::Convert(args)) => cmd_convert(args).await,
        Some(Command::Strip { input, output }) => cmd_strip(input, output),
        Some(Command::Config { action }) => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

/// Resolve input and output paths: explicit flags, then config defaults.
///
/// An explicit input without an explicit output writes `<input>.pdf` next to it.
fn resolve_paths(args: &ConvertArgs, config: &AppConfig) -> ArtifactPaths {
    let input = args
        .input
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.defaults.input));

    let pdf = match (&args.output, &args.input) {
        (Some(out), _) => out.clone(),
        (None, Some(input)) => input.with_extension("pdf"),
        (None, None) => PathBuf::from(&config.defaults.output),
    };

    ArtifactPaths::derive(input, pdf)
}

async fn cmd_convert(args: ConvertArgs) -> Result<()> {
    let config = load_config()?;

    let mut convert_config = ConvertConfig::new(resolve_paths(&args, &config), &config);
    convert_config.keep_intermediates |= args.keep_intermediates;
    if args.no_install {
        convert_config.auto_install = false;
    }

    info!(
        input = %convert_config.paths.input.display(),
        pdf = %convert_config.paths.pdf.display(),
        "converting notebook"
    );

    let reporter = CliProgress::new()?;
    let result = nbpress_core::convert(&convert_config, &reporter).await;
    reporter.spinner.finish_and_clear();

    let result = match result {
        Ok(result) => result,
        Err(e) => {
            eprintln!("\n  Conversion failed.");
            return Err(e.into());
        }
    };

    println!();
    println!("  ✓ PDF successfully created: {}", result.pdf.display());
    println!(
        "  Cells:  {} ({} code cells hidden, {} lines)",
        result.summary.cells, result.summary.code_cells, result.summary.lines_removed
    );
    if result.installed_playwright {
        println!("  Installed playwright and chromium");
    }
    for path in &result.kept {
        println!("  Kept:   {}", path.display());
    }
    println!("  Time:   {:.1}s", result.elapsed.as_secs_f64());
    println!();

    Ok(())
}

fn cmd_strip(input: Option<PathBuf>, output: Option<PathBuf>) -> Result<()> {
    let config = load_config()?;
    let input = input.unwrap_or_else(|| PathBuf::from(&config.defaults.input));
    let output = output.unwrap_or_else(|| filtered_path(&input));

    println!("Filtering notebook to remove code cells: {}", input.display());
    let summary = nbpress_core::strip(&input, &output)?;

    println!(
        "  ✓ Wrote {} ({} cells, {} code cells stripped)",
        output.display(),
        summary.cells,
        summary.code_cells
    );
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
    fn new() -> Result<Self> {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")?
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Ok(Self { spinner })
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn artifact_retained(&self, path: &Path, hint: &str) {
        self.spinner.suspend(|| {
            eprintln!("\n  Intermediate file saved at: {}", path.display());
            eprintln!("  {hint}");
        });
    }

    fn done(&self, _result: &ConvertResult) {
        self.spinner.finish_and_clear();
    }
}

// ---------------------------------------------------------------------------
// Config commands
// ---------------------------------------------------------------------------

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
