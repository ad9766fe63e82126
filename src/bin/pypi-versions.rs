use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use pypi_versions::config::RunConfig;
use pypi_versions::error::{Error, Result};
use pypi_versions::index::PackageIndex;
use pypi_versions::models::{ReleaseMetadata, ReleaseUrl};
use pypi_versions::{RunSummary, init_tracing, run, run_wrapped};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const BIN_NAME: &str = env!("CARGO_BIN_NAME");

#[derive(Parser, Debug)]
#[command(name = BIN_NAME)]
#[command(about = "Publish the latest PyPI releases of a package list as HTML, YAML and RSS", long_about = None)]
#[command(version = VERSION)]
#[command(args_conflicts_with_subcommands = true)]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to configuration file - shorthand for `run <CONFIG>`
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Color output mode (also respects NO_COLOR and FORCE_COLOR env vars)
    #[arg(
        long,
        visible_alias = "colour",
        value_enum,
        default_value = "auto",
        global = true
    )]
    color: ColorMode,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ColorMode {
    /// Auto-detect based on terminal
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run with a structured YAML configuration file
    Run {
        /// Path to configuration file
        config: PathBuf,
    },
    /// Run for an OpenStack package category
    Category {
        /// Category name, e.g. "clients"
        category: String,
        /// Directory holding openstack_<category>_versions.yaml and pypi_versions.tmpl
        path: PathBuf,
    },
}

/// Advances a progress bar for every package queried
struct ProgressIndex<I> {
    inner: I,
    bar: ProgressBar,
}

impl<I: PackageIndex> PackageIndex for ProgressIndex<I> {
    async fn latest_releases(&self, name: &str) -> Result<Vec<String>> {
        self.bar.set_message(name.to_string());
        let releases = self.inner.latest_releases(name).await;
        self.bar.inc(1);
        releases
    }

    async fn release_urls(&self, name: &str, version: &str) -> Result<Vec<ReleaseUrl>> {
        self.inner.release_urls(name, version).await
    }

    async fn release_metadata(&self, name: &str, version: &str) -> Result<ReleaseMetadata> {
        self.inner.release_metadata(name, version).await
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_tracing();

    let args = Args::parse();

    configure_colors(args.color);

    tracing::info!("{BIN_NAME} version {VERSION}");

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("{} {}", "error:".red().bold(), e);
            process::exit(1);
        }
    };

    match execute(&config).await {
        Ok(summary) => print_summary(&summary),
        Err(e) => {
            tracing::error!("Run failed: {}", e);
            eprintln!("{} {}", "error:".red().bold(), e);
            process::exit(1);
        }
    }
}

fn load_config(args: &Args) -> Result<RunConfig> {
    match &args.command {
        Some(Commands::Run { config }) => RunConfig::load(config),
        Some(Commands::Category { category, path }) => RunConfig::for_category(category, path),
        None => {
            // Bare positional path, falling back to the per-user default
            let path = args
                .config
                .clone()
                .or_else(RunConfig::default_path)
                .ok_or_else(|| Error::Config {
                    msg: "No configuration file given and no default location available"
                        .to_string(),
                })?;
            RunConfig::load(&path)
        }
    }
}

async fn execute(config: &RunConfig) -> Result<RunSummary> {
    if !std::io::stdout().is_terminal() {
        return run(config).await;
    }

    let bar = ProgressBar::new(config.packages.len() as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    let result = run_wrapped(config, |client| ProgressIndex {
        inner: client,
        bar: bar.clone(),
    })
    .await;
    bar.finish_and_clear();
    result
}

fn print_summary(summary: &RunSummary) {
    if !std::io::stdout().is_terminal() {
        return;
    }

    println!("{}", "Run Summary".bold());
    println!("  Packages:   {}", summary.packages);
    println!("  Found:      {}", summary.found.to_string().green());
    println!("  Skipped:    {}", summary.skipped().to_string().yellow());
    for path in &summary.written {
        println!("  {} {}", "✓".green().bold(), path.display());
    }
}

fn configure_colors(mode: ColorMode) {
    // Check environment variables first (they take precedence)
    if std::env::var("NO_COLOR").is_ok() {
        colored::control::set_override(false);
        return;
    }
    if std::env::var("FORCE_COLOR").is_ok() {
        colored::control::set_override(true);
        return;
    }

    match mode {
        ColorMode::Auto => {}
        ColorMode::Always => colored::control::set_override(true),
        ColorMode::Never => colored::control::set_override(false),
    }
}
