pub mod artifacts;
pub mod config;
pub mod error;
pub mod index;
pub mod models;
pub mod snapshot;

use artifacts::{PageTemplate, render_artifacts};
use config::RunConfig;
use error::Result;
use index::{PackageIndex, PypiClient};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber for logging
/// Uses journald when running unattended (no terminal), fmt when running interactively
pub fn init_tracing() {
    let env_filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "pypi_versions=info".into())
    };

    if !std::io::stdout().is_terminal() {
        match tracing_journald::layer() {
            Ok(journald) => {
                tracing_subscriber::registry()
                    .with(env_filter())
                    .with(journald)
                    .init();
                return;
            }
            Err(e) => eprintln!("journald unavailable ({}), logging to stderr", e),
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .init();
}

/// Outcome of a completed run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub packages: usize,
    pub found: usize,
    pub written: Vec<PathBuf>,
}

impl RunSummary {
    pub fn skipped(&self) -> usize {
        self.packages.saturating_sub(self.found)
    }
}

/// Poll PyPI and write the configured artifacts
pub async fn run(config: &RunConfig) -> Result<RunSummary> {
    run_wrapped(config, |client| client).await
}

/// Like [`run`], querying PyPI through the index built by `wrap`
///
/// The template is compiled before the index client is created, so a
/// missing or broken template aborts the run without touching the network.
pub async fn run_wrapped<W, I>(config: &RunConfig, wrap: W) -> Result<RunSummary>
where
    W: FnOnce(PypiClient) -> I,
    I: PackageIndex,
{
    let template = PageTemplate::load(&config.files.template)?;
    let client = PypiClient::new(&config.index_url)?;
    run_with_index(config, &template, &wrap(client)).await
}

/// Poll `index` and write the configured artifacts
pub async fn run_with_index<I: PackageIndex>(
    config: &RunConfig,
    template: &PageTemplate,
    index: &I,
) -> Result<RunSummary> {
    tracing::info!(
        packages = config.packages.len(),
        index = %config.index_url,
        "Polling package index"
    );

    let snapshot = snapshot::build_snapshot(config, index).await?;
    let written = render_artifacts(&snapshot, config, template).await?;

    Ok(RunSummary {
        packages: config.packages.len(),
        found: snapshot.records.len(),
        written,
    })
}
