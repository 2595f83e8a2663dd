//! # rt-daemon
//!
//! Residency Tracker HTTP daemon.
//!
//! ```text
//! rt-daemon --project-root /srv/tracker --bind 0.0.0.0:8080
//! ```
//!
//! State lives under `<project-root>/.rt/`. The bind address defaults to the
//! `[http] bind` value of `.rt/tracker.toml`.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use rt_progress::{Tracker, TrackerConfig};

/// Residency Tracker HTTP daemon.
#[derive(Parser)]
#[command(name = "rt-daemon", about = "Residency Tracker HTTP daemon")]
struct Cli {
    /// Project root directory (defaults to current directory).
    #[arg(long, default_value = ".")]
    project_root: PathBuf,

    /// Listen address, overriding tracker.toml.
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("rt_progress=info".parse()?)
                .add_directive("rt_daemon=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();
    let project_root = cli.project_root.canonicalize()?;
    tracing::info!("Project root: {}", project_root.display());

    let config = TrackerConfig::load(&project_root)?;
    let bind = cli.bind.unwrap_or_else(|| config.settings.http.bind.clone());
    let tracker = Tracker::open(config)?;

    rt_daemon::serve(tracker, &bind).await
}
