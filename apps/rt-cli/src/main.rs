//! # rt-cli
//!
//! Command-line interface for the Residency Tracker.
//!
//! - `rt curriculum import/list/reorder` — manage the phase catalogs
//! - `rt user add/list` — the user directory (trainees are initialized on add)
//! - `rt progress init/show/list/complete/validate/reject/set-state` — the workflow
//! - `rt notifications list/read` — a user's inbox
//! - `rt report` — progress summary and certificate eligibility
//! - `rt audit verify/tail` — inspect the hash-chained transition log
//! - `rt serve` — start the HTTP daemon
//!
//! Workflow commands act on behalf of the user given with `--as <user-id>`.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use rt_progress::TrackerConfig;

/// Residency Tracker CLI — curricula, trainee progress and reviews.
#[derive(Parser)]
#[command(name = "rt", version, about)]
struct Cli {
    /// Project root directory (defaults to current directory).
    #[arg(long, default_value = ".")]
    project_root: PathBuf,

    /// Act as this user (required by workflow and inbox commands).
    #[arg(long = "as", global = true)]
    actor: Option<Uuid>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage phase catalogs.
    Curriculum {
        #[command(subcommand)]
        command: commands::curriculum::CurriculumCommands,
    },
    /// Manage the user directory.
    User {
        #[command(subcommand)]
        command: commands::user::UserCommands,
    },
    /// Inspect and advance trainee progress.
    Progress {
        #[command(subcommand)]
        command: commands::progress::ProgressCommands,
    },
    /// Read the acting user's notifications.
    Notifications {
        #[command(subcommand)]
        command: commands::notifications::NotificationCommands,
    },
    /// Progress summary for one trainee.
    Report {
        /// Trainee user ID.
        user_id: Uuid,
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Inspect the audit trail.
    Audit {
        #[command(subcommand)]
        command: commands::audit::AuditCommands,
    },
    /// Start the HTTP daemon.
    Serve {
        /// Listen address, overriding tracker.toml.
        #[arg(long)]
        bind: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("rt_progress=warn".parse()?)
                .add_directive("rt_curriculum=warn".parse()?),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();
    let project_root = cli.project_root.canonicalize().unwrap_or(cli.project_root);
    let config = TrackerConfig::load(&project_root)?;

    let actor = cli.actor;
    let open = move |config| commands::Context::open(config, actor);

    match &cli.command {
        Commands::Curriculum { command } => commands::curriculum::execute(command, &open(config)?),
        Commands::User { command } => commands::user::execute(command, &open(config)?),
        Commands::Progress { command } => commands::progress::execute(command, &open(config)?),
        Commands::Notifications { command } => {
            commands::notifications::execute(command, &open(config)?)
        }
        Commands::Report { user_id, json } => {
            commands::report::execute(&open(config)?, *user_id, *json)
        }
        Commands::Audit { command } => commands::audit::execute(command, &config),
        Commands::Serve { bind } => commands::serve::execute(config, bind.as_deref()),
    }
}
