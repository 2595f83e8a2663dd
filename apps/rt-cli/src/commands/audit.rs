// audit.rs — Audit subcommands: verify, tail.

use std::path::PathBuf;

use clap::Subcommand;
use rt_audit::{AuditError, AuditTrail};
use rt_progress::TrackerConfig;

#[derive(Subcommand)]
pub enum AuditCommands {
    /// Verify the audit trail hash chain.
    Verify {
        /// Path to the audit log (defaults to .rt/audit.jsonl).
        #[arg(long)]
        log: Option<PathBuf>,
    },
    /// Show recent transitions.
    Tail {
        /// Path to the audit log (defaults to .rt/audit.jsonl).
        #[arg(long)]
        log: Option<PathBuf>,
        /// Number of entries to show.
        #[arg(short, default_value = "10")]
        n: usize,
    },
}

pub fn execute(cmd: &AuditCommands, config: &TrackerConfig) -> anyhow::Result<()> {
    match cmd {
        AuditCommands::Verify { log } => {
            let path = log.clone().unwrap_or_else(|| config.audit_log.clone());
            if !path.exists() {
                println!("No audit log found at {}", path.display());
                return Ok(());
            }

            match AuditTrail::verify(&path) {
                Ok(count) => {
                    println!("Audit log verified: {} entr(ies), hash chain intact.", count);
                }
                Err(AuditError::IntegrityViolation {
                    line,
                    expected,
                    actual,
                }) => {
                    println!("INTEGRITY VIOLATION at line {}:", line);
                    println!("  Expected previous_hash: {}", expected);
                    println!("  Actual previous_hash:   {}", actual);
                    anyhow::bail!("audit log integrity check failed");
                }
                Err(e) => return Err(e.into()),
            }
        }

        AuditCommands::Tail { log, n } => {
            let path = log.clone().unwrap_or_else(|| config.audit_log.clone());
            if !path.exists() {
                println!("No audit log found at {}", path.display());
                return Ok(());
            }

            let entries = AuditTrail::read_all(&path)?;
            let recent = &entries[entries.len().saturating_sub(*n)..];
            if recent.is_empty() {
                println!("No audit entries.");
                return Ok(());
            }

            println!(
                "{:<20} {:<22} {:<38} SUBJECT",
                "TIMESTAMP", "ACTION", "ACTOR"
            );
            println!("{}", "-".repeat(120));
            for entry in recent {
                println!(
                    "{:<20} {:<22} {:<38} {}",
                    entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    entry.action,
                    entry
                        .actor_id
                        .map(|id| id.to_string())
                        .unwrap_or_else(|| "system".to_string()),
                    entry
                        .subject_id
                        .map(|id| id.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                );
            }
        }
    }

    Ok(())
}
