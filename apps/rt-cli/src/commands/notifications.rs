// notifications.rs — Inbox subcommands: list, read.

use clap::Subcommand;
use uuid::Uuid;

use super::{truncate, Context};

#[derive(Subcommand)]
pub enum NotificationCommands {
    /// List the acting user's notifications, newest first.
    List {
        /// Only unread notifications.
        #[arg(long)]
        unread: bool,
    },
    /// Mark one notification (or all of them) read.
    Read {
        /// Notification ID.
        #[arg(required_unless_present = "all")]
        id: Option<Uuid>,
        /// Mark every unread notification read.
        #[arg(long, conflicts_with = "id")]
        all: bool,
    },
}

pub fn execute(cmd: &NotificationCommands, ctx: &Context) -> anyhow::Result<()> {
    let actor = ctx.actor()?;
    match cmd {
        NotificationCommands::List { unread } => {
            let inbox = ctx.tracker.inbox(&actor, *unread)?;
            if inbox.is_empty() {
                println!("No notifications.");
                return Ok(());
            }
            println!(
                "{:<38} {:<14} {:<6} {:<17} MESSAGE",
                "ID", "KIND", "READ", "CREATED"
            );
            println!("{}", "-".repeat(120));
            for n in &inbox {
                println!(
                    "{:<38} {:<14} {:<6} {:<17} {}",
                    n.id,
                    n.kind.to_string(),
                    if n.read { "yes" } else { "no" },
                    n.created_at.format("%Y-%m-%d %H:%M"),
                    truncate(&n.message, 60),
                );
            }
            println!("\n{} unread.", ctx.tracker.unread_count(&actor)?);
        }
        NotificationCommands::Read { all: true, .. } => {
            let changed = ctx.tracker.mark_all_read(&actor)?;
            println!("Marked {} notification(s) read.", changed);
        }
        NotificationCommands::Read { id: Some(id), .. } => {
            if ctx.tracker.mark_read(&actor, *id)? {
                println!("Notification {} marked read.", id);
            } else {
                println!("Notification {} was already read.", id);
            }
        }
        NotificationCommands::Read { id: None, .. } => {
            anyhow::bail!("give a notification ID or --all");
        }
    }
    Ok(())
}
