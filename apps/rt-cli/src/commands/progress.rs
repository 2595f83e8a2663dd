// progress.rs — Progress subcommands: init, show, list, complete, validate,
// reject, set-state.

use clap::Subcommand;
use rt_progress::{CompletionPayload, Participation, PhaseState, Progress, ReviewPayload};
use uuid::Uuid;

use super::{truncate, Context};

#[derive(Subcommand)]
pub enum ProgressCommands {
    /// Create progress records for a trainee registered before the catalog.
    Init {
        /// Trainee user ID.
        user_id: Uuid,
    },
    /// Show a trainee's phases and activities.
    Show {
        /// Trainee user ID.
        user_id: Uuid,
    },
    /// List every phase record in one state (as an administrator).
    List {
        /// locked, active, completed or validated.
        #[arg(long)]
        state: PhaseState,
    },
    /// Mark an activity completed (as the trainee).
    Complete {
        /// Progress record ID.
        progress_id: Uuid,
        /// Activity position within the record, starting at 0.
        index: usize,
        #[arg(long)]
        comments: Option<String>,
        #[arg(long)]
        surgery_type: Option<String>,
        #[arg(long)]
        surgeon: Option<String>,
        /// Share performed: 0, 25, 50, 75 or 100.
        #[arg(long)]
        participation: Option<u8>,
        /// Reference to an uploaded document.
        #[arg(long)]
        attachment: Option<String>,
    },
    /// Validate a completed activity (as a reviewer).
    Validate {
        progress_id: Uuid,
        index: usize,
        #[arg(long)]
        comments: Option<String>,
        #[arg(long)]
        signature: Option<String>,
    },
    /// Reject a completed activity (as a reviewer).
    Reject {
        progress_id: Uuid,
        index: usize,
        /// Reason shown to the trainee.
        #[arg(long)]
        comments: Option<String>,
    },
    /// Override a phase's state (as an administrator).
    SetState {
        progress_id: Uuid,
        /// locked, active, completed or validated.
        state: PhaseState,
    },
}

pub fn execute(cmd: &ProgressCommands, ctx: &Context) -> anyhow::Result<()> {
    match cmd {
        ProgressCommands::Init { user_id } => {
            let user = ctx.tracker.caller(*user_id)?;
            let created = ctx.tracker.initialize(&user)?;
            println!("Created {} progress record(s) for {}.", created, user.name);
            Ok(())
        }
        ProgressCommands::Show { user_id } => show(ctx, *user_id),
        ProgressCommands::List { state } => {
            let records = ctx.tracker.phases_in_state(&ctx.actor()?, *state)?;
            if records.is_empty() {
                println!("No {} phases.", state);
                return Ok(());
            }
            println!("{:<38} {:<38} {:<6} NAME", "PROGRESS", "TRAINEE", "PHASE");
            println!("{}", "-".repeat(110));
            for p in &records {
                println!(
                    "{:<38} {:<38} {:<6} {}",
                    p.id,
                    p.resident_id,
                    p.phase_number,
                    truncate(&p.phase_name, 28)
                );
            }
            Ok(())
        }
        ProgressCommands::Complete {
            progress_id,
            index,
            comments,
            surgery_type,
            surgeon,
            participation,
            attachment,
        } => {
            let participation = participation
                .map(Participation::try_from)
                .transpose()
                .map_err(|e| anyhow::anyhow!(e))?;
            let payload = CompletionPayload {
                comments: comments.clone(),
                surgery_type: surgery_type.clone(),
                surgeon_name: surgeon.clone(),
                participation,
                attachment: attachment.clone(),
            };
            let progress = ctx
                .tracker
                .mark_completed(&ctx.actor()?, *progress_id, *index, payload)?;
            print_activity_line(&progress, *index);
            Ok(())
        }
        ProgressCommands::Validate {
            progress_id,
            index,
            comments,
            signature,
        } => {
            let review = ReviewPayload {
                comments: comments.clone(),
                signature: signature.clone(),
            };
            let progress = ctx
                .tracker
                .validate(&ctx.actor()?, *progress_id, *index, review)?;
            print_activity_line(&progress, *index);
            if progress.state == PhaseState::Validated {
                println!("Phase {} '{}' validated.", progress.phase_number, progress.phase_name);
            }
            Ok(())
        }
        ProgressCommands::Reject {
            progress_id,
            index,
            comments,
        } => {
            let review = ReviewPayload {
                comments: comments.clone(),
                signature: None,
            };
            let progress = ctx
                .tracker
                .reject(&ctx.actor()?, *progress_id, *index, review)?;
            print_activity_line(&progress, *index);
            Ok(())
        }
        ProgressCommands::SetState { progress_id, state } => {
            let progress = ctx
                .tracker
                .admin_set_state(&ctx.actor()?, *progress_id, *state)?;
            println!(
                "Phase {} '{}' is now {}.",
                progress.phase_number, progress.phase_name, progress.state
            );
            Ok(())
        }
    }
}

fn show(ctx: &Context, user_id: Uuid) -> anyhow::Result<()> {
    let records = ctx.tracker.progress_for(&ctx.actor()?, user_id)?;
    if records.is_empty() {
        println!("No progress records.");
        return Ok(());
    }

    for p in &records {
        println!(
            "Phase {}: {:<30} {:<10} {}/{} validated  [{}]",
            p.phase_number,
            truncate(&p.phase_name, 28),
            p.state.to_string(),
            p.validated_count(),
            p.activities.len(),
            p.id
        );
        for (index, a) in p.activities.iter().enumerate() {
            println!(
                "  #{:<3} {:<40} {:<10} {}",
                index,
                truncate(&a.name, 38),
                a.state.to_string(),
                a.rejection_comments.as_deref().unwrap_or(""),
            );
        }
    }
    Ok(())
}

fn print_activity_line(progress: &Progress, index: usize) {
    if let Some(a) = progress.activities.get(index) {
        println!("'{}' is now {} (phase {} {}).", a.name, a.state, progress.phase_number, progress.state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::setup;
    use rt_progress::ActivityState;

    #[test]
    fn complete_then_validate_cascades() {
        let s = setup();
        let resident = s.ctx(Some(s.resident.id));
        let records = resident.tracker.progress_for(&s.resident, s.resident.id).unwrap();
        let first = records[0].id;

        let complete = ProgressCommands::Complete {
            progress_id: first,
            index: 0,
            comments: Some("done".into()),
            surgery_type: None,
            surgeon: None,
            participation: Some(100),
            attachment: None,
        };
        execute(&complete, &resident).unwrap();

        let tutor = s.ctx(Some(s.tutor.id));
        let validate = ProgressCommands::Validate {
            progress_id: first,
            index: 0,
            comments: None,
            signature: None,
        };
        execute(&validate, &tutor).unwrap();

        let records = tutor.tracker.progress_for(&s.tutor, s.resident.id).unwrap();
        assert_eq!(records[0].state, PhaseState::Validated);
        assert_eq!(records[0].activities[0].state, ActivityState::Validated);
        assert_eq!(records[1].state, PhaseState::Active);
    }

    #[test]
    fn bad_participation_is_refused() {
        let s = setup();
        let resident = s.ctx(Some(s.resident.id));
        let first = resident.tracker.progress_for(&s.resident, s.resident.id).unwrap()[0].id;
        let complete = ProgressCommands::Complete {
            progress_id: first,
            index: 0,
            comments: None,
            surgery_type: None,
            surgeon: None,
            participation: Some(40),
            attachment: None,
        };
        assert!(execute(&complete, &resident).is_err());
    }

    #[test]
    fn workflow_commands_need_an_actor() {
        let s = setup();
        let anonymous = s.ctx(None);
        let first = anonymous.tracker.progress_for(&s.admin, s.resident.id).unwrap()[0].id;
        let reject = ProgressCommands::Reject {
            progress_id: first,
            index: 0,
            comments: None,
        };
        assert!(execute(&reject, &anonymous).is_err());
    }

    #[test]
    fn list_by_state_needs_an_administrator() {
        let s = setup();
        let cmd = ProgressCommands::List {
            state: PhaseState::Locked,
        };
        execute(&cmd, &s.ctx(Some(s.admin.id))).unwrap();
        assert!(execute(&cmd, &s.ctx(Some(s.tutor.id))).is_err());
    }

    #[test]
    fn set_state_as_admin() {
        let s = setup();
        let admin = s.ctx(Some(s.admin.id));
        let second = admin.tracker.progress_for(&s.admin, s.resident.id).unwrap()[1].id;
        let cmd = ProgressCommands::SetState {
            progress_id: second,
            state: PhaseState::Active,
        };
        execute(&cmd, &admin).unwrap();
        // Same state again is refused.
        assert!(execute(&cmd, &admin).is_err());
    }
}
