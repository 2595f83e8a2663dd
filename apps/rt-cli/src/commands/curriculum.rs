// curriculum.rs — Curriculum subcommands: import, list, reorder.

use std::path::{Path, PathBuf};

use clap::Subcommand;
use rt_curriculum::Track;
use uuid::Uuid;

use super::{truncate, Context};

#[derive(Subcommand)]
pub enum CurriculumCommands {
    /// Replace a track's catalog with a JSON or YAML file.
    Import {
        /// Catalog file (.json, .yaml or .yml).
        file: PathBuf,
        /// Track the catalog belongs to (residency or society).
        #[arg(long, default_value = "residency")]
        track: Track,
    },
    /// List phases and activities of a track.
    List {
        #[arg(long, default_value = "residency")]
        track: Track,
    },
    /// Change the unlock order of a phase.
    Reorder {
        /// Phase ID.
        phase_id: Uuid,
        /// New order value (unique within the track).
        order: u32,
        #[arg(long, default_value = "residency")]
        track: Track,
    },
}

pub fn execute(cmd: &CurriculumCommands, ctx: &Context) -> anyhow::Result<()> {
    match cmd {
        CurriculumCommands::Import { file, track } => import(ctx, file, *track),
        CurriculumCommands::List { track } => list(ctx, *track),
        CurriculumCommands::Reorder {
            phase_id,
            order,
            track,
        } => {
            ctx.tracker.curriculum().reorder(*track, *phase_id, *order)?;
            println!("Phase {} now unlocks at position {}.", phase_id, order);
            Ok(())
        }
    }
}

fn import(ctx: &Context, file: &Path, track: Track) -> anyhow::Result<()> {
    let curriculum = ctx.tracker.curriculum().import_file(file, track)?;
    let activities: usize = curriculum.phases.iter().map(|p| p.activities.len()).sum();
    println!(
        "Imported {} curriculum: {} phase(s), {} activit(ies).",
        track,
        curriculum.phases.len(),
        activities
    );
    for phase in curriculum.phases_by_number() {
        if phase.activities.is_empty() {
            println!("  warning: phase {} '{}' has no activities and will be skipped", phase.number, phase.name);
        }
    }
    Ok(())
}

fn list(ctx: &Context, track: Track) -> anyhow::Result<()> {
    let phases = ctx.tracker.curriculum().phases_by_number(track)?;
    if phases.is_empty() {
        println!("No {} curriculum imported.", track);
        return Ok(());
    }

    for phase in &phases {
        println!(
            "Phase {} (order {}): {}  [{}]",
            phase.number, phase.order, phase.name, phase.id
        );
        for activity in &phase.activities {
            let mut flags = Vec::new();
            if activity.requires_validation {
                flags.push("validation");
            }
            if activity.requires_signature {
                flags.push("signature");
            }
            if activity.requires_percentage {
                flags.push("percentage");
            }
            if activity.requires_attachment {
                flags.push("attachment");
            }
            println!(
                "  {:>2}. {:<40} {:<12} {}",
                activity.order,
                truncate(&activity.name, 38),
                activity.kind.to_string(),
                flags.join(", ")
            );
        }
    }
    println!("\n{} phase(s) total.", phases.len());
    Ok(())
}
