// report.rs — Progress report for one trainee.

use uuid::Uuid;

use super::{truncate, Context};

pub fn execute(ctx: &Context, user_id: Uuid, json: bool) -> anyhow::Result<()> {
    let report = ctx.tracker.report(&ctx.actor()?, user_id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Trainee: {} ({})", report.resident_name, report.resident_id);
    println!("Track:   {}", report.track);
    println!();
    println!("{:<6} {:<32} {:<10} VALIDATED", "PHASE", "NAME", "STATE");
    println!("{}", "-".repeat(64));
    for phase in &report.phases {
        println!(
            "{:<6} {:<32} {:<10} {}/{}",
            phase.phase_number,
            truncate(&phase.phase_name, 30),
            phase.state.to_string(),
            phase.validated_activities,
            phase.total_activities,
        );
    }
    println!();
    println!(
        "Overall: {}/{} activities validated ({}%).",
        report.validated_activities, report.total_activities, report.percent_validated
    );
    if report.certificate_eligible {
        println!("Eligible for certificate.");
    } else {
        println!("Not yet eligible for certificate.");
    }
    Ok(())
}
