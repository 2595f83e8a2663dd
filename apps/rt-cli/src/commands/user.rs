// user.rs — User subcommands: add, list.

use clap::Subcommand;
use rt_directory::{Role, User};

use super::{truncate, Context};

#[derive(Subcommand)]
pub enum UserCommands {
    /// Register a user. Residents and participants get their progress
    /// records immediately.
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// resident, participant, tutor, coordinator (csm), professor or administrator.
        #[arg(long)]
        role: Role,
        #[arg(long)]
        hospital: Option<String>,
        #[arg(long)]
        specialty: Option<String>,
        #[arg(long)]
        zone: Option<String>,
        #[arg(long)]
        society: Option<String>,
    },
    /// List registered users.
    List {
        /// Only users with this role.
        #[arg(long)]
        role: Option<Role>,
    },
}

pub fn execute(cmd: &UserCommands, ctx: &Context) -> anyhow::Result<()> {
    match cmd {
        UserCommands::Add {
            name,
            email,
            role,
            hospital,
            specialty,
            zone,
            society,
        } => {
            let mut user = User::new(name, email, *role);
            user.hospital = hospital.clone();
            user.specialty = specialty.clone();
            user.zone = zone.clone();
            user.society = society.clone();
            add(ctx, &user)
        }
        UserCommands::List { role } => list(ctx, *role),
    }
}

fn add(ctx: &Context, user: &User) -> anyhow::Result<()> {
    let initialized = ctx.tracker.register_user(user)?;
    println!("User registered: {}", user.id);
    println!("  Name:  {}", user.name);
    println!("  Role:  {}", user.role);
    println!("  Track: {}", user.track);
    if user.role.is_trainee() {
        println!("  Progress records created: {}", initialized);
    }
    Ok(())
}

fn list(ctx: &Context, role: Option<Role>) -> anyhow::Result<()> {
    let users = match role {
        Some(role) => ctx.tracker.users().list_by_role(role)?,
        None => ctx.tracker.users().list()?,
    };
    if users.is_empty() {
        println!("No users found.");
        return Ok(());
    }

    println!(
        "{:<38} {:<24} {:<14} {:<20} SCOPE",
        "ID", "NAME", "ROLE", "HOSPITAL"
    );
    println!("{}", "-".repeat(110));
    for u in &users {
        let scope = u
            .society
            .as_deref()
            .or(u.zone.as_deref())
            .unwrap_or("-");
        println!(
            "{:<38} {:<24} {:<14} {:<20} {}",
            u.id,
            truncate(&u.name, 22),
            u.role.to_string(),
            truncate(u.hospital.as_deref().unwrap_or("-"), 18),
            scope,
        );
    }
    println!("\n{} user(s) total.", users.len());
    Ok(())
}
