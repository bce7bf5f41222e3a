//! Drillbook: roster and training-activity tracking over an embedded store.
//!
//! Drillbook keeps a unit's training administration in one local SQLite
//! file: the personnel roster (agents, some flagged as monitors), the course
//! catalog, a fixed set of shifts, and the scheduled activities binding a
//! date + shift + course to a monitor and a set of assigned participants.
//!
//! # Architecture
//!
//! ## Record store with explicit refusals
//!
//! The store enforces the rules SQLite does not express declaratively for
//! this schema: at most one activity per course per shift per day, no
//! deleting a course or agent that is still referenced, no duplicate
//! assignments. A write that would break a rule is *refused*, not failed:
//! operations return [`core::outcome::Outcome`] carrying a
//! [`core::outcome::Refusal`] reason (`DuplicateKey`, `DanglingReference`,
//! `HasDependents`) so callers can explain exactly why nothing changed.
//! Only storage-engine faults are errors.
//!
//! ## Snapshot denormalization
//!
//! Activities store copies of the course and monitor names taken at write
//! time. Renames do not rewrite history; an activity displays what was true
//! when it was scheduled.
//!
//! ## Schema management
//!
//! [`core::db::initialize`] creates the tables and seeds the shift
//! enumeration; [`core::db::reconcile`] applies the one additive patch (the
//! courses `visible` column). Both run on every start and are idempotent;
//! column presence is the only versioning mechanism.
//!
//! # Crate Structure
//!
//! - [`core`]: errors, connection/schema management, store resolution,
//!   outcome taxonomy, session state, output helpers
//! - [`plugins`]: entity subsystems (roster, courses, activities, stats)

pub mod core;
pub mod plugins;

use core::{db, error, store::Store};
use plugins::{activities, courses, roster, stats};

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    name = "drillbook",
    version = env!("CARGO_PKG_VERSION"),
    about = "Track a unit's training roster, courses, and scheduled activities."
)]
struct Cli {
    /// Directory holding the database (defaults to DRILLBOOK_HOME, then '.').
    #[clap(short, long, global = true)]
    dir: Option<PathBuf>,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the database and seed the default shifts.
    #[clap(name = "init")]
    Init,

    /// Manage the personnel roster
    #[clap(name = "agent", visible_alias = "a")]
    Agent(roster::RosterCli),

    /// Manage the course catalog
    #[clap(name = "course", visible_alias = "c")]
    Course(courses::CourseCli),

    /// Schedule and track activities
    #[clap(name = "activity", visible_alias = "act")]
    Activity(activities::ActivityCli),

    /// Summary statistics
    #[clap(name = "stats", visible_alias = "s")]
    Stats(stats::StatsCli),
}

pub fn run() -> Result<(), error::DrillbookError> {
    let cli = Cli::parse();
    let store = Store::resolve(cli.dir);

    // Every command starts by making the schema current: create-if-absent
    // plus the additive reconcile patch. Both are idempotent.
    {
        let conn = store.open().map_err(|e| {
            error::DrillbookError::DatabaseInitializationError(format!(
                "cannot open store at {}: {}",
                store.db_path().display(),
                e
            ))
        })?;
        db::initialize(&conn)?;
        db::reconcile(&conn)?;
    }

    match cli.command {
        Command::Init => {
            println!(
                "{} store ready at {}",
                "●".bright_green(),
                store.db_path().display().to_string().bright_white()
            );
        }
        Command::Agent(roster_cli) => roster::run_roster_cli(&store, roster_cli)?,
        Command::Course(course_cli) => courses::run_course_cli(&store, course_cli)?,
        Command::Activity(activity_cli) => activities::run_activity_cli(&store, activity_cli)?,
        Command::Stats(stats_cli) => stats::run_stats_cli(&store, stats_cli)?,
    }

    Ok(())
}
