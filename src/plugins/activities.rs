//! Scheduled activities: one course, on one date and shift, led by one
//! monitor, with zero or more assigned participants.
//!
//! The (date, shift, course) triple is unique. `course_name` and
//! `monitor_name` are snapshots taken when the row is written; later renames
//! do not touch them.

use crate::core::error;
use crate::core::outcome::{Outcome, Refusal};
use crate::core::output;
use crate::core::session;
use crate::core::store::Store;
use crate::plugins::{OutputFormat, report_write, validate_date};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};

#[derive(Parser, Debug)]
#[clap(name = "activity", about = "Schedule and track training activities.")]
pub struct ActivityCli {
    /// Output format for this command group.
    #[clap(long, global = true, value_enum, default_value = "text")]
    format: OutputFormat,
    #[clap(subcommand)]
    command: ActivityCommand,
}

#[derive(Subcommand, Debug)]
pub enum ActivityCommand {
    /// Schedule a new activity.
    Add {
        #[clap(long, value_parser = validate_date)]
        date: String,
        #[clap(long)]
        shift: String,
        /// Agent id of the leading monitor.
        #[clap(long)]
        monitor: String,
        /// Course id.
        #[clap(long)]
        course: i64,
    },
    /// List activities.
    List {
        /// Sort key: insertion id or date+shift schedule order.
        #[clap(long, value_enum, default_value = "schedule")]
        order: ActivityOrder,
    },
    /// List activities together with their assigned agents.
    Overview,
    /// List the available shifts.
    Shifts,
    /// Replace an activity's date, shift, monitor, course, and notes.
    Edit {
        #[clap(long)]
        id: i64,
        #[clap(long, value_parser = validate_date)]
        date: String,
        #[clap(long)]
        shift: String,
        #[clap(long)]
        monitor: String,
        #[clap(long)]
        course: i64,
        #[clap(long, default_value = "")]
        notes: String,
    },
    /// Assign an agent as participant of an activity.
    Assign {
        #[clap(long)]
        activity: i64,
        #[clap(long)]
        agent: String,
    },
    /// Delete an activity and its assignments.
    Delete {
        #[clap(long)]
        id: i64,
        /// Skip the interactive confirmation.
        #[clap(long)]
        yes: bool,
    },
}

/// Sort key for the single activity-listing primitive.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum ActivityOrder {
    /// Insertion order (ascending id).
    Insertion,
    /// Calendar order (date, then shift name).
    Schedule,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Activity {
    pub id: i64,
    pub date: String,
    pub shift: String,
    pub monitor_id: String,
    pub course_id: i64,
    /// Snapshot of the course name at write time.
    pub course_name: String,
    /// Snapshot of the monitor's display name at write time.
    pub monitor_name: String,
    pub notes: String,
}

/// Activity joined with its participants, flattened for display.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ActivityOverview {
    pub id: i64,
    pub date: String,
    pub shift: String,
    pub course: String,
    pub monitor: String,
    /// `"id, name surname; id, name surname"`, ordered by agent id.
    pub agents: String,
}

/// Fields the caller supplies when scheduling; names are denormalized here.
#[derive(Debug, Clone)]
pub struct ActivityDraft {
    pub date: String,
    pub shift: String,
    pub monitor_id: String,
    pub course_id: i64,
}

pub fn list_shifts(conn: &Connection) -> Result<Vec<String>, error::DrillbookError> {
    let mut stmt = conn.prepare("SELECT name FROM shifts ORDER BY name")?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn list_activities(
    conn: &Connection,
    order: ActivityOrder,
) -> Result<Vec<Activity>, error::DrillbookError> {
    let sql = match order {
        ActivityOrder::Insertion => {
            "SELECT id, date, shift, monitor_id, course_id, course_name, monitor_name, notes
             FROM activities ORDER BY id"
        }
        ActivityOrder::Schedule => {
            "SELECT id, date, shift, monitor_id, course_id, course_name, monitor_name, notes
             FROM activities ORDER BY date, shift"
        }
    };
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([], |row| {
        Ok(Activity {
            id: row.get(0)?,
            date: row.get(1)?,
            shift: row.get(2)?,
            monitor_id: row.get(3)?,
            course_id: row.get(4)?,
            course_name: row.get(5)?,
            monitor_name: row.get(6)?,
            notes: row.get::<_, Option<String>>(7)?.unwrap_or_default(),
        })
    })?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

fn triple_taken(
    conn: &Connection,
    date: &str,
    shift: &str,
    course_id: i64,
    exclude_id: Option<i64>,
) -> Result<bool, error::DrillbookError> {
    let count: i64 = match exclude_id {
        None => conn.query_row(
            "SELECT COUNT(*) FROM activities WHERE date = ?1 AND shift = ?2 AND course_id = ?3",
            params![date, shift, course_id],
            |row| row.get(0),
        )?,
        Some(id) => conn.query_row(
            "SELECT COUNT(*) FROM activities
             WHERE date = ?1 AND shift = ?2 AND course_id = ?3 AND id != ?4",
            params![date, shift, course_id, id],
            |row| row.get(0),
        )?,
    };
    Ok(count > 0)
}

fn shift_exists(conn: &Connection, shift: &str) -> Result<bool, error::DrillbookError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM shifts WHERE name = ?1",
        params![shift],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn course_name(conn: &Connection, course_id: i64) -> Result<Option<String>, error::DrillbookError> {
    let name = conn
        .query_row(
            "SELECT name FROM courses WHERE id = ?1",
            params![course_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(name)
}

fn monitor_name(conn: &Connection, monitor_id: &str) -> Result<Option<String>, error::DrillbookError> {
    let name = conn
        .query_row(
            "SELECT name, surname1 FROM agents WHERE id = ?1",
            params![monitor_id],
            |row| {
                let name: String = row.get(0)?;
                let surname1: String = row.get(1)?;
                Ok(format!("{} {}", name, surname1))
            },
        )
        .optional()?;
    Ok(name)
}

/// Schedule an activity. Refusals: `DuplicateKey` when the (date, shift,
/// course) triple is taken; `DanglingReference` when the shift, course, or
/// monitor does not resolve. Notes start empty. Returns the new id.
pub fn insert_activity(
    conn: &Connection,
    draft: &ActivityDraft,
) -> Result<Outcome<i64>, error::DrillbookError> {
    if triple_taken(conn, &draft.date, &draft.shift, draft.course_id, None)? {
        return Ok(Outcome::Refused(Refusal::DuplicateKey));
    }
    if !shift_exists(conn, &draft.shift)? {
        return Ok(Outcome::Refused(Refusal::DanglingReference));
    }
    let Some(course_name) = course_name(conn, draft.course_id)? else {
        return Ok(Outcome::Refused(Refusal::DanglingReference));
    };
    let Some(monitor_name) = monitor_name(conn, &draft.monitor_id)? else {
        return Ok(Outcome::Refused(Refusal::DanglingReference));
    };

    conn.execute(
        "INSERT INTO activities (date, shift, monitor_id, course_id, course_name, monitor_name, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, '')",
        params![
            draft.date,
            draft.shift,
            draft.monitor_id,
            draft.course_id,
            course_name,
            monitor_name,
        ],
    )?;
    Ok(Outcome::Applied(conn.last_insert_rowid()))
}

/// Full replace of date/shift/monitor/course/notes. Names are re-resolved
/// and re-denormalized from the (possibly changed) references; the triple is
/// re-checked excluding this row, so saving an unchanged activity succeeds.
pub fn update_activity(
    conn: &Connection,
    activity_id: i64,
    draft: &ActivityDraft,
    notes: &str,
) -> Result<Outcome<bool>, error::DrillbookError> {
    let Some(course_name) = course_name(conn, draft.course_id)? else {
        return Ok(Outcome::Refused(Refusal::DanglingReference));
    };
    let Some(monitor_name) = monitor_name(conn, &draft.monitor_id)? else {
        return Ok(Outcome::Refused(Refusal::DanglingReference));
    };
    if !shift_exists(conn, &draft.shift)? {
        return Ok(Outcome::Refused(Refusal::DanglingReference));
    }
    if triple_taken(conn, &draft.date, &draft.shift, draft.course_id, Some(activity_id))? {
        return Ok(Outcome::Refused(Refusal::DuplicateKey));
    }

    let affected = conn.execute(
        "UPDATE activities
         SET date = ?1, shift = ?2, monitor_id = ?3, course_id = ?4,
             course_name = ?5, monitor_name = ?6, notes = ?7
         WHERE id = ?8",
        params![
            draft.date,
            draft.shift,
            draft.monitor_id,
            draft.course_id,
            course_name,
            monitor_name,
            notes,
            activity_id,
        ],
    )?;
    Ok(Outcome::Applied(affected > 0))
}

/// Delete an activity and its assignment rows as one transaction; a fault in
/// either step rolls both back. Returns whether the activity row existed.
pub fn delete_activity(
    conn: &mut Connection,
    activity_id: i64,
) -> Result<bool, error::DrillbookError> {
    let tx = conn.transaction()?;
    tx.execute(
        "DELETE FROM assignments WHERE activity_id = ?1",
        params![activity_id],
    )?;
    let affected = tx.execute("DELETE FROM activities WHERE id = ?1", params![activity_id])?;
    tx.commit()?;
    Ok(affected > 0)
}

/// Assign an agent as participant. An existing pair is a `DuplicateKey`
/// no-op; an unknown activity or agent is a `DanglingReference`.
pub fn assign_agent(
    conn: &Connection,
    activity_id: i64,
    agent_id: &str,
) -> Result<Outcome<()>, error::DrillbookError> {
    let pair: i64 = conn.query_row(
        "SELECT COUNT(*) FROM assignments WHERE activity_id = ?1 AND agent_id = ?2",
        params![activity_id, agent_id],
        |row| row.get(0),
    )?;
    if pair > 0 {
        return Ok(Outcome::Refused(Refusal::DuplicateKey));
    }

    let activity: i64 = conn.query_row(
        "SELECT COUNT(*) FROM activities WHERE id = ?1",
        params![activity_id],
        |row| row.get(0),
    )?;
    let agent: i64 = conn.query_row(
        "SELECT COUNT(*) FROM agents WHERE id = ?1",
        params![agent_id],
        |row| row.get(0),
    )?;
    if activity == 0 || agent == 0 {
        return Ok(Outcome::Refused(Refusal::DanglingReference));
    }

    conn.execute(
        "INSERT INTO assignments (activity_id, agent_id) VALUES (?1, ?2)",
        params![activity_id, agent_id],
    )?;
    Ok(Outcome::Applied(()))
}

/// Every activity in schedule order, with its participants concatenated into
/// one display string (joined by agent id ascending).
pub fn activities_with_assignees(
    conn: &Connection,
) -> Result<Vec<ActivityOverview>, error::DrillbookError> {
    let activities = list_activities(conn, ActivityOrder::Schedule)?;

    let mut stmt = conn.prepare(
        "SELECT aa.agent_id, a.name, a.surname1
         FROM assignments aa
         JOIN agents a ON aa.agent_id = a.id
         WHERE aa.activity_id = ?1
         ORDER BY aa.agent_id",
    )?;

    let mut out = Vec::new();
    for activity in activities {
        let rows = stmt.query_map(params![activity.id], |row| {
            let id: String = row.get(0)?;
            let name: String = row.get(1)?;
            let surname1: String = row.get(2)?;
            Ok(format!("{}, {} {}", id, name, surname1))
        })?;
        let mut agents = Vec::new();
        for r in rows {
            agents.push(r?);
        }
        out.push(ActivityOverview {
            id: activity.id,
            date: activity.date,
            shift: activity.shift,
            course: activity.course_name,
            monitor: activity.monitor_name,
            agents: agents.join("; "),
        });
    }
    Ok(out)
}

pub fn run_activity_cli(store: &Store, cli: ActivityCli) -> Result<(), error::DrillbookError> {
    let mut conn = store.open()?;
    match cli.command {
        ActivityCommand::Add {
            date,
            shift,
            monitor,
            course,
        } => {
            let draft = ActivityDraft {
                date,
                shift,
                monitor_id: monitor,
                course_id: course,
            };
            match insert_activity(&conn, &draft)? {
                Outcome::Applied(id) => {
                    report_write(cli.format, "activity scheduled", &id.to_string(), None)
                }
                Outcome::Refused(r) => {
                    report_write(cli.format, "activity not scheduled", &draft.date, Some(r))
                }
            }
        }
        ActivityCommand::List { order } => {
            let activities = list_activities(&conn, order)?;
            match cli.format {
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&activities).unwrap_or_default()
                ),
                OutputFormat::Text => {
                    let rows: Vec<Vec<String>> = activities
                        .iter()
                        .map(|a| {
                            vec![
                                a.id.to_string(),
                                a.date.clone(),
                                a.shift.clone(),
                                a.course_name.clone(),
                                a.monitor_name.clone(),
                                output::compact_line(&a.notes, 40),
                            ]
                        })
                        .collect();
                    println!(
                        "{}",
                        output::render_table(
                            &["id", "date", "shift", "course", "monitor", "notes"],
                            &rows
                        )
                    );
                }
            }
        }
        ActivityCommand::Overview => {
            let overview = activities_with_assignees(&conn)?;
            match cli.format {
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&overview).unwrap_or_default()
                ),
                OutputFormat::Text => {
                    let rows: Vec<Vec<String>> = overview
                        .iter()
                        .map(|a| {
                            vec![
                                a.id.to_string(),
                                a.date.clone(),
                                a.shift.clone(),
                                a.course.clone(),
                                a.monitor.clone(),
                                output::compact_line(&a.agents, 60),
                            ]
                        })
                        .collect();
                    println!(
                        "{}",
                        output::render_table(
                            &["id", "date", "shift", "course", "monitor", "agents"],
                            &rows
                        )
                    );
                }
            }
        }
        ActivityCommand::Shifts => {
            for shift in list_shifts(&conn)? {
                println!("{}", shift);
            }
        }
        ActivityCommand::Edit {
            id,
            date,
            shift,
            monitor,
            course,
            notes,
        } => {
            let draft = ActivityDraft {
                date,
                shift,
                monitor_id: monitor,
                course_id: course,
            };
            match update_activity(&conn, id, &draft, &notes)? {
                Outcome::Applied(true) => {
                    report_write(cli.format, "activity updated", &id.to_string(), None)
                }
                Outcome::Applied(false) => {
                    println!("{} no activity with id {}", "✗".bright_red(), id)
                }
                Outcome::Refused(r) => {
                    report_write(cli.format, "activity not updated", &id.to_string(), Some(r))
                }
            }
        }
        ActivityCommand::Assign { activity, agent } => {
            match assign_agent(&conn, activity, &agent)? {
                Outcome::Applied(()) => report_write(
                    cli.format,
                    "agent assigned",
                    &format!("{} -> {}", agent, activity),
                    None,
                ),
                Outcome::Refused(r) => report_write(
                    cli.format,
                    "agent not assigned",
                    &format!("{} -> {}", agent, activity),
                    Some(r),
                ),
            }
        }
        ActivityCommand::Delete { id, yes } => {
            if !session::confirm_delete("activity", &id.to_string(), yes)? {
                println!("{} delete cancelled", "✗".bright_yellow());
                return Ok(());
            }
            if delete_activity(&mut conn, id)? {
                report_write(cli.format, "activity deleted", &id.to_string(), None);
            } else {
                println!("{} no activity with id {}", "✗".bright_red(), id);
            }
        }
    }
    Ok(())
}
