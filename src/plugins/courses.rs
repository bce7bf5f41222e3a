//! Course catalog: the named training subjects offered for scheduling.
//!
//! Hiding a course only removes it from the pick list for new activities;
//! historical activities keep their snapshot of the name. Deleting a course
//! is refused while any activity references it.
//!
//! The listing queries tolerate database files that predate the `visible`
//! column: until `reconcile` has run, every course reports as visible.

use crate::core::db;
use crate::core::error;
use crate::core::outcome::{Outcome, Refusal};
use crate::core::output;
use crate::core::session;
use crate::core::store::Store;
use crate::plugins::{OutputFormat, report_write};
use clap::{Parser, Subcommand};
use colored::Colorize;
use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};

#[derive(Parser, Debug)]
#[clap(name = "course", about = "Manage the course catalog.")]
pub struct CourseCli {
    /// Output format for this command group.
    #[clap(long, global = true, value_enum, default_value = "text")]
    format: OutputFormat,
    #[clap(subcommand)]
    command: CourseCommand,
}

#[derive(Subcommand, Debug)]
pub enum CourseCommand {
    /// Add a new course.
    Add {
        #[clap(value_name = "NAME")]
        name: String,
        /// Create the course hidden from the scheduling pick list.
        #[clap(long)]
        hidden: bool,
    },
    /// List courses, ordered by name.
    List {
        /// Only courses offered for new activities.
        #[clap(long)]
        visible_only: bool,
    },
    /// Rename a course. Historical activities keep the old name.
    Rename {
        #[clap(long)]
        id: i64,
        #[clap(long)]
        name: String,
    },
    /// Offer the course for new activity scheduling.
    Show {
        #[clap(long)]
        id: i64,
    },
    /// Hide the course from new activity scheduling.
    Hide {
        #[clap(long)]
        id: i64,
    },
    /// Delete a course with no activities.
    Delete {
        #[clap(long)]
        id: i64,
        /// Skip the interactive confirmation.
        #[clap(long)]
        yes: bool,
    },
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Course {
    pub id: i64,
    pub name: String,
    pub visible: bool,
}

pub fn list_courses(conn: &Connection) -> Result<Vec<Course>, error::DrillbookError> {
    if db::column_exists(conn, "courses", "visible")? {
        let mut stmt = conn.prepare("SELECT id, name, visible FROM courses ORDER BY name")?;
        let rows = stmt.query_map([], |row| {
            Ok(Course {
                id: row.get(0)?,
                name: row.get(1)?,
                visible: row.get::<_, i64>(2)? != 0,
            })
        })?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    } else {
        // Pre-reconcile file: old structure, everything counts as visible.
        let mut stmt = conn.prepare("SELECT id, name FROM courses ORDER BY name")?;
        let rows = stmt.query_map([], |row| {
            Ok(Course {
                id: row.get(0)?,
                name: row.get(1)?,
                visible: true,
            })
        })?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }
}

pub fn list_visible_courses(conn: &Connection) -> Result<Vec<Course>, error::DrillbookError> {
    if !db::column_exists(conn, "courses", "visible")? {
        return list_courses(conn);
    }
    let mut stmt =
        conn.prepare("SELECT id, name, visible FROM courses WHERE visible = 1 ORDER BY name")?;
    let rows = stmt.query_map([], |row| {
        Ok(Course {
            id: row.get(0)?,
            name: row.get(1)?,
            visible: row.get::<_, i64>(2)? != 0,
        })
    })?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Insert a course, returning the generated id. A taken name yields a
/// `DuplicateKey` refusal.
pub fn insert_course(
    conn: &Connection,
    name: &str,
    visible: bool,
) -> Result<Outcome<i64>, error::DrillbookError> {
    let result = conn.execute(
        "INSERT INTO courses (name, visible) VALUES (?1, ?2)",
        params![name, visible as i64],
    );
    match result {
        Ok(_) => Ok(Outcome::Applied(conn.last_insert_rowid())),
        Err(e) if db::is_unique_violation(&e) => Ok(Outcome::Refused(Refusal::DuplicateKey)),
        Err(e) => Err(e.into()),
    }
}

/// Rename a course. `Applied(true)` means a row changed; renaming onto an
/// existing name is refused.
pub fn update_course(
    conn: &Connection,
    course_id: i64,
    name: &str,
) -> Result<Outcome<bool>, error::DrillbookError> {
    let result = conn.execute(
        "UPDATE courses SET name = ?1 WHERE id = ?2",
        params![name, course_id],
    );
    match result {
        Ok(affected) => Ok(Outcome::Applied(affected > 0)),
        Err(e) if db::is_unique_violation(&e) => Ok(Outcome::Refused(Refusal::DuplicateKey)),
        Err(e) => Err(e.into()),
    }
}

/// Delete a course. Refused with `HasDependents` while any activity
/// references it.
pub fn delete_course(
    conn: &Connection,
    course_id: i64,
) -> Result<Outcome<bool>, error::DrillbookError> {
    let referenced: i64 = conn.query_row(
        "SELECT COUNT(*) FROM activities WHERE course_id = ?1",
        params![course_id],
        |row| row.get(0),
    )?;
    if referenced > 0 {
        return Ok(Outcome::Refused(Refusal::HasDependents));
    }

    let affected = conn.execute("DELETE FROM courses WHERE id = ?1", params![course_id])?;
    Ok(Outcome::Applied(affected > 0))
}

/// Set the visibility flag, reconciling the schema first when the column is
/// missing. Returns whether a row changed.
pub fn set_course_visibility(
    conn: &Connection,
    course_id: i64,
    visible: bool,
) -> Result<bool, error::DrillbookError> {
    if !db::column_exists(conn, "courses", "visible")? {
        db::reconcile(conn)?;
    }
    let affected = conn.execute(
        "UPDATE courses SET visible = ?1 WHERE id = ?2",
        params![visible as i64, course_id],
    )?;
    Ok(affected > 0)
}

pub fn run_course_cli(store: &Store, cli: CourseCli) -> Result<(), error::DrillbookError> {
    let conn = store.open()?;
    match cli.command {
        CourseCommand::Add { name, hidden } => match insert_course(&conn, &name, !hidden)? {
            Outcome::Applied(id) => report_write(cli.format, "course added", &id.to_string(), None),
            Outcome::Refused(r) => report_write(cli.format, "course not added", &name, Some(r)),
        },
        CourseCommand::List { visible_only } => {
            let courses = if visible_only {
                list_visible_courses(&conn)?
            } else {
                list_courses(&conn)?
            };
            match cli.format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&courses).unwrap_or_default())
                }
                OutputFormat::Text => {
                    let rows: Vec<Vec<String>> = courses
                        .iter()
                        .map(|c| {
                            vec![
                                c.id.to_string(),
                                c.name.clone(),
                                if c.visible { "visible" } else { "hidden" }.to_string(),
                            ]
                        })
                        .collect();
                    println!("{}", output::render_table(&["id", "name", "status"], &rows));
                }
            }
        }
        CourseCommand::Rename { id, name } => match update_course(&conn, id, &name)? {
            Outcome::Applied(true) => report_write(cli.format, "course renamed", &id.to_string(), None),
            Outcome::Applied(false) => {
                println!("{} no course with id {}", "✗".bright_red(), id)
            }
            Outcome::Refused(r) => {
                report_write(cli.format, "course not renamed", &id.to_string(), Some(r))
            }
        },
        CourseCommand::Show { id } => {
            if set_course_visibility(&conn, id, true)? {
                report_write(cli.format, "course shown", &id.to_string(), None);
            } else {
                println!("{} no course with id {}", "✗".bright_red(), id);
            }
        }
        CourseCommand::Hide { id } => {
            if set_course_visibility(&conn, id, false)? {
                report_write(cli.format, "course hidden", &id.to_string(), None);
            } else {
                println!("{} no course with id {}", "✗".bright_red(), id);
            }
        }
        CourseCommand::Delete { id, yes } => {
            if !session::confirm_delete("course", &id.to_string(), yes)? {
                println!("{} delete cancelled", "✗".bright_yellow());
                return Ok(());
            }
            match delete_course(&conn, id)? {
                Outcome::Applied(true) => {
                    report_write(cli.format, "course deleted", &id.to_string(), None)
                }
                Outcome::Applied(false) => {
                    println!("{} no course with id {}", "✗".bright_red(), id)
                }
                Outcome::Refused(r) => {
                    report_write(cli.format, "course not deleted", &id.to_string(), Some(r))
                }
            }
        }
    }
    Ok(())
}
