//! Read-only statistics over the store: headline counts and the per-course
//! activity distribution.
//!
//! The distribution groups by the denormalized `course_name` snapshot, not a
//! live join, so renamed courses keep their historical buckets.

use crate::core::error;
use crate::core::output;
use crate::core::store::Store;
use crate::plugins::OutputFormat;
use clap::{Parser, Subcommand};
use colored::Colorize;
use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};

#[derive(Parser, Debug)]
#[clap(name = "stats", about = "Summary statistics over the store.")]
pub struct StatsCli {
    /// Output format for this command group.
    #[clap(long, global = true, value_enum, default_value = "text")]
    format: OutputFormat,
    #[clap(subcommand)]
    command: StatsCommand,
}

#[derive(Subcommand, Debug)]
pub enum StatsCommand {
    /// Headline counts: active agents, active monitors, courses, activities.
    Summary,
    /// Activities grouped by course, most scheduled first.
    ByCourse {
        #[clap(long, default_value = "10")]
        limit: u32,
    },
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Totals {
    pub active_agents: i64,
    pub active_monitors: i64,
    pub courses: i64,
    pub activities: i64,
}

pub fn count_active_agents(conn: &Connection) -> Result<i64, error::DrillbookError> {
    let count = conn.query_row("SELECT COUNT(*) FROM agents WHERE is_active = 1", [], |row| {
        row.get(0)
    })?;
    Ok(count)
}

pub fn count_active_monitors(conn: &Connection) -> Result<i64, error::DrillbookError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM agents WHERE is_monitor = 1 AND is_active = 1",
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub fn count_courses(conn: &Connection) -> Result<i64, error::DrillbookError> {
    let count = conn.query_row("SELECT COUNT(*) FROM courses", [], |row| row.get(0))?;
    Ok(count)
}

pub fn count_activities(conn: &Connection) -> Result<i64, error::DrillbookError> {
    let count = conn.query_row("SELECT COUNT(*) FROM activities", [], |row| row.get(0))?;
    Ok(count)
}

pub fn totals(conn: &Connection) -> Result<Totals, error::DrillbookError> {
    Ok(Totals {
        active_agents: count_active_agents(conn)?,
        active_monitors: count_active_monitors(conn)?,
        courses: count_courses(conn)?,
        activities: count_activities(conn)?,
    })
}

/// Activity counts grouped by course-name snapshot, descending, truncated to
/// the top `limit`. Zero activities yield an empty vector; callers decide how
/// to present "insufficient data".
pub fn activities_by_course(
    conn: &Connection,
    limit: u32,
) -> Result<Vec<(String, i64)>, error::DrillbookError> {
    let mut stmt = conn.prepare(
        "SELECT course_name, COUNT(*) AS scheduled
         FROM activities
         GROUP BY course_name
         ORDER BY scheduled DESC
         LIMIT ?1",
    )?;
    let rows = stmt.query_map(params![limit], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
    })?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn run_stats_cli(store: &Store, cli: StatsCli) -> Result<(), error::DrillbookError> {
    let conn = store.open()?;
    match cli.command {
        StatsCommand::Summary => {
            let totals = totals(&conn)?;
            match cli.format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&totals).unwrap_or_default())
                }
                OutputFormat::Text => {
                    println!("{}  active agents", format!("{:>6}", totals.active_agents).bright_white().bold());
                    println!("{}  active monitors", format!("{:>6}", totals.active_monitors).bright_white().bold());
                    println!("{}  courses", format!("{:>6}", totals.courses).bright_white().bold());
                    println!("{}  activities", format!("{:>6}", totals.activities).bright_white().bold());
                }
            }
        }
        StatsCommand::ByCourse { limit } => {
            let distribution = activities_by_course(&conn, limit)?;
            match cli.format {
                OutputFormat::Json => {
                    let body: Vec<serde_json::Value> = distribution
                        .iter()
                        .map(|(name, count)| serde_json::json!({"course": name, "activities": count}))
                        .collect();
                    println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
                }
                OutputFormat::Text => {
                    if distribution.is_empty() {
                        println!("{} not enough activity data yet", "▸".bright_yellow());
                        return Ok(());
                    }
                    let rows: Vec<Vec<String>> = distribution
                        .iter()
                        .map(|(name, count)| vec![name.clone(), count.to_string()])
                        .collect();
                    println!("{}", output::render_table(&["course", "activities"], &rows));
                }
            }
        }
    }
    Ok(())
}
