//! Agent roster: the people eligible to participate in or lead activities.
//!
//! Agent ids are caller-supplied badge numbers (TEXT, immutable once
//! created). Deleting an agent is refused while any activity references them,
//! either as monitor or as an assigned participant.

use crate::core::db;
use crate::core::error;
use crate::core::outcome::{Outcome, Refusal};
use crate::core::output;
use crate::core::session;
use crate::core::store::Store;
use crate::plugins::{OutputFormat, report_write, today, validate_date};
use clap::{Parser, Subcommand};
use colored::Colorize;
use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};

#[derive(Parser, Debug)]
#[clap(name = "agent", about = "Manage the personnel roster.")]
pub struct RosterCli {
    /// Output format for this command group.
    #[clap(long, global = true, value_enum, default_value = "text")]
    format: OutputFormat,
    #[clap(subcommand)]
    command: RosterCommand,
}

#[derive(Subcommand, Debug)]
pub enum RosterCommand {
    /// Add a new agent to the roster.
    Add {
        /// Badge number (positional; kept as text to preserve leading zeros).
        #[clap(value_name = "ID")]
        id: String,
        #[clap(long)]
        name: String,
        #[clap(long)]
        surname1: String,
        #[clap(long)]
        surname2: Option<String>,
        #[clap(long)]
        email: Option<String>,
        #[clap(long)]
        phone: Option<String>,
        #[clap(long)]
        section: Option<String>,
        #[clap(long)]
        squad: Option<String>,
        /// Flag the agent as a monitor (may lead activities).
        #[clap(long)]
        monitor: bool,
        /// Register the agent as inactive.
        #[clap(long)]
        inactive: bool,
        /// Join date, YYYY-MM-DD. Defaults to today.
        #[clap(long, value_parser = validate_date)]
        joined: Option<String>,
    },
    /// List all agents, ordered by surname.
    List,
    /// List active monitors (id and display name).
    Monitors,
    /// Replace every field of an agent except its id.
    Edit {
        #[clap(long)]
        id: String,
        #[clap(long)]
        name: String,
        #[clap(long)]
        surname1: String,
        #[clap(long)]
        surname2: Option<String>,
        #[clap(long)]
        email: Option<String>,
        #[clap(long)]
        phone: Option<String>,
        #[clap(long)]
        section: Option<String>,
        #[clap(long)]
        squad: Option<String>,
        #[clap(long)]
        monitor: bool,
        #[clap(long)]
        inactive: bool,
        #[clap(long, value_parser = validate_date)]
        joined: Option<String>,
    },
    /// Delete an agent with no remaining activity references.
    Delete {
        #[clap(long)]
        id: String,
        /// Skip the interactive confirmation.
        #[clap(long)]
        yes: bool,
    },
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Agent {
    pub id: String,
    pub name: String,
    pub surname1: String,
    pub surname2: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub section: Option<String>,
    pub squad: Option<String>,
    pub is_monitor: bool,
    pub is_active: bool,
    pub join_date: String,
}

impl Agent {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.name, self.surname1)
    }
}

/// Projection of an active monitor for activity scheduling forms.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MonitorRef {
    pub id: String,
    pub display_name: String,
}

pub fn list_agents(conn: &Connection) -> Result<Vec<Agent>, error::DrillbookError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, surname1, surname2, email, phone, section, squad,
                is_monitor, is_active, join_date
         FROM agents
         ORDER BY surname1, name",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(Agent {
            id: row.get(0)?,
            name: row.get(1)?,
            surname1: row.get(2)?,
            surname2: row.get(3)?,
            email: row.get(4)?,
            phone: row.get(5)?,
            section: row.get(6)?,
            squad: row.get(7)?,
            is_monitor: row.get::<_, i64>(8)? != 0,
            is_active: row.get::<_, i64>(9)? != 0,
            join_date: row.get::<_, Option<String>>(10)?.unwrap_or_default(),
        })
    })?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn list_monitors(conn: &Connection) -> Result<Vec<MonitorRef>, error::DrillbookError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, surname1 FROM agents
         WHERE is_monitor = 1 AND is_active = 1
         ORDER BY surname1, name",
    )?;
    let rows = stmt.query_map([], |row| {
        let id: String = row.get(0)?;
        let name: String = row.get(1)?;
        let surname1: String = row.get(2)?;
        Ok(MonitorRef {
            id,
            display_name: format!("{} {}", name, surname1),
        })
    })?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Insert a new agent. A taken id yields a `DuplicateKey` refusal and leaves
/// the existing row untouched.
pub fn insert_agent(conn: &Connection, agent: &Agent) -> Result<Outcome<()>, error::DrillbookError> {
    let result = conn.execute(
        "INSERT INTO agents (id, name, surname1, surname2, email, phone, section, squad,
                             is_monitor, is_active, join_date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            agent.id,
            agent.name,
            agent.surname1,
            agent.surname2,
            agent.email,
            agent.phone,
            agent.section,
            agent.squad,
            agent.is_monitor as i64,
            agent.is_active as i64,
            agent.join_date,
        ],
    );
    match result {
        Ok(_) => Ok(Outcome::Applied(())),
        Err(e) if db::is_unique_violation(&e) => Ok(Outcome::Refused(Refusal::DuplicateKey)),
        Err(e) => Err(e.into()),
    }
}

/// Full-record replace of every field except the immutable id. Returns
/// whether a row was affected.
pub fn update_agent(
    conn: &Connection,
    id: &str,
    agent: &Agent,
) -> Result<bool, error::DrillbookError> {
    let affected = conn.execute(
        "UPDATE agents
         SET name = ?1, surname1 = ?2, surname2 = ?3, email = ?4, phone = ?5,
             section = ?6, squad = ?7, is_monitor = ?8, is_active = ?9, join_date = ?10
         WHERE id = ?11",
        params![
            agent.name,
            agent.surname1,
            agent.surname2,
            agent.email,
            agent.phone,
            agent.section,
            agent.squad,
            agent.is_monitor as i64,
            agent.is_active as i64,
            agent.join_date,
            id,
        ],
    )?;
    Ok(affected > 0)
}

/// Delete an agent. Refused with `HasDependents` while the agent is the
/// monitor of any activity or assigned to one. `Applied(true)` means the row
/// existed and is gone.
pub fn delete_agent(conn: &Connection, id: &str) -> Result<Outcome<bool>, error::DrillbookError> {
    let as_monitor: i64 = conn.query_row(
        "SELECT COUNT(*) FROM activities WHERE monitor_id = ?1",
        params![id],
        |row| row.get(0),
    )?;
    let as_assignee: i64 = conn.query_row(
        "SELECT COUNT(*) FROM assignments WHERE agent_id = ?1",
        params![id],
        |row| row.get(0),
    )?;
    if as_monitor > 0 || as_assignee > 0 {
        return Ok(Outcome::Refused(Refusal::HasDependents));
    }

    let affected = conn.execute("DELETE FROM agents WHERE id = ?1", params![id])?;
    Ok(Outcome::Applied(affected > 0))
}

#[allow(clippy::too_many_arguments)]
fn agent_from_flags(
    id: String,
    name: String,
    surname1: String,
    surname2: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    section: Option<String>,
    squad: Option<String>,
    monitor: bool,
    inactive: bool,
    joined: Option<String>,
) -> Agent {
    Agent {
        id,
        name,
        surname1,
        surname2,
        email,
        phone,
        section,
        squad,
        is_monitor: monitor,
        is_active: !inactive,
        join_date: joined.unwrap_or_else(today),
    }
}

pub fn run_roster_cli(store: &Store, cli: RosterCli) -> Result<(), error::DrillbookError> {
    let conn = store.open()?;
    match cli.command {
        RosterCommand::Add {
            id,
            name,
            surname1,
            surname2,
            email,
            phone,
            section,
            squad,
            monitor,
            inactive,
            joined,
        } => {
            let agent = agent_from_flags(
                id, name, surname1, surname2, email, phone, section, squad, monitor, inactive,
                joined,
            );
            match insert_agent(&conn, &agent)? {
                Outcome::Applied(()) => report_write(cli.format, "agent added", &agent.id, None),
                Outcome::Refused(r) => report_write(cli.format, "agent not added", &agent.id, Some(r)),
            }
        }
        RosterCommand::List => {
            let agents = list_agents(&conn)?;
            match cli.format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&agents).unwrap_or_default())
                }
                OutputFormat::Text => {
                    let rows: Vec<Vec<String>> = agents
                        .iter()
                        .map(|a| {
                            vec![
                                a.id.clone(),
                                a.display_name(),
                                a.section.clone().unwrap_or_default(),
                                a.squad.clone().unwrap_or_default(),
                                if a.is_monitor { "monitor" } else { "" }.to_string(),
                                if a.is_active { "active" } else { "inactive" }.to_string(),
                            ]
                        })
                        .collect();
                    println!(
                        "{}",
                        output::render_table(
                            &["id", "name", "section", "squad", "role", "status"],
                            &rows
                        )
                    );
                }
            }
        }
        RosterCommand::Monitors => {
            let monitors = list_monitors(&conn)?;
            match cli.format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&monitors).unwrap_or_default())
                }
                OutputFormat::Text => {
                    for m in monitors {
                        println!("{}  {}", m.id.bright_white().bold(), m.display_name);
                    }
                }
            }
        }
        RosterCommand::Edit {
            id,
            name,
            surname1,
            surname2,
            email,
            phone,
            section,
            squad,
            monitor,
            inactive,
            joined,
        } => {
            let agent = agent_from_flags(
                id.clone(),
                name,
                surname1,
                surname2,
                email,
                phone,
                section,
                squad,
                monitor,
                inactive,
                joined,
            );
            if update_agent(&conn, &id, &agent)? {
                report_write(cli.format, "agent updated", &id, None);
            } else {
                println!("{} no agent with id {}", "✗".bright_red(), id);
            }
        }
        RosterCommand::Delete { id, yes } => {
            if !session::confirm_delete("agent", &id, yes)? {
                println!("{} delete cancelled", "✗".bright_yellow());
                return Ok(());
            }
            match delete_agent(&conn, &id)? {
                Outcome::Applied(true) => report_write(cli.format, "agent deleted", &id, None),
                Outcome::Applied(false) => {
                    println!("{} no agent with id {}", "✗".bright_red(), id)
                }
                Outcome::Refused(r) => report_write(cli.format, "agent not deleted", &id, Some(r)),
            }
        }
    }
    Ok(())
}
