//! Centralized database schema definitions for the drillbook store.
//!
//! Drillbook uses a single SQLite database with five tables:
//! 1. agents: the personnel roster (monitors are flagged agents).
//! 2. courses: the training-subject catalog.
//! 3. shifts: the fixed set of named time windows.
//! 4. activities: scheduled course occurrences (date + shift + course).
//! 5. assignments: agent participation in activities (many-to-many).

pub const DB_NAME: &str = "drillbook.db";

/// Agent ids are TEXT on purpose: badge numbers keep leading zeros and may
/// carry non-numeric prefixes.
pub const DB_SCHEMA_AGENTS: &str = "
    CREATE TABLE IF NOT EXISTS agents (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        surname1 TEXT NOT NULL,
        surname2 TEXT,
        email TEXT,
        phone TEXT,
        section TEXT,
        squad TEXT,
        is_monitor INTEGER DEFAULT 0,
        is_active INTEGER DEFAULT 1,
        join_date TEXT
    )
";

pub const DB_SCHEMA_COURSES: &str = "
    CREATE TABLE IF NOT EXISTS courses (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        visible INTEGER DEFAULT 1
    )
";

pub const DB_SCHEMA_SHIFTS: &str = "
    CREATE TABLE IF NOT EXISTS shifts (
        name TEXT PRIMARY KEY
    )
";

/// course_name/monitor_name are deliberate point-in-time snapshots taken at
/// write time. Renaming a course or agent later does NOT rewrite history.
pub const DB_SCHEMA_ACTIVITIES: &str = "
    CREATE TABLE IF NOT EXISTS activities (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        date TEXT NOT NULL,
        shift TEXT NOT NULL,
        monitor_id TEXT NOT NULL,
        course_id INTEGER NOT NULL,
        course_name TEXT NOT NULL,
        monitor_name TEXT NOT NULL,
        notes TEXT,
        FOREIGN KEY (shift) REFERENCES shifts (name),
        FOREIGN KEY (monitor_id) REFERENCES agents (id),
        FOREIGN KEY (course_id) REFERENCES courses (id)
    )
";

pub const DB_SCHEMA_ASSIGNMENTS: &str = "
    CREATE TABLE IF NOT EXISTS assignments (
        activity_id INTEGER NOT NULL,
        agent_id TEXT NOT NULL,
        PRIMARY KEY (activity_id, agent_id),
        FOREIGN KEY (activity_id) REFERENCES activities (id),
        FOREIGN KEY (agent_id) REFERENCES agents (id)
    )
";

pub const DB_SCHEMA_INDEX_ACTIVITIES_COURSE: &str =
    "CREATE INDEX IF NOT EXISTS idx_activities_course ON activities(course_id)";
pub const DB_SCHEMA_INDEX_ACTIVITIES_MONITOR: &str =
    "CREATE INDEX IF NOT EXISTS idx_activities_monitor ON activities(monitor_id)";
pub const DB_SCHEMA_INDEX_ASSIGNMENTS_AGENT: &str =
    "CREATE INDEX IF NOT EXISTS idx_assignments_agent ON assignments(agent_id)";

/// Seeded on initialization; skipped when already present.
pub const DEFAULT_SHIFTS: [&str; 3] = ["Morning", "Afternoon", "Night"];
