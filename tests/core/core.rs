use drillbook::core::db;
use rusqlite::Connection;
use tempfile::tempdir;

fn open_store(dir: &std::path::Path) -> Connection {
    let path = dir.join("drillbook.db");
    let conn = db::db_connect(path.to_str().unwrap()).unwrap();
    db::initialize(&conn).unwrap();
    db::reconcile(&conn).unwrap();
    conn
}

#[test]
fn test_initialize_is_idempotent_and_seeds_shifts() {
    let tmp = tempdir().unwrap();
    let conn = open_store(tmp.path());

    // Second run must not fail or duplicate the seeded shifts.
    db::initialize(&conn).unwrap();

    let shifts: i64 = conn
        .query_row("SELECT COUNT(*) FROM shifts", [], |row| row.get(0))
        .unwrap();
    assert_eq!(shifts, 3);

    let night: i64 = conn
        .query_row("SELECT COUNT(*) FROM shifts WHERE name = 'Night'", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(night, 1);
}

#[test]
fn test_reconcile_adds_visible_column_once() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("drillbook.db");
    let conn = db::db_connect(path.to_str().unwrap()).unwrap();

    // Legacy file: courses table without the visible column.
    conn.execute(
        "CREATE TABLE courses (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL UNIQUE)",
        [],
    )
    .unwrap();
    conn.execute("INSERT INTO courses (name) VALUES ('Firearms')", [])
        .unwrap();
    assert!(!db::column_exists(&conn, "courses", "visible").unwrap());

    db::reconcile(&conn).unwrap();
    assert!(db::column_exists(&conn, "courses", "visible").unwrap());

    // Pre-existing rows picked up the default.
    let visible: i64 = conn
        .query_row(
            "SELECT visible FROM courses WHERE name = 'Firearms'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(visible, 1);

    // Second run is a no-op, not a duplicate-column error.
    db::reconcile(&conn).unwrap();
}

#[test]
fn test_column_exists_probe() {
    let tmp = tempdir().unwrap();
    let conn = open_store(tmp.path());

    assert!(db::column_exists(&conn, "agents", "surname1").unwrap());
    assert!(!db::column_exists(&conn, "agents", "no_such_column").unwrap());
    assert!(!db::column_exists(&conn, "no_such_table", "id").unwrap());
}
