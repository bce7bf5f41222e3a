use drillbook::core::db;
use drillbook::core::outcome::{Outcome, Refusal};
use drillbook::plugins::activities::{ActivityDraft, delete_activity, insert_activity};
use drillbook::plugins::courses::{
    delete_course, insert_course, list_courses, list_visible_courses, set_course_visibility,
    update_course,
};
use drillbook::plugins::roster::{Agent, insert_agent};
use rusqlite::Connection;
use tempfile::tempdir;

fn open_store(dir: &std::path::Path) -> Connection {
    let path = dir.join("drillbook.db");
    let conn = db::db_connect(path.to_str().unwrap()).unwrap();
    db::initialize(&conn).unwrap();
    db::reconcile(&conn).unwrap();
    conn
}

fn monitor(id: &str) -> Agent {
    Agent {
        id: id.to_string(),
        name: "Rosa".to_string(),
        surname1: "Alba".to_string(),
        surname2: None,
        email: None,
        phone: None,
        section: None,
        squad: None,
        is_monitor: true,
        is_active: true,
        join_date: "2022-01-15".to_string(),
    }
}

fn applied_id(outcome: Outcome<i64>) -> i64 {
    match outcome {
        Outcome::Applied(id) => id,
        Outcome::Refused(r) => panic!("unexpected refusal: {:?}", r),
    }
}

#[test]
fn test_duplicate_course_name_is_refused() {
    let tmp = tempdir().unwrap();
    let conn = open_store(tmp.path());

    applied_id(insert_course(&conn, "Firearms", true).unwrap());
    let second = insert_course(&conn, "Firearms", true).unwrap();
    assert_eq!(second.refusal(), Some(Refusal::DuplicateKey));

    assert_eq!(list_courses(&conn).unwrap().len(), 1);
}

#[test]
fn test_list_courses_ordered_by_name() {
    let tmp = tempdir().unwrap();
    let conn = open_store(tmp.path());

    insert_course(&conn, "Tactics", true).unwrap();
    insert_course(&conn, "CPR", true).unwrap();
    insert_course(&conn, "Firearms", true).unwrap();

    let names: Vec<String> = list_courses(&conn).unwrap().iter().map(|c| c.name.clone()).collect();
    assert_eq!(names, vec!["CPR", "Firearms", "Tactics"]);
}

#[test]
fn test_rename_course_refuses_taken_name() {
    let tmp = tempdir().unwrap();
    let conn = open_store(tmp.path());

    let cpr = applied_id(insert_course(&conn, "CPR", true).unwrap());
    applied_id(insert_course(&conn, "Tactics", true).unwrap());

    let collision = update_course(&conn, cpr, "Tactics").unwrap();
    assert_eq!(collision.refusal(), Some(Refusal::DuplicateKey));

    assert_eq!(update_course(&conn, cpr, "First Aid").unwrap(), Outcome::Applied(true));
    assert_eq!(update_course(&conn, 999, "Ghost").unwrap(), Outcome::Applied(false));
}

#[test]
fn test_visibility_toggle_filters_pick_list() {
    let tmp = tempdir().unwrap();
    let conn = open_store(tmp.path());

    let cpr = applied_id(insert_course(&conn, "CPR", true).unwrap());
    applied_id(insert_course(&conn, "Tactics", true).unwrap());

    assert!(set_course_visibility(&conn, cpr, false).unwrap());

    let visible: Vec<String> = list_visible_courses(&conn)
        .unwrap()
        .iter()
        .map(|c| c.name.clone())
        .collect();
    assert_eq!(visible, vec!["Tactics"]);

    // The full list still carries the hidden course.
    assert_eq!(list_courses(&conn).unwrap().len(), 2);

    assert!(!set_course_visibility(&conn, 999, true).unwrap());
}

#[test]
fn test_pre_reconcile_file_reports_all_courses_visible() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("drillbook.db");
    let conn = db::db_connect(path.to_str().unwrap()).unwrap();

    // Legacy structure without the visible column.
    conn.execute(
        "CREATE TABLE courses (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL UNIQUE)",
        [],
    )
    .unwrap();
    conn.execute("INSERT INTO courses (name) VALUES ('Firearms')", []).unwrap();
    conn.execute("INSERT INTO courses (name) VALUES ('CPR')", []).unwrap();

    let all = list_courses(&conn).unwrap();
    assert_eq!(all.len(), 2);
    assert!(all.iter().all(|c| c.visible));

    // The visible listing falls back to the full list.
    assert_eq!(list_visible_courses(&conn).unwrap().len(), 2);
}

#[test]
fn test_toggle_on_legacy_file_reconciles_first() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("drillbook.db");
    let conn = db::db_connect(path.to_str().unwrap()).unwrap();

    conn.execute(
        "CREATE TABLE courses (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL UNIQUE)",
        [],
    )
    .unwrap();
    conn.execute("INSERT INTO courses (name) VALUES ('Firearms')", []).unwrap();

    assert!(set_course_visibility(&conn, 1, false).unwrap());
    assert!(db::column_exists(&conn, "courses", "visible").unwrap());
    assert!(list_visible_courses(&conn).unwrap().is_empty());
}

#[test]
fn test_delete_course_reference_protection() {
    let tmp = tempdir().unwrap();
    let mut conn = open_store(tmp.path());

    insert_agent(&conn, &monitor("M1")).unwrap();
    let course_id = applied_id(insert_course(&conn, "Firearms", true).unwrap());
    let activity_id = applied_id(
        insert_activity(
            &conn,
            &ActivityDraft {
                date: "2024-01-10".to_string(),
                shift: "Morning".to_string(),
                monitor_id: "M1".to_string(),
                course_id,
            },
        )
        .unwrap(),
    );

    // Referenced by an activity: refused, row count unchanged.
    let refused = delete_course(&conn, course_id).unwrap();
    assert_eq!(refused.refusal(), Some(Refusal::HasDependents));
    assert_eq!(list_courses(&conn).unwrap().len(), 1);

    // After its sole activity is gone, the delete applies.
    assert!(delete_activity(&mut conn, activity_id).unwrap());
    assert_eq!(delete_course(&conn, course_id).unwrap(), Outcome::Applied(true));
    assert!(list_courses(&conn).unwrap().is_empty());
}
