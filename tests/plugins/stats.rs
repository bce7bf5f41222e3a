use drillbook::core::db;
use drillbook::core::outcome::Outcome;
use drillbook::plugins::activities::{ActivityDraft, insert_activity};
use drillbook::plugins::courses::insert_course;
use drillbook::plugins::roster::{Agent, insert_agent};
use drillbook::plugins::stats::{
    activities_by_course, count_active_agents, count_active_monitors, count_activities,
    count_courses, totals,
};
use rusqlite::Connection;
use tempfile::tempdir;

fn open_store(dir: &std::path::Path) -> Connection {
    let path = dir.join("drillbook.db");
    let conn = db::db_connect(path.to_str().unwrap()).unwrap();
    db::initialize(&conn).unwrap();
    db::reconcile(&conn).unwrap();
    conn
}

fn agent(id: &str, monitor: bool, active: bool) -> Agent {
    Agent {
        id: id.to_string(),
        name: "Nora".to_string(),
        surname1: "Beltran".to_string(),
        surname2: None,
        email: None,
        phone: None,
        section: None,
        squad: None,
        is_monitor: monitor,
        is_active: active,
        join_date: "2021-09-01".to_string(),
    }
}

fn applied<T>(outcome: Outcome<T>) -> T {
    match outcome {
        Outcome::Applied(v) => v,
        Outcome::Refused(r) => panic!("unexpected refusal: {:?}", r),
    }
}

#[test]
fn test_headline_counts() {
    let tmp = tempdir().unwrap();
    let conn = open_store(tmp.path());

    insert_agent(&conn, &agent("1", true, true)).unwrap();
    insert_agent(&conn, &agent("2", false, true)).unwrap();
    insert_agent(&conn, &agent("3", true, false)).unwrap();
    insert_agent(&conn, &agent("4", false, false)).unwrap();

    let course_id = applied(insert_course(&conn, "Firearms", true).unwrap());
    applied(
        insert_activity(
            &conn,
            &ActivityDraft {
                date: "2024-01-10".to_string(),
                shift: "Morning".to_string(),
                monitor_id: "1".to_string(),
                course_id,
            },
        )
        .unwrap(),
    );

    // Inactive agents count toward neither metric.
    assert_eq!(count_active_agents(&conn).unwrap(), 2);
    assert_eq!(count_active_monitors(&conn).unwrap(), 1);
    assert_eq!(count_courses(&conn).unwrap(), 1);
    assert_eq!(count_activities(&conn).unwrap(), 1);

    let t = totals(&conn).unwrap();
    assert_eq!(t.active_agents, 2);
    assert_eq!(t.active_monitors, 1);
    assert_eq!(t.courses, 1);
    assert_eq!(t.activities, 1);
}

#[test]
fn test_empty_store_counts_are_zero() {
    let tmp = tempdir().unwrap();
    let conn = open_store(tmp.path());

    let t = totals(&conn).unwrap();
    assert_eq!(t.active_agents, 0);
    assert_eq!(t.active_monitors, 0);
    assert_eq!(t.courses, 0);
    assert_eq!(t.activities, 0);
}

#[test]
fn test_activities_by_course_truncates_to_top_ten() {
    let tmp = tempdir().unwrap();
    let conn = open_store(tmp.path());
    insert_agent(&conn, &agent("M1", true, true)).unwrap();

    // Twelve courses with descending activity counts 12, 11, ..., 1.
    for i in 0..12u32 {
        let name = format!("Course {:02}", i);
        let course_id = applied(insert_course(&conn, &name, true).unwrap());
        for day in 0..(12 - i) {
            applied(
                insert_activity(
                    &conn,
                    &ActivityDraft {
                        date: format!("2024-01-{:02}", day + 1),
                        shift: "Morning".to_string(),
                        monitor_id: "M1".to_string(),
                        course_id,
                    },
                )
                .unwrap(),
            );
        }
    }

    let distribution = activities_by_course(&conn, 10).unwrap();
    assert_eq!(distribution.len(), 10);
    assert_eq!(distribution[0], ("Course 00".to_string(), 12));
    assert_eq!(distribution[9], ("Course 09".to_string(), 3));

    // Strictly descending counts for this fixture.
    let counts: Vec<i64> = distribution.iter().map(|(_, n)| *n).collect();
    assert_eq!(counts, (3..=12).rev().collect::<Vec<i64>>());
}

#[test]
fn test_activities_by_course_groups_by_name_snapshot() {
    let tmp = tempdir().unwrap();
    let conn = open_store(tmp.path());
    insert_agent(&conn, &agent("M1", true, true)).unwrap();

    let course_id = applied(insert_course(&conn, "Firearms", true).unwrap());
    applied(
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

    // A refused duplicate must not inflate the count.
    let dup = insert_activity(
        &conn,
        &ActivityDraft {
            date: "2024-01-10".to_string(),
            shift: "Morning".to_string(),
            monitor_id: "M1".to_string(),
            course_id,
        },
    )
    .unwrap();
    assert!(!dup.is_applied());

    let distribution = activities_by_course(&conn, 10).unwrap();
    assert_eq!(distribution, vec![("Firearms".to_string(), 1)]);
}

#[test]
fn test_activities_by_course_empty_store() {
    let tmp = tempdir().unwrap();
    let conn = open_store(tmp.path());

    assert!(activities_by_course(&conn, 10).unwrap().is_empty());
}
