use std::collections::BTreeSet;

use chrono::{Datelike, Duration, NaiveDate};
use taskflow::color::HexColor;
use taskflow::models::{Priority, Repeat, Task, TimeOfDay};
use taskflow::recurrence::{applies_on_date, next_occurrence, tasks_for_date, weekday_index};

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn task(id: &str, date: &str, repeat: Repeat) -> Task {
    Task {
        id: id.into(),
        title: format!("Task {}", id),
        notes: String::new(),
        project: "General".into(),
        priority: Priority::Medium,
        date: day(date),
        start: TimeOfDay::day_start(),
        end: TimeOfDay::day_end(),
        repeat,
        all_day: true,
        color: HexColor::default(),
        pinned: false,
        completed_dates: BTreeSet::new(),
    }
}

/// Every date from 60 days before to 400 days after `anchor`.
fn window(anchor: &str) -> impl Iterator<Item = NaiveDate> {
    let start = day(anchor) - Duration::days(60);
    (0..460).map(move |i| start + Duration::days(i))
}

#[test]
fn test_none_applies_only_on_anchor() {
    let t = task("a", "2024-03-15", Repeat::None);
    for d in window("2024-03-15") {
        assert_eq!(applies_on_date(&t, d), d == t.date, "date {}", d);
    }
}

#[test]
fn test_daily_applies_from_anchor_on() {
    let t = task("a", "2024-03-15", Repeat::Daily);
    for d in window("2024-03-15") {
        assert_eq!(applies_on_date(&t, d), d >= t.date, "date {}", d);
    }
}

#[test]
fn test_weekly_matches_anchor_weekday() {
    let t = task("a", "2024-01-01", Repeat::Weekly);
    for d in window("2024-01-01") {
        let expected = d >= t.date && d.weekday() == t.date.weekday();
        assert_eq!(applies_on_date(&t, d), expected, "date {}", d);
    }
}

#[test]
fn test_weekly_scenario() {
    let t = task("a", "2024-01-01", Repeat::Weekly);
    assert!(applies_on_date(&t, day("2024-01-08")));
    assert!(!applies_on_date(&t, day("2023-12-25")));
    assert!(!applies_on_date(&t, day("2024-01-09")));
}

#[test]
fn test_custom_matches_weekday_set() {
    // Monday, Wednesday, Friday
    let days: BTreeSet<u8> = [1, 3, 5].into_iter().collect();
    let t = task("a", "2024-01-03", Repeat::Custom(days.clone()));
    for d in window("2024-01-03") {
        let expected = d >= t.date && days.contains(&weekday_index(d));
        assert_eq!(applies_on_date(&t, d), expected, "date {}", d);
    }
    // The Monday before the anchor does not count.
    assert!(!applies_on_date(&t, day("2024-01-01")));
    assert!(applies_on_date(&t, day("2024-01-05")));
    assert!(!applies_on_date(&t, day("2024-01-06")));
}

#[test]
fn test_custom_with_no_weekdays_never_applies() {
    let t = task("a", "2024-01-01", Repeat::Custom(BTreeSet::new()));
    assert!(window("2024-01-01").all(|d| !applies_on_date(&t, d)));
}

#[test]
fn test_monthly_skips_short_months() {
    let t = task("b", "2024-01-31", Repeat::Monthly);
    let april: Vec<NaiveDate> = (1..=30).map(|d| NaiveDate::from_ymd_opt(2024, 4, d).unwrap()).collect();
    assert!(april.iter().all(|d| !applies_on_date(&t, *d)));
    // No clamping to the last day of February either.
    assert!(!applies_on_date(&t, day("2024-02-29")));
    assert!(applies_on_date(&t, day("2024-03-31")));
    assert!(applies_on_date(&t, day("2024-05-31")));
}

#[test]
fn test_monthly_matches_day_of_month() {
    let t = task("b", "2024-01-15", Repeat::Monthly);
    for d in window("2024-01-15") {
        let expected = d >= t.date && d.day() == 15;
        assert_eq!(applies_on_date(&t, d), expected, "date {}", d);
    }
}

#[test]
fn test_tasks_for_date_keeps_collection_order() {
    let tasks = vec![
        task("1", "2024-01-01", Repeat::Daily),
        task("2", "2024-01-02", Repeat::None),
        task("3", "2024-01-01", Repeat::Weekly),
    ];
    let ids: Vec<&str> = tasks_for_date(&tasks, day("2024-01-08")).iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "3"]);
    let ids: Vec<&str> = tasks_for_date(&tasks, day("2024-01-02")).iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2"]);
    assert!(tasks_for_date(&tasks, day("2023-12-31")).is_empty());
}

#[test]
fn test_next_occurrence() {
    let weekly = task("a", "2024-01-01", Repeat::Weekly);
    assert_eq!(next_occurrence(&weekly, day("2023-06-01")), Some(day("2024-01-01")));
    assert_eq!(next_occurrence(&weekly, day("2024-01-02")), Some(day("2024-01-08")));

    let once = task("b", "2024-01-01", Repeat::None);
    assert_eq!(next_occurrence(&once, day("2023-12-01")), Some(day("2024-01-01")));
    assert_eq!(next_occurrence(&once, day("2024-01-02")), None);

    let monthly = task("c", "2024-01-31", Repeat::Monthly);
    assert_eq!(next_occurrence(&monthly, day("2024-04-01")), Some(day("2024-05-31")));

    let empty = task("d", "2024-01-01", Repeat::Custom(BTreeSet::new()));
    assert_eq!(next_occurrence(&empty, day("2024-01-01")), None);
}
