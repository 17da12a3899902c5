use std::collections::BTreeSet;

use chrono::NaiveDate;
use taskflow::color::{mix_color, HexColor, Rgb};
use taskflow::completion::{
    completion_score, is_completed, month_summary, toggle_completion, unfinished_colors, DaySummary, MAX_SWATCHES,
};
use taskflow::models::{Priority, Repeat, Task, TimeOfDay};

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn color(s: &str) -> HexColor {
    s.parse().unwrap()
}

fn task(id: &str, date: &str, repeat: Repeat, hex: &str) -> Task {
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
        color: color(hex),
        pinned: false,
        completed_dates: BTreeSet::new(),
    }
}

#[test]
fn test_score_is_zero_on_empty_day() {
    let tasks = vec![task("a", "2024-01-10", Repeat::None, "#ff0000")];
    assert_eq!(completion_score(&tasks, day("2024-01-01")), 0.0);
    assert_eq!(completion_score(&[], day("2024-01-01")), 0.0);
}

#[test]
fn test_half_done_day() {
    let mut tasks = vec![
        task("a", "2024-01-01", Repeat::Daily, "#ff0000"),
        task("b", "2024-01-01", Repeat::Daily, "#00ff00"),
    ];
    let d = day("2024-01-05");
    toggle_completion(&mut tasks[0], d);

    assert_eq!(completion_score(&tasks, d), 0.5);
    let colors = unfinished_colors(&tasks, d);
    assert_eq!(colors.len(), 1);
    assert!(colors.contains(&color("#00ff00")));
}

#[test]
fn test_score_is_one_only_when_all_done() {
    let mut tasks = vec![
        task("a", "2024-01-01", Repeat::Daily, "#ff0000"),
        task("b", "2024-01-01", Repeat::Weekly, "#00ff00"),
        task("c", "2024-01-02", Repeat::None, "#0000ff"),
    ];
    let d = day("2024-01-08");
    toggle_completion(&mut tasks[0], d);
    assert_eq!(completion_score(&tasks, d), 0.5);
    toggle_completion(&mut tasks[1], d);
    assert_eq!(completion_score(&tasks, d), 1.0);
    assert!(unfinished_colors(&tasks, d).is_empty());

    // Completing on another day does not count.
    let other = day("2024-01-09");
    assert_eq!(completion_score(&tasks, other), 0.0);
}

#[test]
fn test_toggle_is_idempotent_in_pairs() {
    let mut t = task("a", "2024-01-01", Repeat::Daily, "#ff0000");
    let d = day("2024-01-03");
    assert!(!is_completed(&t, d));
    assert!(toggle_completion(&mut t, d));
    assert!(is_completed(&t, d));
    assert!(!toggle_completion(&mut t, d));
    assert!(!is_completed(&t, d));

    toggle_completion(&mut t, d);
    toggle_completion(&mut t, d);
    toggle_completion(&mut t, d);
    assert_eq!(t.completed_dates.len(), 1);
}

#[test]
fn test_unfinished_colors_collapse_duplicates() {
    let tasks = vec![
        task("a", "2024-01-01", Repeat::Daily, "#ff0000"),
        task("b", "2024-01-01", Repeat::Daily, "#F00"),
        task("c", "2024-01-01", Repeat::Daily, "#00ff00"),
    ];
    let colors = unfinished_colors(&tasks, day("2024-01-01"));
    assert_eq!(colors.len(), 2);
}

#[test]
fn test_day_summary_caps_swatches() {
    let palette = [
        "#000001", "#000002", "#000003", "#000004", "#000005", "#000006", "#000007", "#000008", "#000009", "#00000a",
    ];
    let mut tasks: Vec<Task> = palette
        .iter()
        .enumerate()
        .map(|(i, c)| task(&i.to_string(), "2024-01-01", Repeat::Daily, c))
        .collect();
    let d = day("2024-01-02");
    toggle_completion(&mut tasks[0], d);

    let summary = DaySummary::build(&tasks, d);
    assert_eq!(summary.total(), 10);
    assert_eq!(summary.done(), 1);
    assert!((summary.score - 0.1).abs() < 1e-9);
    assert_eq!(summary.unfinished_colors.len(), 9);
    assert_eq!(summary.swatches().count(), MAX_SWATCHES);
    assert!(summary.entries[0].completed);
}

#[test]
fn test_month_summary_covers_every_day() {
    let mut tasks = vec![task("a", "2024-04-01", Repeat::Daily, "#ff0000")];
    toggle_completion(&mut tasks[0], day("2024-04-10"));
    let month = month_summary(&tasks, 2024, 4);
    assert_eq!(month.len(), 30);
    assert_eq!(month[9], (day("2024-04-10"), 1.0));
    assert_eq!(month[10].1, 0.0);
    assert!(month_summary(&tasks, 2024, 13).is_empty());
    assert_eq!(month_summary(&tasks, 2024, 2).len(), 29);
}

#[test]
fn test_mix_color_midpoint_rounds_up() {
    let mixed = mix_color(&color("#000000"), &color("#ffffff"), 0.5);
    assert_eq!(mixed, Rgb { r: 128, g: 128, b: 128 });
    assert_eq!(mixed.to_string(), "rgb(128, 128, 128)");
}

#[test]
fn test_mix_color_endpoints() {
    let low = color("#ef4444");
    let high = color("#22c55e");
    assert_eq!(mix_color(&low, &high, 0.0), low.rgb());
    assert_eq!(mix_color(&low, &high, 1.0), high.rgb());
    assert_eq!(low.rgb(), Rgb { r: 0xef, g: 0x44, b: 0x44 });
    // Out of range ratios are clamped.
    assert_eq!(mix_color(&low, &high, 2.0), high.rgb());
    assert_eq!(mix_color(&low, &high, -1.0), low.rgb());
}

#[test]
fn test_hex_color_parsing() {
    assert_eq!(color("#abc").as_str(), "#aabbcc");
    assert_eq!(color("ABCDEF").as_str(), "#abcdef");
    assert_eq!(color("#fff").rgb(), Rgb { r: 255, g: 255, b: 255 });
    assert!("#abcd".parse::<HexColor>().is_err());
    assert!("#ggg".parse::<HexColor>().is_err());
    assert!("".parse::<HexColor>().is_err());
}
