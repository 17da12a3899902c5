use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};

use crate::color::HexColor;
use crate::models::Task;
use crate::recurrence::tasks_for_date;

/// Renderers show at most this many pending-color swatches per day.
pub const MAX_SWATCHES: usize = 8;

/// Whether `task` was marked done on `date`.
pub fn is_completed(task: &Task, date: NaiveDate) -> bool {
    task.completed_dates.contains(&date)
}

/// Flips the completion of `task` on `date` and returns the new state.
pub fn toggle_completion(task: &mut Task, date: NaiveDate) -> bool {
    if task.completed_dates.remove(&date) {
        false
    } else {
        task.completed_dates.insert(date);
        true
    }
}

/// Share of the tasks scheduled on `date` that are done.
///
/// A day with nothing scheduled scores `0.0`, not `1.0`.
pub fn completion_score(tasks: &[Task], date: NaiveDate) -> f64 {
    let items = tasks_for_date(tasks, date);
    if items.is_empty() {
        return 0.0;
    }
    let done = items.iter().filter(|t| is_completed(t, date)).count();
    done as f64 / items.len() as f64
}

/// Distinct colors of the tasks scheduled on `date` that are still pending.
pub fn unfinished_colors(tasks: &[Task], date: NaiveDate) -> BTreeSet<HexColor> {
    tasks_for_date(tasks, date)
        .into_iter()
        .filter(|t| !is_completed(t, date))
        .map(|t| t.color.clone())
        .collect()
}

/// One scheduled task with its completion on the summarised day.
#[derive(Debug, Clone)]
pub struct DayEntry<'a> {
    pub task: &'a Task,
    pub completed: bool,
}

/// Everything a renderer needs to draw one day.
#[derive(Debug, Clone)]
pub struct DaySummary<'a> {
    pub date: NaiveDate,
    pub entries: Vec<DayEntry<'a>>,
    pub score: f64,
    pub unfinished_colors: BTreeSet<HexColor>,
}

impl<'a> DaySummary<'a> {
    pub fn build(tasks: &'a [Task], date: NaiveDate) -> Self {
        let entries: Vec<DayEntry<'a>> = tasks_for_date(tasks, date)
            .into_iter()
            .map(|task| DayEntry {
                task,
                completed: is_completed(task, date),
            })
            .collect();
        let done = entries.iter().filter(|e| e.completed).count();
        let score = if entries.is_empty() {
            0.0
        } else {
            done as f64 / entries.len() as f64
        };
        let unfinished_colors = entries
            .iter()
            .filter(|e| !e.completed)
            .map(|e| e.task.color.clone())
            .collect();
        DaySummary {
            date,
            entries,
            score,
            unfinished_colors,
        }
    }

    pub fn done(&self) -> usize {
        self.entries.iter().filter(|e| e.completed).count()
    }

    pub fn total(&self) -> usize {
        self.entries.len()
    }

    /// Pending colors, capped at [`MAX_SWATCHES`].
    pub fn swatches(&self) -> impl Iterator<Item = &HexColor> {
        self.unfinished_colors.iter().take(MAX_SWATCHES)
    }
}

/// Completion score for every day of `month` (1-12) in `year`.
///
/// Returns an empty list for an invalid month.
pub fn month_summary(tasks: &[Task], year: i32, month: u32) -> Vec<(NaiveDate, f64)> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };
    first
        .iter_days()
        .take_while(|d| d.month() == month)
        .map(|d| (d, completion_score(tasks, d)))
        .collect()
}
