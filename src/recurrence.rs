use chrono::{Datelike, Duration, NaiveDate};
use crate::models::{Repeat, Task};

/// How far ahead [`next_occurrence`] looks before giving up.
pub const OCCURRENCE_HORIZON_DAYS: i64 = 366 * 4;

/// Decides whether `task` is scheduled on `date`.
///
/// A task never applies before its anchor date. After that:
/// - **none**: only on the anchor date itself.
/// - **daily**: every day.
/// - **weekly**: on the anchor's weekday.
/// - **monthly**: on the anchor's day of month. Months without that day
///   (the 31st in April, the 30th in February) are skipped, not clamped.
/// - **custom**: on any weekday in the task's set.
pub fn applies_on_date(task: &Task, date: NaiveDate) -> bool {
    if date < task.date {
        return false;
    }
    match &task.repeat {
        Repeat::None => date == task.date,
        Repeat::Daily => true,
        Repeat::Weekly => date.weekday() == task.date.weekday(),
        Repeat::Monthly => date.day() == task.date.day(),
        Repeat::Custom(days) => days.contains(&weekday_index(date)),
    }
}

/// Weekday of `date` as 0 (Sunday) to 6 (Saturday).
pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

/// Returns the tasks scheduled on `date`, in collection order.
pub fn tasks_for_date(tasks: &[Task], date: NaiveDate) -> Vec<&Task> {
    tasks.iter().filter(|t| applies_on_date(t, date)).collect()
}

/// First date on or after `from` on which `task` applies.
///
/// Returns `None` for one-off tasks already in the past, custom tasks with no
/// weekdays, or when nothing matches within [`OCCURRENCE_HORIZON_DAYS`].
pub fn next_occurrence(task: &Task, from: NaiveDate) -> Option<NaiveDate> {
    let start = from.max(task.date);
    if let Repeat::None = task.repeat {
        return (start == task.date).then_some(task.date);
    }
    (0..OCCURRENCE_HORIZON_DAYS)
        .map(|offset| start + Duration::days(offset))
        .find(|d| applies_on_date(task, *d))
}
