use std::io::{self, Write};
use std::path::Path;

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveTime};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use crate::color::{mix_color, HexColor, Rgb};
use crate::completion::MAX_SWATCHES;
use crate::config::SyncConfig;
use crate::error::ValidationError;
use crate::models::{parse_date, parse_weekday, Priority, Repeat, SortBy, Theme, TimeOfDay, WEEKDAY_NAMES};
use crate::recurrence::next_occurrence;
use crate::session::{sort_tasks, Session, TaskDraft};
use crate::storage::{self, delete_database};
use crate::sync::{self, HttpRemote, SyncStatus};

/// Optional task fields shared by `add` and `edit`.
#[derive(Debug, Clone, Default)]
pub struct TaskFields {
    pub title: Option<String>,
    pub notes: Option<String>,
    pub project: Option<String>,
    pub priority: Option<Priority>,
    pub date: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub all_day: Option<bool>,
    pub repeat: Option<String>,
    pub days: Vec<String>,
    pub color: Option<String>,
}

impl TaskFields {
    /// Applies the given fields on top of `draft`.
    fn apply(self, draft: &mut TaskDraft) -> Result<(), ValidationError> {
        if let Some(t) = self.title {
            draft.title = t;
        }
        if let Some(n) = self.notes {
            draft.notes = n;
        }
        if let Some(p) = self.project {
            draft.project = p;
        }
        if let Some(p) = self.priority {
            draft.priority = p;
        }
        if let Some(d) = self.date {
            draft.date = parse_day(&d)?;
        }
        if let Some(c) = self.color {
            draft.color = c.parse::<HexColor>()?;
        }

        let start = self.start.as_deref().map(str::parse::<TimeOfDay>).transpose()?;
        let end = self.end.as_deref().map(str::parse::<TimeOfDay>).transpose()?;
        if start.is_some() || end.is_some() {
            let was_all_day = draft.all_day;
            let start = start.unwrap_or(if was_all_day { default_start() } else { draft.start });
            let end = end.unwrap_or_else(|| {
                if !was_all_day && draft.end > start { draft.end } else { hour_after(start) }
            });
            draft.all_day = false;
            draft.start = start;
            draft.end = end;
        }
        if let Some(all_day) = self.all_day {
            draft.all_day = all_day;
            if !all_day && start.is_none() && end.is_none() && draft.end <= draft.start {
                draft.start = default_start();
                draft.end = hour_after(draft.start);
            }
        }

        let days = self
            .days
            .iter()
            .flat_map(|d| d.split(','))
            .filter(|d| !d.trim().is_empty())
            .map(parse_weekday)
            .collect::<Result<Vec<u8>, _>>()?;
        match self.repeat {
            Some(kind) => draft.repeat = Repeat::from_parts(&kind, days)?,
            None if !days.is_empty() => draft.repeat = Repeat::from_parts("custom", days)?,
            None => {}
        }
        Ok(())
    }
}

fn default_start() -> TimeOfDay {
    "09:00".parse().unwrap_or_else(|_| TimeOfDay::day_start())
}

fn hour_after(start: TimeOfDay) -> TimeOfDay {
    let (next, wrapped) = start.time().overflowing_add_signed(Duration::hours(1));
    let next = if wrapped != 0 { NaiveTime::from_hms_opt(23, 59, 0).unwrap_or(next) } else { next };
    next.format("%H:%M").to_string().parse().unwrap_or_else(|_| TimeOfDay::day_end())
}

/// Parses `today`, `tomorrow`, `yesterday` or a `YYYY-MM-DD` date.
pub fn parse_day(s: &str) -> Result<NaiveDate, ValidationError> {
    let today = Local::now().date_naive();
    match s.trim().to_ascii_lowercase().as_str() {
        "today" => Ok(today),
        "tomorrow" => Ok(today + Duration::days(1)),
        "yesterday" => Ok(today - Duration::days(1)),
        _ => parse_date(s),
    }
}

fn load_session() -> Session {
    storage::load().map(Session::from_snapshot).unwrap_or_default()
}

fn persist(session: &Session, silent: bool) -> bool {
    match storage::save(&session.snapshot()) {
        Ok(()) => true,
        Err(e) => {
            if !silent { eprintln!("Failed to save tasks: {}", e); }
            false
        }
    }
}

fn resolve(session: &Session, id: &str, silent: bool) -> Option<String> {
    match session.resolve_id(id) {
        Ok(id) => Some(id),
        Err(e) => {
            if !silent { eprintln!("{}.", e); }
            None
        }
    }
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn table_color(rgb: Rgb) -> Color {
    Color::Rgb { r: rgb.r, g: rgb.g, b: rgb.b }
}

/// Adds a new task and returns its id.
///
/// Without `start`/`end` the task is all-day; without `date` it is anchored
/// on today.
pub fn cmd_add(fields: TaskFields, silent: bool) -> Option<String> {
    let mut session = load_session();
    let mut draft = TaskDraft::new(String::new(), Local::now().date_naive());
    if let Err(e) = fields.apply(&mut draft) {
        if !silent { eprintln!("{}.", e); }
        return None;
    }
    let id = match session.add_task(draft) {
        Ok(t) => t.id.clone(),
        Err(e) => {
            if !silent { eprintln!("{}.", e); }
            return None;
        }
    };
    if !persist(&session, silent) {
        return None;
    }
    if !silent { println!("Task added (id = {})", short_id(&id)); }
    Some(id)
}

/// Edits an existing task's details.
pub fn cmd_edit(id: &str, fields: TaskFields, clear_history: bool, silent: bool) {
    let mut session = load_session();
    let Some(id) = resolve(&session, id, silent) else { return };
    let Some(task) = session.task(&id) else { return };
    let mut draft = TaskDraft::from_task(task);
    if let Err(e) = fields.apply(&mut draft) {
        if !silent { eprintln!("{}.", e); }
        return;
    }
    if let Err(e) = session.edit_task(&id, draft, clear_history) {
        if !silent { eprintln!("{}.", e); }
        return;
    }
    if persist(&session, silent) && !silent {
        println!("Task {} updated.", short_id(&id));
    }
}

/// Toggles completion of a task on `date` (default today).
pub fn cmd_done(id: &str, date: Option<String>, silent: bool) {
    let date = match date.as_deref().map(parse_day).transpose() {
        Ok(d) => d.unwrap_or_else(|| Local::now().date_naive()),
        Err(e) => {
            if !silent { eprintln!("{}.", e); }
            return;
        }
    };
    let mut session = load_session();
    let Some(id) = resolve(&session, id, silent) else { return };
    if !session.tasks_for_date(date).iter().any(|t| t.id == id) {
        if !silent { eprintln!("Task {} is not scheduled on {}.", short_id(&id), date); }
        return;
    }
    match session.toggle_completion(&id, date) {
        Ok(done) => {
            if persist(&session, silent) && !silent {
                let state = if done { "done" } else { "pending" };
                println!("Task {} marked {} on {}.", short_id(&id), state, date);
            }
        }
        Err(e) => {
            if !silent { eprintln!("{}.", e); }
        }
    }
}

/// Copies a task under a new id.
pub fn cmd_duplicate(id: &str, silent: bool) -> Option<String> {
    let mut session = load_session();
    let id = resolve(&session, id, silent)?;
    let new_id = match session.duplicate_task(&id) {
        Ok(t) => t.id.clone(),
        Err(e) => {
            if !silent { eprintln!("{}.", e); }
            return None;
        }
    };
    if !persist(&session, silent) {
        return None;
    }
    if !silent { println!("Task {} duplicated (id = {})", short_id(&id), short_id(&new_id)); }
    Some(new_id)
}

/// Removes a task from the database by ID.
pub fn cmd_remove(id: &str, silent: bool) {
    let mut session = load_session();
    let Some(id) = resolve(&session, id, silent) else { return };
    if let Err(e) = session.delete_task(&id) {
        if !silent { eprintln!("{}.", e); }
        return;
    }
    if persist(&session, silent) && !silent {
        println!("Task {} removed.", short_id(&id));
    }
}

/// Pins or unpins a task.
pub fn cmd_pin(id: &str, silent: bool) {
    let mut session = load_session();
    let Some(id) = resolve(&session, id, silent) else { return };
    match session.toggle_pinned(&id) {
        Ok(pinned) => {
            if persist(&session, silent) && !silent {
                println!("Task {} {}.", short_id(&id), if pinned { "pinned" } else { "unpinned" });
            }
        }
        Err(e) => {
            if !silent { eprintln!("{}.", e); }
        }
    }
}

/// Lists the tasks scheduled on a date in a formatted table.
pub fn cmd_list(date: Option<String>, sort: Option<SortBy>, search: Option<String>) {
    let date = match date.as_deref().map(parse_day).transpose() {
        Ok(d) => d.unwrap_or_else(|| Local::now().date_naive()),
        Err(e) => {
            eprintln!("{}.", e);
            return;
        }
    };
    let session = load_session();
    let summary = session.day_summary(date);
    let query = search.map(|q| q.trim().to_lowercase()).filter(|q| !q.is_empty());

    let mut tasks: Vec<_> = summary
        .entries
        .iter()
        .map(|e| e.task)
        .filter(|t| match &query {
            Some(q) => t.title.to_lowercase().contains(q) || t.notes.to_lowercase().contains(q),
            None => true,
        })
        .collect();
    sort_tasks(&mut tasks, sort.unwrap_or(session.settings().sort_by));

    println!("{}: {}/{} completed", date.format("%a %Y-%m-%d"), summary.done(), summary.total());
    if tasks.is_empty() {
        println!("No tasks for this day.");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").add_attribute(Attribute::Bold),
            Cell::new("").add_attribute(Attribute::Bold),
            Cell::new("Title").add_attribute(Attribute::Bold),
            Cell::new("Time").add_attribute(Attribute::Bold),
            Cell::new("Repeat").add_attribute(Attribute::Bold),
            Cell::new("Project").add_attribute(Attribute::Bold),
            Cell::new("Priority").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
        ]);

    for t in tasks {
        let done = t.completed_dates.contains(&date);
        let time = if t.all_day { "All day".to_string() } else { format!("{}–{}", t.start, t.end) };
        let title = if t.notes.is_empty() { t.title.clone() } else { format!("{}\n{}", t.title, t.notes) };
        let priority_color = match t.priority {
            Priority::High => Color::Red,
            Priority::Medium => Color::Yellow,
            Priority::Low => Color::Green,
        };
        table.add_row(vec![
            Cell::new(short_id(&t.id)),
            Cell::new(if t.pinned { "●📌" } else { "●" }).fg(table_color(t.color.rgb())),
            Cell::new(title),
            Cell::new(time),
            Cell::new(&t.repeat),
            Cell::new(&t.project),
            Cell::new(t.priority).fg(priority_color),
            Cell::new(if done { "Done" } else { "Pending" }).fg(if done { Color::Green } else { Color::Yellow }),
        ]);
    }

    println!("{table}");
    if session.settings().show_swatches && !summary.unfinished_colors.is_empty() {
        let swatches: Vec<&str> = summary.swatches().map(|c| c.as_str()).collect();
        let more = summary.unfinished_colors.len().saturating_sub(MAX_SWATCHES);
        if more > 0 {
            println!("Pending: {} (+{} more)", swatches.join(" "), more);
        } else {
            println!("Pending: {}", swatches.join(" "));
        }
    }
}

/// Lists every task with its schedule and next occurrence.
pub fn cmd_all() {
    let session = load_session();
    if session.tasks().is_empty() {
        println!("No tasks found.");
        return;
    }
    let today = Local::now().date_naive();
    let mut tasks: Vec<_> = session.tasks().iter().collect();
    sort_tasks(&mut tasks, session.settings().sort_by);

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["ID", "Title", "Anchor", "Repeat", "Project", "Next", "Done"]);
    for t in tasks {
        let next = match next_occurrence(t, today) {
            Some(d) if d == today => "Today".to_string(),
            Some(d) => d.to_string(),
            None => "-".to_string(),
        };
        table.add_row(vec![
            Cell::new(short_id(&t.id)),
            Cell::new(&t.title).fg(table_color(t.color.rgb())),
            Cell::new(t.date),
            Cell::new(&t.repeat),
            Cell::new(&t.project),
            Cell::new(next),
            Cell::new(t.completed_dates.len()),
        ]);
    }
    println!("{table}");
}

/// Prints a month grid, each day shaded by its completion score.
pub fn cmd_calendar(month: Option<String>) {
    let today = Local::now().date_naive();
    let first = match month {
        Some(m) => match NaiveDate::parse_from_str(&format!("{}-01", m.trim()), "%Y-%m-%d") {
            Ok(d) => d,
            Err(_) => {
                eprintln!("Invalid month '{}'. Use YYYY-MM.", m);
                return;
            }
        },
        None => today.with_day(1).unwrap_or(today),
    };
    let session = load_session();
    let settings = session.settings();
    let days = session.month_summary(first.year(), first.month());

    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(WEEKDAY_NAMES.to_vec());

    let mut row: Vec<Cell> = (0..first.weekday().num_days_from_sunday()).map(|_| Cell::new("")).collect();
    for (date, score) in days {
        let label = format!("{:>2}\n{:>3}%", date.day(), (score * 100.0).round() as u32);
        let mut cell = Cell::new(label);
        if score > 0.0 {
            cell = cell.bg(table_color(mix_color(&settings.low_color, &settings.high_color, score))).fg(Color::Black);
        }
        if date == today {
            cell = cell.add_attribute(Attribute::Bold);
        }
        row.push(cell);
        if row.len() == 7 {
            table.add_row(std::mem::take(&mut row));
        }
    }
    if !row.is_empty() {
        table.add_row(row);
    }

    println!("{}", first.format("%B %Y"));
    println!("{table}");
}

pub fn cmd_project_add(name: &str, silent: bool) {
    let mut session = load_session();
    if let Err(e) = session.add_project(name) {
        if !silent { eprintln!("{}.", e); }
        return;
    }
    if persist(&session, silent) && !silent {
        println!("Project '{}' added.", name.trim());
    }
}

pub fn cmd_project_list() {
    let session = load_session();
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["Project", "Tasks"]);
    for p in session.projects() {
        let count = session.tasks().iter().filter(|t| &t.project == p).count();
        table.add_row(vec![Cell::new(p), Cell::new(count)]);
    }
    println!("{table}");
}

/// Renames a project; its tasks follow.
pub fn cmd_project_rename(old: &str, new: &str, silent: bool) {
    let mut session = load_session();
    match session.rename_project(old, new) {
        Ok(moved) => {
            if persist(&session, silent) && !silent {
                println!("Project '{}' renamed to '{}' ({} tasks).", old, new.trim(), moved);
            }
        }
        Err(e) => {
            if !silent { eprintln!("{}.", e); }
        }
    }
}

/// Removes a project; its tasks move to General.
pub fn cmd_project_remove(name: &str, silent: bool) {
    let mut session = load_session();
    match session.delete_project(name) {
        Ok(moved) => {
            if persist(&session, silent) && !silent {
                println!("Project '{}' removed ({} tasks moved).", name, moved);
            }
        }
        Err(e) => {
            if !silent { eprintln!("{}.", e); }
        }
    }
}

pub fn cmd_settings_show() {
    let session = load_session();
    let s = session.settings();
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["Setting", "Value"]);
    table.add_row(vec![Cell::new("theme"), Cell::new(format!("{:?}", s.theme).to_lowercase())]);
    table.add_row(vec![Cell::new("font-size"), Cell::new(s.font_size)]);
    table.add_row(vec![Cell::new("low-color"), Cell::new(&s.low_color).fg(table_color(s.low_color.rgb()))]);
    table.add_row(vec![Cell::new("high-color"), Cell::new(&s.high_color).fg(table_color(s.high_color.rgb()))]);
    table.add_row(vec![Cell::new("sort-by"), Cell::new(s.sort_by)]);
    table.add_row(vec![Cell::new("show-swatches"), Cell::new(s.show_swatches)]);
    println!("{table}");
}

/// Changes the stored preferences.
#[derive(Debug, Clone, Default)]
pub struct SettingsUpdate {
    pub theme: Option<Theme>,
    pub font_size: Option<u16>,
    pub low_color: Option<String>,
    pub high_color: Option<String>,
    pub sort_by: Option<SortBy>,
    pub show_swatches: Option<bool>,
}

pub fn cmd_settings_set(update: SettingsUpdate, silent: bool) {
    let low = update.low_color.as_deref().map(str::parse::<HexColor>).transpose();
    let high = update.high_color.as_deref().map(str::parse::<HexColor>).transpose();
    let (low, high) = match (low, high) {
        (Ok(l), Ok(h)) => (l, h),
        (Err(e), _) | (_, Err(e)) => {
            if !silent { eprintln!("{}.", e); }
            return;
        }
    };
    let mut session = load_session();
    let s = session.settings_mut();
    if let Some(t) = update.theme { s.theme = t; }
    if let Some(f) = update.font_size { s.font_size = f; }
    if let Some(c) = low { s.low_color = c; }
    if let Some(c) = high { s.high_color = c; }
    if let Some(k) = update.sort_by { s.sort_by = k; }
    if let Some(b) = update.show_swatches { s.show_swatches = b; }
    if persist(&session, silent) && !silent {
        println!("Settings saved.");
    }
}

pub fn cmd_export(path: &Path, silent: bool) {
    let session = load_session();
    match storage::export_to(path, &session.snapshot()) {
        Ok(()) => {
            if !silent { println!("Exported {} tasks to {}.", session.tasks().len(), path.display()); }
        }
        Err(e) => {
            if !silent { eprintln!("Export failed: {}", e); }
        }
    }
}

/// Replaces all local data with a backup file.
///
/// A malformed file is rejected and the current data is kept.
pub fn cmd_import(path: &Path, silent: bool) {
    let snapshot = match storage::import_from(path) {
        Ok(s) => s,
        Err(e) => {
            if !silent { eprintln!("Invalid backup file: {}", e); }
            return;
        }
    };
    let mut session = load_session();
    session.replace(snapshot);
    if persist(&session, silent) && !silent {
        println!("Imported {} tasks.", session.tasks().len());
    }
}

pub fn cmd_push(config: &SyncConfig, silent: bool) -> SyncStatus {
    let session = load_session();
    let status = match HttpRemote::from_config(config) {
        Ok(remote) => sync::push(&session, &remote),
        Err(e) => SyncStatus::Failed(e.to_string()),
    };
    if !silent { println!("{}", status); }
    status
}

pub fn cmd_pull(config: &SyncConfig, silent: bool) -> SyncStatus {
    let mut session = load_session();
    let status = match HttpRemote::from_config(config) {
        Ok(remote) => sync::pull(&mut session, &remote),
        Err(e) => SyncStatus::Failed(e.to_string()),
    };
    if status.is_ok() && !persist(&session, silent) {
        return SyncStatus::Failed("could not save pulled data".to_string());
    }
    if !silent { println!("{}", status); }
    status
}

/// Resets the database by deleting all tasks, projects and settings.
pub fn cmd_reset(force: bool) {
    if !force {
        print!("Clear all tasks and settings? This cannot be undone. [y/N] ");
        let _ = io::stdout().flush();
        let mut input = String::new();
        if io::stdin().read_line(&mut input).is_err() || input.trim().to_lowercase() != "y" {
            println!("Aborted.");
            return;
        }
    }

    if let Err(e) = delete_database() {
        eprintln!("Failed to reset database: {}", e);
    } else {
        println!("Database reset successfully.");
    }
}
