use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::color::HexColor;
use crate::error::ValidationError;

/// The project every task falls back to. It cannot be renamed or deleted.
pub const GENERAL_PROJECT: &str = "General";

pub const WEEKDAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Task priority, used for sorting only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" | "med" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(format!("unknown priority '{}', expected low, medium or high", other)),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        })
    }
}

/// How a task recurs from its anchor date.
///
/// Weekday indices run from 0 (Sunday) to 6 (Saturday).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Repeat {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
    Custom(BTreeSet<u8>),
}

impl Repeat {
    /// Builds a repeat rule from its wire name and weekday list.
    ///
    /// Weekdays are ignored for anything but `custom`. An empty custom set is
    /// accepted here; creation and edit reject it separately.
    pub fn from_parts(kind: &str, weekdays: impl IntoIterator<Item = u8>) -> Result<Self, ValidationError> {
        match kind.trim().to_ascii_lowercase().as_str() {
            "none" | "" => Ok(Repeat::None),
            "daily" => Ok(Repeat::Daily),
            "weekly" => Ok(Repeat::Weekly),
            "monthly" => Ok(Repeat::Monthly),
            "custom" => {
                let mut set = BTreeSet::new();
                for d in weekdays {
                    if d > 6 {
                        return Err(ValidationError::WeekdayOutOfRange(d));
                    }
                    set.insert(d);
                }
                Ok(Repeat::Custom(set))
            }
            other => Err(ValidationError::UnknownRepeat(other.to_string())),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Repeat::None => "none",
            Repeat::Daily => "daily",
            Repeat::Weekly => "weekly",
            Repeat::Monthly => "monthly",
            Repeat::Custom(_) => "custom",
        }
    }

    pub fn weekdays(&self) -> Vec<u8> {
        match self {
            Repeat::Custom(days) => days.iter().copied().collect(),
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for Repeat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Repeat::Custom(days) => {
                let names: Vec<&str> = days.iter().map(|d| WEEKDAY_NAMES[*d as usize]).collect();
                write!(f, "custom ({})", names.join(", "))
            }
            other => f.write_str(other.kind()),
        }
    }
}

/// Parses a weekday given as an index (`0`-`6`) or an English name/prefix.
pub fn parse_weekday(s: &str) -> Result<u8, ValidationError> {
    let s = s.trim();
    if let Ok(n) = s.parse::<u8>() {
        return if n <= 6 { Ok(n) } else { Err(ValidationError::WeekdayOutOfRange(n)) };
    }
    let lower = s.to_ascii_lowercase();
    if lower.len() >= 2 {
        let full = ["sunday", "monday", "tuesday", "wednesday", "thursday", "friday", "saturday"];
        if let Some(i) = full.iter().position(|name| name.starts_with(&lower)) {
            return Ok(i as u8);
        }
    }
    Err(ValidationError::UnknownWeekday(s.to_string()))
}

/// A local time of day with minute precision, written as `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(NaiveTime);

impl TimeOfDay {
    pub fn day_start() -> Self {
        TimeOfDay(NaiveTime::default())
    }

    pub fn day_end() -> Self {
        TimeOfDay(NaiveTime::from_hms_opt(23, 59, 0).unwrap_or_default())
    }

    pub fn time(&self) -> NaiveTime {
        self.0
    }
}

impl FromStr for TimeOfDay {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveTime::parse_from_str(s.trim(), "%H:%M")
            .map(TimeOfDay)
            .map_err(|_| ValidationError::InvalidTime(s.to_string()))
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(t: TimeOfDay) -> String {
        t.to_string()
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

/// Parses a `YYYY-MM-DD` calendar date.
pub fn parse_date(s: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| ValidationError::InvalidDate(s.to_string()))
}

/// A scheduled task and its completion history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TaskRecord", into = "TaskRecord")]
pub struct Task {
    /// Unique identifier, stable across edits.
    pub id: String,
    /// Display title, never empty.
    pub title: String,
    /// Free text, empty when unset.
    pub notes: String,
    /// Project label.
    pub project: String,
    pub priority: Priority,
    /// Anchor date; the task never applies before it.
    pub date: NaiveDate,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    pub repeat: Repeat,
    pub all_day: bool,
    pub color: HexColor,
    /// Sort precedence only.
    pub pinned: bool,
    /// Dates on which this task was marked done.
    pub completed_dates: BTreeSet<NaiveDate>,
}

/// Wire shape of a task inside a snapshot document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskRecord {
    id: String,
    title: String,
    #[serde(default)]
    notes: String,
    #[serde(default = "default_project")]
    project: String,
    #[serde(default)]
    priority: Priority,
    date: NaiveDate,
    #[serde(default = "TimeOfDay::day_start")]
    start: TimeOfDay,
    #[serde(default = "TimeOfDay::day_end")]
    end: TimeOfDay,
    #[serde(default = "default_repeat")]
    repeat: String,
    #[serde(default)]
    weekdays: Vec<u8>,
    #[serde(default)]
    all_day: bool,
    #[serde(default)]
    color: HexColor,
    #[serde(default)]
    pinned: bool,
    #[serde(default)]
    completed_dates: BTreeSet<NaiveDate>,
}

fn default_project() -> String {
    GENERAL_PROJECT.to_string()
}

fn default_repeat() -> String {
    "none".to_string()
}

impl TryFrom<TaskRecord> for Task {
    type Error = ValidationError;

    fn try_from(r: TaskRecord) -> Result<Self, Self::Error> {
        let repeat = Repeat::from_parts(&r.repeat, r.weekdays)?;
        Ok(Task {
            id: r.id,
            title: r.title,
            notes: r.notes,
            project: if r.project.trim().is_empty() { default_project() } else { r.project },
            priority: r.priority,
            date: r.date,
            start: r.start,
            end: r.end,
            repeat,
            all_day: r.all_day,
            color: r.color,
            pinned: r.pinned,
            completed_dates: r.completed_dates,
        })
    }
}

impl From<Task> for TaskRecord {
    fn from(t: Task) -> Self {
        TaskRecord {
            weekdays: t.repeat.weekdays(),
            repeat: t.repeat.kind().to_string(),
            id: t.id,
            title: t.title,
            notes: t.notes,
            project: t.project,
            priority: t.priority,
            date: t.date,
            start: t.start,
            end: t.end,
            all_day: t.all_day,
            color: t.color,
            pinned: t.pinned,
            completed_dates: t.completed_dates,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme '{}', expected light or dark", other)),
        }
    }
}

/// Presentation order for task lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    #[default]
    Start,
    Title,
    Project,
    Priority,
}

impl SortBy {
    pub fn next(self) -> SortBy {
        match self {
            SortBy::Start => SortBy::Title,
            SortBy::Title => SortBy::Project,
            SortBy::Project => SortBy::Priority,
            SortBy::Priority => SortBy::Start,
        }
    }
}

impl FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "start" | "time" => Ok(SortBy::Start),
            "title" => Ok(SortBy::Title),
            "project" => Ok(SortBy::Project),
            "priority" => Ok(SortBy::Priority),
            other => Err(format!("unknown sort key '{}', expected start, title, project or priority", other)),
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortBy::Start => "start",
            SortBy::Title => "title",
            SortBy::Project => "project",
            SortBy::Priority => "priority",
        })
    }
}

/// User preferences stored alongside the tasks.
///
/// Every field has a default so older snapshots load unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub theme: Theme,
    pub font_size: u16,
    /// Calendar color for a day with a low completion score.
    pub low_color: HexColor,
    /// Calendar color for a fully completed day.
    pub high_color: HexColor,
    pub sort_by: SortBy,
    pub show_swatches: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            theme: Theme::Light,
            font_size: 16,
            low_color: HexColor::from_str("#ef4444").unwrap_or_default(),
            high_color: HexColor::from_str("#22c55e").unwrap_or_default(),
            sort_by: SortBy::Start,
            show_swatches: true,
        }
    }
}

/// The whole persisted state: tasks, projects and settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default = "default_projects")]
    pub projects: Vec<String>,
    #[serde(default)]
    pub settings: Settings,
}

fn default_projects() -> Vec<String> {
    vec![GENERAL_PROJECT.to_string()]
}

impl Default for Snapshot {
    fn default() -> Self {
        Snapshot {
            tasks: Vec::new(),
            projects: default_projects(),
            settings: Settings::default(),
        }
    }
}
