//! The owned application state and every operation that mutates it.
//!
//! Front ends hold one [`Session`], call into it, and persist it through
//! [`Session::snapshot`]. Failed operations leave the session unchanged.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use chrono::NaiveDate;
use log::{debug, info};
use uuid::Uuid;

use crate::color::HexColor;
use crate::completion::{self, DaySummary};
use crate::error::{Error, Result, ValidationError};
use crate::models::{Priority, Repeat, Settings, Snapshot, SortBy, Task, TimeOfDay, GENERAL_PROJECT};
use crate::recurrence;

/// User-supplied fields for creating or editing a task.
#[derive(Debug, Clone)]
pub struct TaskDraft {
    pub title: String,
    pub notes: String,
    pub project: String,
    pub priority: Priority,
    pub date: NaiveDate,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    pub repeat: Repeat,
    pub all_day: bool,
    pub color: HexColor,
}

impl TaskDraft {
    /// A one-off, all-day task in the General project.
    pub fn new(title: impl Into<String>, date: NaiveDate) -> Self {
        TaskDraft {
            title: title.into(),
            notes: String::new(),
            project: GENERAL_PROJECT.to_string(),
            priority: Priority::default(),
            date,
            start: TimeOfDay::day_start(),
            end: TimeOfDay::day_end(),
            repeat: Repeat::None,
            all_day: true,
            color: HexColor::default(),
        }
    }

    /// Starts a draft from an existing task, for partial edits.
    pub fn from_task(task: &Task) -> Self {
        TaskDraft {
            title: task.title.clone(),
            notes: task.notes.clone(),
            project: task.project.clone(),
            priority: task.priority,
            date: task.date,
            start: task.start,
            end: task.end,
            repeat: task.repeat.clone(),
            all_day: task.all_day,
            color: task.color.clone(),
        }
    }

    /// Checks the draft and returns it normalised: trimmed text, all-day
    /// times collapsed, empty project mapped to General.
    fn validate(mut self) -> Result<Self, ValidationError> {
        self.title = self.title.trim().to_string();
        if self.title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        self.notes = self.notes.trim().to_string();
        self.project = self.project.trim().to_string();
        if self.project.is_empty() {
            self.project = GENERAL_PROJECT.to_string();
        }
        if self.all_day {
            self.start = TimeOfDay::day_start();
            self.end = TimeOfDay::day_end();
        } else if self.end <= self.start {
            return Err(ValidationError::EndNotAfterStart {
                start: self.start.to_string(),
                end: self.end.to_string(),
            });
        }
        if let Repeat::Custom(days) = &self.repeat {
            if days.is_empty() {
                return Err(ValidationError::EmptyWeekdays);
            }
        }
        Ok(self)
    }
}

/// Tasks, projects and settings for one user.
#[derive(Debug, Clone)]
pub struct Session {
    tasks: Vec<Task>,
    projects: Vec<String>,
    settings: Settings,
}

impl Default for Session {
    fn default() -> Self {
        Session::from_snapshot(Snapshot::default())
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopts a snapshot, making sure General and every project referenced
    /// by a task are listed.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let mut session = Session {
            tasks: snapshot.tasks,
            projects: Vec::new(),
            settings: snapshot.settings,
        };
        for name in std::iter::once(GENERAL_PROJECT.to_string()).chain(snapshot.projects) {
            let name = name.trim();
            if !name.is_empty() {
                session.ensure_project(name);
            }
        }
        let mut tasks = std::mem::take(&mut session.tasks);
        for t in &mut tasks {
            t.project = session.ensure_project(t.project.trim());
        }
        session.tasks = tasks;
        session
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tasks: self.tasks.clone(),
            projects: self.projects.clone(),
            settings: self.settings.clone(),
        }
    }

    /// Replaces the whole state, as pull and import do.
    pub fn replace(&mut self, snapshot: Snapshot) {
        *self = Session::from_snapshot(snapshot);
        info!("session state replaced ({} tasks)", self.tasks.len());
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn projects(&self) -> &[String] {
        &self.projects
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Resolves a full id or a unique id prefix to the full id.
    pub fn resolve_id(&self, prefix: &str) -> Result<String> {
        let prefix = prefix.trim();
        if prefix.is_empty() {
            return Err(Error::TaskNotFound(prefix.to_string()));
        }
        if let Some(t) = self.task(prefix) {
            return Ok(t.id.clone());
        }
        let mut matches = self.tasks.iter().filter(|t| t.id.starts_with(prefix));
        match (matches.next(), matches.next()) {
            (Some(t), None) => Ok(t.id.clone()),
            (Some(_), Some(_)) => Err(Error::AmbiguousTask(prefix.to_string())),
            (None, _) => Err(Error::TaskNotFound(prefix.to_string())),
        }
    }

    fn task_mut(&mut self, id: &str) -> Result<&mut Task> {
        self.tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| Error::TaskNotFound(id.to_string()))
    }

    /// Creates a task with a fresh id and empty completion history.
    pub fn add_task(&mut self, draft: TaskDraft) -> Result<&Task> {
        let draft = draft.validate()?;
        let project = self.ensure_project(&draft.project);
        let task = Task {
            id: Uuid::new_v4().to_string(),
            title: draft.title,
            notes: draft.notes,
            project,
            priority: draft.priority,
            date: draft.date,
            start: draft.start,
            end: draft.end,
            repeat: draft.repeat,
            all_day: draft.all_day,
            color: draft.color,
            pinned: false,
            completed_dates: BTreeSet::new(),
        };
        info!("added task {} ({})", task.id, task.repeat);
        self.tasks.push(task);
        Ok(&self.tasks[self.tasks.len() - 1])
    }

    /// Replaces the editable fields of a task.
    ///
    /// The id and pin survive; the completion history survives unless
    /// `clear_history` is set.
    pub fn edit_task(&mut self, id: &str, draft: TaskDraft, clear_history: bool) -> Result<()> {
        let draft = draft.validate()?;
        if self.task(id).is_none() {
            return Err(Error::TaskNotFound(id.to_string()));
        }
        let project = self.ensure_project(&draft.project);
        let task = self.task_mut(id)?;
        task.title = draft.title;
        task.notes = draft.notes;
        task.project = project;
        task.priority = draft.priority;
        task.date = draft.date;
        task.start = draft.start;
        task.end = draft.end;
        task.repeat = draft.repeat;
        task.all_day = draft.all_day;
        task.color = draft.color;
        if clear_history {
            task.completed_dates.clear();
        }
        debug!("edited task {}", id);
        Ok(())
    }

    /// Copies a task under a new id, unpinned and with no completions.
    pub fn duplicate_task(&mut self, id: &str) -> Result<&Task> {
        let mut copy = self.task(id).cloned().ok_or_else(|| Error::TaskNotFound(id.to_string()))?;
        copy.id = Uuid::new_v4().to_string();
        copy.pinned = false;
        copy.completed_dates.clear();
        debug!("duplicated task {} as {}", id, copy.id);
        self.tasks.push(copy);
        Ok(&self.tasks[self.tasks.len() - 1])
    }

    pub fn delete_task(&mut self, id: &str) -> Result<Task> {
        let pos = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| Error::TaskNotFound(id.to_string()))?;
        info!("deleted task {}", id);
        Ok(self.tasks.remove(pos))
    }

    /// Flips completion of a task on `date`; returns the new state.
    pub fn toggle_completion(&mut self, id: &str, date: NaiveDate) -> Result<bool> {
        let task = self.task_mut(id)?;
        let done = completion::toggle_completion(task, date);
        debug!("task {} on {} -> {}", id, date, if done { "done" } else { "pending" });
        Ok(done)
    }

    /// Flips the pin of a task; returns the new state.
    pub fn toggle_pinned(&mut self, id: &str) -> Result<bool> {
        let task = self.task_mut(id)?;
        task.pinned = !task.pinned;
        Ok(task.pinned)
    }

    pub fn tasks_for_date(&self, date: NaiveDate) -> Vec<&Task> {
        recurrence::tasks_for_date(&self.tasks, date)
    }

    pub fn is_completed(&self, id: &str, date: NaiveDate) -> bool {
        self.task(id).is_some_and(|t| completion::is_completed(t, date))
    }

    pub fn completion_score(&self, date: NaiveDate) -> f64 {
        completion::completion_score(&self.tasks, date)
    }

    pub fn unfinished_colors(&self, date: NaiveDate) -> BTreeSet<HexColor> {
        completion::unfinished_colors(&self.tasks, date)
    }

    pub fn day_summary(&self, date: NaiveDate) -> DaySummary<'_> {
        DaySummary::build(&self.tasks, date)
    }

    pub fn month_summary(&self, year: i32, month: u32) -> Vec<(NaiveDate, f64)> {
        completion::month_summary(&self.tasks, year, month)
    }

    fn find_project(&self, name: &str) -> Option<usize> {
        self.projects.iter().position(|p| p.eq_ignore_ascii_case(name))
    }

    /// Returns the listed spelling of `name`, listing it first if needed.
    fn ensure_project(&mut self, name: &str) -> String {
        match self.find_project(name) {
            Some(idx) => self.projects[idx].clone(),
            None => {
                self.projects.push(name.to_string());
                name.to_string()
            }
        }
    }

    pub fn add_project(&mut self, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyProjectName.into());
        }
        if self.find_project(name).is_some() {
            return Err(ValidationError::DuplicateProject(name.to_string()).into());
        }
        self.projects.push(name.to_string());
        Ok(())
    }

    /// Renames a project and every task that references it.
    ///
    /// Returns the number of tasks moved.
    pub fn rename_project(&mut self, old: &str, new: &str) -> Result<usize> {
        let new = new.trim();
        if new.is_empty() {
            return Err(ValidationError::EmptyProjectName.into());
        }
        let idx = self.find_project(old).ok_or_else(|| Error::ProjectNotFound(old.to_string()))?;
        let current = self.projects[idx].clone();
        if current == GENERAL_PROJECT {
            return Err(ValidationError::ProtectedProject(current).into());
        }
        if let Some(other) = self.find_project(new) {
            if other != idx {
                return Err(ValidationError::DuplicateProject(new.to_string()).into());
            }
        }
        self.projects[idx] = new.to_string();
        let mut moved = 0;
        for t in self.tasks.iter_mut().filter(|t| t.project.eq_ignore_ascii_case(&current)) {
            t.project = new.to_string();
            moved += 1;
        }
        info!("renamed project '{}' to '{}' ({} tasks)", current, new, moved);
        Ok(moved)
    }

    /// Deletes a project, moving its tasks to General.
    ///
    /// Returns the number of tasks moved.
    pub fn delete_project(&mut self, name: &str) -> Result<usize> {
        let idx = self.find_project(name).ok_or_else(|| Error::ProjectNotFound(name.to_string()))?;
        let current = self.projects[idx].clone();
        if current == GENERAL_PROJECT {
            return Err(ValidationError::ProtectedProject(current).into());
        }
        self.projects.remove(idx);
        let mut moved = 0;
        for t in self.tasks.iter_mut().filter(|t| t.project.eq_ignore_ascii_case(&current)) {
            t.project = GENERAL_PROJECT.to_string();
            moved += 1;
        }
        info!("deleted project '{}' ({} tasks moved to {})", current, moved, GENERAL_PROJECT);
        Ok(moved)
    }
}

/// Orders tasks for display: pinned first, then by `key`, then by title.
pub fn sort_tasks(tasks: &mut [&Task], key: SortBy) {
    tasks.sort_by(|a, b| {
        b.pinned
            .cmp(&a.pinned)
            .then_with(|| compare_by(a, b, key))
            .then_with(|| a.title.to_lowercase().cmp(&b.title.to_lowercase()))
    });
}

fn compare_by(a: &Task, b: &Task, key: SortBy) -> Ordering {
    match key {
        SortBy::Start => a.start.cmp(&b.start),
        SortBy::Title => Ordering::Equal,
        SortBy::Project => a.project.to_lowercase().cmp(&b.project.to_lowercase()),
        // High before low.
        SortBy::Priority => b.priority.cmp(&a.priority),
    }
}
