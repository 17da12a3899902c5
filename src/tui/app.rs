use chrono::{Datelike, Duration, Local, Months, NaiveDate};
use ratatui::widgets::TableState;

use crate::config::SyncConfig;
use crate::models::{parse_date, parse_weekday, Repeat, TimeOfDay};
use crate::session::{sort_tasks, Session, TaskDraft};
use crate::storage;
use crate::sync::{self, HttpRemote, SyncStatus};

#[derive(PartialEq)]
pub enum InputMode {
    Normal,
    Adding,
    Searching,
}

#[derive(PartialEq)]
pub enum ViewMode {
    Day,
    Calendar,
}

/// State for the multi-step "Add Task" wizard.
#[derive(Default)]
pub struct AddState {
    pub title: String,
    pub date: Option<NaiveDate>,
    pub start: Option<TimeOfDay>,
    pub end: Option<TimeOfDay>,
    pub repeat: String,
    pub step: usize, // 0: Title, 1: Date, 2: Start, 3: End, 4: Repeat, 5: Days
}

pub struct App {
    pub session: Session,
    pub sync_config: SyncConfig,
    /// Day shown in the day view and highlighted in the calendar.
    pub date: NaiveDate,
    /// Ids of the tasks listed in the day view, in display order.
    pub rows: Vec<String>,
    pub state: TableState,
    pub view_mode: ViewMode,
    pub input_mode: InputMode,
    pub input_buffer: String,
    pub search: String,
    pub add_state: AddState,
    /// Last message shown in the help bar.
    pub status: Option<String>,
}

impl App {
    /// Creates a new App instance and loads initial data.
    pub fn load(sync_config: SyncConfig) -> App {
        let session = storage::load().map(Session::from_snapshot).unwrap_or_default();
        App::new(session, sync_config)
    }

    pub fn new(session: Session, sync_config: SyncConfig) -> App {
        let mut app = App {
            session,
            sync_config,
            date: Local::now().date_naive(),
            rows: Vec::new(),
            state: TableState::default(),
            view_mode: ViewMode::Day,
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            search: String::new(),
            add_state: AddState::default(),
            status: None,
        };
        app.refresh();
        app
    }

    /// Rebuilds the day view rows from the session.
    pub fn refresh(&mut self) {
        let query = self.search.trim().to_lowercase();
        let mut tasks: Vec<_> = self
            .session
            .tasks_for_date(self.date)
            .into_iter()
            .filter(|t| {
                query.is_empty()
                    || t.title.to_lowercase().contains(&query)
                    || t.notes.to_lowercase().contains(&query)
            })
            .collect();
        sort_tasks(&mut tasks, self.session.settings().sort_by);
        self.rows = tasks.into_iter().map(|t| t.id.clone()).collect();

        if self.rows.is_empty() {
            self.state.select(None);
        } else if let Some(i) = self.state.selected() {
            if i >= self.rows.len() {
                self.state.select(Some(self.rows.len() - 1));
            }
        } else {
            self.state.select(Some(0));
        }
    }

    fn save(&mut self) {
        if let Err(e) = storage::save(&self.session.snapshot()) {
            self.status = Some(format!("Failed to save: {}", e));
        }
    }

    fn selected_id(&self) -> Option<String> {
        if self.view_mode != ViewMode::Day {
            return None;
        }
        self.state.selected().and_then(|i| self.rows.get(i).cloned())
    }

    /// Selects the next task, or moves a week ahead in the calendar.
    pub fn next(&mut self) {
        match self.view_mode {
            ViewMode::Day => {
                if self.rows.is_empty() { return; }
                let i = match self.state.selected() {
                    Some(i) if i + 1 < self.rows.len() => i + 1,
                    _ => 0,
                };
                self.state.select(Some(i));
            }
            ViewMode::Calendar => self.shift_day(7),
        }
    }

    /// Selects the previous task, or moves a week back in the calendar.
    pub fn previous(&mut self) {
        match self.view_mode {
            ViewMode::Day => {
                if self.rows.is_empty() { return; }
                let i = match self.state.selected() {
                    Some(0) | None => self.rows.len() - 1,
                    Some(i) => i - 1,
                };
                self.state.select(Some(i));
            }
            ViewMode::Calendar => self.shift_day(-7),
        }
    }

    pub fn shift_day(&mut self, days: i64) {
        self.date += Duration::days(days);
        self.refresh();
    }

    pub fn shift_month(&mut self, months: i32) {
        let shifted = if months >= 0 {
            self.date.checked_add_months(Months::new(months as u32))
        } else {
            self.date.checked_sub_months(Months::new(months.unsigned_abs()))
        };
        if let Some(d) = shifted {
            self.date = d;
            self.refresh();
        }
    }

    pub fn go_today(&mut self) {
        self.date = Local::now().date_naive();
        self.refresh();
    }

    /// First day of the month containing the selected date.
    pub fn month_start(&self) -> NaiveDate {
        self.date.with_day(1).unwrap_or(self.date)
    }

    pub fn toggle_selected(&mut self) {
        let Some(id) = self.selected_id() else { return };
        if let Ok(done) = self.session.toggle_completion(&id, self.date) {
            self.status = Some(if done { "Marked done.".into() } else { "Marked pending.".into() });
            self.save();
            self.refresh();
        }
    }

    pub fn delete_selected(&mut self) {
        let Some(id) = self.selected_id() else { return };
        if let Ok(task) = self.session.delete_task(&id) {
            self.status = Some(format!("Deleted '{}'.", task.title));
            self.save();
            self.refresh();
        }
    }

    pub fn duplicate_selected(&mut self) {
        let Some(id) = self.selected_id() else { return };
        if let Ok(task) = self.session.duplicate_task(&id) {
            self.status = Some(format!("Duplicated '{}'.", task.title));
            self.save();
            self.refresh();
        }
    }

    pub fn pin_selected(&mut self) {
        let Some(id) = self.selected_id() else { return };
        if self.session.toggle_pinned(&id).is_ok() {
            self.save();
            self.refresh();
        }
    }

    pub fn cycle_sort(&mut self) {
        let settings = self.session.settings_mut();
        settings.sort_by = settings.sort_by.next();
        self.status = Some(format!("Sorted by {}.", settings.sort_by));
        self.save();
        self.refresh();
    }

    pub fn toggle_view(&mut self) {
        self.view_mode = match self.view_mode {
            ViewMode::Day => ViewMode::Calendar,
            ViewMode::Calendar => ViewMode::Day,
        };
    }

    pub fn open_selected_day(&mut self) {
        if self.view_mode == ViewMode::Calendar {
            self.view_mode = ViewMode::Day;
            self.refresh();
        }
    }

    pub fn push_backup(&mut self) {
        let status = match HttpRemote::from_config(&self.sync_config) {
            Ok(remote) => sync::push(&self.session, &remote),
            Err(e) => SyncStatus::Failed(e.to_string()),
        };
        self.status = Some(status.to_string());
    }

    pub fn pull_backup(&mut self) {
        let status = match HttpRemote::from_config(&self.sync_config) {
            Ok(remote) => sync::pull(&mut self.session, &remote),
            Err(e) => SyncStatus::Failed(e.to_string()),
        };
        if status.is_ok() {
            self.save();
            self.refresh();
        }
        self.status = Some(status.to_string());
    }

    /// Initiates the "Add Task" wizard.
    pub fn start_add(&mut self) {
        self.input_mode = InputMode::Adding;
        self.add_state = AddState::default();
        self.input_buffer.clear();
    }

    pub fn start_search(&mut self) {
        self.input_mode = InputMode::Searching;
        self.input_buffer = self.search.clone();
    }

    pub fn cancel_input(&mut self) {
        if self.input_mode == InputMode::Searching {
            self.search.clear();
            self.refresh();
        }
        self.input_mode = InputMode::Normal;
        self.input_buffer.clear();
    }

    /// Live-filters the day view while searching.
    pub fn input_changed(&mut self) {
        if self.input_mode == InputMode::Searching {
            self.search = self.input_buffer.clone();
            self.refresh();
        }
    }

    /// Handles text input based on the current mode.
    pub fn handle_input(&mut self) {
        match self.input_mode {
            InputMode::Adding => self.handle_adding_input(),
            InputMode::Searching => {
                self.input_mode = InputMode::Normal;
                self.input_buffer.clear();
            }
            InputMode::Normal => {}
        }
    }

    /// Handles input for the "Add Task" wizard.
    fn handle_adding_input(&mut self) {
        let input = self.input_buffer.trim().to_string();
        match self.add_state.step {
            0 => { // Title
                if !input.is_empty() {
                    self.add_state.title = input;
                    self.next_step(1);
                }
            }
            1 => { // Date
                if input.is_empty() {
                    self.add_state.date = Some(self.date);
                    self.next_step(2);
                } else if let Ok(d) = parse_date(&input) {
                    self.add_state.date = Some(d);
                    self.next_step(2);
                }
            }
            2 => { // Start, empty for all-day
                if input.is_empty() {
                    self.next_step(4);
                } else if let Ok(t) = input.parse::<TimeOfDay>() {
                    self.add_state.start = Some(t);
                    self.next_step(3);
                }
            }
            3 => { // End
                if let Ok(t) = input.parse::<TimeOfDay>() {
                    self.add_state.end = Some(t);
                    self.next_step(4);
                }
            }
            4 => { // Repeat
                let kind = if input.is_empty() { "none".to_string() } else { input.to_lowercase() };
                if Repeat::from_parts(&kind, std::iter::empty()).is_ok() {
                    self.add_state.repeat = kind;
                    if self.add_state.repeat == "custom" {
                        self.next_step(5);
                    } else {
                        self.finish_add(Vec::new());
                    }
                }
            }
            5 => { // Days
                let days: Result<Vec<u8>, _> = input
                    .split(',')
                    .filter(|d| !d.trim().is_empty())
                    .map(parse_weekday)
                    .collect();
                if let Ok(days) = days {
                    if !days.is_empty() {
                        self.finish_add(days);
                    }
                }
            }
            _ => {}
        }
    }

    fn next_step(&mut self, step: usize) {
        self.add_state.step = step;
        self.input_buffer.clear();
    }

    fn finish_add(&mut self, days: Vec<u8>) {
        let mut draft = TaskDraft::new(self.add_state.title.clone(), self.add_state.date.unwrap_or(self.date));
        if let (Some(start), Some(end)) = (self.add_state.start, self.add_state.end) {
            draft.all_day = false;
            draft.start = start;
            draft.end = end;
        }
        match Repeat::from_parts(&self.add_state.repeat, days) {
            Ok(r) => draft.repeat = r,
            Err(e) => {
                self.status = Some(e.to_string());
                return;
            }
        }
        match self.session.add_task(draft) {
            Ok(task) => {
                self.status = Some(format!("Added '{}'.", task.title));
                self.save();
                self.refresh();
            }
            Err(e) => self.status = Some(e.to_string()),
        }
        self.input_mode = InputMode::Normal;
        self.input_buffer.clear();
    }
}
