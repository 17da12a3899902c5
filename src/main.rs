//! # Taskflow
//!
//! A terminal habit and task tracker. Tasks repeat daily, weekly, monthly or
//! on chosen weekdays; each day is marked done task by task, and the calendar
//! shades every day by how much of it was completed.
//!
//! ## Usage
//!
//! ```bash
//! # Interactive mode
//! taskflow
//!
//! # A workout every Mon/Wed/Fri from 07:00 to 08:00
//! taskflow add "Workout" --repeat custom --days mon,wed,fri --start 07:00 --end 08:00 --color "#f97316"
//!
//! # Today's tasks, then mark one done
//! taskflow list
//! taskflow done 3f2a
//!
//! # This month at a glance
//! taskflow calendar
//! ```
//!
//! ## Data Storage
//!
//! State is a single JSON document in the local data directory
//! (`~/.local/share/taskflow/taskflow.json` on Linux), overridable with the
//! `TASKFLOW_DB` environment variable. Remote backup and logging are set up in
//! `taskflow.toml` or `~/.config/taskflow/config.toml`.

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};

use taskflow::commands::*;
use taskflow::config::Config;
use taskflow::models::{Priority, SortBy, Theme};
use taskflow::tui::run_tui;
use taskflow::{logger, storage};

#[derive(Parser)]
#[command(name = "taskflow")]
#[command(about = "Recurring task and habit tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Args)]
struct FieldArgs {
    /// Notes
    #[arg(short, long)]
    notes: Option<String>,
    /// Project label
    #[arg(short, long)]
    project: Option<String>,
    /// Priority (low, medium, high)
    #[arg(short = 'P', long)]
    priority: Option<Priority>,
    /// Anchor date: YYYY-MM-DD, today, tomorrow or yesterday
    #[arg(short, long)]
    date: Option<String>,
    /// Start time (HH:MM)
    #[arg(short, long)]
    start: Option<String>,
    /// End time (HH:MM)
    #[arg(short, long)]
    end: Option<String>,
    /// Mark as an all-day task
    #[arg(long, conflicts_with_all = ["start", "end"])]
    all_day: bool,
    /// Repeat (none, daily, weekly, monthly, custom)
    #[arg(short, long)]
    repeat: Option<String>,
    /// Weekdays for custom repeat, e.g. mon,wed,fri or 1,3,5
    #[arg(long, value_delimiter = ',')]
    days: Vec<String>,
    /// Color as #rgb or #rrggbb
    #[arg(short, long)]
    color: Option<String>,
}

impl FieldArgs {
    fn into_fields(self, title: Option<String>) -> TaskFields {
        TaskFields {
            title,
            notes: self.notes,
            project: self.project,
            priority: self.priority,
            date: self.date,
            start: self.start,
            end: self.end,
            all_day: self.all_day.then_some(true),
            repeat: self.repeat,
            days: self.days,
            color: self.color,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new task
    Add {
        /// Task title (quoted if it has spaces)
        title: String,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// List tasks scheduled on a day (default today)
    List {
        /// Day: YYYY-MM-DD, today, tomorrow or yesterday
        date: Option<String>,
        /// Sort key (start, title, project, priority)
        #[arg(long)]
        sort: Option<SortBy>,
        /// Only show tasks whose title or notes contain this text
        #[arg(short = 'q', long)]
        search: Option<String>,
    },
    /// List every task with its schedule
    All,
    /// Toggle completion of a task on a day (default today)
    Done {
        id: String,
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Edit a task
    Edit {
        id: String,
        /// New title
        #[arg(short, long)]
        title: Option<String>,
        #[command(flatten)]
        fields: FieldArgs,
        /// Forget past completions
        #[arg(long)]
        clear_history: bool,
    },
    /// Duplicate a task (new id, no completions, unpinned)
    Dup {
        id: String,
    },
    /// Remove a task
    Remove {
        id: String,
    },
    /// Pin or unpin a task
    Pin {
        id: String,
    },
    /// Show a month colored by completion
    Calendar {
        /// Month as YYYY-MM (default current month)
        month: Option<String>,
    },
    /// Manage projects
    Project {
        #[command(subcommand)]
        command: ProjectCommands,
    },
    /// Show or change preferences
    Settings {
        #[command(subcommand)]
        command: Option<SettingsCommands>,
    },
    /// Write a backup file
    Export {
        path: PathBuf,
    },
    /// Replace all data with a backup file
    Import {
        path: PathBuf,
    },
    /// Upload a backup to the configured remote store
    Push,
    /// Replace all data with the remote backup
    Pull,
    /// Reset the database (delete all tasks, projects and settings)
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        shell: String,
    },
    /// Open interactive TUI
    Ui,
}

#[derive(Subcommand)]
enum ProjectCommands {
    /// Add a project
    Add { name: String },
    /// List projects
    List,
    /// Rename a project and move its tasks
    Rename { old: String, new: String },
    /// Remove a project, moving its tasks to General
    Remove { name: String },
}

#[derive(Subcommand)]
enum SettingsCommands {
    /// Show current settings
    Show,
    /// Change settings
    Set {
        #[arg(long)]
        theme: Option<Theme>,
        #[arg(long)]
        font_size: Option<u16>,
        /// Calendar color for low completion
        #[arg(long)]
        low_color: Option<String>,
        /// Calendar color for full completion
        #[arg(long)]
        high_color: Option<String>,
        #[arg(long)]
        sort_by: Option<SortBy>,
        #[arg(long)]
        show_swatches: Option<bool>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;
    logger::init(&config.logging, &storage::data_dir())?;

    match cli.command {
        Some(Commands::Add { title, fields }) => {
            cmd_add(fields.into_fields(Some(title)), false);
        }
        Some(Commands::List { date, sort, search }) => cmd_list(date, sort, search),
        Some(Commands::All) => cmd_all(),
        Some(Commands::Done { id, date }) => cmd_done(&id, date, false),
        Some(Commands::Edit { id, title, fields, clear_history }) => {
            cmd_edit(&id, fields.into_fields(title), clear_history, false)
        }
        Some(Commands::Dup { id }) => {
            cmd_duplicate(&id, false);
        }
        Some(Commands::Remove { id }) => cmd_remove(&id, false),
        Some(Commands::Pin { id }) => cmd_pin(&id, false),
        Some(Commands::Calendar { month }) => cmd_calendar(month),
        Some(Commands::Project { command }) => match command {
            ProjectCommands::Add { name } => cmd_project_add(&name, false),
            ProjectCommands::List => cmd_project_list(),
            ProjectCommands::Rename { old, new } => cmd_project_rename(&old, &new, false),
            ProjectCommands::Remove { name } => cmd_project_remove(&name, false),
        },
        Some(Commands::Settings { command }) => match command {
            Some(SettingsCommands::Set { theme, font_size, low_color, high_color, sort_by, show_swatches }) => {
                cmd_settings_set(
                    SettingsUpdate { theme, font_size, low_color, high_color, sort_by, show_swatches },
                    false,
                )
            }
            Some(SettingsCommands::Show) | None => cmd_settings_show(),
        },
        Some(Commands::Export { path }) => cmd_export(&path, false),
        Some(Commands::Import { path }) => cmd_import(&path, false),
        Some(Commands::Push) => {
            cmd_push(&config.sync, false);
        }
        Some(Commands::Pull) => {
            cmd_pull(&config.sync, false);
        }
        Some(Commands::Reset { force }) => cmd_reset(force),
        Some(Commands::Completions { shell }) => {
            let shell_enum = match shell.as_str() {
                "bash" => Shell::Bash,
                "zsh" => Shell::Zsh,
                "fish" => Shell::Fish,
                "powershell" => Shell::PowerShell,
                "elvish" => Shell::Elvish,
                _ => {
                    eprintln!("Unsupported shell: {}", shell);
                    return Ok(());
                }
            };
            let mut cmd = Cli::command();
            generate(shell_enum, &mut cmd, "taskflow", &mut io::stdout());
        }
        Some(Commands::Ui) | None => run_tui(&config)?,
    }
    Ok(())
}
