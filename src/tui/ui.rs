use chrono::{Datelike, Local};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table},
    Frame,
};

use super::app::{App, InputMode, ViewMode};
use crate::color::{mix_color, Rgb};
use crate::models::WEEKDAY_NAMES;

fn rgb(c: Rgb) -> Color {
    Color::Rgb(c.r, c.g, c.b)
}

pub fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Summary
            Constraint::Min(0),    // Body
            Constraint::Length(3), // Help
        ].as_ref())
        .split(f.area());

    render_summary(f, app, chunks[0]);
    match app.view_mode {
        ViewMode::Day => render_day(f, app, chunks[1]),
        ViewMode::Calendar => render_calendar(f, app, chunks[1]),
    }

    let help_text = match app.input_mode {
        InputMode::Normal => match app.view_mode {
            ViewMode::Day => "q: Quit | a: Add | Space: Done | d: Del | D: Dup | p: Pin | s: Sort | /: Search | h/l: Day | t: Today | v: Calendar | U/G: Push/Pull",
            ViewMode::Calendar => "q: Quit | h/l: Day | j/k: Week | [/]: Month | t: Today | Enter: Open Day | v: Day View",
        },
        InputMode::Adding => "Enter: Next Step | Esc: Cancel",
        InputMode::Searching => "Enter: Keep Filter | Esc: Clear",
    };
    let help_line = match &app.status {
        Some(status) => format!("{}  ·  {}", status, help_text),
        None => help_text.to_string(),
    };
    let help = Paragraph::new(help_line)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[2]);

    if app.input_mode != InputMode::Normal {
        render_input(f, app);
    }
}

fn render_summary(f: &mut Frame, app: &App, area: Rect) {
    let summary = app.session.day_summary(app.date);
    let mut spans = vec![
        Span::styled(
            app.date.format("%A %Y-%m-%d").to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(
            "  {}/{} completed ({:.0}%)",
            summary.done(),
            summary.total(),
            summary.score * 100.0
        )),
    ];
    if app.session.settings().show_swatches && !summary.unfinished_colors.is_empty() {
        spans.push(Span::raw("  pending "));
        for c in summary.swatches() {
            spans.push(Span::styled("● ", Style::default().fg(rgb(c.rgb()))));
        }
    }
    if !app.search.is_empty() {
        spans.push(Span::styled(
            format!("  filter: {}", app.search),
            Style::default().fg(Color::Yellow),
        ));
    }
    let p = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL).title("Taskflow"));
    f.render_widget(p, area);
}

fn render_day(f: &mut Frame, app: &mut App, area: Rect) {
    let rows: Vec<Row> = app
        .rows
        .iter()
        .filter_map(|id| app.session.task(id))
        .map(|t| {
            let done = t.completed_dates.contains(&app.date);
            let time = if t.all_day { "All day".to_string() } else { format!("{}–{}", t.start, t.end) };
            let style = if done {
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(if done { "[x]" } else { "[ ]" }),
                Cell::from(Span::styled("●", Style::default().fg(rgb(t.color.rgb())))),
                Cell::from(format!("{}{}", if t.pinned { "📌 " } else { "" }, t.title)),
                Cell::from(time),
                Cell::from(t.repeat.to_string()),
                Cell::from(t.project.clone()),
                Cell::from(t.priority.to_string()),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Min(20),
        Constraint::Length(11),
        Constraint::Length(18),
        Constraint::Length(12),
        Constraint::Length(8),
    ];

    let title = format!("Tasks (sorted by {})", app.session.settings().sort_by);
    let table = Table::new(rows, widths)
        .header(Row::new(vec!["", "", "Title", "Time", "Repeat", "Project", "Priority"])
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .bottom_margin(1))
        .block(Block::default().borders(Borders::ALL).title(title))
        .row_highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray))
        .highlight_symbol(">> ");

    if app.rows.is_empty() {
        let empty = Paragraph::new("No tasks for this day. Press 'a' to add one.")
            .style(Style::default().fg(Color::Gray))
            .block(Block::default().borders(Borders::ALL).title("Tasks"));
        f.render_widget(empty, area);
    } else {
        f.render_stateful_widget(table, area, &mut app.state);
    }
}

fn render_calendar(f: &mut Frame, app: &App, area: Rect) {
    let settings = app.session.settings();
    let first = app.month_start();
    let today = Local::now().date_naive();

    let mut rows: Vec<Row> = Vec::new();
    let mut cells: Vec<Cell> = (0..first.weekday().num_days_from_sunday()).map(|_| Cell::from("")).collect();
    for (date, score) in app.session.month_summary(first.year(), first.month()) {
        let mut style = Style::default();
        if score > 0.0 {
            style = style.bg(rgb(mix_color(&settings.low_color, &settings.high_color, score))).fg(Color::Black);
        }
        if date == today {
            style = style.add_modifier(Modifier::UNDERLINED);
        }
        if date == app.date {
            style = style.add_modifier(Modifier::BOLD | Modifier::REVERSED);
        }
        let text = vec![
            Line::from(format!("{:>2}", date.day())),
            Line::from(format!("{:>3}%", (score * 100.0).round() as u32)),
        ];
        cells.push(Cell::from(text).style(style));
        if cells.len() == 7 {
            rows.push(Row::new(std::mem::take(&mut cells)).height(2).bottom_margin(1));
        }
    }
    if !cells.is_empty() {
        rows.push(Row::new(cells).height(2));
    }

    let widths = [Constraint::Ratio(1, 7); 7];
    let table = Table::new(rows, widths)
        .header(Row::new(WEEKDAY_NAMES.to_vec())
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .bottom_margin(1))
        .block(Block::default().borders(Borders::ALL).title(first.format("%B %Y").to_string()));
    f.render_widget(table, area);
}

fn render_input(f: &mut Frame, app: &App) {
    let area = centered_rect(60, 3, f.area()); // Fixed height of 3 (border + 1 line)
    f.render_widget(Clear, area); // Clear the area first

    let title = match app.input_mode {
        InputMode::Adding => match app.add_state.step {
            0 => "Add Task: Enter Title",
            1 => "Add Task: Enter Date (YYYY-MM-DD, empty for selected day)",
            2 => "Add Task: Enter Start (HH:MM, empty for all day)",
            3 => "Add Task: Enter End (HH:MM)",
            4 => "Add Task: Enter Repeat (none, daily, weekly, monthly, custom)",
            5 => "Add Task: Enter Weekdays (e.g. mon,wed,fri)",
            _ => "Add Task",
        },
        InputMode::Searching => "Search",
        InputMode::Normal => "",
    };

    let input = Paragraph::new(app.input_buffer.as_str())
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL).title(title));

    f.render_widget(input, area);
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let pad = r.height.saturating_sub(height) / 2;
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(pad),
            Constraint::Length(height),
            Constraint::Length(pad),
        ].as_ref())
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ].as_ref())
        .split(popup_layout[1])[1]
}
