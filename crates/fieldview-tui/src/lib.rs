// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use fieldview_app::{DatasetKind, EditView, ViewCommand, ViewController, ViewEvent, ViewSnapshot};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

const DATA_TITLE: &str = "Data";
const SEARCH_TITLE: &str = "Search";
const FILTER_TITLE: &str = "Filter";
const SELECT_FILTERS_TITLE: &str = "Select Filters";
const EDIT_TITLE: &str = "Edit";
const SAVE_LABEL: &str = "Save";
const PICK_LABEL: &str = "Pick";
const STATUS_CLEAR_AFTER: Duration = Duration::from_secs(4);
const PICKER_WINDOW: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Focus {
    #[default]
    Table,
    Search,
    FieldPicker,
    ValuePicker,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct ViewData {
    focus: Focus,
    selected_row: usize,
    picker_cursor: usize,
    help_visible: bool,
    status_token: u64,
}

pub fn run_app(controller: &mut ViewController) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();
    info!(dataset = %controller.state().active, "terminal session started");

    let mut result = Ok(());
    loop {
        process_internal_events(controller, &view_data, &internal_rx);

        let snapshot = controller.snapshot();
        if let Err(error) = terminal.draw(|frame| render(frame, &snapshot, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(Duration::from_millis(120)).context("poll event")?;
        if has_event {
            match event::read().context("read event")? {
                Event::Key(key) => {
                    if handle_key_event(controller, &mut view_data, &internal_tx, key) {
                        break;
                    }
                }
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    info!("terminal session ended");
    result
}

fn process_internal_events(
    controller: &mut ViewController,
    view_data: &ViewData,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                controller.dispatch(ViewCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_AFTER);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

/// Runs a command and keeps the local cursor state consistent with whatever
/// the controller changed.
fn apply(
    controller: &mut ViewController,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: ViewCommand,
) {
    for event in controller.dispatch(command) {
        match event {
            ViewEvent::StatusUpdated(_) => {
                view_data.status_token = view_data.status_token.saturating_add(1);
                schedule_status_clear(internal_tx, view_data.status_token);
            }
            ViewEvent::DatasetChanged(_)
            | ViewEvent::SearchChanged(_)
            | ViewEvent::FilterFieldChanged(_) => {
                view_data.selected_row = 0;
            }
            _ => {}
        }
    }
    clamp_selection(&controller.snapshot(), view_data);
}

fn clamp_selection(snapshot: &ViewSnapshot, view_data: &mut ViewData) {
    view_data.selected_row = view_data
        .selected_row
        .min(snapshot.rows.len().saturating_sub(1));
}

fn handle_key_event(
    controller: &mut ViewController,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if view_data.help_visible {
        if key.code == KeyCode::Esc || key.code == KeyCode::Char('?') {
            view_data.help_visible = false;
        }
        return false;
    }

    if controller.state().edit.is_some() {
        handle_edit_key(controller, view_data, internal_tx, key);
        return false;
    }

    match view_data.focus {
        Focus::Search => {
            handle_search_key(controller, view_data, internal_tx, key);
            false
        }
        Focus::FieldPicker => {
            handle_field_picker_key(controller, view_data, internal_tx, key);
            false
        }
        Focus::ValuePicker => {
            handle_value_picker_key(controller, view_data, internal_tx, key);
            false
        }
        Focus::Table => handle_table_key(controller, view_data, internal_tx, key),
    }
}

fn handle_table_key(
    controller: &mut ViewController,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    let snapshot = controller.snapshot();
    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Tab => apply(controller, view_data, internal_tx, ViewCommand::NextDataset),
        KeyCode::BackTab => apply(controller, view_data, internal_tx, ViewCommand::PrevDataset),
        KeyCode::Char(digit @ '1'..='9') => {
            let index = digit as usize - '1' as usize;
            if let Some(kind) = DatasetKind::ALL.get(index) {
                apply(
                    controller,
                    view_data,
                    internal_tx,
                    ViewCommand::SelectDataset(*kind),
                );
            }
        }
        KeyCode::Char('j') | KeyCode::Down => {
            view_data.selected_row = view_data.selected_row.saturating_add(1);
            clamp_selection(&snapshot, view_data);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            view_data.selected_row = view_data.selected_row.saturating_sub(1);
        }
        KeyCode::Char('g') | KeyCode::Home => view_data.selected_row = 0,
        KeyCode::Char('G') | KeyCode::End => {
            view_data.selected_row = snapshot.rows.len().saturating_sub(1);
        }
        KeyCode::Char('/') => view_data.focus = Focus::Search,
        KeyCode::Char('f') => {
            if snapshot.filter_fields.is_empty() {
                apply(
                    controller,
                    view_data,
                    internal_tx,
                    ViewCommand::SetStatus("no fields to filter".to_owned()),
                );
            } else {
                view_data.picker_cursor = snapshot
                    .filter_field
                    .as_ref()
                    .and_then(|field| snapshot.filter_fields.iter().position(|f| f == field))
                    .unwrap_or(0);
                view_data.focus = Focus::FieldPicker;
            }
        }
        KeyCode::Char('v') => {
            if snapshot.filter_field.is_none() {
                apply(
                    controller,
                    view_data,
                    internal_tx,
                    ViewCommand::SetStatus("pick a filter field first".to_owned()),
                );
            } else {
                view_data.picker_cursor = 0;
                view_data.focus = Focus::ValuePicker;
            }
        }
        KeyCode::Char('c') => apply(
            controller,
            view_data,
            internal_tx,
            ViewCommand::ClearFilterValues,
        ),
        KeyCode::Char('e') | KeyCode::Enter => match snapshot.rows.get(view_data.selected_row) {
            Some(row) => apply(
                controller,
                view_data,
                internal_tx,
                ViewCommand::OpenEdit(row.id),
            ),
            None => apply(
                controller,
                view_data,
                internal_tx,
                ViewCommand::SetStatus("no row selected".to_owned()),
            ),
        },
        KeyCode::Char('?') => view_data.help_visible = true,
        KeyCode::Esc => apply(controller, view_data, internal_tx, ViewCommand::ClearStatus),
        _ => {}
    }
    false
}

fn handle_search_key(
    controller: &mut ViewController,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let mut query = controller.state().search_query.clone();
    match key.code {
        KeyCode::Esc | KeyCode::Enter => {
            view_data.focus = Focus::Table;
            return;
        }
        KeyCode::Backspace => {
            if query.pop().is_none() {
                return;
            }
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => query.clear(),
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => query.push(ch),
        _ => return,
    }
    apply(
        controller,
        view_data,
        internal_tx,
        ViewCommand::SetSearchQuery(query),
    );
}

fn handle_field_picker_key(
    controller: &mut ViewController,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let fields = controller.snapshot().filter_fields;
    match key.code {
        KeyCode::Esc => view_data.focus = Focus::Table,
        KeyCode::Char('j') | KeyCode::Down => {
            view_data.picker_cursor = move_cursor(view_data.picker_cursor, 1, fields.len());
        }
        KeyCode::Char('k') | KeyCode::Up => {
            view_data.picker_cursor = move_cursor(view_data.picker_cursor, -1, fields.len());
        }
        KeyCode::Enter => {
            let Some(field) = fields.get(view_data.picker_cursor) else {
                view_data.focus = Focus::Table;
                return;
            };
            debug!(field = %field, "filter field picked");
            apply(
                controller,
                view_data,
                internal_tx,
                ViewCommand::SetFilterField(field.clone()),
            );
            view_data.picker_cursor = 0;
            view_data.focus = Focus::ValuePicker;
        }
        _ => {}
    }
}

fn handle_value_picker_key(
    controller: &mut ViewController,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let choices = controller.snapshot().filter_choices;
    match key.code {
        KeyCode::Esc | KeyCode::Enter => view_data.focus = Focus::Table,
        KeyCode::Char('j') | KeyCode::Down => {
            view_data.picker_cursor = move_cursor(view_data.picker_cursor, 1, choices.len());
        }
        KeyCode::Char('k') | KeyCode::Up => {
            view_data.picker_cursor = move_cursor(view_data.picker_cursor, -1, choices.len());
        }
        KeyCode::Char(' ') => {
            if let Some(value) = choices.get(view_data.picker_cursor) {
                apply(
                    controller,
                    view_data,
                    internal_tx,
                    ViewCommand::ToggleFilterValue(value.clone()),
                );
            }
        }
        KeyCode::Char('c') => apply(
            controller,
            view_data,
            internal_tx,
            ViewCommand::ClearFilterValues,
        ),
        _ => {}
    }
}

fn handle_edit_key(
    controller: &mut ViewController,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let Some(session) = controller.state().edit.as_ref() else {
        return;
    };
    let mut pending = session.pending.clone();
    let command = match key.code {
        KeyCode::Esc => ViewCommand::CancelEdit,
        KeyCode::Enter => ViewCommand::SaveEdit,
        KeyCode::Backspace => {
            if pending.pop().is_none() {
                return;
            }
            ViewCommand::UpdateEditPending(pending)
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            ViewCommand::UpdateEditPending(String::new())
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            pending.push(ch);
            ViewCommand::UpdateEditPending(pending)
        }
        _ => return,
    };
    apply(controller, view_data, internal_tx, command);
}

fn move_cursor(cursor: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let next = cursor.saturating_add_signed(delta);
    next.min(len - 1)
}

fn render(frame: &mut ratatui::Frame<'_>, snapshot: &ViewSnapshot, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let selected = snapshot
        .datasets
        .iter()
        .position(|kind| *kind == snapshot.dataset)
        .unwrap_or(0);
    let tab_titles = snapshot
        .datasets
        .iter()
        .map(|kind| kind.label().to_owned())
        .collect::<Vec<String>>();
    let tabs = Tabs::new(tab_titles)
        .block(Block::default().title(DATA_TITLE).borders(Borders::ALL))
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .select(selected);
    frame.render_widget(tabs, layout[0]);

    let controls = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(layout[1]);
    let search_style = if view_data.focus == Focus::Search {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let search = Paragraph::new(render_search_text(snapshot, view_data)).block(
        Block::default()
            .title(SEARCH_TITLE)
            .borders(Borders::ALL)
            .style(search_style),
    );
    frame.render_widget(search, controls[0]);
    let filter = Paragraph::new(render_filter_text(snapshot))
        .block(Block::default().title(FILTER_TITLE).borders(Borders::ALL));
    frame.render_widget(filter, controls[1]);

    render_table(frame, layout[2], snapshot, view_data);

    let status_widget = Paragraph::new(status_text(snapshot, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status_widget, layout[3]);

    match view_data.focus {
        Focus::FieldPicker => {
            let area = centered_rect(40, 50, frame.area());
            frame.render_widget(Clear, area);
            let picker =
                Paragraph::new(render_field_picker_text(snapshot, view_data.picker_cursor))
                    .block(Block::default().title(FILTER_TITLE).borders(Borders::ALL));
            frame.render_widget(picker, area);
        }
        Focus::ValuePicker => {
            let area = centered_rect(40, 50, frame.area());
            frame.render_widget(Clear, area);
            let picker =
                Paragraph::new(render_value_picker_text(snapshot, view_data.picker_cursor)).block(
                    Block::default()
                        .title(SELECT_FILTERS_TITLE)
                        .borders(Borders::ALL),
                );
            frame.render_widget(picker, area);
        }
        Focus::Table | Focus::Search => {}
    }

    if let Some(edit) = &snapshot.edit {
        let area = centered_rect(50, 30, frame.area());
        frame.render_widget(Clear, area);
        let modal = Paragraph::new(render_edit_overlay_text(edit)).block(
            Block::default()
                .title(EDIT_TITLE)
                .borders(Borders::ALL)
                .style(Style::default().fg(Color::Cyan)),
        );
        frame.render_widget(modal, area);
    }

    if view_data.help_visible {
        let area = centered_rect(60, 60, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn render_table(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    snapshot: &ViewSnapshot,
    view_data: &ViewData,
) {
    let block = Block::default()
        .title(table_title(snapshot))
        .borders(Borders::ALL);
    if snapshot.columns.is_empty() {
        frame.render_widget(Paragraph::new("no records").block(block), area);
        return;
    }

    let widths = vec![Constraint::Min(8); snapshot.columns.len()];
    let header = Row::new(snapshot.headings.iter().map(|heading| {
        Cell::from(heading.as_str()).style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    }));

    // Borders take two lines and the header one more.
    let visible_rows = usize::from(area.height.saturating_sub(3)).max(1);
    let offset = scroll_offset(view_data.selected_row, visible_rows);
    let rows = snapshot
        .rows
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible_rows)
        .map(|(index, row)| {
            let style = if index == view_data.selected_row && view_data.focus == Focus::Table {
                Style::default().bg(Color::DarkGray)
            } else {
                Style::default()
            };
            Row::new(row.cells.iter().map(|cell| Cell::from(cell.as_str()))).style(style)
        });

    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(block);
    frame.render_widget(table, area);
}

fn scroll_offset(selected_row: usize, visible_rows: usize) -> usize {
    (selected_row + 1).saturating_sub(visible_rows)
}

fn table_title(snapshot: &ViewSnapshot) -> String {
    format!(
        "{} {}/{}",
        snapshot.dataset.label(),
        snapshot.rows.len(),
        snapshot.total_rows
    )
}

fn render_search_text(snapshot: &ViewSnapshot, view_data: &ViewData) -> String {
    let cursor = if view_data.focus == Focus::Search {
        "_"
    } else {
        ""
    };
    format!(
        "{}: {}{cursor}",
        snapshot.search_field, snapshot.search_query
    )
}

fn render_filter_text(snapshot: &ViewSnapshot) -> String {
    let Some(field) = &snapshot.filter_field else {
        return "(none) | f pick field".to_owned();
    };
    let values = if snapshot.filter_values.is_empty() {
        "all".to_owned()
    } else {
        snapshot.filter_values.join(", ")
    };
    format!("{field}: {values}")
}

fn render_field_picker_text(snapshot: &ViewSnapshot, cursor: usize) -> String {
    let mut lines = Vec::new();
    let start = cursor.saturating_sub(PICKER_WINDOW / 2);
    for (index, field) in snapshot
        .filter_fields
        .iter()
        .enumerate()
        .skip(start)
        .take(PICKER_WINDOW)
    {
        let prefix = if index == cursor { "> " } else { "  " };
        let active = if snapshot.filter_field.as_ref() == Some(field) {
            " *"
        } else {
            ""
        };
        lines.push(format!("{prefix}{field}{active}"));
    }
    lines.push(String::new());
    lines.push(format!("j/k move | enter {PICK_LABEL} | esc close"));
    lines.join("\n")
}

fn render_value_picker_text(snapshot: &ViewSnapshot, cursor: usize) -> String {
    let mut lines = Vec::new();
    if let Some(field) = &snapshot.filter_field {
        lines.push(format!("field: {field}"));
        lines.push(String::new());
    }
    if snapshot.filter_choices.is_empty() {
        lines.push("(no values)".to_owned());
    }
    let start = cursor.saturating_sub(PICKER_WINDOW / 2);
    for (index, value) in snapshot
        .filter_choices
        .iter()
        .enumerate()
        .skip(start)
        .take(PICKER_WINDOW)
    {
        let prefix = if index == cursor { "> " } else { "  " };
        let mark = if snapshot.filter_values.contains(value) {
            "[x]"
        } else {
            "[ ]"
        };
        lines.push(format!("{prefix}{mark} {value}"));
    }
    lines.push(String::new());
    lines.push("space toggle | c clear | esc close".to_owned());
    lines.join("\n")
}

fn render_edit_overlay_text(edit: &EditView) -> String {
    [
        format!("record {}", edit.record_id),
        String::new(),
        format!("{}: {}_", edit.heading, edit.pending),
        String::new(),
        format!("enter {SAVE_LABEL} | esc cancel"),
    ]
    .join("\n")
}

fn status_text(snapshot: &ViewSnapshot, view_data: &ViewData) -> String {
    let (mode, hints) = if snapshot.edit.is_some() {
        ("EDIT", "type | enter save | esc cancel")
    } else {
        match view_data.focus {
            Focus::Table => (
                "TABLE",
                "tab/1-3 data | j/k | / search | f filter | v values | c clear | e edit | ? | ctrl+q",
            ),
            Focus::Search => ("SEARCH", "type | enter/esc done | ctrl+u clear"),
            Focus::FieldPicker | Focus::ValuePicker => ("FILTER", "j/k | esc close"),
        }
    };
    match &snapshot.status_line {
        Some(status) => format!("{mode} | {status} | {hints}"),
        None => format!("{mode} | {hints}"),
    }
}

fn help_overlay_text() -> String {
    [
        "tab / shift+tab   next / previous dataset",
        "1-3               jump to dataset",
        "j/k g/G           move selection",
        "/                 search the dataset's search field",
        "f                 pick the filter field",
        "v                 pick filter values",
        "c                 clear filter values",
        "e / enter         edit the selected row",
        "esc               clear status",
        "q / ctrl+q        quit",
        "",
        "esc or ? closes this help",
    ]
    .join("\n")
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
