//! Main application logic for the terminal user interface.
//!
//! `App` owns the `TaskStore` for the lifetime of the UI. Every key press that
//! changes the store is followed by an explicit `refresh`, which re-queries the
//! filter view and re-clamps the selection.

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Gauge, Paragraph, Row, Table, TableState, Tabs, Wrap},
    Frame, Terminal,
};

use crate::cmd::format_date;
use crate::fields::{format_filter, FilterMode};
use crate::store::TaskStore;
use crate::task::Task;
use crate::tui::{
    colors::{DARK_GREEN, DARK_RED, GOLD, MUTED},
    enums::{AppState, Flow},
    input::InputField,
    utils::centered_rect,
};
use crate::view::{counts, empty_message, progress_percent, visible};

/// State of the task list screen.
pub struct App {
    state: AppState,
    store: TaskStore,
    filter: FilterMode,
    table_state: TableState,
    visible_ids: Vec<u64>,
    input: InputField,
    status_message: String,
}

impl App {
    /// Create the app around a loaded store, showing all tasks.
    pub fn new(store: TaskStore) -> Self {
        let mut app = App {
            state: AppState::TaskList,
            store,
            filter: FilterMode::All,
            table_state: TableState::default(),
            visible_ids: Vec::new(),
            input: InputField::new(),
            status_message: String::new(),
        };
        app.refresh();
        app
    }

    /// The underlying task store.
    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    /// Screen currently receiving key presses.
    pub fn state(&self) -> AppState {
        self.state
    }

    /// Active filter tab.
    pub fn filter(&self) -> FilterMode {
        self.filter
    }

    /// Re-query the visible tasks and keep the selection in range.
    fn refresh(&mut self) {
        self.visible_ids = visible(self.store.tasks(), self.filter)
            .iter()
            .map(|t| t.id)
            .collect();
        let selected = match (self.visible_ids.len(), self.table_state.selected()) {
            (0, _) => None,
            (n, Some(i)) => Some(i.min(n - 1)),
            (_, None) => Some(0),
        };
        self.table_state.select(selected);
    }

    /// ID of the highlighted task, if any.
    pub fn selected_id(&self) -> Option<u64> {
        self.table_state
            .selected()
            .and_then(|i| self.visible_ids.get(i).copied())
    }

    fn set_filter(&mut self, mode: FilterMode) {
        self.filter = mode;
        self.table_state.select(Some(0));
        self.refresh();
    }

    fn select_next(&mut self) {
        if let Some(i) = self.table_state.selected() {
            if i + 1 < self.visible_ids.len() {
                self.table_state.select(Some(i + 1));
            }
        }
    }

    fn select_previous(&mut self) {
        if let Some(i) = self.table_state.selected() {
            self.table_state.select(Some(i.saturating_sub(1)));
        }
    }

    fn toggle_selected(&mut self) {
        let Some(id) = self.selected_id() else {
            return;
        };
        if let Some(task) = self.store.toggle(id) {
            self.status_message = if task.completed {
                format!("Completed: {}", task.text)
            } else {
                format!("Reopened: {}", task.text)
            };
        }
        self.refresh();
    }

    fn remove_selected(&mut self) {
        let Some(id) = self.selected_id() else {
            return;
        };
        if let Some(task) = self.store.remove(id) {
            self.status_message = format!("Removed: {}", task.text);
        }
        self.refresh();
    }

    fn submit_input(&mut self) {
        let text = self.input.take();
        self.status_message = match self.store.add(&text) {
            Some(task) => format!("Added: {}", task.text),
            None => "Ignored empty task text".to_string(),
        };
        self.state = AppState::TaskList;
        self.refresh();
        // Jump to the new task when it is visible.
        if let Some(last) = self.visible_ids.len().checked_sub(1) {
            if self.filter.matches(false) {
                self.table_state.select(Some(last));
            }
        }
    }

    /// Apply a single key press. Returns `Flow::Quit` when the UI should exit.
    pub fn handle_key(&mut self, key: KeyEvent) -> Flow {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Flow::Quit;
        }
        self.status_message.clear();

        match self.state {
            AppState::TaskList => return self.handle_task_list_key(key),
            AppState::AddTask => self.handle_add_key(key),
            AppState::Help => self.state = AppState::TaskList,
            AppState::ConfirmClear => self.handle_confirm_key(key),
        }
        Flow::Continue
    }

    fn handle_task_list_key(&mut self, key: KeyEvent) -> Flow {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Flow::Quit,
            KeyCode::Down | KeyCode::Char('j') => self.select_next(),
            KeyCode::Up | KeyCode::Char('k') => self.select_previous(),
            KeyCode::Char('a') => self.state = AppState::AddTask,
            KeyCode::Enter | KeyCode::Char(' ') => self.toggle_selected(),
            KeyCode::Char('d') | KeyCode::Delete => self.remove_selected(),
            KeyCode::Char('c') => {
                if counts(self.store.tasks()).completed > 0 {
                    self.state = AppState::ConfirmClear;
                } else {
                    self.status_message = "No completed tasks to clear".to_string();
                }
            }
            KeyCode::Char('1') => self.set_filter(FilterMode::All),
            KeyCode::Char('2') => self.set_filter(FilterMode::Active),
            KeyCode::Char('3') => self.set_filter(FilterMode::Completed),
            KeyCode::Tab => self.set_filter(self.filter.next()),
            KeyCode::BackTab => self.set_filter(self.filter.prev()),
            KeyCode::Char('h') | KeyCode::Char('?') | KeyCode::F(1) => self.state = AppState::Help,
            _ => {}
        }
        Flow::Continue
    }

    fn handle_add_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.submit_input(),
            KeyCode::Esc => {
                self.input.take();
                self.state = AppState::TaskList;
            }
            KeyCode::Char(c) => self.input.handle_char(c),
            KeyCode::Backspace => self.input.handle_backspace(),
            KeyCode::Delete => self.input.handle_delete(),
            KeyCode::Left => self.input.move_cursor_left(),
            KeyCode::Right => self.input.move_cursor_right(),
            KeyCode::Home => self.input.move_home(),
            KeyCode::End => self.input.move_end(),
            _ => {}
        }
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                let removed = self.store.clear_completed();
                self.status_message = format!("Cleared {removed} completed task(s)");
                self.state = AppState::TaskList;
                self.refresh();
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.state = AppState::TaskList;
            }
            _ => {}
        }
    }

    /// Poll for and handle one keyboard event.
    ///
    /// Returns true if the application should quit.
    fn handle_input(&mut self) -> io::Result<bool> {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(self.handle_key(key) == Flow::Quit);
                }
            }
        }
        Ok(false)
    }

    fn render_header(&self, f: &mut Frame, area: Rect) {
        let header = Paragraph::new(Line::from(vec![
            Span::styled("LEARNING GOALS", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            Span::styled(
                format!("slot: {}", self.store.slot()),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
            ),
        ]))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);
        f.render_widget(header, area);
    }

    fn render_filters(&self, f: &mut Frame, area: Rect) {
        let c = counts(self.store.tasks());
        let titles: Vec<Line> = FilterMode::ALL
            .iter()
            .enumerate()
            .map(|(i, &mode)| Line::from(format!("{} {} ({})", i + 1, format_filter(mode), c.for_mode(mode))))
            .collect();
        let tabs = Tabs::new(titles)
            .select(self.filter.index())
            .block(Block::default().borders(Borders::ALL).title("Filter"))
            .highlight_style(Style::default().fg(Color::Black).bg(GOLD).add_modifier(Modifier::BOLD));
        f.render_widget(tabs, area);
    }

    fn render_task_list(&mut self, f: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title(format!(
            "Tasks ({}/{}) - Press 'h' for help",
            self.visible_ids.len(),
            self.store.tasks().len()
        ));

        if self.visible_ids.is_empty() {
            let empty = Paragraph::new(empty_message(self.filter))
                .block(block)
                .alignment(Alignment::Center)
                .style(Style::default().fg(MUTED));
            f.render_widget(empty, area);
            return;
        }

        let header = Row::new(["", "Task", "Created"].map(|h| {
            Cell::from(h).style(Style::default().add_modifier(Modifier::BOLD))
        }))
        .style(Style::default().bg(DARK_GREEN).fg(Color::White));

        let rows: Vec<Row> = visible(self.store.tasks(), self.filter)
            .into_iter()
            .map(|task: &Task| {
                let style = if task.completed {
                    Style::default().fg(MUTED).add_modifier(Modifier::CROSSED_OUT)
                } else {
                    Style::default().fg(Color::White)
                };
                Row::new(vec![
                    Cell::from(task.status_icon()),
                    Cell::from(task.text.clone()),
                    Cell::from(format_date(task.created_at)),
                ])
                .style(style)
            })
            .collect();

        let widths = [Constraint::Length(2), Constraint::Min(20), Constraint::Length(10)];
        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .row_highlight_style(Style::default().bg(Color::Gray).fg(Color::Black))
            .highlight_symbol(">> ");

        f.render_stateful_widget(table, area, &mut self.table_state);
    }

    fn render_progress(&self, f: &mut Frame, area: Rect) {
        let c = counts(self.store.tasks());
        let percent = progress_percent(self.store.tasks());
        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title("Progress"))
            .gauge_style(Style::default().fg(GOLD).bg(Color::Black))
            .percent(u16::from(percent))
            .label(format!("Completed {} / {} ({}%)", c.completed, c.total, percent));
        f.render_widget(gauge, area);
    }

    fn render_add_popup(&self, f: &mut Frame, area: Rect) {
        let popup = centered_rect(60, 20, area);
        let popup = Rect { height: popup.height.max(3), ..popup };
        f.render_widget(Clear, popup);
        let before: String = self.input.value.chars().take(self.input.cursor).collect();
        let offset = u16::try_from(Span::raw(before).width()).unwrap_or(u16::MAX);
        let (scroll, column) = input_scroll(offset, popup.width.saturating_sub(2));

        let input = Paragraph::new(self.input.value.as_str())
            .scroll((0, scroll))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("New learning goal (Enter to add, Esc to cancel)"),
            );
        f.render_widget(input, popup);

        f.set_cursor_position((
            popup.x.saturating_add(1).saturating_add(column),
            popup.y.saturating_add(1),
        ));
    }

    fn render_confirm(&self, f: &mut Frame, area: Rect) {
        let popup = centered_rect(50, 30, area);
        f.render_widget(Clear, popup);
        let completed = counts(self.store.tasks()).completed;
        let text = vec![
            Line::from(""),
            Line::from(Span::styled(
                format!("Remove {completed} completed task(s)?"),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from("Press 'y' to confirm, 'n' to cancel"),
        ];
        let paragraph = Paragraph::new(text)
            .block(Block::default().title("Confirm Action").borders(Borders::ALL).style(Style::default().bg(DARK_RED)))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, popup);
    }

    fn render_help(&self, f: &mut Frame, area: Rect) {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let help_text = vec![
            Line::from(Span::styled("Learning Goals Help", bold)),
            Line::from(""),
            Line::from("  ↑/k, ↓/j      Move selection"),
            Line::from("  a             Add a goal"),
            Line::from("  Enter/Space   Toggle completed"),
            Line::from("  d/Delete      Delete selected goal"),
            Line::from("  c             Clear completed goals"),
            Line::from("  1 / 2 / 3     Show all / active / completed"),
            Line::from("  Tab/Shift+Tab Cycle filter"),
            Line::from("  h/?/F1        Show this help"),
            Line::from("  q/Esc/Ctrl+C  Quit"),
        ];
        let paragraph = Paragraph::new(help_text)
            .block(Block::default().borders(Borders::ALL).title("Help - Press any key to return"))
            .wrap(Wrap { trim: false });
        f.render_widget(paragraph, area);
    }

    fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        let text = if !self.status_message.is_empty() {
            self.status_message.clone()
        } else {
            match self.state {
                AppState::TaskList => format!(
                    "{}: {} shown | a add  space toggle  d delete  c clear | h help",
                    format_filter(self.filter),
                    self.visible_ids.len()
                ),
                AppState::AddTask => "Add Task".to_string(),
                AppState::Help => "Help".to_string(),
                AppState::ConfirmClear => "Confirm Action".to_string(),
            }
        };
        let status = Paragraph::new(text).style(Style::default().bg(DARK_GREEN).fg(Color::White));
        f.render_widget(status, area);
    }

    /// Main render function that dispatches to the active screen.
    pub fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(3),
                Constraint::Length(3),
                Constraint::Length(1),
            ])
            .split(f.area());

        self.render_header(f, chunks[0]);
        self.render_filters(f, chunks[1]);
        match self.state {
            AppState::Help => self.render_help(f, chunks[2]),
            _ => self.render_task_list(f, chunks[2]),
        }
        self.render_progress(f, chunks[3]);
        self.render_status_bar(f, chunks[4]);

        match self.state {
            AppState::AddTask => self.render_add_popup(f, chunks[2]),
            AppState::ConfirmClear => self.render_confirm(f, chunks[2]),
            _ => {}
        }
    }

    /// Main event loop for the TUI application.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.handle_input()? {
                break;
            }
        }
        Ok(())
    }
}

/// Horizontal scroll and cursor column for a cursor `offset` cells into the
/// text, shown in a field `width` cells wide.
fn input_scroll(offset: u16, width: u16) -> (u16, u16) {
    if width == 0 {
        return (offset, 0);
    }
    let scroll = offset.saturating_sub(width - 1);
    (scroll, offset - scroll)
}
