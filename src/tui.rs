//! Interactive terminal viewer: query input, error banner, filtered grid.

use std::io::{self, stdout, Write};
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tracing::error;

use crate::column_filter::ColumnFilter;
use crate::error::Result;
use crate::llm::ColumnResolver;
use crate::query_state::QueryState;
use crate::records::RecordStore;
use crate::util;

/// Widest a column is allowed to render; longer values are truncated.
const MAX_COL_WIDTH: usize = 24;

/// Outcome of one resolve task, tagged with its request generation so the
/// view can discard completions of superseded searches.
enum Completion {
    Resolved(u64, String),
    Failed(u64),
}

struct App {
    store: RecordStore,
    state: QueryState,
    resolver: Arc<dyn ColumnResolver + Send + Sync>,
    tx: mpsc::UnboundedSender<Completion>,
    should_quit: bool,
}

impl App {
    fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Enter => self.start_search(),
            KeyCode::Backspace => {
                self.state.input.pop();
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.state.input.push(c);
            }
            _ => {}
        }
    }

    /// Kick off a resolve for the current input. The search action is
    /// disabled while a request is in flight; typing stays live.
    fn start_search(&mut self) {
        if self.state.is_loading() {
            return;
        }

        let generation = self.state.begin_search();
        let user_text = self.state.input.clone();
        let resolver = Arc::clone(&self.resolver);
        let tx = self.tx.clone();

        tokio::spawn(async move {
            let completion = match resolver.resolve_column(&user_text).await {
                Ok(token) => Completion::Resolved(generation, token),
                Err(e) => {
                    error!("Error calling the column resolver: {}", e);
                    Completion::Failed(generation)
                }
            };
            let _ = tx.send(completion);
        });
    }

    fn apply(&mut self, completion: Completion) {
        match completion {
            Completion::Resolved(generation, token) => {
                self.state.apply_success(generation, &token);
            }
            Completion::Failed(generation) => {
                self.state.apply_failure(generation);
            }
        }
    }

    fn draw(&self, frame: &mut Frame) {
        let area = frame.area();

        let mut constraints = vec![
            Constraint::Length(1), // heading
            Constraint::Length(3), // input
            Constraint::Length(1), // search action
        ];
        if self.state.error().is_some() {
            constraints.push(Constraint::Length(3));
        }
        if self.state.filter().is_active() {
            constraints.push(Constraint::Length(1));
        }
        constraints.push(Constraint::Min(1)); // grid
        constraints.push(Constraint::Length(1)); // status
        let chunks = Layout::vertical(constraints).split(area);

        let mut next = 0usize;
        self.draw_heading(frame, chunks[next]);
        next += 1;
        self.draw_input(frame, chunks[next]);
        next += 1;
        self.draw_action(frame, chunks[next]);
        next += 1;
        if self.state.error().is_some() {
            self.draw_error(frame, chunks[next]);
            next += 1;
        }
        if self.state.filter().is_active() {
            self.draw_caption(frame, chunks[next]);
            next += 1;
        }
        self.draw_grid(frame, chunks[next]);
        next += 1;
        self.draw_status(frame, chunks[next]);
    }

    fn draw_heading(&self, frame: &mut Frame, area: Rect) {
        let store = &self.store;
        let title = format!(
            " gridlens | {} rows x {} cols ",
            store.records().len(),
            store.field_names().len()
        );
        let para = Paragraph::new(Line::from(Span::styled(
            title,
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )))
        .style(Style::default().bg(Color::Cyan));
        frame.render_widget(para, area);
    }

    fn draw_input(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Enter your search query ");
        let para = Paragraph::new(self.state.input.as_str()).block(block);
        frame.render_widget(para, area);

        let cursor_x = area.x + 1 + self.state.input.chars().count() as u16;
        let max_x = area.x + area.width.saturating_sub(2);
        frame.set_cursor_position((cursor_x.min(max_x), area.y + 1));
    }

    fn draw_action(&self, frame: &mut Frame, area: Rect) {
        let (label, style) = if self.state.is_loading() {
            (
                " [ Processing... ] ",
                Style::default().fg(Color::DarkGray),
            )
        } else {
            (
                " [ Search (Enter) ] ",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )
        };
        let para = Paragraph::new(Line::from(Span::styled(label, style)));
        frame.render_widget(para, area);
    }

    fn draw_error(&self, frame: &mut Frame, area: Rect) {
        let message = self.state.error().unwrap_or_default();
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red))
            .title(" Error ")
            .title_style(
                Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD),
            );
        let para = Paragraph::new(Line::from(Span::styled(
            message,
            Style::default().fg(Color::Red),
        )))
        .block(block);
        frame.render_widget(para, area);
    }

    fn draw_caption(&self, frame: &mut Frame, area: Rect) {
        let term = self.state.filter().term().unwrap_or_default();
        let line = Line::from(vec![
            Span::raw(" Showing columns including: "),
            Span::styled(
                term.to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn draw_grid(&self, frame: &mut Frame, area: Rect) {
        let columns = self.state.filter().select(self.store.field_names());
        if columns.is_empty() {
            // A term matching nothing legitimately renders zero columns.
            return;
        }

        let widths = column_widths(&self.store, &columns);

        let mut header_spans = vec![Span::raw(" ")];
        for (col, width) in columns.iter().zip(&widths) {
            header_spans.push(Span::styled(
                format!("{} ", util::pad_right(col, *width)),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ));
        }

        let mut lines = Vec::with_capacity(self.store.records().len() + 1);
        lines.push(Line::from(header_spans));

        for record in self.store.records() {
            let mut spans = vec![Span::raw(" ")];
            for (col, width) in columns.iter().zip(&widths) {
                let value = record.get(col).unwrap_or_default();
                spans.push(Span::styled(
                    format!("{} ", util::pad_right(&value, *width)),
                    Style::default().fg(Color::Gray),
                ));
            }
            lines.push(Line::from(spans));
        }

        frame.render_widget(Paragraph::new(lines), area);
    }

    fn draw_status(&self, frame: &mut Frame, area: Rect) {
        let visible = self.state.filter().select(self.store.field_names()).len();
        let status = format!(
            " {} rows | {}/{} columns | Enter: search  Esc: quit ",
            self.store.records().len(),
            visible,
            self.store.field_names().len()
        );
        let para = Paragraph::new(Line::from(Span::styled(
            status,
            Style::default().fg(Color::Black).bg(Color::DarkGray),
        )))
        .style(Style::default().bg(Color::DarkGray));
        frame.render_widget(para, area);
    }
}

/// Run the interactive viewer until the user quits.
pub async fn run(
    store: RecordStore,
    resolver: Arc<dyn ColumnResolver + Send + Sync>,
) -> Result<()> {
    terminal::enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;

    struct Cleanup;
    impl Drop for Cleanup {
        fn drop(&mut self) {
            let _ = stdout().execute(LeaveAlternateScreen);
            let _ = terminal::disable_raw_mode();
        }
    }
    let _cleanup = Cleanup;

    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut app = App {
        store,
        state: QueryState::new(),
        resolver,
        tx,
        should_quit: false,
    };

    loop {
        while let Ok(completion) = rx.try_recv() {
            app.apply(completion);
        }

        terminal.draw(|frame| app.draw(frame))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key);
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Print the filtered table as plain text to stdout (no TUI, no raw mode).
pub fn print_plain(store: &RecordStore, filter: &ColumnFilter) -> Result<()> {
    let out = io::stdout();
    let mut w = out.lock();

    if let Some(term) = filter.term() {
        writeln!(w, "Showing columns including: {}", term)?;
    }

    let columns = filter.select(store.field_names());
    if columns.is_empty() {
        return Ok(());
    }

    let widths = column_widths(store, &columns);

    for (col, width) in columns.iter().zip(&widths) {
        write!(w, "{} ", util::pad_right(col, *width))?;
    }
    writeln!(w)?;

    for width in &widths {
        write!(w, "{}-", "-".repeat(*width))?;
    }
    writeln!(w)?;

    for record in store.records() {
        for (col, width) in columns.iter().zip(&widths) {
            let value = record.get(col).unwrap_or_default();
            write!(w, "{} ", util::pad_right(&value, *width))?;
        }
        writeln!(w)?;
    }

    Ok(())
}

/// Display width per selected column: header or widest value, capped.
fn column_widths(store: &RecordStore, columns: &[&str]) -> Vec<usize> {
    columns
        .iter()
        .map(|col| {
            let mut width = col.len();
            for record in store.records() {
                if let Some(value) = record.get(col) {
                    width = width.max(value.len());
                }
            }
            width.min(MAX_COL_WIDTH)
        })
        .collect()
}
