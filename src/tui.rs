use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::{Frame, Terminal};

use crate::app::{App, HostOps, Role};
use crate::runtime::SyncController;

const POLL_INTERVAL: Duration = Duration::from_millis(150);

const KEY_HINTS: &str = "Enter send · Tab switch · ^N new · ^T tools · ^R refresh · /help";

/// Terminal lifecycle wrapper: raw mode + alternate screen in, restored out.
pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl Tui {
    pub fn new() -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }

    pub fn restore(&mut self) -> io::Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        Ok(())
    }

    fn draw(&mut self, app: &App) -> io::Result<()> {
        self.terminal.draw(|frame| draw(frame, app))?;
        Ok(())
    }
}

/// Main loop: drain fetch completions, render when something changed,
/// dispatch keys.
pub fn run(tui: &mut Tui, controller: &Arc<SyncController>) -> io::Result<()> {
    with_app_mut(controller, |app, host| app.on_refresh_roster(host));

    let mut needs_draw = true;
    loop {
        controller.flush_pending_events();
        if controller.take_render_request() {
            needs_draw = true;
        }

        let snapshot = controller.snapshot();
        if snapshot.should_exit || controller.stop_requested() {
            return Ok(());
        }

        if needs_draw {
            tui.draw(&snapshot)?;
            needs_draw = false;
        }

        if !event::poll(POLL_INTERVAL)? {
            continue;
        }

        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                with_app_mut(controller, |app, host| handle_key(key, app, host));
                needs_draw = true;
            }
            Event::Resize(_, _) => needs_draw = true,
            _ => {}
        }
    }
}

fn with_app_mut(controller: &Arc<SyncController>, f: impl FnOnce(&mut App, &mut dyn HostOps)) {
    let mut host = Arc::clone(controller);
    let mut app = controller.lock_app();
    f(&mut app, &mut host);
}

fn handle_key(key: KeyEvent, app: &mut App, host: &mut dyn HostOps) {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => app.on_control_c(host),
            KeyCode::Char('n') => app.on_create_session(host),
            KeyCode::Char('t') => app.on_toggle_tool_trace(host),
            KeyCode::Char('r') => {
                app.on_refresh_roster(host);
                if app.tool_trace_visible {
                    app.on_refresh_tool_trace(host);
                }
            }
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Enter => app.on_submit(host),
        KeyCode::Esc => app.on_quit(host),
        KeyCode::Up => app.on_history_previous(),
        KeyCode::Down => app.on_history_next(),
        KeyCode::Backspace => app.on_composer_backspace(),
        KeyCode::Tab => {
            if let Some(next) = adjacent_session_id(app, 1) {
                app.on_select_session(host, &next);
            }
        }
        KeyCode::BackTab => {
            if let Some(previous) = adjacent_session_id(app, -1) {
                app.on_select_session(host, &previous);
            }
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::ALT) => {
            app.on_composer_char(ch);
        }
        _ => {}
    }
}

/// Roster neighbour of the active session, wrapping at both ends. Starts at
/// the top when nothing is active yet.
fn adjacent_session_id(app: &App, step: isize) -> Option<String> {
    if app.roster.is_empty() {
        return None;
    }

    let len = app.roster.len() as isize;
    let current = app.active_session_id.as_deref().and_then(|active| {
        app.roster
            .iter()
            .position(|session| session.session_id == active)
    });

    let index = match current {
        Some(index) => (index as isize + step).rem_euclid(len) as usize,
        None => 0,
    };

    Some(app.roster[index].session_id.clone())
}

fn draw(frame: &mut Frame, app: &App) {
    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(32), Constraint::Min(40)])
        .split(frame.size());

    draw_sidebar(frame, panes[0], app);
    draw_main(frame, panes[1], app);
}

fn draw_sidebar(frame: &mut Frame, area: Rect, app: &App) {
    let tools_height = if app.tool_trace_visible {
        Constraint::Percentage(45)
    } else {
        Constraint::Length(0)
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(4), tools_height])
        .split(area);

    let header = Paragraph::new(vec![
        Line::from(Span::styled(
            "Library Desk Agent",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(KEY_HINTS, Style::default().fg(Color::DarkGray))),
    ])
    .wrap(Wrap { trim: true })
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, rows[0]);

    draw_roster(frame, rows[1], app);

    if app.tool_trace_visible {
        draw_tool_trace(frame, rows[2], app);
    }
}

fn draw_roster(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default().borders(Borders::ALL).title("Sessions");

    if app.roster.is_empty() {
        let empty = Paragraph::new("No sessions yet. Create one with ^N.")
            .style(Style::default().fg(Color::DarkGray))
            .wrap(Wrap { trim: true })
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = app
        .roster
        .iter()
        .map(|session| {
            let mut lines = vec![Line::from(session_label(&session.session_id))];
            if let Some(last_time) = &session.last_time {
                lines.push(Line::from(Span::styled(
                    format!("  last: {last_time}"),
                    Style::default().fg(Color::DarkGray),
                )));
            }
            ListItem::new(lines)
        })
        .collect();

    let active_index = app.active_session_id.as_deref().and_then(|active| {
        app.roster
            .iter()
            .position(|session| session.session_id == active)
    });

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("› ");

    let mut state = ListState::default();
    state.select(active_index);
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_tool_trace(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Tool calls (^R refresh)");

    let body = if app.active_session_id.is_none() {
        "Select a session to inspect its tool calls.".to_string()
    } else if app.tool_trace.is_empty() {
        "No tool calls recorded.".to_string()
    } else {
        serde_json::to_string_pretty(&serde_json::Value::Array(app.tool_trace.clone()))
            .unwrap_or_else(|_| "<unrenderable tool trace>".to_string())
    };

    let panel = Paragraph::new(body)
        .style(Style::default().fg(Color::DarkGray))
        .wrap(Wrap { trim: false })
        .block(block);
    frame.render_widget(panel, area);
}

fn draw_main(frame: &mut Frame, area: Rect, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(4),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(area);

    draw_thread(frame, rows[0], app);
    draw_composer(frame, rows[1], app);
    draw_status(frame, rows[2], app);
}

fn draw_thread(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default().borders(Borders::ALL).title("Conversation");
    let inner_width = area.width.saturating_sub(2).max(1) as usize;
    let inner_height = area.height.saturating_sub(2) as usize;

    let lines = if app.active_session_id.is_none() {
        vec![Line::from(Span::styled(
            "Create or select a session on the left.",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        thread_lines(app, inner_width)
    };

    // Pin the view to the newest message.
    let scroll = lines.len().saturating_sub(inner_height) as u16;

    let thread = Paragraph::new(lines).scroll((scroll, 0)).block(block);
    frame.render_widget(thread, area);
}

fn thread_lines(app: &App, width: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    if app.is_loading_messages() {
        lines.push(Line::from(Span::styled(
            "Loading history…",
            Style::default().fg(Color::DarkGray),
        )));
    }

    for message in &app.messages {
        let (prefix, style) = match message.role {
            Role::User => ("you", Style::default().fg(Color::Cyan)),
            Role::Assistant => ("desk", Style::default().fg(Color::Green)),
        };

        let body_width = width.saturating_sub(prefix.len() + 3).max(8);
        for (index, wrapped) in wrap_text(&message.content, body_width).into_iter().enumerate() {
            let gutter = if index == 0 {
                format!("{prefix} › ")
            } else {
                " ".repeat(prefix.len() + 3)
            };
            lines.push(Line::from(vec![
                Span::styled(gutter, style.add_modifier(Modifier::BOLD)),
                Span::raw(wrapped),
            ]));
        }

        if message.pending {
            lines.push(Line::from(Span::styled(
                "    sending…",
                Style::default().fg(Color::DarkGray),
            )));
        } else if let Some(created_at) = &message.created_at {
            lines.push(Line::from(Span::styled(
                format!("    {created_at}"),
                Style::default().fg(Color::DarkGray),
            )));
        }
    }

    if app.pending_turn_count() > 0 {
        lines.push(Line::from(Span::styled(
            "desk is thinking…",
            Style::default().fg(Color::DarkGray),
        )));
    }

    lines
}

fn draw_composer(frame: &mut Frame, area: Rect, app: &App) {
    let session_active = app.active_session_id.is_some();

    let (text, style) = if app.composer.is_empty() {
        let placeholder = if session_active {
            "Ask about books, restocking, orders…"
        } else {
            "Create/select a session first…"
        };
        (placeholder.to_string(), Style::default().fg(Color::DarkGray))
    } else {
        (app.composer.clone(), Style::default())
    };

    let border_style = if session_active {
        Style::default()
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let composer = Paragraph::new(text).style(style).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style),
    );
    frame.render_widget(composer, area);

    let cursor_x = area.x + 1 + app.composer.chars().count() as u16;
    frame.set_cursor(cursor_x.min(area.x + area.width.saturating_sub(2)), area.y + 1);
}

fn draw_status(frame: &mut Frame, area: Rect, app: &App) {
    let (text, style) = match &app.notice {
        Some(notice) => (notice.clone(), Style::default().fg(Color::Yellow)),
        None if app.pending_turn_count() > 0 => (
            "Waiting for the desk agent…".to_string(),
            Style::default().fg(Color::DarkGray),
        ),
        None => (
            "Try: Restock The Pragmatic Programmer by 10.".to_string(),
            Style::default().fg(Color::DarkGray),
        ),
    };

    frame.render_widget(Paragraph::new(Span::styled(text, style)), area);
}

/// Sidebar label for a session: first eight characters of the opaque id.
fn session_label(session_id: &str) -> String {
    let short: String = session_id.chars().take(8).collect();
    if short.len() < session_id.len() {
        format!("Session {short}…")
    } else {
        format!("Session {short}")
    }
}

/// Greedy word wrap by character count. Words longer than the width are
/// split hard so no line ever exceeds it.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for raw_line in text.lines() {
        let mut current = String::new();

        for word in raw_line.split_whitespace() {
            let candidate_len = if current.is_empty() {
                word.chars().count()
            } else {
                current.chars().count() + 1 + word.chars().count()
            };

            if candidate_len <= width {
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(word);
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }

            let mut chunk = String::new();
            for ch in word.chars() {
                if chunk.chars().count() == width {
                    lines.push(std::mem::take(&mut chunk));
                }
                chunk.push(ch);
            }
            current = chunk;
        }

        lines.push(current);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}
