//! UI rendering

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use storeview_core::ConnectionState;

use crate::app::App;

/// Main UI rendering function
pub fn draw(frame: &mut Frame, app: &App) {
    if let Some(ref message) = app.fallback {
        draw_fallback(frame, message);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(4),
            Constraint::Length(1),
        ])
        .split(frame.area());

    draw_mirror(frame, app, chunks[0]);
    draw_controls(frame, app, chunks[1]);
    draw_status_bar(frame, app, chunks[2]);
}

/// Static message shown when the configured transport is unsupported
fn draw_fallback(frame: &mut Frame, message: &str) {
    let block = Block::default().title(" storeview ").borders(Borders::ALL);
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            message.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("Press q to quit."),
    ];
    let paragraph = Paragraph::new(text).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, frame.area());
}

/// The mirror region: serialized store, or a connection-state placeholder
fn draw_mirror(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().title(" Store ").borders(Borders::ALL);
    let paragraph = Paragraph::new(app.view.mirror.text().to_string())
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

/// The recording toggle and the name field
fn draw_controls(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().title(" Controls ").borders(Borders::ALL);

    let toggle_mark = if app.view.toggle.checked() { "x" } else { " " };
    let toggle_line = Line::from(format!("[{}] recording  (r to toggle)", toggle_mark));

    let editing = app.view.name_field.is_focused();
    let name_style = if editing {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let cursor = if editing { "▏" } else { "" };
    let hint = if editing {
        "(Enter to send)"
    } else {
        "(i to edit)"
    };
    let name_line = Line::from(vec![
        Span::raw("name: "),
        Span::styled(format!("{}{}", app.view.name_field.value(), cursor), name_style),
        Span::raw(format!("  {}", hint)),
    ]);

    let paragraph = Paragraph::new(vec![toggle_line, name_line]).block(block);
    frame.render_widget(paragraph, area);
}

/// Connection state and key hints
fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let state = app.state.connection_state();
    let state_style = match state {
        ConnectionState::Open => Style::default().add_modifier(Modifier::BOLD),
        _ => Style::default().add_modifier(Modifier::DIM),
    };

    let line = Line::from(vec![
        Span::styled(format!(" {} ", state), state_style),
        Span::raw("  r:toggle  i:edit name  q:quit"),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
