use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::tui::state::AppState;

/// Settings line: connection parameters, state and toggles.
pub fn render_settings_line(f: &mut Frame, area: Rect, state: &AppState) {
    let style = if state.session_state().is_connected() {
        Style::default().fg(Color::Black).bg(Color::Green)
    } else {
        Style::default().fg(Color::White).bg(Color::Blue)
    };

    let line = Paragraph::new(Line::from(vec![Span::styled(
        state.settings_line(),
        style.add_modifier(Modifier::BOLD),
    )]))
    .style(style);

    f.render_widget(line, area);
}

pub fn render_status_bar(f: &mut Frame, area: Rect, state: &AppState) {
    let status_text = match &state.status_message {
        Some(message) => message.clone(),
        None => "F1 help | F2 connect | Ctrl-Q quit".to_string(),
    };

    let status = Paragraph::new(Line::from(vec![Span::styled(
        status_text,
        Style::default().fg(Color::Yellow),
    )]));

    f.render_widget(status, area);
}
