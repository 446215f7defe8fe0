use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::tui::state::AppState;

pub fn render_entry_line(f: &mut Frame, area: Rect, state: &AppState) {
    let is_command = state.input.content().starts_with(':');
    let (title, color) = if is_command {
        ("Command", Color::Yellow)
    } else {
        ("Entry", Color::Cyan)
    };

    let entry = Paragraph::new(state.input.content()).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(color)),
    );
    f.render_widget(entry, area);

    if !state.show_help {
        f.set_cursor(area.x + 1 + state.input.cursor_position() as u16, area.y + 1);
    }
}
