use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    Frame,
};

use super::{
    state::AppState,
    widgets::{
        entry::render_entry_line,
        help::render_help_popup,
        output::render_output_panel,
        status::{render_settings_line, render_status_bar},
    },
};

pub fn draw_ui(f: &mut Frame, state: &AppState) {
    let size = f.size();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Settings line
            Constraint::Min(0),    // Output pane
            Constraint::Length(3), // Entry line
            Constraint::Length(1), // Status bar
        ])
        .split(size);

    render_settings_line(f, chunks[0], state);
    render_output_panel(f, chunks[1], state);
    render_entry_line(f, chunks[2], state);
    render_status_bar(f, chunks[3], state);

    if state.show_help {
        render_help_popup(f, size);
    }
}

pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
