use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::{core::display::Direction, tui::state::AppState};

fn direction_style(direction: Direction) -> Style {
    match direction {
        Direction::Received => Style::default(),
        Direction::Echoed => Style::default().fg(Color::Red),
        Direction::Status => Style::default().fg(Color::Green),
    }
}

/// Output pane, scrolled so the newest line is at the bottom.
pub fn render_output_panel(f: &mut Frame, area: Rect, state: &AppState) {
    let visible = area.height.saturating_sub(2) as usize;
    let skip = state.output.len().saturating_sub(visible);

    let lines: Vec<Line> = state
        .output
        .iter()
        .skip(skip)
        .map(|line| Line::from(Span::styled(line.text.as_str(), direction_style(line.direction))))
        .collect();

    let title = format!("Output ({})", state.view);
    let output = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title));

    f.render_widget(output, area);
}
