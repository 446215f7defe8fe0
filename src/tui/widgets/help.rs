use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::tui::ui::centered_rect;

pub fn render_help_popup(f: &mut Frame, area: Rect) {
    let popup_area = centered_rect(70, 80, area);

    // Clear the background
    f.render_widget(Clear, popup_area);

    let help_content = vec![
        Line::from("Bt3 Serial Terminal"),
        Line::from(""),
        Line::from("Keys:"),
        Line::from("  F1       - Toggle help"),
        Line::from("  F2       - Connect / disconnect"),
        Line::from("  F3       - Switch HEX / ASCII view"),
        Line::from("  F4       - Local echo"),
        Line::from("  F5 / F6  - Append CR / LF"),
        Line::from("  F7 / F8  - Modulo / XOR checksum"),
        Line::from("  F9       - Timestamps"),
        Line::from("  F10      - Clear output"),
        Line::from("  Up/Down  - Entry history"),
        Line::from("  Ctrl-Q   - Quit"),
        Line::from(""),
        Line::from("Entries accept escapes: \\x00 \\n \\r \\t \\\\ \\101"),
        Line::from(""),
        Line::from("Commands (while disconnected):"),
        Line::from("  :set device <path>"),
        Line::from("  :set baud|bits|parity|stop|flow <value>"),
        Line::from("  :devices   :clear   :quit"),
    ];

    let help = Paragraph::new(help_content)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Help")
                .border_style(Style::default().fg(Color::Yellow)),
        )
        .wrap(ratatui::widgets::Wrap { trim: true });

    f.render_widget(help, popup_area);
}
