use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::core::framing::ChecksumMode;

use super::state::{Action, AppState};

/// Map one key press onto the terminal state.
pub fn handle_key_event(key: KeyEvent, state: &mut AppState) -> Action {
    if key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('q') | KeyCode::Char('c'))
    {
        return Action::Quit;
    }

    // Help mode swallows everything but its own close keys
    if state.show_help {
        if matches!(key.code, KeyCode::F(1) | KeyCode::Esc) {
            state.toggle_help();
        }
        return Action::None;
    }

    match key.code {
        KeyCode::F(1) => state.toggle_help(),
        KeyCode::F(2) => return state.toggle_connection(),
        KeyCode::F(3) => state.toggle_view(),
        KeyCode::F(4) => state.toggle_echo(),
        KeyCode::F(5) => state.toggle_cr(),
        KeyCode::F(6) => state.toggle_lf(),
        KeyCode::F(7) => state.toggle_checksum(ChecksumMode::Modulo),
        KeyCode::F(8) => state.toggle_checksum(ChecksumMode::Xor),
        KeyCode::F(9) => state.toggle_timestamps(),
        KeyCode::F(10) => state.clear_output(),
        KeyCode::Enter => return state.submit(),
        KeyCode::Up => state.history_previous(),
        KeyCode::Down => state.history_next(),
        KeyCode::Esc => {
            state.input.take();
        }
        _ => {
            state.input.handle_key(key);
        }
    }

    Action::None
}
