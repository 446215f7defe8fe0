// TUI module - Terminal User Interface

pub mod app;
pub mod event;
pub mod input;
pub mod state;
pub mod ui;
pub mod widgets;

pub use app::App;
