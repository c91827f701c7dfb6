// Terminal UI implementation using ratatui
// The profile header, repository card grid and their key bindings

pub mod app;
pub mod help_ui;
pub mod runner;
pub mod ui;

pub use app::{App, InputMode, Screen};
pub use runner::{run_tui, RunOptions};
