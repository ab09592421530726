/*
[INPUT]:  Shared TaskLogStore and the session to view
[OUTPUT]: Ratatui-based scrollable log viewer
[POS]:    TUI module for tasklog-viewer binary
[UPDATE]: When changing TUI layout, keybindings, or runtime controls
*/

mod app;
mod events;
mod runtime;
mod terminal;
mod ui;

pub use runtime::run_tui;
