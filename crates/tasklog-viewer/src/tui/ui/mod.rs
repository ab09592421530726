/*
[INPUT]:  TUI app state for UI components
[OUTPUT]: UI component render functions and module exports
[POS]:    TUI UI module root
[UPDATE]: When adding or removing panels
*/

mod layout;
mod logs;

pub(in crate::tui) use layout::{draw_banner, draw_error, draw_footer, draw_header};
pub(in crate::tui) use logs::draw_logs;
