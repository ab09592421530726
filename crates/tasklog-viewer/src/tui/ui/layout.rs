/*
[INPUT]:  AppState session, filter, snapshot error, and reset banner
[OUTPUT]: Header, banner, error line, and hotkey footer renderers
[POS]:    TUI UI layout chrome around the log panel
[UPDATE]: When changing header fields or hotkeys
*/

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use tasklog_adapter::Direction;
use tasklog_viewer::{LoadOperation, SessionStatus};

use crate::tui::app::{AppState, InputMode};
use crate::tui::runtime::{border_style, header_style, key_style};

pub(in crate::tui) fn draw_header(frame: &mut ratatui::Frame, area: Rect, app: &AppState) {
    let status = match app.snapshot.status {
        SessionStatus::Idle => "idle",
        SessionStatus::LoadingInitial => "loading",
        SessionStatus::Ready => "ready",
        SessionStatus::Error => "error",
    };
    let filter = app.viewport.filter();
    let mut spans = vec![
        Span::styled(" job ", header_style()),
        Span::raw(format!(" {}  ", app.session.job_id)),
        Span::styled(" task ", header_style()),
        Span::raw(format!(" {}  ", app.session.task_id)),
        Span::styled(" lines ", header_style()),
        Span::raw(format!(
            " {}/{}  ",
            app.viewport.filtered_len(),
            app.snapshot.entries.len()
        )),
        Span::styled(" status ", header_style()),
        Span::raw(format!(" {status} ")),
    ];
    if filter.errors_only() {
        spans.push(Span::styled(
            " errors only ",
            Style::default().fg(Color::LightRed),
        ));
    }
    if !filter.search_text().is_empty() {
        spans.push(Span::raw(format!(" search: \"{}\"", filter.search_text())));
    }

    let widget = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style())
            .title("Task log"),
    );
    frame.render_widget(widget, area);
}

pub(in crate::tui) fn draw_banner(frame: &mut ratatui::Frame, area: Rect, app: &AppState) {
    let Some(reset) = app.viewport.banner() else {
        return;
    };
    let towards = match reset.direction {
        Direction::Older => "older",
        Direction::Newer => "newer",
    };
    let text = format!(
        " Memory limit reached: {} buffered lines were dropped and the view now shows the {towards} page. Press any key to dismiss. ",
        reset.discarded
    );
    let widget = Paragraph::new(Line::styled(
        text,
        Style::default()
            .fg(Color::Black)
            .bg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    ));
    frame.render_widget(widget, area);
}

pub(in crate::tui) fn draw_error(frame: &mut ratatui::Frame, area: Rect, app: &AppState) {
    let Some(failure) = app.snapshot.error.as_ref() else {
        return;
    };
    let operation = match failure.operation {
        LoadOperation::Initial => "initial load",
        LoadOperation::Older => "older page",
        LoadOperation::Newer => "newer page",
    };
    let hint = if failure.retryable {
        "press [R] to retry"
    } else {
        "[R] retries anyway"
    };
    let line = Line::from(vec![
        Span::styled(
            format!(" {operation} failed: "),
            Style::default()
                .fg(Color::LightRed)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(failure.message.clone()),
        Span::styled(format!("  ({hint})"), Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

pub(in crate::tui) fn draw_footer(frame: &mut ratatui::Frame, area: Rect, app: &AppState) {
    let key_style = key_style();
    let first = if app.input_mode == InputMode::Search {
        Line::from(vec![
            Span::styled("[Enter]", key_style),
            Span::raw(" Keep  "),
            Span::styled("[Esc]", key_style),
            Span::raw(" Clear  "),
            Span::raw(format!("Search: {}_", app.search_draft)),
        ])
    } else {
        Line::from(vec![
            Span::styled("[Up/Down]", key_style),
            Span::raw(" Scroll  "),
            Span::styled("[PgUp/PgDn]", key_style),
            Span::raw(" Page  "),
            Span::styled("[Home/End]", key_style),
            Span::raw(" Jump  "),
            Span::styled("[/]", key_style),
            Span::raw(" Search  "),
            Span::styled("[e]", key_style),
            Span::raw(" Errors"),
        ])
    };
    let second = Line::from(vec![
        Span::styled("[r]", key_style),
        Span::raw(" Refresh  "),
        Span::styled("[R]", key_style),
        Span::raw(" Retry  "),
        Span::styled("[q]", key_style),
        Span::raw(" Quit  "),
        Span::raw(format!("Status: {}", app.status_message)),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style())
        .title("Hotkeys");
    let widget = Paragraph::new(Text::from(vec![first, second]))
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(widget, area);
}
