/*
[INPUT]:  AppState viewport window and store snapshot
[OUTPUT]: Log panel rendered into Ratatui frame
[POS]:    TUI UI logs panel rendering
[UPDATE]: When changing log line layout or edge indicators
*/

use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use tasklog_adapter::LogLevel;
use tasklog_viewer::{LogEntry, SessionStatus};

use crate::tui::app::AppState;
use crate::tui::runtime::border_style;

pub(in crate::tui) fn draw_logs(frame: &mut ratatui::Frame, area: Rect, app: &mut AppState) {
    app.viewport
        .set_client_height(area.height.saturating_sub(2) as usize);

    let pagination = app.snapshot.pagination;
    let metrics = app.viewport.metrics();

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style())
        .title(format!(" {} ", app.session.file_path));

    if pagination.is_loading_older {
        block = block.title_top(Line::from(" ▲ loading older ").right_aligned());
    } else if !pagination.has_more_older && metrics.scroll_height > 0 {
        block = block.title_top(
            Line::from(Span::styled(
                " start of log ",
                Style::default().fg(Color::DarkGray),
            ))
            .right_aligned(),
        );
    }
    if pagination.is_loading_newer {
        block = block.title_bottom(Line::from(" ▼ loading newer ").right_aligned());
    }
    if metrics.scroll_height > 0 {
        let range = app.viewport.visible_range();
        block = block.title_bottom(Line::from(format!(
            " {}-{} of {} ",
            range.start + 1,
            range.end,
            metrics.scroll_height
        )));
    }

    if metrics.scroll_height == 0 {
        let placeholder = empty_placeholder(app);
        let widget = Paragraph::new(placeholder)
            .block(block)
            .alignment(Alignment::Center);
        frame.render_widget(widget, area);
        return;
    }

    let offset = u16::try_from(app.viewport.render_offset()).unwrap_or(u16::MAX);
    let lines = app
        .viewport
        .render_entries()
        .map(log_line)
        .collect::<Vec<_>>();
    frame.render_widget(
        Paragraph::new(lines).block(block).scroll((offset, 0)),
        area,
    );
}

fn empty_placeholder(app: &AppState) -> Line<'static> {
    let dim = Style::default().fg(Color::DarkGray);
    match app.snapshot.status {
        SessionStatus::LoadingInitial => Line::styled("Loading logs...", dim),
        SessionStatus::Error => Line::styled(
            "Logs could not be loaded. Press [R] to retry.",
            Style::default().fg(Color::LightRed),
        ),
        _ if app.viewport.filter().is_active() => Line::styled("No lines match the filter", dim),
        _ => Line::styled("No logs", dim),
    }
}

fn log_line(entry: &LogEntry) -> Line<'_> {
    let mut spans = Vec::with_capacity(4);
    if entry.has_timestamp() {
        spans.push(Span::styled(
            format!("{} {} ", entry.date, entry.time),
            Style::default().fg(Color::DarkGray),
        ));
    }
    spans.push(Span::styled(
        format!("{:<5} ", entry.level.as_str().to_ascii_uppercase()),
        level_style(entry.level),
    ));
    spans.push(Span::raw(entry.message.as_str()));
    Line::from(spans)
}

fn level_style(level: LogLevel) -> Style {
    match level {
        LogLevel::Debug => Style::default().fg(Color::Blue),
        LogLevel::Info => Style::default().fg(Color::LightGreen),
        LogLevel::Warn => Style::default().fg(Color::Yellow),
        LogLevel::Error => Style::default()
            .fg(Color::LightRed)
            .add_modifier(Modifier::BOLD),
        LogLevel::Fatal => Style::default()
            .fg(Color::White)
            .bg(Color::Red)
            .add_modifier(Modifier::BOLD),
        LogLevel::Unknown => Style::default().fg(Color::Gray),
    }
}
