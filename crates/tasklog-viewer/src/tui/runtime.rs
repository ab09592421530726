/*
[INPUT]:  Shared TaskLogStore, session key, viewport config
[OUTPUT]: Ratatui run loop, frame layout, and shared styles
[POS]:    TUI runtime loop and shared helpers
[UPDATE]: When changing TUI layout or loop timing
*/

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{Event as CrosstermEvent, KeyEventKind};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use tasklog_viewer::SessionKey;
use tasklog_viewer::config::ViewportConfig;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::app::{AppState, LoadRequest, SharedStore, UiEvent};
use super::events::{handle_key_event, handle_mouse_event};
use super::terminal::TerminalGuard;
use super::ui::*;

const UI_TICK_INTERVAL: Duration = Duration::from_millis(250);
const INPUT_POLL_INTERVAL: Duration = Duration::from_millis(200);

pub(crate) fn border_style() -> Style {
    Style::default().fg(Color::Magenta)
}

pub(crate) fn header_style() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
}

pub(crate) fn key_style() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(Color::Yellow)
        .add_modifier(Modifier::BOLD)
}

pub async fn run_tui(
    store: SharedStore,
    session: SessionKey,
    viewport_config: &ViewportConfig,
) -> Result<()> {
    let mut terminal = TerminalGuard::new()?;
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let input_shutdown = CancellationToken::new();
    let input_shutdown_clone = input_shutdown.clone();
    let input_tx = event_tx.clone();

    tokio::task::spawn_blocking(move || {
        while !input_shutdown_clone.is_cancelled() {
            if crossterm::event::poll(INPUT_POLL_INTERVAL).unwrap_or(false) {
                if let Ok(event) = crossterm::event::read() {
                    if input_tx.send(UiEvent::Input(event)).is_err() {
                        break;
                    }
                }
            }
        }
    });

    let mut app = AppState::new(store.clone(), session, viewport_config, event_tx);
    app.spawn_load(LoadRequest::Initial);

    let mut tick = tokio::time::interval(UI_TICK_INTERVAL);
    let mut should_quit = false;

    while !should_quit {
        tokio::select! {
            _ = tick.tick() => {}
            maybe_event = event_rx.recv() => {
                match maybe_event {
                    Some(UiEvent::Input(CrosstermEvent::Key(key))) if key.kind == KeyEventKind::Press => {
                        should_quit = handle_key_event(&mut app, key);
                    }
                    Some(UiEvent::Input(CrosstermEvent::Mouse(mouse))) => {
                        handle_mouse_event(&mut app, mouse);
                    }
                    Some(UiEvent::Loaded { request, result }) => {
                        app.on_loaded(request, result);
                    }
                    Some(UiEvent::Input(_)) => {}
                    None => should_quit = true,
                }
            }
        }

        app.sync();
        terminal.draw(|frame| draw_ui(frame, &mut app))?;
    }

    input_shutdown.cancel();
    store.close();
    info!("log viewer closed");
    Ok(())
}

fn draw_ui(frame: &mut ratatui::Frame, app: &mut AppState) {
    let banner_rows = u16::from(app.viewport.banner().is_some());
    let error_rows = u16::from(app.snapshot.error.is_some());
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(banner_rows),
            Constraint::Min(5),
            Constraint::Length(error_rows),
            Constraint::Length(4),
        ])
        .split(frame.area());

    draw_header(frame, layout[0], app);
    draw_banner(frame, layout[1], app);
    draw_logs(frame, layout[2], app);
    draw_error(frame, layout[3], app);
    draw_footer(frame, layout[4], app);
}
