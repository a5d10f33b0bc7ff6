use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::io::{self, stdout};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::config::Config;
use crate::export;
use crate::galaxy::Session;
use crate::ipc::{self, IpcCommand};
use crate::view::ViewState;

/// How long a status message stays on screen.
const MESSAGE_TTL: Duration = Duration::from_secs(3);

/// What the loop should do after a key press.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyAction {
    Quit,
    /// State changed, geometry must be recomputed
    Changed,
    Export,
    Ignored,
}

pub async fn run(config: Config, ipc_rx: mpsc::Receiver<IpcCommand>) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, config, ipc_rx).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: Config,
    mut ipc_rx: mpsc::Receiver<IpcCommand>,
) -> Result<()> {
    let mut session = Session::new(config.galaxy, config.params);
    let mut view = ViewState::new(&config.display);
    let mut geometry = session.render();
    let mut dirty = false;
    let mut message: Option<(String, Instant)> = None;

    info!(
        "Viewer started with {} stars, {} arms, seed {}",
        session.shape().stars,
        session.shape().arms,
        session.shape().seed
    );

    let mut last_frame = Instant::now();
    let frame_time = Duration::from_secs_f64(1.0 / config.display.fps.max(1) as f64);

    loop {
        // Calculate delta time
        let now = Instant::now();
        let dt = now.duration_since(last_frame).as_secs_f64();
        last_frame = now;

        if view.animate {
            session.advance(dt * config.display.time_scale);
            dirty = true;
        }

        // Process IPC commands (non-blocking)
        while let Ok(cmd) = ipc_rx.try_recv() {
            ipc::process_ipc_command(cmd, &mut session, &mut view, &config.export);
            dirty = true;
        }

        if dirty {
            geometry = session.render();
            dirty = false;
        }

        if message.as_ref().is_some_and(|(_, at)| at.elapsed() > MESSAGE_TTL) {
            message = None;
        }

        terminal.draw(|frame| {
            let area = frame.area();
            let block = ratatui::widgets::Block::default().style(Style::default().bg(Color::Reset));
            frame.render_widget(block, area);

            let body = Rect::new(area.x, area.y, area.width, area.height.saturating_sub(1));
            view.render(frame, body, &session, &geometry);
            render_status(frame, area, &session, &view, message.as_ref().map(|(m, _)| m.as_str()));
        })?;

        // Handle input
        if event::poll(frame_time)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match handle_key(key, &mut session, &mut view) {
                    KeyAction::Quit => break,
                    KeyAction::Changed => dirty = true,
                    KeyAction::Export => {
                        let path = &config.export.path;
                        let text = match export::write_snapshot(
                            path,
                            config.export.format,
                            &session,
                            view.color_scheme,
                        ) {
                            Ok(_) => format!("exported {}", path.display()),
                            Err(e) => {
                                warn!("Export failed: {}", e);
                                format!("export failed: {}", e)
                            }
                        };
                        message = Some((text, Instant::now()));
                    }
                    KeyAction::Ignored => {}
                }
            }
        }
    }

    Ok(())
}

/// Apply a key press to the session and view.
pub fn handle_key(key: KeyEvent, session: &mut Session, view: &mut ViewState) -> KeyAction {
    match key {
        KeyEvent {
            code: KeyCode::Char('q') | KeyCode::Esc,
            ..
        }
        | KeyEvent {
            code: KeyCode::Char('c'),
            modifiers: KeyModifiers::CONTROL,
            ..
        } => KeyAction::Quit,
        KeyEvent {
            code: KeyCode::Up | KeyCode::Char('k'),
            ..
        } => {
            view.selected = view.selected.prev();
            KeyAction::Changed
        }
        KeyEvent {
            code: KeyCode::Down | KeyCode::Char('j'),
            ..
        } => {
            view.selected = view.selected.next();
            KeyAction::Changed
        }
        KeyEvent {
            code: KeyCode::Left | KeyCode::Char('h'),
            ..
        } => {
            session.step_param(view.selected, -1);
            KeyAction::Changed
        }
        KeyEvent {
            code: KeyCode::Right | KeyCode::Char('l'),
            ..
        } => {
            session.step_param(view.selected, 1);
            KeyAction::Changed
        }
        KeyEvent {
            code: KeyCode::Char('a'),
            ..
        } => {
            view.camera.orbit(-1);
            KeyAction::Changed
        }
        KeyEvent {
            code: KeyCode::Char('d'),
            ..
        } => {
            view.camera.orbit(1);
            KeyAction::Changed
        }
        KeyEvent {
            code: KeyCode::Char('w'),
            ..
        } => {
            view.camera.tilt_by(1);
            KeyAction::Changed
        }
        KeyEvent {
            code: KeyCode::Char('s'),
            ..
        } => {
            view.camera.tilt_by(-1);
            KeyAction::Changed
        }
        KeyEvent {
            code: KeyCode::Char('+') | KeyCode::Char('='),
            ..
        } => {
            view.camera.zoom_by(1);
            KeyAction::Changed
        }
        KeyEvent {
            code: KeyCode::Char('-'),
            ..
        } => {
            view.camera.zoom_by(-1);
            KeyAction::Changed
        }
        KeyEvent {
            code: KeyCode::Char('c'),
            modifiers: KeyModifiers::NONE,
            ..
        } => {
            view.color_scheme = view.color_scheme.next();
            KeyAction::Changed
        }
        KeyEvent {
            code: KeyCode::Char(' '),
            ..
        } => {
            view.animate = !view.animate;
            KeyAction::Changed
        }
        KeyEvent {
            code: KeyCode::Char('t'),
            ..
        } => {
            session.reset_time();
            KeyAction::Changed
        }
        KeyEvent {
            code: KeyCode::Char('r'),
            ..
        } => {
            let seed = session.shape().seed.wrapping_add(1);
            session.reseed(seed);
            KeyAction::Changed
        }
        KeyEvent {
            code: KeyCode::Char('0'),
            ..
        } => {
            session.reset_params();
            KeyAction::Changed
        }
        KeyEvent {
            code: KeyCode::Char('p'),
            ..
        } => {
            view.show_panel = !view.show_panel;
            KeyAction::Changed
        }
        KeyEvent {
            code: KeyCode::Char('e'),
            ..
        } => KeyAction::Export,
        _ => KeyAction::Ignored,
    }
}

fn render_status(
    frame: &mut Frame,
    area: Rect,
    session: &Session,
    view: &ViewState,
    message: Option<&str>,
) {
    if area.height == 0 {
        return;
    }
    // Status line at bottom
    let status = match message {
        Some(message) => format!(" {} ", message),
        None => format!(
            " {} {:.2} | t {:.2}{} | [c]olor: {} | [q]uit ",
            view.selected.label(),
            session.params().get(view.selected),
            session.time(),
            if view.animate { " ▶" } else { "" },
            view.color_scheme.name()
        ),
    };

    let y = area.y + area.height - 1;
    for (i, ch) in status.chars().enumerate() {
        if i < area.width as usize {
            let cell = frame.buffer_mut().cell_mut((area.x + i as u16, y));
            if let Some(cell) = cell {
                cell.set_char(ch);
                cell.set_fg(Color::DarkGray);
            }
        }
    }
}
