use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::debug;

use super::TuiOptions;
use super::app::App;
use super::models::{ConfigInputMode, Phase};
use super::rendering::ui;

const TICK: Duration = Duration::from_millis(100);

pub async fn run_tui(options: TuiOptions) -> anyhow::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::with_options(options);
    let res = run_app(&mut terminal, &mut app).await;

    // Restore the terminal even when the loop failed.
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    res.map_err(Into::into)
}

async fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        app.clear_status_message_if_expired();
        app.poll_worker();

        terminal.draw(|f| ui(f, app))?;

        if event::poll(TICK)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && handle_key(app, key) {
                    if app.phase.is_busy() {
                        app.cancel_work();
                    }
                    return Ok(());
                }
            }
        } else {
            // Let spawned workers make progress between frames.
            tokio::task::yield_now().await;
        }
    }
}

/// Applies one key press. Returns `true` when the app should exit.
fn handle_key(app: &mut App, key: KeyEvent) -> bool {
    debug!(code = ?key.code, phase = ?app.phase, "key");

    if app.show_help {
        if matches!(key.code, KeyCode::Char('q' | 'h') | KeyCode::Esc | KeyCode::F(1)) {
            app.toggle_help();
        }
        return false;
    }

    if app.show_config {
        return handle_config_key(app, key.code);
    }

    if app.edit_buffer.is_some() {
        handle_edit_key(app, key.code);
        return false;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return true,
        KeyCode::Char('h') | KeyCode::F(1) => app.toggle_help(),
        KeyCode::Char('p') => app.toggle_preview(),
        KeyCode::Down | KeyCode::Char('j') => app.next(),
        KeyCode::Up | KeyCode::Char('k') => app.previous(),
        KeyCode::Char(' ') => app.toggle_selected(),
        KeyCode::Char('e') => app.start_edit(),
        KeyCode::Enter => app.start_execution(),
        KeyCode::Char('c') => app.cancel_work(),
        KeyCode::Char('r') => app.start_planning(),
        KeyCode::Char('o') => app.reopen_config(),
        _ => {}
    }
    false
}

// While a name is being typed every printable key goes into it.
fn handle_edit_key(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Enter => app.commit_edit(),
        KeyCode::Esc => app.cancel_edit(),
        KeyCode::Backspace => app.handle_edit_input('\x08'),
        KeyCode::Char(c) => app.handle_edit_input(c),
        _ => {}
    }
}

fn handle_config_key(app: &mut App, code: KeyCode) -> bool {
    if app.phase == Phase::Planning {
        match code {
            KeyCode::Char('c') => app.cancel_work(),
            KeyCode::Esc => return true,
            _ => {}
        }
        return false;
    }

    let typing = app.config_input_mode == ConfigInputMode::Directory;
    match code {
        KeyCode::Esc => return true,
        KeyCode::Char('q') if !typing => return true,
        KeyCode::Char('h') if !typing => app.toggle_help(),
        KeyCode::F(1) => app.toggle_help(),
        KeyCode::Enter if app.config_input_mode == ConfigInputMode::Confirm => app.start_planning(),
        KeyCode::Enter => app.advance_config_step(),
        KeyCode::Backspace if typing => app.handle_config_input('\x08'),
        KeyCode::Char(c) => app.handle_config_input(c),
        other => app.handle_config_navigation(other),
    }
    false
}
