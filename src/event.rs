use std::io::{self, Stdout};
use std::path::Path;
use std::time::Duration;

use crossterm::{
    cursor,
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::warn;

use crate::ai::{AiResponse, AiWorker};
use crate::app::{App, Effect};
use crate::editor;
use crate::error::Error;
use crate::ui;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub fn run_app(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    worker: &AiWorker,
    editor_command: &str,
) -> io::Result<()> {
    let size = terminal.size()?;
    app.set_size(size.width, size.height);

    loop {
        while let Some(response) = worker.try_recv() {
            app.handle_ai_response(response);
        }

        terminal.draw(|f| ui::render(f, app))?;

        if !event::poll(POLL_INTERVAL)? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => match app.handle_key(key) {
                Effect::None => {}
                Effect::Quit => return Ok(()),
                Effect::Ask(request) => {
                    let scope = request.scope();
                    if let Err(e) = worker.dispatch(request) {
                        warn!("could not start AI request: {}", e);
                        app.handle_ai_response(AiResponse {
                            scope,
                            result: Err(Error::Service(format!("could not start request: {}", e))),
                        });
                    }
                }
                Effect::OpenEditor { id, path } => {
                    let outcome = suspend_for_editor(terminal, editor_command, &path)?;
                    app.editor_closed(&id, outcome);
                }
            },
            Event::Resize(width, height) => app.set_size(width, height),
            _ => {}
        }
    }
}

/// Hand the terminal to the editor and take it back afterwards. The outer
/// result is about the terminal itself; the inner one is the editor's.
fn suspend_for_editor(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    editor_command: &str,
    path: &Path,
) -> io::Result<io::Result<()>> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, cursor::Show)?;

    let outcome = editor::run(editor_command, path);

    enable_raw_mode()?;
    execute!(terminal.backend_mut(), EnterAlternateScreen)?;
    terminal.clear()?;
    Ok(outcome)
}
