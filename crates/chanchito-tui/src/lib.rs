//! chanchito-tui - Terminal front end for the Chanchito Feliz admin client

pub mod app;
pub mod components;
pub mod screens;
pub mod theme;
pub mod ui;

pub use app::{App, AppOptions};

use anyhow::{Context, Result};
use chanchito_core::ApiClient;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Run the TUI until the user quits. `start_path` is the first view to open
/// (subject to the auth gate like any other navigation).
pub async fn run(client: Arc<ApiClient>, options: AppOptions, start_path: &str) -> Result<()> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(client, options);
    app.start(start_path);
    info!(route = app.route.path(), "TUI started");

    let result = run_loop(&mut terminal, &mut app).await;

    // Restore the terminal even when the loop failed
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_loop<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()>
where
    <B as Backend>::Error: Send + Sync + 'static,
{
    loop {
        // Session events first so a sign-out redirects before the next draw
        app.poll_events();
        app.spinner.tick();

        terminal.draw(|f| ui::render(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key.code, key.modifiers);
                }
            }
        }

        if app.should_quit {
            info!("TUI exiting");
            return Ok(());
        }
    }
}
