//! Search-as-you-type terminal host: one query per keystroke

mod app;
mod ui;

use crate::handler::QueryHandler;
use crate::prefs::RawPreferences;
use anyhow::Result;
use app::{Activation, App};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use std::time::Duration;

pub fn run(
    handler: QueryHandler,
    preferences: RawPreferences,
    initial_query: Option<String>,
) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let mut app = App::new(handler, preferences);
    app.set_query(initial_query.as_deref().unwrap_or(""));

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        app.poll_search();

        terminal.draw(|f| ui::draw(f, app))?;

        if app.finished {
            return Ok(());
        }

        // Poll for events with timeout so background results get drawn
        if !event::poll(Duration::from_millis(50))? {
            continue;
        }

        // Only handle key press events, not release or repeat
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('c'))
            | (KeyModifiers::CONTROL, KeyCode::Char('q')) => return Ok(()),
            (KeyModifiers::ALT, KeyCode::Enter) | (KeyModifiers::CONTROL, KeyCode::Char('o')) => {
                app.activate(Activation::Alternate)
            }
            (KeyModifiers::CONTROL, KeyCode::Char('j'))
            | (KeyModifiers::CONTROL, KeyCode::Char('n')) => app.select_next(),
            (KeyModifiers::CONTROL, KeyCode::Char('k'))
            | (KeyModifiers::CONTROL, KeyCode::Char('p')) => app.select_prev(),
            (KeyModifiers::CONTROL, KeyCode::Char('a')) => app.select_first(),
            (KeyModifiers::CONTROL, KeyCode::Char('e')) => app.select_last(),
            (KeyModifiers::CONTROL, KeyCode::Char('w')) => app.delete_word(),
            (KeyModifiers::CONTROL, KeyCode::Char('u')) => app.clear_query(),
            (KeyModifiers::CONTROL, KeyCode::Char('h')) => app.pop_char(),
            (KeyModifiers::NONE | KeyModifiers::SHIFT, code) => match code {
                KeyCode::Esc => {
                    if app.query.is_empty() {
                        return Ok(());
                    }
                    app.clear_query();
                }
                KeyCode::Enter => app.activate(Activation::Primary),
                KeyCode::Down | KeyCode::Tab => app.select_next(),
                KeyCode::Up | KeyCode::BackTab => app.select_prev(),
                KeyCode::Char(c) => app.push_char(c),
                KeyCode::Backspace => app.pop_char(),
                _ => {}
            },
            _ => {}
        }
    }
}
