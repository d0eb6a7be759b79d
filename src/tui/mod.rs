//! Terminal UI using ratatui

mod terminal;
mod ui;

pub use terminal::Tui;
pub use ui::render;

use crate::app::App;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use std::io;
use std::time::{Duration, Instant};
use tracing::info;

/// How often the game clock advances
const TICK_RATE: Duration = Duration::from_millis(250);

/// Run the event loop until the player quits.
pub fn run(app: &mut App<'_>) -> io::Result<()> {
    let mut terminal = Tui::new()?;
    terminal.enter()?;

    let mut last_tick = Instant::now();
    loop {
        terminal.draw(|frame| render(frame, app))?;

        let timeout = TICK_RATE.checked_sub(last_tick.elapsed()).unwrap_or(Duration::ZERO);

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                // Only handle key press events (not release)
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Esc => app.quit(),
                        KeyCode::Enter => app.on_submit(),
                        KeyCode::Backspace => app.on_backspace(),
                        KeyCode::Char(c) if !c.is_control() => app.on_char(c),
                        _ => {}
                    }
                }
            }
        }

        if last_tick.elapsed() >= TICK_RATE {
            app.tick();
            last_tick = Instant::now();
        }

        if app.should_quit {
            info!("player quit");
            break;
        }
    }

    terminal.exit()
}
