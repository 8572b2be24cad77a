//! Main Terminal UI interface implementation

use crate::commands::Services;
use crate::tui::{events, rendering, state::TuiState};
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::Terminal;
use std::io;
use std::time::Duration;

/// TUI interface for SecondBrain
pub struct TuiInterface {
    /// Terminal instance for the TUI
    terminal: Terminal<ratatui::backend::CrosstermBackend<std::io::Stdout>>,
    /// Application state
    state: TuiState,
}

impl TuiInterface {
    /// Create a new TUI interface
    pub fn new(services: &Services) -> Result<Self, io::Error> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = ratatui::backend::CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            state: TuiState::new(services),
        })
    }

    /// Run the TUI interface
    pub async fn run(&mut self) -> anyhow::Result<()> {
        while !self.state.should_quit {
            // Process events in a batch until there are none left
            let mut events_processed = false;
            while event::poll(Duration::from_millis(0))? {
                events_processed = true;
                if let Event::Key(key) = event::read()? {
                    events::handle_key_event(&mut self.state, key);
                }
                if self.state.should_quit {
                    break;
                }
            }

            // Results of background requests and session changes
            self.state.tick();

            self.terminal
                .draw(|f| rendering::render_ui(&self.state, f))?;

            if !events_processed {
                // Yield to the runtime so spawned requests make progress
                tokio::time::sleep(Duration::from_millis(32)).await;
            }
        }

        // Restore terminal
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;

        Ok(())
    }
}

impl Drop for TuiInterface {
    fn drop(&mut self) {
        // Ensure terminal is properly cleaned up
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
    }
}
