//! Terminal User Interface (TUI) module for SecondBrain
//!
//! Landing screen, the authenticated dashboard and the static documents,
//! drawn with ratatui over crossterm.

mod events;
mod interface;
mod rendering;
mod state;

// Re-export the main interface
pub use interface::TuiInterface;
pub use state::{Tab, TuiState};
