//! SecondBrain: a terminal client for the SecondBrain knowledge store
//!
//! This library provides the session and authentication layer, the typed
//! backend client, the dashboard views and the terminal UI.

pub mod auth;
pub mod cli;
pub mod commands;
pub mod config;
pub mod constants;
pub mod errors;
pub mod gate;
pub mod knowledge;
pub mod logging;
pub mod tui;
pub mod views;
