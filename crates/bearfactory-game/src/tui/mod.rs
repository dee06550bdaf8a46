/*
[INPUT]:  Game session handle, leaderboard store, log buffer
[OUTPUT]: Ratatui terminal front-end for playing rounds
[POS]:    TUI module for the bearfactory binary
[UPDATE]: When changing TUI layout, keybindings, or runtime controls
*/

mod app;
mod events;
mod runtime;
mod terminal;
mod ui;

pub use runtime::{LOG_BUFFER_CAPACITY, LogBuffer, LogBufferHandle, LogWriterFactory, run_tui_with_log};
