//! Ratatui front-end. It owns no catalogue rules: every action calls into
//! [`crate::library::Library`] and the next frame is drawn from its state.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
