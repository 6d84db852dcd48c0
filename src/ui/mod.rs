//! Ratatui front-end: a playlist table, a modal song form, a live search bar
//! and a save prompt on quit. All editing goes through [`EditWorkflow`].
//!
//! [`EditWorkflow`]: crate::workflow::EditWorkflow

mod app;
mod forms;
mod helpers;
mod terminal;

pub use app::App;
pub use terminal::run_app;
