//! Core library surface for the playlist editor.
//!
//! The editing core (`table`, `validate`, `workflow`, `db`) has no terminal
//! dependency; `ui` drives it through the same calls the tests use.
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod table;
pub mod ui;
pub mod validate;
pub mod workflow;

/// Handle to the SQLite-backed song table.
pub use db::RecordStore;

pub use config::Config;
pub use error::{Field, StoreError, TableError, ValidationError, WorkflowError};
pub use models::{Column, SongDraft, SongRecord};
pub use table::{SortOrder, TableModel};
pub use workflow::{DialogOutcome, EditSession, EditTarget, EditWorkflow, SongDialog};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
