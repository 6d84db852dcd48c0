//! Binary entry point: resolve configuration, start file logging, open the
//! playlist database, load it into the table, and run the terminal UI until
//! the user quits. The store is closed explicitly on the way out.
use std::env;
use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use anyhow::{Context, Result};
use playlist_editor::{run_app, App, Config, EditWorkflow, RecordStore};
use tracing::info;

fn main() -> Result<()> {
    let config = Config::from_env(env::args().nth(1))?;
    init_logging(&config)?;

    let store = RecordStore::open(&config.db_path)?;
    let mut workflow = EditWorkflow::new(store);
    workflow.load().context("failed to load the playlist")?;

    let mut app = App::new(workflow);
    let result = run_app(&mut app);

    app.into_workflow().into_store().close()?;
    info!("playlist editor exited");
    result
}

/// Route `tracing` output to the log file; the terminal is owned by the UI.
fn init_logging(config: &Config) -> Result<()> {
    if let Some(parent) = config.log_path.parent() {
        fs::create_dir_all(parent).context("failed to create data directory")?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)
        .with_context(|| format!("failed to open log file {}", config.log_path.display()))?;

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(config.log_level)
        .init();
    Ok(())
}
