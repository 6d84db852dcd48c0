//! Persistence module split across logical submodules.

mod connection;
mod songs;

pub use connection::RecordStore;
