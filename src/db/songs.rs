use rusqlite::{params, Connection};
use tracing::{info, warn};

use crate::error::StoreError;
use crate::models::SongRecord;

use super::RecordStore;

/// Rating written by older saves that left the column empty.
const DEFAULT_RATING: i64 = 1;

impl RecordStore {
    /// Read every stored song in insertion order. Rows are taken as-is, with
    /// no re-validation.
    pub fn load_all(&self) -> Result<Vec<SongRecord>, StoreError> {
        let songs = fetch_all_songs(&self.conn)?;
        info!(count = songs.len(), "loaded songs");
        Ok(songs)
    }

    /// Replace the stored playlist with `songs`, in the given order. The
    /// delete and every insert run in one transaction, so a failure leaves the
    /// previous playlist in place.
    pub fn replace_all(&mut self, songs: &[SongRecord]) -> Result<(), StoreError> {
        match replace_all_songs(&mut self.conn, songs) {
            Ok(()) => {
                info!(count = songs.len(), "saved songs");
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "save rolled back");
                Err(StoreError::StoreWriteFailure(err))
            }
        }
    }
}

fn fetch_all_songs(conn: &Connection) -> Result<Vec<SongRecord>, StoreError> {
    let mut stmt = conn
        .prepare("SELECT title, artist, duration, preview, rating FROM songs ORDER BY id")
        .map_err(StoreError::Read)?;

    let songs = stmt
        .query_map([], |row| {
            Ok(SongRecord {
                title: row.get(0)?,
                artist: row.get(1)?,
                duration: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                preview: row.get(3)?,
                rating: row.get::<_, Option<i64>>(4)?.unwrap_or(DEFAULT_RATING),
            })
        })
        .map_err(StoreError::Read)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(StoreError::Read)?;

    Ok(songs)
}

/// The transaction rolls back on drop unless `commit` is reached.
fn replace_all_songs(conn: &mut Connection, songs: &[SongRecord]) -> rusqlite::Result<()> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM songs", [])?;
    {
        let mut insert = tx.prepare(
            "INSERT INTO songs (title, artist, duration, preview, rating)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        for song in songs {
            insert.execute(params![
                song.title,
                song.artist,
                song.duration,
                song.preview,
                song.rating
            ])?;
        }
    }
    tx.commit()
}
