//! Domain models shared by the table model, the persistence layer and the
//! terminal front-end. These stay plain data holders; validation lives in
//! `validate` and the index bookkeeping in `table`.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
/// One row of the playlist. Identity is positional: the record has no key of
/// its own, the table model addresses it by storage index.
pub struct SongRecord {
    pub title: String,
    pub artist: String,
    /// `MM:SS` text. Records loaded from the store are not re-validated, so
    /// this may hold anything an older save wrote.
    pub duration: String,
    /// Raw image bytes. Paths never reach this field; the workflow reads the
    /// file when the form is accepted.
    pub preview: Option<Vec<u8>>,
    pub rating: i64,
}

impl SongRecord {
    /// Convenience constructor for records without a preview image.
    pub fn new(title: &str, artist: &str, duration: &str, rating: i64) -> Self {
        Self {
            title: title.to_string(),
            artist: artist.to_string(),
            duration: duration.to_string(),
            preview: None,
            rating,
        }
    }

    /// Attach preview bytes, consuming the record.
    pub fn with_preview(mut self, bytes: Vec<u8>) -> Self {
        self.preview = Some(bytes);
        self
    }

    /// Short text describing the preview cell, e.g. `img 12K`.
    pub fn preview_label(&self) -> String {
        match &self.preview {
            None => "-".to_string(),
            Some(bytes) if bytes.len() < 1024 => format!("img {}B", bytes.len()),
            Some(bytes) => format!("img {}K", bytes.len() / 1024),
        }
    }
}

impl fmt::Display for SongRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.title, self.artist)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Raw text as entered in the record form. Nothing here is trusted until it
/// passes through [`crate::validate::check`].
pub struct SongDraft {
    pub title: String,
    pub artist: String,
    pub duration: String,
    pub rating: String,
    /// Filesystem path of a new preview image. Blank means "no new image":
    /// creation stores no preview, editing keeps the existing one.
    pub preview_path: String,
}

impl SongDraft {
    /// Prefill a draft from an existing record for the edit path. The preview
    /// path stays blank because stored images have no path.
    pub fn from_record(record: &SongRecord) -> Self {
        Self {
            title: record.title.clone(),
            artist: record.artist.clone(),
            duration: record.duration.clone(),
            rating: record.rating.to_string(),
            preview_path: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Displayed columns that the view can be sorted by.
pub enum Column {
    Title,
    Artist,
    Duration,
    Rating,
}

impl Column {
    pub const ALL: [Column; 4] = [Column::Title, Column::Artist, Column::Duration, Column::Rating];

    pub fn header(self) -> &'static str {
        match self {
            Column::Title => "Title",
            Column::Artist => "Artist",
            Column::Duration => "Duration",
            Column::Rating => "Rating",
        }
    }
}
