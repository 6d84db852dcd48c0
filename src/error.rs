//! Error taxonomy for the editing workflow. User-input problems re-prompt the
//! form, index problems are treated as "nothing selected", and store problems
//! are reported while the in-memory table stays untouched.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Required form fields, reported by [`ValidationError::MissingField`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Artist,
    Duration,
    Rating,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Title => "Title",
            Field::Artist => "Artist",
            Field::Duration => "Duration",
            Field::Rating => "Rating",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required. Fill in Title, Artist, Duration and Rating.")]
    MissingField(Field),

    #[error("Duration '{0}' must use the MM:SS format (00:00 to 59:59).")]
    BadDurationFormat(String),

    #[error("Rating '{0}' must be a whole number.")]
    InvalidRating(String),

    #[error("Preview '{}' must be a .png, .jpg or .jpeg image.", .0.display())]
    UnsupportedPreview(PathBuf),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("Row {index} is out of range (table has {len} rows).")]
    IndexOutOfRange { index: usize, len: usize },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to open playlist database at {}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("failed to prepare playlist schema")]
    Schema(#[source] rusqlite::Error),

    #[error("failed to read songs from the playlist database")]
    Read(#[source] rusqlite::Error),

    #[error("Saving failed, the database still holds the previous playlist")]
    StoreWriteFailure(#[source] rusqlite::Error),

    #[error("failed to close playlist database")]
    Close(#[source] rusqlite::Error),

    #[error("failed to create data directory {}", .path.display())]
    DataDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Reasons a form submission is rejected. Input problems keep the form open;
/// a lost edit target closes it.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The edited row disappeared while the form was open.
    #[error(transparent)]
    Table(#[from] TableError),

    #[error("Could not read preview image {}: {source}", .path.display())]
    PreviewUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
