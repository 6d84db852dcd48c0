//! Record validation for the form's accept button. Pure: no file access, no
//! database access.

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Field, ValidationError};
use crate::models::SongDraft;

/// Minutes and seconds both run 00-59. Tracks of an hour or longer are
/// rejected; this matches the format the playlist has always stored.
static DURATION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-5][0-9]):([0-5][0-9])$").expect("duration pattern compiles"));

/// File types accepted as preview images.
const PREVIEW_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// A draft that passed validation. Text fields are trimmed, the rating is
/// parsed, and the preview path (if any) is known to name an image file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidRecord {
    pub title: String,
    pub artist: String,
    pub duration: String,
    pub rating: i64,
    pub preview_path: Option<PathBuf>,
}

/// Validate a form draft. Required fields are checked in display order so the
/// first empty one is reported.
pub fn check(draft: &SongDraft) -> Result<ValidRecord, ValidationError> {
    let title = required(&draft.title, Field::Title)?;
    let artist = required(&draft.artist, Field::Artist)?;
    required(&draft.duration, Field::Duration)?;
    let rating_raw = required(&draft.rating, Field::Rating)?;

    // Matched untrimmed: padding around the duration is a format error.
    let duration = draft.duration.as_str();
    if !is_valid_duration(duration) {
        return Err(ValidationError::BadDurationFormat(duration.to_string()));
    }

    let rating = rating_raw
        .parse::<i64>()
        .map_err(|_| ValidationError::InvalidRating(rating_raw.to_string()))?;

    let preview_path = match draft.preview_path.trim() {
        "" => None,
        raw => {
            let path = PathBuf::from(raw);
            if !is_image_path(&path) {
                return Err(ValidationError::UnsupportedPreview(path));
            }
            Some(path)
        }
    };

    Ok(ValidRecord {
        title: title.to_string(),
        artist: artist.to_string(),
        duration: duration.to_string(),
        rating,
        preview_path,
    })
}

/// Whether `text` is an `MM:SS` duration with both parts in 00-59.
pub fn is_valid_duration(text: &str) -> bool {
    DURATION_PATTERN.is_match(text)
}

fn required(value: &str, field: Field) -> Result<&str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(trimmed)
    }
}

fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            PREVIEW_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(title: &str, artist: &str, duration: &str, rating: &str) -> SongDraft {
        SongDraft {
            title: title.to_string(),
            artist: artist.to_string(),
            duration: duration.to_string(),
            rating: rating.to_string(),
            preview_path: String::new(),
        }
    }

    #[test]
    fn accepts_complete_record() {
        let valid = check(&draft("Song A", "Artist X", "03:45", "4")).unwrap();
        assert_eq!(valid.title, "Song A");
        assert_eq!(valid.artist, "Artist X");
        assert_eq!(valid.duration, "03:45");
        assert_eq!(valid.rating, 4);
        assert_eq!(valid.preview_path, None);
    }

    #[test]
    fn empty_title_is_missing_field() {
        let err = check(&draft("", "X", "03:45", "1")).unwrap_err();
        assert_eq!(err, ValidationError::MissingField(Field::Title));
    }

    #[test]
    fn whitespace_only_counts_as_missing() {
        let err = check(&draft("A", "   ", "03:45", "1")).unwrap_err();
        assert_eq!(err, ValidationError::MissingField(Field::Artist));
    }

    #[test]
    fn missing_duration_and_rating_are_reported() {
        assert_eq!(
            check(&draft("A", "B", "", "1")).unwrap_err(),
            ValidationError::MissingField(Field::Duration)
        );
        assert_eq!(
            check(&draft("A", "B", "01:00", "")).unwrap_err(),
            ValidationError::MissingField(Field::Rating)
        );
    }

    #[test]
    fn out_of_range_duration_is_rejected() {
        let err = check(&draft("A", "B", "99:99", "1")).unwrap_err();
        assert_eq!(err, ValidationError::BadDurationFormat("99:99".to_string()));
    }

    #[test]
    fn padded_duration_is_a_format_error() {
        for padded in [" 03:45 ", "03:45 ", "\t03:45"] {
            let err = check(&draft("A", "B", padded, "1")).unwrap_err();
            assert_eq!(err, ValidationError::BadDurationFormat(padded.to_string()));
        }
    }

    #[test]
    fn duration_pattern_boundaries() {
        for ok in ["00:00", "59:59", "07:05"] {
            assert!(is_valid_duration(ok), "{ok} should pass");
        }
        for bad in ["60:00", "00:60", "3:45", "03:4", "03:45 ", "1:02:03", "ab:cd", ""] {
            assert!(!is_valid_duration(bad), "{bad} should fail");
        }
    }

    #[test]
    fn non_numeric_rating_is_rejected() {
        let err = check(&draft("A", "B", "01:00", "five")).unwrap_err();
        assert_eq!(err, ValidationError::InvalidRating("five".to_string()));
    }

    #[test]
    fn preview_path_must_be_an_image() {
        let mut candidate = draft("A", "B", "01:00", "3");
        candidate.preview_path = "/tmp/cover.JPEG".to_string();
        let valid = check(&candidate).unwrap();
        assert_eq!(valid.preview_path, Some(PathBuf::from("/tmp/cover.JPEG")));

        candidate.preview_path = "/tmp/notes.txt".to_string();
        assert!(matches!(
            check(&candidate),
            Err(ValidationError::UnsupportedPreview(_))
        ));
    }
}
