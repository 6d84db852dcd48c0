use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::SongDraft;

/// Form state for creating or editing a song.
#[derive(Default, Clone)]
pub(crate) struct SongForm {
    pub(crate) title: String,
    pub(crate) artist: String,
    pub(crate) duration: String,
    pub(crate) rating: String,
    pub(crate) preview_path: String,
    pub(crate) active: SongField,
    pub(crate) error: Option<String>,
    /// Editing a record that already has an image; a blank path keeps it.
    pub(crate) has_existing_preview: bool,
}

/// Enumerates the fields within the song form to drive focus management.
#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub(crate) enum SongField {
    #[default]
    Title,
    Artist,
    Duration,
    Rating,
    Preview,
}

impl SongField {
    pub(crate) const ORDER: [SongField; 5] = [
        SongField::Title,
        SongField::Artist,
        SongField::Duration,
        SongField::Rating,
        SongField::Preview,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            SongField::Title => "Title",
            SongField::Artist => "Artist",
            SongField::Duration => "Duration",
            SongField::Rating => "Rating",
            SongField::Preview => "Preview",
        }
    }

    fn position(self) -> usize {
        Self::ORDER
            .iter()
            .position(|field| *field == self)
            .unwrap_or(0)
    }
}

impl SongForm {
    /// Populate the form from a workflow draft.
    pub(crate) fn from_draft(draft: &SongDraft, has_existing_preview: bool) -> Self {
        Self {
            title: draft.title.clone(),
            artist: draft.artist.clone(),
            duration: draft.duration.clone(),
            rating: draft.rating.clone(),
            preview_path: draft.preview_path.clone(),
            active: SongField::Title,
            error: None,
            has_existing_preview,
        }
    }

    /// Snapshot of the current text for submission.
    pub(crate) fn to_draft(&self) -> SongDraft {
        SongDraft {
            title: self.title.clone(),
            artist: self.artist.clone(),
            duration: self.duration.clone(),
            rating: self.rating.clone(),
            preview_path: self.preview_path.clone(),
        }
    }

    /// Move focus forward, wrapping from Preview back to Title.
    pub(crate) fn next_field(&mut self) {
        let next = (self.active.position() + 1) % SongField::ORDER.len();
        self.active = SongField::ORDER[next];
    }

    /// Move focus backward, wrapping from Title to Preview.
    pub(crate) fn previous_field(&mut self) {
        let len = SongField::ORDER.len();
        let previous = (self.active.position() + len - 1) % len;
        self.active = SongField::ORDER[previous];
    }

    /// Insert a character into the active field. Duration only takes digits
    /// and `:`, rating only digits and a leading minus.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.active {
            SongField::Title => self.title.push(ch),
            SongField::Artist => self.artist.push(ch),
            SongField::Duration => {
                if ch.is_ascii_digit() || ch == ':' {
                    self.duration.push(ch);
                } else {
                    return false;
                }
            }
            SongField::Rating => {
                if ch.is_ascii_digit() || (ch == '-' && self.rating.is_empty()) {
                    self.rating.push(ch);
                } else {
                    return false;
                }
            }
            SongField::Preview => self.preview_path.push(ch),
        }
        true
    }

    /// Remove a character from the active field.
    pub(crate) fn backspace(&mut self) {
        self.value_mut(self.active).pop();
    }

    fn value(&self, field: SongField) -> &String {
        match field {
            SongField::Title => &self.title,
            SongField::Artist => &self.artist,
            SongField::Duration => &self.duration,
            SongField::Rating => &self.rating,
            SongField::Preview => &self.preview_path,
        }
    }

    fn value_mut(&mut self, field: SongField) -> &mut String {
        match field {
            SongField::Title => &mut self.title,
            SongField::Artist => &mut self.artist,
            SongField::Duration => &mut self.duration,
            SongField::Rating => &mut self.rating,
            SongField::Preview => &mut self.preview_path,
        }
    }

    /// Render a styled line for the modal form.
    pub(crate) fn build_line(&self, field: SongField) -> Line<'static> {
        let value = self.value(field);
        let is_active = self.active == field;

        let placeholder = match field {
            SongField::Duration => "<MM:SS>",
            SongField::Preview if self.has_existing_preview => "<keep current image>",
            SongField::Preview => "<optional .png/.jpg path>",
            _ => "<required>",
        };

        let display = if value.is_empty() {
            placeholder.to_string()
        } else {
            value.clone()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{}: ", field.label())),
            Span::styled(display, style),
        ])
    }

    /// Character length of the requested field.
    pub(crate) fn value_len(&self, field: SongField) -> usize {
        self.value(field).chars().count()
    }

    /// Row of the active field inside the form, for cursor placement.
    pub(crate) fn active_row(&self) -> usize {
        self.active.position()
    }
}

/// Tracks the user's choice when quitting with unsaved edits.
pub(crate) struct ConfirmQuit {
    pub(crate) selection: QuitChoice,
}

impl ConfirmQuit {
    pub(crate) fn new() -> Self {
        Self {
            selection: QuitChoice::Save,
        }
    }

    /// Move the selection forward (Save → Discard → Cancel).
    pub(crate) fn next(&mut self) {
        self.selection = match self.selection {
            QuitChoice::Save => QuitChoice::Discard,
            QuitChoice::Discard => QuitChoice::Cancel,
            QuitChoice::Cancel => QuitChoice::Save,
        };
    }

    /// Move the selection backward (Save ← Discard ← Cancel).
    pub(crate) fn previous(&mut self) {
        self.selection = match self.selection {
            QuitChoice::Save => QuitChoice::Cancel,
            QuitChoice::Discard => QuitChoice::Save,
            QuitChoice::Cancel => QuitChoice::Discard,
        };
    }

    pub(crate) fn labels(&self) -> [&'static str; 3] {
        ["Save & Quit", "Discard & Quit", "Cancel"]
    }

    pub(crate) fn selected_index(&self) -> usize {
        match self.selection {
            QuitChoice::Save => 0,
            QuitChoice::Discard => 1,
            QuitChoice::Cancel => 2,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum QuitChoice {
    Save,
    Discard,
    Cancel,
}
