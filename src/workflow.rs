//! Create/edit/delete/save/load orchestration over the table model and the
//! record store.
//!
//! The form is modeled two ways. [`SongDialog`] is a blocking collaborator:
//! `create_with`/`edit_with` keep prompting until the user submits a valid
//! draft or cancels. Event-driven front-ends instead call [`EditWorkflow::begin_edit`]
//! and [`EditWorkflow::submit`] themselves, keeping the form open whenever
//! `submit` returns an error.

use std::fs;

use tracing::{debug, warn};

use crate::db::RecordStore;
use crate::error::{StoreError, WorkflowError};
use crate::models::{Column, SongDraft, SongRecord};
use crate::table::TableModel;
use crate::validate::{self, ValidRecord};

/// What the user did with the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogOutcome {
    Submitted(SongDraft),
    Cancelled,
}

/// Blocking record form. `error` carries the message from the previous
/// rejected submission so the form can show it while re-prompting.
pub trait SongDialog {
    fn prompt(&mut self, draft: &SongDraft, error: Option<&WorkflowError>) -> DialogOutcome;
}

/// Where an accepted form goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    /// Append a new record.
    Create,
    /// Replace the record at this storage index.
    Existing(usize),
}

/// An open form: its target plus the draft it was seeded with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    pub target: EditTarget,
    pub draft: SongDraft,
}

pub struct EditWorkflow {
    store: RecordStore,
    model: TableModel,
    dirty: bool,
}

impl EditWorkflow {
    /// Wrap an open store. The table starts empty; call [`load`](Self::load)
    /// to populate it.
    pub fn new(store: RecordStore) -> Self {
        Self {
            store,
            model: TableModel::new(),
            dirty: false,
        }
    }

    pub fn model(&self) -> &TableModel {
        &self.model
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Whether the table has edits that are not in the store yet.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Rebuild the table from the store, discarding unsaved edits.
    pub fn load(&mut self) -> Result<usize, StoreError> {
        let records = self.store.load_all()?;
        let count = records.len();
        self.model.replace_all(records);
        self.dirty = false;
        Ok(count)
    }

    /// Write the whole table to the store, replacing what was there. On
    /// failure the table and the stored playlist are both unchanged.
    pub fn save(&mut self) -> Result<usize, StoreError> {
        self.store.replace_all(self.model.records())?;
        self.dirty = false;
        Ok(self.model.len())
    }

    /// Blank form for a new record.
    pub fn begin_create(&self) -> EditSession {
        EditSession {
            target: EditTarget::Create,
            draft: SongDraft::default(),
        }
    }

    /// Form prefilled from the record shown at `visible_row`. `None` when
    /// nothing is shown there.
    pub fn begin_edit(&self, visible_row: usize) -> Option<EditSession> {
        let index = self.model.resolve(visible_row)?;
        let record = self.model.get(index)?;
        Some(EditSession {
            target: EditTarget::Existing(index),
            draft: SongDraft::from_record(record),
        })
    }

    /// Validate `draft` and apply it to `target`. Returns the storage index
    /// of the created or updated record. Nothing changes on error.
    pub fn submit(
        &mut self,
        target: EditTarget,
        draft: &SongDraft,
    ) -> Result<usize, WorkflowError> {
        let valid = validate::check(draft).inspect_err(|err| {
            warn!(error = %err, "rejected song form");
        })?;

        let index = match target {
            EditTarget::Create => {
                let record = self.build_record(valid, None)?;
                let index = self.model.insert(record);
                debug!(index, "created song");
                index
            }
            EditTarget::Existing(index) => {
                let kept_preview = self.model.get(index).and_then(|r| r.preview.clone());
                let record = self.build_record(valid, kept_preview)?;
                self.model.update(index, record)?;
                debug!(index, "updated song");
                index
            }
        };

        self.dirty = true;
        Ok(index)
    }

    /// Blocking create: prompt until a valid draft is submitted or the user
    /// cancels. Returns the new storage index.
    pub fn create_with(&mut self, dialog: &mut dyn SongDialog) -> Option<usize> {
        let session = self.begin_create();
        self.run_dialog(session, dialog)
    }

    /// Blocking edit of the record shown at `visible_row`. No selection (or
    /// cancel) leaves the table untouched.
    pub fn edit_with(&mut self, visible_row: usize, dialog: &mut dyn SongDialog) -> Option<usize> {
        let session = self.begin_edit(visible_row)?;
        self.run_dialog(session, dialog)
    }

    /// Remove the record shown at `visible_row`, without confirmation.
    /// Returns `None` when no row is shown there.
    pub fn delete(&mut self, visible_row: usize) -> Option<SongRecord> {
        let index = self.model.resolve(visible_row)?;
        let removed = self.model.remove(index).ok()?;
        debug!(index, title = %removed.title, "deleted song");
        self.dirty = true;
        Some(removed)
    }

    /// Live search keyword for the view.
    pub fn set_filter(&mut self, keyword: &str) {
        self.model.set_filter(keyword);
    }

    pub fn sort(&mut self, column: Column, ascending: bool) {
        self.model.sort(column, ascending);
    }

    pub fn clear_sort(&mut self) {
        self.model.clear_sort();
    }

    /// Hand the store back for closing.
    pub fn into_store(self) -> RecordStore {
        self.store
    }

    fn run_dialog(&mut self, session: EditSession, dialog: &mut dyn SongDialog) -> Option<usize> {
        let mut draft = session.draft;
        let mut last_error: Option<WorkflowError> = None;
        loop {
            match dialog.prompt(&draft, last_error.as_ref()) {
                DialogOutcome::Cancelled => return None,
                DialogOutcome::Submitted(submitted) => {
                    match self.submit(session.target, &submitted) {
                        Ok(index) => return Some(index),
                        Err(WorkflowError::Table(_)) => return None,
                        Err(err) => {
                            draft = submitted;
                            last_error = Some(err);
                        }
                    }
                }
            }
        }
    }

    /// Turn a validated form into a record, reading the preview file if a
    /// new path was given and otherwise keeping `existing_preview`.
    fn build_record(
        &self,
        valid: ValidRecord,
        existing_preview: Option<Vec<u8>>,
    ) -> Result<SongRecord, WorkflowError> {
        let preview = match valid.preview_path {
            Some(path) => {
                let bytes = fs::read(&path)
                    .map_err(|source| WorkflowError::PreviewUnreadable { path, source })?;
                Some(bytes)
            }
            None => existing_preview,
        };

        Ok(SongRecord {
            title: valid.title,
            artist: valid.artist,
            duration: valid.duration,
            preview,
            rating: valid.rating,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use crate::error::{Field, ValidationError};

    /// Replays canned outcomes and records what the form was shown.
    struct Scripted {
        outcomes: VecDeque<DialogOutcome>,
        shown: Vec<(SongDraft, Option<String>)>,
    }

    impl Scripted {
        fn new(outcomes: Vec<DialogOutcome>) -> Self {
            Self {
                outcomes: outcomes.into(),
                shown: Vec::new(),
            }
        }
    }

    impl SongDialog for Scripted {
        fn prompt(&mut self, draft: &SongDraft, error: Option<&WorkflowError>) -> DialogOutcome {
            self.shown.push((draft.clone(), error.map(|e| e.to_string())));
            self.outcomes.pop_front().unwrap_or(DialogOutcome::Cancelled)
        }
    }

    fn draft(title: &str, artist: &str, duration: &str, rating: &str) -> SongDraft {
        SongDraft {
            title: title.to_string(),
            artist: artist.to_string(),
            duration: duration.to_string(),
            rating: rating.to_string(),
            preview_path: String::new(),
        }
    }

    fn workflow() -> EditWorkflow {
        EditWorkflow::new(RecordStore::open_in_memory().unwrap())
    }

    #[test]
    fn create_appends_valid_record() {
        let mut wf = workflow();
        let index = wf
            .submit(EditTarget::Create, &draft("Song A", "Artist X", "03:45", "4"))
            .unwrap();
        assert_eq!(index, 0);
        assert_eq!(wf.model().get(0), Some(&SongRecord::new("Song A", "Artist X", "03:45", 4)));
        assert!(wf.is_dirty());
    }

    #[test]
    fn invalid_submit_changes_nothing() {
        let mut wf = workflow();
        let err = wf
            .submit(EditTarget::Create, &draft("", "X", "03:45", "1"))
            .unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::Validation(ValidationError::MissingField(Field::Title))
        ));
        assert!(wf.model().is_empty());
        assert!(!wf.is_dirty());
    }

    #[test]
    fn dialog_reprompts_until_valid() {
        let mut wf = workflow();
        let mut dialog = Scripted::new(vec![
            DialogOutcome::Submitted(draft("A", "B", "99:99", "1")),
            DialogOutcome::Submitted(draft("A", "B", "09:59", "1")),
        ]);
        let index = wf.create_with(&mut dialog);
        assert_eq!(index, Some(0));
        assert_eq!(dialog.shown.len(), 2);
        assert!(dialog.shown[0].1.is_none());
        // Second prompt shows the rejected draft and its error.
        assert_eq!(dialog.shown[1].0.duration, "99:99");
        assert!(dialog.shown[1].1.as_deref().unwrap().contains("MM:SS"));
    }

    #[test]
    fn cancel_discards() {
        let mut wf = workflow();
        let mut dialog = Scripted::new(vec![DialogOutcome::Cancelled]);
        assert_eq!(wf.create_with(&mut dialog), None);
        assert!(wf.model().is_empty());
    }

    #[test]
    fn edit_prefills_and_updates_in_place() {
        let mut wf = workflow();
        wf.submit(EditTarget::Create, &draft("One", "A", "01:00", "1")).unwrap();
        wf.submit(EditTarget::Create, &draft("Two", "B", "02:00", "2")).unwrap();

        let edited = draft("Two v2", "B", "02:30", "5");
        let mut dialog = Scripted::new(vec![DialogOutcome::Submitted(edited)]);
        assert_eq!(wf.edit_with(1, &mut dialog), Some(1));
        assert_eq!(dialog.shown[0].0, draft("Two", "B", "02:00", "2"));
        assert_eq!(wf.model().get(1).unwrap().title, "Two v2");
        assert_eq!(wf.model().len(), 2);
    }

    #[test]
    fn edit_and_delete_without_selection_are_noops() {
        let mut wf = workflow();
        let stray = draft("x", "y", "00:01", "1");
        let mut dialog = Scripted::new(vec![DialogOutcome::Submitted(stray)]);
        assert_eq!(wf.edit_with(0, &mut dialog), None);
        assert!(dialog.shown.is_empty());
        assert_eq!(wf.delete(0), None);
        assert!(!wf.is_dirty());
    }

    #[test]
    fn delete_targets_visible_row_under_sort() {
        let mut wf = workflow();
        wf.submit(EditTarget::Create, &draft("First", "Adams", "01:00", "1")).unwrap();
        wf.submit(EditTarget::Create, &draft("Second", "Young", "02:00", "2")).unwrap();
        wf.submit(EditTarget::Create, &draft("Third", "Miles", "03:00", "3")).unwrap();

        wf.sort(Column::Artist, false);
        let removed = wf.delete(0).unwrap();
        assert_eq!(removed.artist, "Young");
        let titles: Vec<&str> = wf.model().records().iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Third"]);
    }

    #[test]
    fn edit_targets_visible_row_under_filter() {
        let mut wf = workflow();
        wf.submit(EditTarget::Create, &draft("Alpha", "A", "01:00", "1")).unwrap();
        wf.submit(EditTarget::Create, &draft("Beta", "B", "02:00", "2")).unwrap();
        wf.set_filter("beta");

        let session = wf.begin_edit(0).unwrap();
        assert_eq!(session.target, EditTarget::Existing(1));
        wf.submit(session.target, &draft("Beta", "B", "02:01", "2")).unwrap();
        assert_eq!(wf.model().get(1).unwrap().duration, "02:01");
        assert_eq!(wf.model().get(0).unwrap().duration, "01:00");
    }

    #[test]
    fn unreadable_preview_blocks_acceptance() {
        let mut wf = workflow();
        let mut candidate = draft("A", "B", "01:00", "1");
        candidate.preview_path = "/definitely/not/here/cover.png".to_string();
        let err = wf.submit(EditTarget::Create, &candidate).unwrap_err();
        assert!(matches!(err, WorkflowError::PreviewUnreadable { .. }));
        assert!(wf.model().is_empty());
    }

    #[test]
    fn failed_save_keeps_table_and_dirty_flag() {
        let mut wf = workflow();
        wf.submit(EditTarget::Create, &draft("Stored", "A", "01:00", "1")).unwrap();
        wf.save().unwrap();
        wf.submit(EditTarget::Create, &draft("boom", "B", "02:00", "2")).unwrap();
        wf.store()
            .conn
            .execute_batch(
                "CREATE TRIGGER reject_boom BEFORE INSERT ON songs
                 WHEN NEW.title = 'boom'
                 BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
            )
            .unwrap();
        let before = wf.model().records().to_vec();

        let err = wf.save().unwrap_err();
        assert!(matches!(err, StoreError::StoreWriteFailure(_)));
        assert!(wf.is_dirty());
        assert_eq!(wf.model().records(), before.as_slice());
        assert_eq!(
            wf.store().load_all().unwrap(),
            vec![SongRecord::new("Stored", "A", "01:00", 1)]
        );
    }
}
