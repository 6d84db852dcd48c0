use std::collections::VecDeque;
use std::fs;

use playlist_editor::{
    Column, DialogOutcome, EditTarget, EditWorkflow, Field, RecordStore, SongDialog, SongDraft,
    SongRecord, ValidationError, WorkflowError,
};
use tempfile::TempDir;

struct Scripted(VecDeque<DialogOutcome>);

impl SongDialog for Scripted {
    fn prompt(&mut self, _draft: &SongDraft, _error: Option<&WorkflowError>) -> DialogOutcome {
        self.0.pop_front().unwrap_or(DialogOutcome::Cancelled)
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

fn submit(dialog_draft: SongDraft) -> Scripted {
    Scripted(VecDeque::from(vec![DialogOutcome::Submitted(dialog_draft)]))
}

#[test]
fn insert_save_reload_reproduces_record() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("nested").join("playlist.db");

    let mut workflow = EditWorkflow::new(RecordStore::open(&db_path).unwrap());
    workflow.load().unwrap();
    workflow
        .create_with(&mut submit(draft("Song A", "Artist X", "03:45", "4")))
        .unwrap();
    assert_eq!(workflow.save().unwrap(), 1);
    workflow.into_store().close().unwrap();

    let mut reopened = EditWorkflow::new(RecordStore::open(&db_path).unwrap());
    assert_eq!(reopened.load().unwrap(), 1);
    assert_eq!(
        reopened.model().records(),
        &[SongRecord::new("Song A", "Artist X", "03:45", 4)]
    );
}

#[test]
fn load_discards_unsaved_edits() {
    let mut workflow = EditWorkflow::new(RecordStore::open_in_memory().unwrap());
    workflow
        .submit(EditTarget::Create, &draft("Kept", "A", "01:00", "1"))
        .unwrap();
    workflow.save().unwrap();
    workflow
        .submit(EditTarget::Create, &draft("Unsaved", "B", "02:00", "2"))
        .unwrap();
    assert!(workflow.is_dirty());

    workflow.load().unwrap();
    assert!(!workflow.is_dirty());
    let titles: Vec<&str> = workflow.model().records().iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Kept"]);
}

#[test]
fn save_then_reload_is_idempotent() {
    let mut workflow = EditWorkflow::new(RecordStore::open_in_memory().unwrap());
    for (title, artist) in [("C", "3"), ("A", "1"), ("B", "2")] {
        workflow
            .submit(EditTarget::Create, &draft(title, artist, "00:30", "2"))
            .unwrap();
    }
    workflow.sort(Column::Title, true);
    workflow.save().unwrap();
    workflow.load().unwrap();
    let first = workflow.model().records().to_vec();
    workflow.save().unwrap();
    workflow.load().unwrap();
    assert_eq!(workflow.model().records(), first.as_slice());
    // Saving writes storage order, not the sorted view.
    let titles: Vec<&str> = first.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["C", "A", "B"]);
}

#[test]
fn validation_scenarios() {
    let mut workflow = EditWorkflow::new(RecordStore::open_in_memory().unwrap());
    let missing = workflow
        .submit(EditTarget::Create, &draft("", "X", "03:45", "1"))
        .unwrap_err();
    assert!(matches!(
        missing,
        WorkflowError::Validation(ValidationError::MissingField(Field::Title))
    ));

    let bad = workflow
        .submit(EditTarget::Create, &draft("A", "B", "99:99", "1"))
        .unwrap_err();
    assert!(matches!(
        bad,
        WorkflowError::Validation(ValidationError::BadDurationFormat(_))
    ));
    assert!(workflow.model().is_empty());
}

#[test]
fn preview_is_kept_on_blank_path_and_replaced_on_new_path() {
    let dir = TempDir::new().unwrap();
    let first_image = dir.path().join("first.png");
    let second_image = dir.path().join("second.jpg");
    fs::write(&first_image, b"first-bytes").unwrap();
    fs::write(&second_image, b"second-bytes").unwrap();

    let mut workflow = EditWorkflow::new(RecordStore::open_in_memory().unwrap());
    let mut with_image = draft("Song", "Artist", "02:00", "3");
    with_image.preview_path = first_image.display().to_string();
    workflow.submit(EditTarget::Create, &with_image).unwrap();
    assert_eq!(
        workflow.model().get(0).unwrap().preview.as_deref(),
        Some(&b"first-bytes"[..])
    );

    // The edit form comes back with a blank path; accepting it keeps the image.
    let session = workflow.begin_edit(0).unwrap();
    assert!(session.draft.preview_path.is_empty());
    let mut renamed = session.draft.clone();
    renamed.title = "Song (live)".to_string();
    workflow.submit(session.target, &renamed).unwrap();
    let record = workflow.model().get(0).unwrap();
    assert_eq!(record.title, "Song (live)");
    assert_eq!(record.preview.as_deref(), Some(&b"first-bytes"[..]));

    let mut replaced = workflow.begin_edit(0).unwrap().draft;
    replaced.preview_path = second_image.display().to_string();
    workflow
        .edit_with(0, &mut submit(replaced))
        .unwrap();
    assert_eq!(
        workflow.model().get(0).unwrap().preview.as_deref(),
        Some(&b"second-bytes"[..])
    );

    workflow.save().unwrap();
    workflow.load().unwrap();
    assert_eq!(
        workflow.model().get(0).unwrap().preview.as_deref(),
        Some(&b"second-bytes"[..])
    );
}

#[test]
fn delete_after_descending_artist_sort_removes_displayed_row() {
    let mut workflow = EditWorkflow::new(RecordStore::open_in_memory().unwrap());
    for (title, artist) in [("One", "Beatles"), ("Two", "Zappa"), ("Three", "Abba")] {
        workflow
            .submit(EditTarget::Create, &draft(title, artist, "03:00", "4"))
            .unwrap();
    }

    workflow.sort(Column::Artist, false);
    let shown_first = workflow.model().visible_rows().next().unwrap().clone();
    assert_eq!(shown_first.artist, "Zappa");

    let removed = workflow.delete(0).unwrap();
    assert_eq!(removed, shown_first);
    let remaining: Vec<&str> = workflow
        .model()
        .records()
        .iter()
        .map(|r| r.title.as_str())
        .collect();
    assert_eq!(remaining, vec!["One", "Three"]);
}

#[test]
fn edit_under_filter_and_sort_updates_the_visible_record() {
    let mut workflow = EditWorkflow::new(RecordStore::open_in_memory().unwrap());
    for (title, artist) in [("Rock Ballad", "X"), ("Jazz Night", "Y"), ("Rock Anthem", "Z")] {
        workflow
            .submit(EditTarget::Create, &draft(title, artist, "04:00", "2"))
            .unwrap();
    }
    workflow.set_filter("rock");
    workflow.sort(Column::Title, true);
    // Visible: Rock Anthem (storage 2), Rock Ballad (storage 0).

    let mut edited = workflow.begin_edit(0).unwrap().draft;
    edited.rating = "5".to_string();
    assert_eq!(workflow.edit_with(0, &mut submit(edited)), Some(2));
    assert_eq!(workflow.model().get(2).unwrap().rating, 5);
    assert_eq!(workflow.model().get(0).unwrap().rating, 2);
}
