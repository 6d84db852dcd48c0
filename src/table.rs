//! In-memory playlist table plus the sorted/filtered view shown on screen.
//!
//! Records live in `records` in storage order. The view is a separate list of
//! storage indices; visible row `n` shows `records[view[n]]`. Every mutation,
//! sort change and filter change rebuilds `view`, so a visible row always
//! resolves to the record actually drawn at that position.

use std::cmp::Ordering;

use crate::error::TableError;
use crate::models::{Column, SongRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub column: Column,
    pub ascending: bool,
}

#[derive(Debug, Default)]
pub struct TableModel {
    records: Vec<SongRecord>,
    view: Vec<usize>,
    filter: String,
    sort: Option<SortOrder>,
}

impl TableModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a model from already loaded records, with no sort or filter.
    pub fn from_records(records: Vec<SongRecord>) -> Self {
        let mut model = Self {
            records,
            ..Self::default()
        };
        model.rebuild_view();
        model
    }

    /// Append a record and return its storage index.
    pub fn insert(&mut self, record: SongRecord) -> usize {
        self.records.push(record);
        self.rebuild_view();
        self.records.len() - 1
    }

    /// Replace the record at `index` in storage order.
    pub fn update(&mut self, index: usize, record: SongRecord) -> Result<(), TableError> {
        let len = self.records.len();
        let slot = self
            .records
            .get_mut(index)
            .ok_or(TableError::IndexOutOfRange { index, len })?;
        *slot = record;
        self.rebuild_view();
        Ok(())
    }

    /// Remove the record at `index`; later records shift down by one.
    pub fn remove(&mut self, index: usize) -> Result<SongRecord, TableError> {
        if index >= self.records.len() {
            return Err(TableError::IndexOutOfRange {
                index,
                len: self.records.len(),
            });
        }
        let removed = self.records.remove(index);
        self.rebuild_view();
        Ok(removed)
    }

    /// Drop every record and take `records` instead. Sort and filter stay
    /// active so a reload keeps the user's view settings.
    pub fn replace_all(&mut self, records: Vec<SongRecord>) {
        self.records = records;
        self.rebuild_view();
    }

    /// Lazily yield `(storage_index, record)` pairs whose title, artist or
    /// duration contains `keyword`, ignoring case. An empty keyword matches
    /// every row. Storage order; the active sort is not applied.
    pub fn filter<'a>(
        &'a self,
        keyword: &str,
    ) -> impl Iterator<Item = (usize, &'a SongRecord)> + 'a {
        let needle = keyword.to_lowercase();
        self.records
            .iter()
            .enumerate()
            .filter(move |(_, record)| matches_keyword(record, &needle))
    }

    /// Set the live search keyword used by the view.
    pub fn set_filter(&mut self, keyword: &str) {
        self.filter = keyword.to_string();
        self.rebuild_view();
    }

    pub fn filter_keyword(&self) -> &str {
        &self.filter
    }

    /// Order the view by `column`. Storage order is untouched.
    pub fn sort(&mut self, column: Column, ascending: bool) {
        self.sort = Some(SortOrder { column, ascending });
        self.rebuild_view();
    }

    /// Return the view to storage order.
    pub fn clear_sort(&mut self) {
        self.sort = None;
        self.rebuild_view();
    }

    pub fn sort_order(&self) -> Option<SortOrder> {
        self.sort
    }

    /// Translate a visible row into the storage index of the record drawn
    /// there.
    pub fn resolve(&self, visible_row: usize) -> Option<usize> {
        self.view.get(visible_row).copied()
    }

    /// Visible position of a storage index, if the active filter shows it.
    pub fn visible_position(&self, index: usize) -> Option<usize> {
        self.view.iter().position(|&storage| storage == index)
    }

    /// Records in view order.
    pub fn visible_rows(&self) -> impl Iterator<Item = &SongRecord> + '_ {
        self.view.iter().map(move |&index| &self.records[index])
    }

    pub fn get(&self, index: usize) -> Option<&SongRecord> {
        self.records.get(index)
    }

    /// All records in storage order. This is the order a save writes.
    pub fn records(&self) -> &[SongRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn visible_len(&self) -> usize {
        self.view.len()
    }

    fn rebuild_view(&mut self) {
        let needle = self.filter.to_lowercase();
        let mut view: Vec<usize> = self
            .records
            .iter()
            .enumerate()
            .filter(|(_, record)| matches_keyword(record, &needle))
            .map(|(index, _)| index)
            .collect();

        if let Some(order) = self.sort {
            // Stable: ties keep storage order in both directions.
            view.sort_by(|&a, &b| {
                let ordering = compare_by(&self.records[a], &self.records[b], order.column);
                if order.ascending {
                    ordering
                } else {
                    ordering.reverse()
                }
            });
        }

        self.view = view;
    }
}

/// Rating and preview are not matched; only the text columns are searched.
fn matches_keyword(record: &SongRecord, needle: &str) -> bool {
    needle.is_empty()
        || record.title.to_lowercase().contains(needle)
        || record.artist.to_lowercase().contains(needle)
        || record.duration.to_lowercase().contains(needle)
}

fn compare_by(a: &SongRecord, b: &SongRecord, column: Column) -> Ordering {
    match column {
        Column::Title => compare_text(&a.title, &b.title),
        Column::Artist => compare_text(&a.artist, &b.artist),
        Column::Duration => compare_text(&a.duration, &b.duration),
        Column::Rating => a.rating.cmp(&b.rating),
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
