use std::error::Error as StdError;

use anyhow::Chain;
use ratatui::layout::{Constraint, Direction, Layout, Rect};

use crate::models::Column;
use crate::table::SortOrder;

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Top-level message plus the innermost cause, when they differ. SQLite and
/// I/O causes carry the detail the user needs to act on.
pub(crate) fn surface_error(err: &(dyn StdError + 'static)) -> String {
    let top = err.to_string();
    match Chain::new(err).last() {
        Some(cause) if cause.to_string() != top && !top.contains(&cause.to_string()) => {
            format!("{top}: {cause}")
        }
        _ => top,
    }
}

/// Column header with an arrow when the view is sorted by it.
pub(crate) fn column_header(column: Column, sort: Option<SortOrder>) -> String {
    match sort {
        Some(order) if order.column == column => {
            let arrow = if order.ascending { "▲" } else { "▼" };
            format!("{} {arrow}", column.header())
        }
        _ => column.header().to_string(),
    }
}

/// Clamp `current + offset` into `0..len`.
pub(crate) fn clamp_offset(current: usize, offset: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let moved = current as isize + offset;
    moved.clamp(0, len as isize - 1) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;

    #[test]
    fn surface_error_appends_root_cause() {
        let err = StoreError::StoreWriteFailure(rusqlite::Error::QueryReturnedNoRows);
        let message = surface_error(&err);
        assert!(message.starts_with("Saving failed"));
        assert!(message.len() > "Saving failed".len() + 2);
    }

    #[test]
    fn header_marks_sorted_column() {
        let sort = Some(SortOrder {
            column: Column::Artist,
            ascending: false,
        });
        assert_eq!(column_header(Column::Artist, sort), "Artist ▼");
        assert_eq!(column_header(Column::Title, sort), "Title");
    }

    #[test]
    fn clamp_offset_stays_in_bounds() {
        assert_eq!(clamp_offset(0, -3, 4), 0);
        assert_eq!(clamp_offset(2, 5, 4), 3);
        assert_eq!(clamp_offset(1, 1, 4), 2);
        assert_eq!(clamp_offset(5, 1, 0), 0);
    }
}
