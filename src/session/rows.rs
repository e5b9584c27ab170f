//! Row factory
//!
//! Every variant appends to the end of the table body and then saves the
//! table exactly as change capture would.

use super::EditorSession;
use crate::clock::Clock;
use crate::content::{Cell, Row};
use crate::document::Document;
use crate::error::EditorResult;
use crate::store::KeyValueStore;

/// Status pre-filled in new attendance rows
pub const ATTENDANCE_DEFAULT_STATUS: &str = "Present";

/// Attendance sheets: date, name, grade/time/duty, status
pub const ATTENDANCE_COLUMNS: usize = 4;

impl<S, D, C> EditorSession<S, D, C>
where
    S: KeyValueStore,
    D: Document,
    C: Clock,
{
    /// Append a numbered row sized to the table's header.
    ///
    /// The first cell shows the new row's 1-based position. The number is
    /// written once and never renumbered. Returns that position, or `None`
    /// if the table is not in the page.
    pub fn add_row(&mut self, id: &str) -> EditorResult<Option<usize>> {
        let (Some(columns), Some(existing)) = (
            self.document.header_cell_count(id),
            self.document.row_count(id),
        ) else {
            log::debug!("add_row: no table body {}", id);
            return Ok(None);
        };

        let position = existing + 1;
        let cells = (0..columns)
            .map(|i| {
                if i == 0 {
                    Cell::text(&position.to_string())
                } else {
                    Cell::empty()
                }
            })
            .collect();
        self.append_and_save(id, Row::new(cells), position)
    }

    /// Append an attendance row dated today and marked present
    pub fn add_attendance_row(&mut self, id: &str) -> EditorResult<Option<usize>> {
        let Some(existing) = self.document.row_count(id) else {
            log::debug!("add_attendance_row: no table body {}", id);
            return Ok(None);
        };

        let row = Row::new(vec![
            Cell::text(&self.clock.today_iso()),
            Cell::empty(),
            Cell::empty(),
            Cell::text(ATTENDANCE_DEFAULT_STATUS),
        ]);
        self.append_and_save(id, row, existing + 1)
    }

    /// Append a row of `columns` empty cells
    pub fn add_generic_row(&mut self, id: &str, columns: usize) -> EditorResult<Option<usize>> {
        let Some(existing) = self.document.row_count(id) else {
            log::debug!("add_generic_row: no table body {}", id);
            return Ok(None);
        };
        self.append_and_save(id, Row::blank(columns), existing + 1)
    }

    fn append_and_save(&mut self, id: &str, row: Row, position: usize) -> EditorResult<Option<usize>> {
        if !self.document.append_row(id, &row) {
            return Ok(None);
        }
        if self.registry.is_table(id) {
            self.save_region(id)?;
        } else {
            log::debug!("Row added to unregistered table {}, not persisted", id);
        }
        Ok(Some(position))
    }
}
