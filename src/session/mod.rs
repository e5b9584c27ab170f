//! Editor session
//!
//! One [`EditorSession`] per page load bundles the record store, the region
//! registry, the document accessor and a clock. The browser glue owns it
//! behind an `Rc<RefCell<_>>` and hands it to every event closure.
//!
//! - `hydrate`: startup load / seed
//! - `capture`: delegated edit handling
//! - `rows`: row factory

pub mod capture;
pub mod hydrate;
pub mod rows;

pub use hydrate::HydrationReport;

use std::collections::BTreeSet;

use crate::clock::Clock;
use crate::config::EditorConfig;
use crate::document::Document;
use crate::error::EditorResult;
use crate::region::RegionRegistry;
use crate::store::{KeyValueStore, RecordStore};

/// Persistence service for one page session
pub struct EditorSession<S, D, C> {
    pub(crate) store: RecordStore<S>,
    pub(crate) registry: RegionRegistry,
    pub(crate) document: D,
    pub(crate) clock: C,
    pub(crate) hydrated: bool,
    /// Tables whose stored record could not be read at startup. Their record
    /// is kept and never saved over until a backup restore replaces it.
    pub(crate) held: BTreeSet<String>,
}

impl<S, D, C> EditorSession<S, D, C>
where
    S: KeyValueStore,
    D: Document,
    C: Clock,
{
    pub fn new(store: RecordStore<S>, registry: RegionRegistry, document: D, clock: C) -> Self {
        Self {
            store,
            registry,
            document,
            clock,
            hydrated: false,
            held: BTreeSet::new(),
        }
    }

    /// Build a session from configuration
    pub fn from_config(config: &EditorConfig, backend: S, document: D, clock: C) -> EditorResult<Self> {
        config.validate()?;
        let registry = config.registry()?;
        let store = RecordStore::new(backend, config.storage_prefix.clone());
        Ok(Self::new(store, registry, document, clock))
    }

    pub fn store(&self) -> &RecordStore<S> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut RecordStore<S> {
        &mut self.store
    }

    pub fn registry(&self) -> &RegionRegistry {
        &self.registry
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut D {
        &mut self.document
    }

    pub fn is_hydrated(&self) -> bool {
        self.hydrated
    }

    /// Whether saves to `id` are held back to protect an unreadable record
    pub fn is_held(&self, id: &str) -> bool {
        self.held.contains(id)
    }

    /// Persist the full current content of a registered region.
    ///
    /// Returns false without writing when the id is not registered, the
    /// page has no such element, or the region is held.
    pub fn save_region(&mut self, id: &str) -> EditorResult<bool> {
        let Some(region) = self.registry.lookup(id) else {
            log::debug!("Not saving unregistered region {}", id);
            return Ok(false);
        };
        if self.held.contains(id) {
            log::warn!("Not saving {}: its stored record could not be read", id);
            return Ok(false);
        }
        let Some(content) = self.document.read_region(region) else {
            log::debug!("Region {} not found in page", id);
            return Ok(false);
        };
        self.store.set(id, &content.to_record())?;
        Ok(true)
    }

    /// Start over on a freshly loaded page, keeping storage.
    ///
    /// Equivalent of `location.reload()`: the new session must be hydrated
    /// again before edits are captured.
    pub fn reload(self, document: D) -> Self {
        Self::new(self.store, self.registry, document, self.clock)
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use crate::content::{Cell, Row, TableContent};
    use crate::document::MemoryDocument;
    use crate::store::{KeyValueStore, MemoryStorage};

    #[test]
    fn test_save_region_writes_full_table() {
        let mut s = hydrated();
        s.document_mut().edit_cell("teacher-list-body", 0, 1, "Ven. Sumedha");

        assert!(s.save_region("teacher-list-body").unwrap());
        let stored = s.store().get("teacher-list-body").unwrap().unwrap();
        let table = TableContent::from_markup(&stored).unwrap();
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.rows[0].cells[1].content, "Ven. Sumedha");
    }

    #[test]
    fn test_save_region_skips_unknown_and_missing() {
        let mut s = session_with(MemoryStorage::new());
        assert!(!s.save_region("archive-body").unwrap());

        let mut s = crate::session::EditorSession::from_config(
            &crate::config::EditorConfig::default(),
            MemoryStorage::new(),
            MemoryDocument::new(),
            clock(),
        )
        .unwrap();
        assert!(!s.save_region("prefect-list-body").unwrap());
        assert!(s.store().backend().is_empty());
    }

    #[test]
    fn test_table_round_trip_through_reload() {
        let mut s = hydrated();
        let content = TableContent::new(vec![
            Row::new(vec![Cell::text("1"), Cell::text("Nimal"), Cell::text("7")]),
            Row::new(vec![Cell::text("2"), Cell::text("Kamala & Co"), Cell::empty()]),
        ]);
        s.document_mut().replace_table("student-list-body", &content);
        s.save_region("student-list-body").unwrap();

        let mut s = s.reload(MemoryDocument::siridhamma_page());
        s.hydrate().unwrap();
        assert_eq!(s.document().table("student-list-body"), Some(&content));
    }

    fn rich_student_rows() -> TableContent {
        let nested = "<table><tbody><tr><td>Nimal</td><td>7</td></tr></tbody></table>";
        let mut absent = Cell::text("absent");
        absent.attributes = vec![("class".to_string(), "absent".to_string())];
        let mut first = Row::new(vec![
            Cell::text("1"),
            Cell {
                content: nested.to_string(),
                ..Cell::empty()
            },
            Cell {
                content: "<b>Grade</b> 6<br>Pali".to_string(),
                ..Cell::empty()
            },
            absent,
            Cell::empty(),
        ]);
        first.attributes = vec![("data-house".to_string(), "Lotus".to_string())];
        TableContent::new(vec![first])
    }

    #[test]
    fn test_rich_cells_round_trip_through_reload() {
        let mut s = hydrated();
        let content = rich_student_rows();
        s.document_mut().replace_table("student-list-body", &content);
        assert!(s.save_region("student-list-body").unwrap());

        let mut s = s.reload(MemoryDocument::siridhamma_page());
        let report = s.hydrate().unwrap();
        assert!(report.undecodable.is_empty());
        assert_eq!(s.document().table("student-list-body"), Some(&content));

        // Adding a row after the reload keeps the restored row in the record
        assert_eq!(s.add_row("student-list-body").unwrap(), Some(2));
        let stored = s.store().get("student-list-body").unwrap().unwrap();
        let table = TableContent::from_markup(&stored).unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows[0], content.rows[0]);
    }

    #[test]
    fn test_attributed_record_is_saved_back_unchanged() {
        let record = "<tr class=\"odd\"><td contenteditable=\"true\" style=\"width: 2em\">1</td>\
            <td contenteditable=\"true\">Ven. <i>Ananda</i></td>\
            <td contenteditable=\"true\"></td><td contenteditable=\"true\"></td></tr>";
        let mut storage = MemoryStorage::new();
        storage.set_item("siridhamma_teacher-list-body", record).unwrap();

        let mut s = session_with(storage);
        s.hydrate().unwrap();
        assert!(s.save_region("teacher-list-body").unwrap());
        assert_eq!(s.store().get("teacher-list-body").unwrap().as_deref(), Some(record));
    }

    #[test]
    fn test_field_round_trip_through_reload() {
        let mut s = hydrated();
        let markup = "<ul><li>Open the hall</li><li>Lead <i>Vandana</i></li></ul>";
        let node = s.document_mut().edit_field("school-principal-duties", markup).unwrap();
        s.handle_edit(&node).unwrap();

        let mut s = s.reload(MemoryDocument::siridhamma_page());
        s.hydrate().unwrap();
        assert_eq!(s.document().field("school-principal-duties").unwrap().markup, markup);
    }

    /// Fresh storage, seed, edit, export, wipe, import, reload
    #[test]
    fn test_prefect_list_backup_scenario() {
        let mut s = session();
        s.hydrate().unwrap();

        let prefects = s.document().table("prefect-list-body").unwrap();
        assert_eq!(prefects.row_count(), 20);
        for (i, row) in prefects.rows.iter().enumerate() {
            assert_eq!(row.cells[0].content, (i + 1).to_string());
        }

        let node = s
            .document_mut()
            .edit_cell("prefect-list-body", 4, 1, "Jane Doe")
            .unwrap();
        assert_eq!(s.handle_edit(&node).unwrap().as_deref(), Some("prefect-list-body"));

        let stored = s.store().get("prefect-list-body").unwrap().unwrap();
        let table = TableContent::from_markup(&stored).unwrap();
        assert_eq!(table.rows[4].cells[1].content, "Jane Doe");

        let json = s.export_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value["prefect-list-body"].as_str().unwrap().contains("Jane Doe"));

        s.store_mut().backend_mut().clear();
        s.import_json(&json).unwrap();

        let mut s = s.reload(MemoryDocument::siridhamma_page());
        s.hydrate().unwrap();
        let prefects = s.document().table("prefect-list-body").unwrap();
        assert_eq!(prefects.row_count(), 20);
        assert_eq!(prefects.rows[4].cells[1].content, "Jane Doe");
        assert_eq!(prefects.rows[4].cells[0].content, "5");
    }
}
