//! Snapshot export/import
//!
//! The backup file is a flat JSON object mapping region id to its stored
//! markup, or `null` for regions that were never saved:
//!
//! ```json
//! { "teacher-list-body": "<tr>...</tr>", "std-att-body": null, "role-pali": "Thursdays" }
//! ```

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use crate::clock::Clock;
use crate::document::Document;
use crate::error::{EditorError, EditorResult};
use crate::session::EditorSession;
use crate::store::KeyValueStore;

/// Region id → stored content, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    entries: Vec<(String, Option<String>)>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an entry, replacing an existing one with the same key in place
    pub fn insert(&mut self, id: impl Into<String>, value: Option<String>) {
        let id = id.into();
        match self.entries.iter_mut().find(|(k, _)| *k == id) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((id, value)),
        }
    }

    /// Stored content for `id`; `None` for absent keys and `null` entries
    pub fn get(&self, id: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == id)
            .and_then(|(_, v)| v.as_deref())
    }

    pub fn contains_key(&self, id: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == id)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_json(&self) -> EditorResult<String> {
        serde_json::to_string(self).map_err(|e| EditorError::Serialization(e.to_string()))
    }

    /// Parse a backup file.
    ///
    /// The top level must be an object. String values are taken verbatim,
    /// `null` stays `None`, and any other value is kept as its JSON text.
    pub fn parse(text: &str) -> EditorResult<Self> {
        let value: Value = serde_json::from_str(text)?;
        let Value::Object(map) = value else {
            return Err(EditorError::ImportShape(json_kind(&value)));
        };

        let mut snapshot = Self::new();
        for (key, value) in map {
            let content = match value {
                Value::Null => None,
                Value::String(s) => Some(s),
                other => Some(other.to_string()),
            };
            snapshot.insert(key, content);
        }
        Ok(snapshot)
    }
}

impl Serialize for Snapshot {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Outcome of an import
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Keys whose record was written
    pub written: Vec<String>,
    /// Keys whose record was cleared by a `null` entry
    pub removed: Vec<String>,
    /// Keys that are not registered regions (written anyway, never read back)
    pub unknown: Vec<String>,
}

impl<S, D, C> EditorSession<S, D, C>
where
    S: KeyValueStore,
    D: Document,
    C: Clock,
{
    /// Snapshot of every registered region's stored record.
    ///
    /// Reads storage, not the live page.
    pub fn export(&self) -> EditorResult<Snapshot> {
        let mut snapshot = Snapshot::new();
        for id in self.registry.ids() {
            snapshot.insert(id, self.store.get(id)?);
        }
        log::info!("Exported {} regions", snapshot.len());
        Ok(snapshot)
    }

    pub fn export_json(&self) -> EditorResult<String> {
        self.export()?.to_json()
    }

    /// Write every snapshot entry into the record store.
    ///
    /// The page must be reloaded afterwards for the new records to show.
    pub fn import(&mut self, snapshot: &Snapshot) -> EditorResult<ImportReport> {
        let mut report = ImportReport::default();

        for (key, value) in snapshot.iter() {
            if !self.registry.contains(key) {
                report.unknown.push(key.to_string());
            }
            // A restored record replaces one that could not be read
            self.held.remove(key);
            match value {
                Some(content) => {
                    self.store.set(key, content)?;
                    report.written.push(key.to_string());
                }
                None => {
                    self.store.remove(key)?;
                    report.removed.push(key.to_string());
                }
            }
        }

        if !report.unknown.is_empty() {
            log::warn!(
                "Imported {} unknown keys: {}",
                report.unknown.len(),
                report.unknown.join(", ")
            );
        }
        log::info!(
            "Imported {} records ({} cleared)",
            report.written.len(),
            report.removed.len()
        );
        Ok(report)
    }

    /// Parse a backup file and import it. Storage is untouched if parsing fails.
    pub fn import_json(&mut self, text: &str) -> EditorResult<ImportReport> {
        let snapshot = Snapshot::parse(text)?;
        self.import(&snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::test_support::*;
    use crate::store::MemoryStorage;

    #[test]
    fn test_export_covers_every_region_in_order() {
        let mut s = hydrated();
        s.add_attendance_row("std-att-body").unwrap();

        let snapshot = s.export().unwrap();
        let keys: Vec<_> = snapshot.keys().collect();
        let registered: Vec<_> = s.registry().ids().collect();
        assert_eq!(keys, registered);

        assert!(snapshot.get("std-att-body").unwrap().contains("Present"));
        assert_eq!(snapshot.get("tch-att-body"), None);
        assert!(snapshot.contains_key("tch-att-body"));

        let json = snapshot.to_json().unwrap();
        assert!(json.starts_with("{\"teacher-list-body\":\"<tr>"));
        assert!(json.contains("\"tch-att-body\":null"));
    }

    #[test]
    fn test_export_reads_storage_not_page() {
        let mut s = hydrated();
        s.document_mut().edit_field("role-pali", "unsaved");
        let snapshot = s.export().unwrap();
        assert_eq!(snapshot.get("role-pali"), None);
    }

    #[test]
    fn test_import_of_export_is_idempotent() {
        let mut s = hydrated();
        let node = s.document_mut().edit_field("role-abhidharma", "Sundays").unwrap();
        s.handle_edit(&node).unwrap();
        s.add_attendance_row("prf-att-body").unwrap();

        let before = s.store().backend().items().clone();
        let json = s.export_json().unwrap();
        let report = s.import_json(&json).unwrap();

        assert_eq!(s.store().backend().items(), &before);
        assert!(report.unknown.is_empty());
        assert!(report.removed.contains(&"school-vp-name".to_string()));
    }

    #[test]
    fn test_import_overwrites_and_clears() {
        let mut s = hydrated();
        let node = s.document_mut().edit_field("prefect-duties", "old duties").unwrap();
        s.handle_edit(&node).unwrap();

        let report = s
            .import_json(r#"{ "prefect-duties": null, "role-pali": "<i>Pali</i>" }"#)
            .unwrap();
        assert_eq!(s.store().get("prefect-duties").unwrap(), None);
        assert_eq!(s.store().get("role-pali").unwrap().as_deref(), Some("<i>Pali</i>"));
        assert_eq!(report.written, ["role-pali"]);
        assert_eq!(report.removed, ["prefect-duties"]);
    }

    #[test]
    fn test_unknown_keys_pass_through() {
        let mut s = hydrated();
        let report = s
            .import_json(r#"{ "library-list-body": "<tr></tr>", "version": 3 }"#)
            .unwrap();

        assert_eq!(report.unknown.len(), 2);
        let items = s.store().backend().items();
        assert_eq!(items.get("siridhamma_library-list-body").map(String::as_str), Some("<tr></tr>"));
        assert_eq!(items.get("siridhamma_version").map(String::as_str), Some("3"));
    }

    #[test]
    fn test_parse_failure_leaves_storage_untouched() {
        let mut s = hydrated();
        let before = s.store().backend().items().clone();

        let err = s.import_json("{ not json").unwrap_err();
        assert!(matches!(err, EditorError::ImportParse(_)));
        assert!(err.is_import_rejection());
        assert!(err.to_string().starts_with("Error parsing file:"));

        let err = s.import_json("[\"prefect-list-body\"]").unwrap_err();
        assert!(matches!(err, EditorError::ImportShape("an array")));

        assert_eq!(s.store().backend().items(), &before);
    }

    #[test]
    fn test_import_into_fresh_storage_then_hydrate() {
        let mut s = session_with(MemoryStorage::new());
        s.import_json(
            r#"{ "flower-list-body": "<tr><td contenteditable=\"true\">1</td><td contenteditable=\"true\">Lotus</td></tr>" }"#,
        )
        .unwrap();

        s.hydrate().unwrap();
        let flowers = s.document().table("flower-list-body").unwrap();
        assert_eq!(flowers.row_count(), 1);
        assert_eq!(flowers.rows[0].cells[1].content, "Lotus");
    }
}
