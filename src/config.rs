//! Editor configuration
//!
//! Which regions the page persists and how records are named. The defaults
//! describe the Siridhamma school page; a page can override them with an
//! inline `<script type="application/json" id="editor-config">` block.

use serde::{Deserialize, Serialize};

use crate::error::{EditorError, EditorResult};
use crate::region::{RegionRegistry, SeedPolicy};
use crate::store::DEFAULT_PREFIX;

/// File name offered for backup downloads
pub const BACKUP_FILE_NAME: &str = "siridhamma_data_backup.json";

/// MIME type of backup downloads
pub const BACKUP_MIME_TYPE: &str = "application/json";

/// Table body seeded with a full page of numbered rows
pub const PREFECT_TABLE_ID: &str = "prefect-list-body";

/// Rows seeded into the prefect list on first load
pub const PREFECT_SEED_ROWS: usize = 20;

/// Attendance sheets start without rows
pub const ATTENDANCE_TABLE_IDS: [&str; 3] = ["std-att-body", "tch-att-body", "prf-att-body"];

/// Table bodies persisted by default, in page order
pub const DEFAULT_TABLE_IDS: [&str; 7] = [
    "teacher-list-body",
    "prefect-list-body",
    "student-list-body",
    "std-att-body",
    "tch-att-body",
    "prf-att-body",
    "flower-list-body",
];

/// Free-form fields persisted by default
pub const DEFAULT_FIELD_IDS: [&str; 9] = [
    "school-principal-name",
    "school-principal-duties",
    "school-vp-name",
    "school-vp-duties",
    "role-discipline",
    "role-abhidharma",
    "role-pali",
    "role-prefect-master",
    "prefect-duties",
];

/// A persisted table body and its first-load seed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRegionConfig {
    pub id: String,
    #[serde(default)]
    pub seed: SeedPolicy,
}

/// Editor configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Namespace prepended to every storage key
    pub storage_prefix: String,
    /// Download name for exported backups
    pub backup_file_name: String,
    /// Persisted table bodies
    pub tables: Vec<TableRegionConfig>,
    /// Persisted free-form fields
    pub fields: Vec<String>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        let tables = DEFAULT_TABLE_IDS
            .iter()
            .map(|&id| TableRegionConfig {
                id: id.to_string(),
                seed: default_seed(id),
            })
            .collect();

        Self {
            storage_prefix: DEFAULT_PREFIX.to_string(),
            backup_file_name: BACKUP_FILE_NAME.to_string(),
            tables,
            fields: DEFAULT_FIELD_IDS.iter().map(|id| id.to_string()).collect(),
        }
    }
}

/// Seed used for a table id that has no explicit policy
pub fn default_seed(id: &str) -> SeedPolicy {
    if id == PREFECT_TABLE_ID {
        SeedPolicy::NumberedRows {
            count: PREFECT_SEED_ROWS,
        }
    } else if ATTENDANCE_TABLE_IDS.contains(&id) {
        SeedPolicy::Empty
    } else {
        SeedPolicy::NumberedRows { count: 1 }
    }
}

impl EditorConfig {
    /// Parse a JSON override; missing keys keep their defaults
    pub fn from_json(json: &str) -> EditorResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| EditorError::config(format!("bad editor config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> EditorResult<()> {
        if self.storage_prefix.is_empty() {
            return Err(EditorError::config("storage prefix must not be empty"));
        }
        if self.backup_file_name.trim().is_empty() {
            return Err(EditorError::config("backup file name must not be empty"));
        }
        Ok(())
    }

    /// Build the session's region registry
    pub fn registry(&self) -> EditorResult<RegionRegistry> {
        RegionRegistry::new(
            self.tables.iter().map(|t| (t.id.clone(), t.seed)),
            self.fields.iter().cloned(),
        )
    }

    /// Element id of the inline config block
    #[cfg(target_arch = "wasm32")]
    const ELEMENT_ID: &'static str = "editor-config";

    /// Load configuration from the page (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load(document: &web_sys::Document) -> Self {
        if let Some(el) = document.get_element_by_id(Self::ELEMENT_ID) {
            if let Some(json) = el.text_content() {
                match Self::from_json(&json) {
                    Ok(config) => {
                        log::info!("Loaded editor config from page");
                        return config;
                    }
                    Err(e) => log::warn!("Ignoring editor config: {}", e),
                }
            }
        }

        log::info!("Using default editor config");
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_seed_policy() {
        let config = EditorConfig::default();
        let seed = |id: &str| config.tables.iter().find(|t| t.id == id).unwrap().seed;

        assert_eq!(seed("prefect-list-body"), SeedPolicy::NumberedRows { count: 20 });
        for id in ATTENDANCE_TABLE_IDS {
            assert_eq!(seed(id), SeedPolicy::Empty);
        }
        assert_eq!(seed("flower-list-body"), SeedPolicy::NumberedRows { count: 1 });
    }

    #[test]
    fn test_default_registry() {
        let registry = EditorConfig::default().registry().unwrap();
        assert_eq!(registry.len(), 16);
        assert!(registry.is_table("teacher-list-body"));
        assert!(registry.is_field("role-pali"));
    }

    #[test]
    fn test_partial_json_override() {
        let config = EditorConfig::from_json(
            r#"{
                "storage_prefix": "dhamma_school_",
                "tables": [
                    { "id": "class-list-body", "seed": { "kind": "numbered_rows", "count": 5 } },
                    { "id": "visit-log-body", "seed": { "kind": "empty" } },
                    { "id": "notes-body" }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(config.storage_prefix, "dhamma_school_");
        assert_eq!(config.backup_file_name, BACKUP_FILE_NAME);
        assert_eq!(config.fields.len(), DEFAULT_FIELD_IDS.len());
        assert_eq!(config.tables[2].seed, SeedPolicy::NumberedRows { count: 1 });
    }

    #[test]
    fn test_invalid_config() {
        assert!(EditorConfig::from_json(r#"{ "storage_prefix": "" }"#).is_err());
        assert!(EditorConfig::from_json("[1, 2]").is_err());
    }
}
