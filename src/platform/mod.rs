//! Browser platform layer
//!
//! Handles everything that needs `web_sys`:
//! - Storage (LocalStorage)
//! - DOM access for regions
//! - Backup download and file reading
//! - Tab navigation

#[cfg(target_arch = "wasm32")]
pub mod dom;
#[cfg(target_arch = "wasm32")]
pub mod file;
#[cfg(target_arch = "wasm32")]
pub mod nav;
#[cfg(target_arch = "wasm32")]
pub mod storage;

/// Attribute the hydrator puts on every registered region root
pub const REGION_ATTRIBUTE: &str = "data-region";

/// Attribute naming the UI action of a clickable element
pub const ACTION_ATTRIBUTE: &str = "data-action";

/// Attribute naming the element an action applies to
pub const TARGET_ATTRIBUTE: &str = "data-target";

/// Attribute carrying the column count for `add-generic-row`
pub const COLUMNS_ATTRIBUTE: &str = "data-columns";

/// UI actions wired through `data-action`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    AddRow(String),
    AddAttendanceRow(String),
    AddGenericRow(String, usize),
    Export,
    Tab(String),
    SubTab(String),
}

impl Action {
    /// Decode an action from its attribute values
    pub fn parse(action: &str, target: Option<&str>, columns: Option<&str>) -> Option<Self> {
        let target = target.map(str::trim).filter(|t| !t.is_empty());
        match action.trim() {
            "export" => Some(Action::Export),
            "add-row" => target.map(|t| Action::AddRow(t.to_string())),
            "add-attendance-row" => target.map(|t| Action::AddAttendanceRow(t.to_string())),
            "add-generic-row" => {
                let columns = columns?.trim().parse().ok()?;
                target.map(|t| Action::AddGenericRow(t.to_string(), columns))
            }
            "tab" => target.map(|t| Action::Tab(t.to_string())),
            "sub-tab" => target.map(|t| Action::SubTab(t.to_string())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_actions() {
        assert_eq!(Action::parse("export", None, None), Some(Action::Export));
        assert_eq!(
            Action::parse("add-row", Some("teacher-list-body"), None),
            Some(Action::AddRow("teacher-list-body".into()))
        );
        assert_eq!(
            Action::parse("add-generic-row", Some("flower-list-body"), Some(" 3 ")),
            Some(Action::AddGenericRow("flower-list-body".into(), 3))
        );
        assert_eq!(
            Action::parse("sub-tab", Some("prefect-attendance"), None),
            Some(Action::SubTab("prefect-attendance".into()))
        );
    }

    #[test]
    fn test_parse_rejects_incomplete_actions() {
        assert_eq!(Action::parse("add-row", None, None), None);
        assert_eq!(Action::parse("add-row", Some("  "), None), None);
        assert_eq!(Action::parse("add-generic-row", Some("t"), Some("three")), None);
        assert_eq!(Action::parse("add-generic-row", Some("t"), None), None);
        assert_eq!(Action::parse("delete-row", Some("t"), None), None);
    }
}
