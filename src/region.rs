//! Region registry
//!
//! Which document regions are persisted. Built once per session from
//! [`EditorConfig`](crate::config::EditorConfig) and never changed afterwards.
//! Dispatch is a direct id lookup; resolving an event target to a region id
//! is the document adapter's job.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{EditorError, EditorResult};

/// What to put in a table that has no stored record yet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SeedPolicy {
    /// Append `count` numbered rows through the row factory
    NumberedRows { count: usize },
    /// Leave the table without rows (attendance sheets)
    Empty,
}

impl SeedPolicy {
    pub fn row_count(&self) -> usize {
        match self {
            SeedPolicy::NumberedRows { count } => *count,
            SeedPolicy::Empty => 0,
        }
    }
}

impl Default for SeedPolicy {
    fn default() -> Self {
        SeedPolicy::NumberedRows { count: 1 }
    }
}

/// Region kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind {
    /// Table body, persisted as its row collection
    Table { seed: SeedPolicy },
    /// Free-form editable container
    Field,
}

/// A registered region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionDescriptor {
    pub id: String,
    pub kind: RegionKind,
}

impl RegionDescriptor {
    pub fn is_table(&self) -> bool {
        matches!(self.kind, RegionKind::Table { .. })
    }

    pub fn is_field(&self) -> bool {
        matches!(self.kind, RegionKind::Field)
    }
}

/// Immutable set of persisted regions
#[derive(Debug, Clone, Default)]
pub struct RegionRegistry {
    /// Registration order: tables first, then fields
    order: Vec<String>,
    regions: BTreeMap<String, RegionDescriptor>,
}

impl RegionRegistry {
    /// Build a registry; ids must be non-empty and unique across both sets
    pub fn new<T, F>(tables: T, fields: F) -> EditorResult<Self>
    where
        T: IntoIterator<Item = (String, SeedPolicy)>,
        F: IntoIterator<Item = String>,
    {
        let mut registry = Self::default();
        for (id, seed) in tables {
            registry.insert(id, RegionKind::Table { seed })?;
        }
        for id in fields {
            registry.insert(id, RegionKind::Field)?;
        }
        Ok(registry)
    }

    fn insert(&mut self, id: String, kind: RegionKind) -> EditorResult<()> {
        if id.trim().is_empty() {
            return Err(EditorError::config("region id must not be empty"));
        }
        if self.regions.contains_key(&id) {
            return Err(EditorError::config(format!("duplicate region id: {id}")));
        }
        self.order.push(id.clone());
        self.regions.insert(id.clone(), RegionDescriptor { id, kind });
        Ok(())
    }

    pub fn lookup(&self, id: &str) -> Option<&RegionDescriptor> {
        self.regions.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.regions.contains_key(id)
    }

    pub fn is_table(&self, id: &str) -> bool {
        self.lookup(id).is_some_and(RegionDescriptor::is_table)
    }

    pub fn is_field(&self, id: &str) -> bool {
        self.lookup(id).is_some_and(RegionDescriptor::is_field)
    }

    /// All regions in registration order
    pub fn iter(&self) -> impl Iterator<Item = &RegionDescriptor> {
        self.order.iter().filter_map(|id| self.regions.get(id))
    }

    /// Table regions with their seed policy, in registration order
    pub fn tables(&self) -> impl Iterator<Item = (&str, SeedPolicy)> {
        self.iter().filter_map(|r| match r.kind {
            RegionKind::Table { seed } => Some((r.id.as_str(), seed)),
            RegionKind::Field => None,
        })
    }

    /// Field region ids in registration order
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.iter().filter(|r| r.is_field()).map(|r| r.id.as_str())
    }

    /// Every id in registration order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
