//! Document accessor
//!
//! The persistence core never touches the DOM directly. It talks to a
//! [`Document`], implemented by `platform::dom::BrowserDocument` on web and by
//! [`MemoryDocument`] for the native build and tests.

use std::collections::{BTreeMap, BTreeSet};

use crate::config::{DEFAULT_FIELD_IDS, DEFAULT_TABLE_IDS};
use crate::content::markup::escape_text;
use crate::content::{FieldContent, RegionContent, Row, TableContent};
use crate::error::EditorResult;
use crate::region::{RegionDescriptor, RegionKind};

/// Regions of an editable page
pub trait Document {
    /// Edit event target
    type Node;

    /// Tag a region root so edits inside it resolve to `id`.
    /// Returns false when the page has no element with that id.
    fn mark_region(&mut self, id: &str) -> bool;

    /// Id of the nearest tagged region enclosing `node` (the node itself included)
    fn owning_region(&self, node: &Self::Node) -> Option<String>;

    fn read_table(&self, id: &str) -> Option<TableContent>;

    /// Install a stored record as the body `id`, exactly as stored.
    ///
    /// Returns false when the page has no such body. Fails with
    /// `EditorError::Markup` when the record holds no rows the page can
    /// show; the body then keeps its previous content.
    fn restore_table(&mut self, id: &str, record: &str) -> EditorResult<bool>;

    fn read_field(&self, id: &str) -> Option<FieldContent>;

    fn replace_field(&mut self, id: &str, content: &FieldContent) -> bool;

    /// Number of header cells in the table enclosing the body `id`
    fn header_cell_count(&self, id: &str) -> Option<usize>;

    /// Append `row` as the last row of the body `id`
    fn append_row(&mut self, id: &str, row: &Row) -> bool;

    fn row_count(&self, id: &str) -> Option<usize> {
        self.read_table(id).map(|t| t.row_count())
    }

    /// Current live content of a registered region
    fn read_region(&self, region: &RegionDescriptor) -> Option<RegionContent> {
        match region.kind {
            RegionKind::Table { .. } => self.read_table(&region.id).map(RegionContent::Table),
            RegionKind::Field => self.read_field(&region.id).map(RegionContent::Field),
        }
    }
}

/// Edit target inside a [`MemoryDocument`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryNode {
    Cell { table: String, row: usize, col: usize },
    Field { id: String },
    /// Somewhere outside every table and field
    Outside,
}

#[derive(Debug, Clone)]
struct MemoryTable {
    header_cells: usize,
    content: TableContent,
}

/// In-memory page: table bodies with header counts, and fields
#[derive(Debug, Clone, Default)]
pub struct MemoryDocument {
    tables: BTreeMap<String, MemoryTable>,
    fields: BTreeMap<String, FieldContent>,
    marked: BTreeSet<String>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// The Siridhamma page as authored: empty table bodies and default field text
    pub fn siridhamma_page() -> Self {
        let mut doc = Self::new();
        for id in DEFAULT_TABLE_IDS {
            let headers = if id == "student-list-body" { 5 } else { 4 };
            doc = doc.with_table(id, headers);
        }
        for id in DEFAULT_FIELD_IDS {
            doc = doc.with_field(id, "<span>Click to edit</span>");
        }
        doc
    }

    pub fn with_table(mut self, id: &str, header_cells: usize) -> Self {
        self.tables.insert(
            id.to_string(),
            MemoryTable {
                header_cells,
                content: TableContent::default(),
            },
        );
        self
    }

    pub fn with_field(mut self, id: &str, markup: &str) -> Self {
        self.fields.insert(id.to_string(), FieldContent::new(markup));
        self
    }

    pub fn table(&self, id: &str) -> Option<&TableContent> {
        self.tables.get(id).map(|t| &t.content)
    }

    pub fn field(&self, id: &str) -> Option<&FieldContent> {
        self.fields.get(id)
    }

    /// Overwrite the rows of a table body
    pub fn replace_table(&mut self, id: &str, content: &TableContent) -> bool {
        match self.tables.get_mut(id) {
            Some(table) => {
                table.content = content.clone();
                true
            }
            None => false,
        }
    }

    pub fn is_marked(&self, id: &str) -> bool {
        self.marked.contains(id)
    }

    /// Type `text` into a cell, returning the event target
    pub fn edit_cell(&mut self, table: &str, row: usize, col: usize, text: &str) -> Option<MemoryNode> {
        let cell = self
            .tables
            .get_mut(table)?
            .content
            .rows
            .get_mut(row)?
            .cells
            .get_mut(col)?;
        cell.content = escape_text(text);
        Some(MemoryNode::Cell {
            table: table.to_string(),
            row,
            col,
        })
    }

    /// Replace a field's markup, returning the event target
    pub fn edit_field(&mut self, id: &str, markup: &str) -> Option<MemoryNode> {
        let field = self.fields.get_mut(id)?;
        field.markup = markup.to_string();
        Some(MemoryNode::Field { id: id.to_string() })
    }
}

impl Document for MemoryDocument {
    type Node = MemoryNode;

    fn mark_region(&mut self, id: &str) -> bool {
        if self.tables.contains_key(id) || self.fields.contains_key(id) {
            self.marked.insert(id.to_string());
            true
        } else {
            false
        }
    }

    fn owning_region(&self, node: &MemoryNode) -> Option<String> {
        let id = match node {
            MemoryNode::Cell { table, .. } => table,
            MemoryNode::Field { id } => id,
            MemoryNode::Outside => return None,
        };
        self.marked.contains(id).then(|| id.clone())
    }

    fn read_table(&self, id: &str) -> Option<TableContent> {
        self.table(id).cloned()
    }

    fn restore_table(&mut self, id: &str, record: &str) -> EditorResult<bool> {
        let Some(table) = self.tables.get_mut(id) else {
            return Ok(false);
        };
        table.content = TableContent::from_markup(record)?;
        Ok(true)
    }

    fn read_field(&self, id: &str) -> Option<FieldContent> {
        self.field(id).cloned()
    }

    fn replace_field(&mut self, id: &str, content: &FieldContent) -> bool {
        match self.fields.get_mut(id) {
            Some(field) => {
                *field = content.clone();
                true
            }
            None => false,
        }
    }

    fn header_cell_count(&self, id: &str) -> Option<usize> {
        self.tables.get(id).map(|t| t.header_cells)
    }

    fn append_row(&mut self, id: &str, row: &Row) -> bool {
        match self.tables.get_mut(id) {
            Some(table) => {
                table.content.push(row.clone());
                true
            }
            None => false,
        }
    }

    fn row_count(&self, id: &str) -> Option<usize> {
        self.tables.get(id).map(|t| t.content.row_count())
    }
}
