//! Typed region content
//!
//! Tables are rows of cells, fields are opaque rich-text markup. Conversion
//! to and from the stored markup string lives in [`markup`]; nothing else in
//! the crate touches raw record text.

pub mod markup;

use crate::error::EditorResult;

/// Element attributes as (name, value) pairs, in page order
pub type Attributes = Vec<(String, String)>;

/// A single table cell. `content` is the cell's inner markup.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cell {
    pub content: String,
    pub editable: bool,
    /// Attributes besides `contenteditable`
    pub attributes: Attributes,
}

impl Cell {
    /// Editable cell holding plain text (escaped for markup)
    pub fn text(text: &str) -> Self {
        Self {
            content: markup::escape_text(text),
            editable: true,
            attributes: Attributes::new(),
        }
    }

    /// Editable empty cell
    pub fn empty() -> Self {
        Self {
            content: String::new(),
            editable: true,
            attributes: Attributes::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// One table row
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Row {
    pub cells: Vec<Cell>,
    pub attributes: Attributes,
}

impl Row {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self {
            cells,
            attributes: Attributes::new(),
        }
    }

    /// Row of `columns` empty editable cells
    pub fn blank(columns: usize) -> Self {
        Self::new((0..columns).map(|_| Cell::empty()).collect())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cell(&self, col: usize) -> Option<&Cell> {
        self.cells.get(col)
    }
}

/// Row collection of a table body
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableContent {
    pub rows: Vec<Row>,
}

impl TableContent {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn push(&mut self, row: Row) {
        self.rows.push(row);
    }

    /// Decode a stored record
    pub fn from_markup(markup: &str) -> EditorResult<Self> {
        markup::parse_rows(markup).map(Self::new)
    }

    /// Encode for storage
    pub fn to_markup(&self) -> String {
        markup::render_rows(&self.rows)
    }
}

/// Free-form rich content of a field region
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldContent {
    pub markup: String,
}

impl FieldContent {
    pub fn new(markup: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
        }
    }
}

/// Content of any region, as held in the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionContent {
    Table(TableContent),
    Field(FieldContent),
}

impl RegionContent {
    /// Serialized form written to the record store
    pub fn to_record(&self) -> String {
        match self {
            RegionContent::Table(table) => table.to_markup(),
            RegionContent::Field(field) => field.markup.clone(),
        }
    }
}
