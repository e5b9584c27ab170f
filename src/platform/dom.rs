//! DOM-backed [`Document`]

use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlTableRowElement, HtmlTableSectionElement};

use super::REGION_ATTRIBUTE;
use crate::content::markup::{is_editable_value, render_rows};
use crate::content::{Attributes, Cell, FieldContent, Row, TableContent};
use crate::document::Document;
use crate::error::{EditorError, EditorResult};

const EDITABLE_ATTRIBUTE: &str = "contenteditable";

/// Regions of the live page
pub struct BrowserDocument {
    document: web_sys::Document,
}

impl BrowserDocument {
    pub fn new(document: web_sys::Document) -> Self {
        Self { document }
    }

    pub fn inner(&self) -> &web_sys::Document {
        &self.document
    }

    fn element(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn table_body(&self, id: &str) -> Option<HtmlTableSectionElement> {
        self.element(id)?.dyn_into().ok()
    }
}

/// Attributes of `el` other than `contenteditable`
fn other_attributes(el: &Element) -> Attributes {
    el.get_attribute_names()
        .iter()
        .filter_map(|name| name.as_string())
        .filter(|name| name != EDITABLE_ATTRIBUTE)
        .filter_map(|name| el.get_attribute(&name).map(|value| (name, value)))
        .collect()
}

fn read_row(row: &HtmlTableRowElement) -> Row {
    let cells = row.cells();
    let mut out = Vec::with_capacity(cells.length() as usize);
    for i in 0..cells.length() {
        if let Some(cell) = cells.item(i) {
            out.push(Cell {
                content: cell.inner_html(),
                editable: is_editable_value(cell.get_attribute(EDITABLE_ATTRIBUTE).as_deref()),
                attributes: other_attributes(&cell),
            });
        }
    }
    Row {
        cells: out,
        attributes: other_attributes(row),
    }
}

impl Document for BrowserDocument {
    type Node = Element;

    fn mark_region(&mut self, id: &str) -> bool {
        match self.element(id) {
            Some(el) => el.set_attribute(REGION_ATTRIBUTE, id).is_ok(),
            None => false,
        }
    }

    fn owning_region(&self, node: &Element) -> Option<String> {
        let selector = format!("[{REGION_ATTRIBUTE}]");
        let region = node.closest(&selector).ok()??;
        region.get_attribute(REGION_ATTRIBUTE)
    }

    fn read_table(&self, id: &str) -> Option<TableContent> {
        let body = self.table_body(id)?;
        let rows = body.rows();
        let mut content = TableContent::default();
        for i in 0..rows.length() {
            if let Some(row) = rows.item(i).and_then(|r| r.dyn_into::<HtmlTableRowElement>().ok()) {
                content.push(read_row(&row));
            }
        }
        Some(content)
    }

    fn restore_table(&mut self, id: &str, record: &str) -> EditorResult<bool> {
        let Some(body) = self.table_body(id) else {
            return Ok(false);
        };
        let authored = body.inner_html();
        body.set_inner_html(record);
        if body.rows().length() == 0 && !record.trim().is_empty() {
            body.set_inner_html(&authored);
            return Err(EditorError::markup(0, "stored record has no table rows"));
        }
        Ok(true)
    }

    fn read_field(&self, id: &str) -> Option<FieldContent> {
        self.element(id).map(|el| FieldContent::new(el.inner_html()))
    }

    fn replace_field(&mut self, id: &str, content: &FieldContent) -> bool {
        match self.element(id) {
            Some(el) => {
                el.set_inner_html(&content.markup);
                true
            }
            None => false,
        }
    }

    fn header_cell_count(&self, id: &str) -> Option<usize> {
        let table = self.table_body(id)?.parent_element()?;
        let headers = table.query_selector_all("th").ok()?;
        Some(headers.length() as usize)
    }

    fn append_row(&mut self, id: &str, row: &Row) -> bool {
        match self.table_body(id) {
            Some(body) => body
                .insert_adjacent_html("beforeend", &render_rows(std::slice::from_ref(row)))
                .is_ok(),
            None => false,
        }
    }

    fn row_count(&self, id: &str) -> Option<usize> {
        self.table_body(id).map(|body| body.rows().length() as usize)
    }
}
