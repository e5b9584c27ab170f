//! Table-body markup codec
//!
//! Records are stored as the inner markup of a `<tbody>`:
//! `<tr><td contenteditable="true">1</td><td contenteditable="true"></td></tr>`.
//! This is exactly what a browser serializes for rows built by the row
//! factory, so backups written by older versions of the page decode too.
//!
//! The parser understands the row/cell skeleton. Cell bodies are kept as raw
//! inner markup, including nested tables. Row and cell attributes survive,
//! with `contenteditable` written first. Whitespace and comments between
//! rows and cells are dropped.

use super::{Attributes, Cell, Row};
use crate::error::{EditorError, EditorResult};

const EDITABLE_ATTRIBUTE: &str = "contenteditable";

/// Render rows to stored markup
pub fn render_rows(rows: &[Row]) -> String {
    let mut out = String::new();
    for row in rows {
        out.push_str("<tr");
        push_attributes(&mut out, &row.attributes);
        out.push('>');
        for cell in &row.cells {
            out.push_str("<td");
            if cell.editable {
                out.push_str(" contenteditable=\"true\"");
            }
            push_attributes(&mut out, &cell.attributes);
            out.push('>');
            out.push_str(&cell.content);
            out.push_str("</td>");
        }
        out.push_str("</tr>");
    }
    out
}

fn push_attributes(out: &mut String, attributes: &Attributes) {
    for (name, value) in attributes {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        for ch in value.chars() {
            match ch {
                '&' => out.push_str("&amp;"),
                '"' => out.push_str("&quot;"),
                _ => out.push(ch),
            }
        }
        out.push('"');
    }
}

/// Parse stored markup into rows
pub fn parse_rows(input: &str) -> EditorResult<Vec<Row>> {
    let mut parser = Parser::new(input);
    let mut rows = Vec::new();

    loop {
        parser.skip_insignificant()?;
        if parser.at_end() {
            break;
        }
        let tag = parser.open_tag()?;
        if tag.name != "tr" {
            return Err(parser.error(format!("expected <tr>, found <{}>", tag.name)));
        }
        let cells = parser.row_body()?;
        rows.push(Row {
            cells,
            attributes: tag.attrs,
        });
    }

    Ok(rows)
}

/// Escape plain text for use as cell content
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Whether a `contenteditable` attribute value enables editing
pub fn is_editable_value(value: Option<&str>) -> bool {
    match value {
        None => false,
        Some(v) => !v.trim().eq_ignore_ascii_case("false"),
    }
}

/// Resolve the character references a serializer emits in attribute values
fn unescape_attribute(raw: &str) -> String {
    const ENTITIES: [(&str, char); 6] = [
        ("&amp;", '&'),
        ("&quot;", '"'),
        ("&#39;", '\''),
        ("&apos;", '\''),
        ("&lt;", '<'),
        ("&gt;", '>'),
    ];

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        match ENTITIES.iter().find(|(entity, _)| rest.starts_with(entity)) {
            Some((entity, ch)) => {
                out.push(*ch);
                rest = &rest[entity.len()..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

struct OpenTag {
    name: String,
    attrs: Attributes,
}

impl OpenTag {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn error(&self, reason: impl Into<String>) -> EditorError {
        EditorError::markup(self.pos, reason)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    fn starts_with_ci(&self, prefix: &str) -> bool {
        let rest = self.rest().as_bytes();
        rest.len() >= prefix.len() && rest[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
    }

    fn skip_whitespace(&mut self) {
        while let Some(b) = self.peek() {
            if b.is_ascii_whitespace() {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    /// Skip whitespace and comments between structural tags
    fn skip_insignificant(&mut self) -> EditorResult<()> {
        loop {
            self.skip_whitespace();
            if self.starts_with_ci("<!--") {
                match self.rest().find("-->") {
                    Some(end) => self.pos += end + 3,
                    None => return Err(self.error("unterminated comment")),
                }
            } else {
                return Ok(());
            }
        }
    }

    fn read_name(&mut self) -> String {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b':' {
                self.pos += 1;
            } else {
                break;
            }
        }
        self.src[start..self.pos].to_ascii_lowercase()
    }

    fn open_tag(&mut self) -> EditorResult<OpenTag> {
        if self.peek() != Some(b'<') {
            return Err(self.error("expected a tag"));
        }
        self.pos += 1;
        let name = self.read_name();
        if name.is_empty() {
            return Err(self.error("missing tag name"));
        }

        let mut attrs = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                None => return Err(self.error(format!("unterminated <{name}> tag"))),
                Some(b'>') => {
                    self.pos += 1;
                    break;
                }
                Some(b'/') if self.rest().starts_with("/>") => {
                    self.pos += 2;
                    break;
                }
                Some(_) => {
                    let attr = self.read_name();
                    if attr.is_empty() {
                        return Err(self.error(format!("bad attribute in <{name}>")));
                    }
                    self.skip_whitespace();
                    let value = if self.peek() == Some(b'=') {
                        self.pos += 1;
                        self.skip_whitespace();
                        self.attr_value()?
                    } else {
                        String::new()
                    };
                    attrs.push((attr, value));
                }
            }
        }

        Ok(OpenTag { name, attrs })
    }

    fn attr_value(&mut self) -> EditorResult<String> {
        match self.peek() {
            Some(quote @ (b'"' | b'\'')) => {
                self.pos += 1;
                let end = self.rest().find(quote as char);
                match end {
                    Some(end) => {
                        let value = unescape_attribute(&self.rest()[..end]);
                        self.pos += end + 1;
                        Ok(value)
                    }
                    None => Err(self.error("unterminated attribute value")),
                }
            }
            _ => {
                let start = self.pos;
                while let Some(b) = self.peek() {
                    if b.is_ascii_whitespace() || b == b'>' {
                        break;
                    }
                    self.pos += 1;
                }
                Ok(unescape_attribute(&self.src[start..self.pos]))
            }
        }
    }

    /// Consume `</name   >`
    fn close_tag(&mut self, name: &str) -> EditorResult<()> {
        let opener = format!("</{name}");
        if !self.starts_with_ci(&opener) {
            return Err(self.error(format!("expected </{name}>")));
        }
        self.pos += opener.len();
        self.skip_whitespace();
        if self.peek() != Some(b'>') {
            return Err(self.error(format!("unterminated </{name}>")));
        }
        self.pos += 1;
        Ok(())
    }

    fn row_body(&mut self) -> EditorResult<Vec<Cell>> {
        let mut cells = Vec::new();
        loop {
            self.skip_insignificant()?;
            if self.at_end() {
                return Err(self.error("unterminated <tr>"));
            }
            if self.starts_with_ci("</tr") {
                self.close_tag("tr")?;
                return Ok(cells);
            }
            let tag = self.open_tag()?;
            if tag.name != "td" {
                return Err(self.error(format!("expected <td>, found <{}>", tag.name)));
            }
            let editable = is_editable_value(tag.attr(EDITABLE_ATTRIBUTE));
            let attributes = tag
                .attrs
                .into_iter()
                .filter(|(name, _)| name != EDITABLE_ATTRIBUTE)
                .collect();
            let content = self.cell_body()?;
            cells.push(Cell {
                content,
                editable,
                attributes,
            });
        }
    }

    /// `prefix` followed by the end of a tag name
    fn at_tag(&self, prefix: &str) -> bool {
        self.starts_with_ci(prefix)
            && matches!(
                self.src.as_bytes().get(self.pos + prefix.len()),
                Some(b) if b.is_ascii_whitespace() || *b == b'>' || *b == b'/'
            )
    }

    /// Raw inner markup up to the `</td>` that closes this cell.
    ///
    /// Cells of nested tables open and close inside the body and are kept.
    fn cell_body(&mut self) -> EditorResult<String> {
        let start = self.pos;
        let mut depth = 0usize;
        while !self.at_end() {
            if self.starts_with_ci("<!--") {
                match self.rest().find("-->") {
                    Some(end) => self.pos += end + 3,
                    None => return Err(self.error("unterminated comment")),
                }
            } else if self.at_tag("</td") {
                if depth == 0 {
                    let content = self.src[start..self.pos].to_string();
                    self.close_tag("td")?;
                    return Ok(content);
                }
                depth -= 1;
                self.pos += 4;
            } else if self.at_tag("<td") {
                depth += 1;
                self.pos += 3;
            } else {
                self.pos += self.rest().chars().next().map_or(1, char::len_utf8);
            }
        }
        Err(self.error("unterminated <td>"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_render_numbered_row() {
        let rows = vec![Row::new(vec![Cell::text("1"), Cell::empty()])];
        assert_eq!(
            render_rows(&rows),
            "<tr><td contenteditable=\"true\">1</td><td contenteditable=\"true\"></td></tr>"
        );
    }

    #[test]
    fn test_parse_browser_serialization() {
        let stored = "<tr><td contenteditable=\"true\">5</td><td contenteditable=\"true\">Jane Doe</td></tr>";
        let rows = parse_rows(stored).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].cells[1].content, "Jane Doe");
        assert!(rows[0].cells[1].editable);
        assert_eq!(render_rows(&rows), stored);
    }

    #[test]
    fn test_parse_authored_markup() {
        let authored = r#"
            <!-- seeded by hand -->
            <TR class="odd">
                <td contenteditable>Ven. Ananda</td>
                <td contenteditable='false'>Pali</td>
                <td>Fri<br/>Sat</td>
            </TR>
        "#;
        let rows = parse_rows(authored).unwrap();
        assert_eq!(rows.len(), 1);
        let cells = &rows[0].cells;
        assert_eq!(cells.len(), 3);
        assert!(cells[0].editable);
        assert!(!cells[1].editable);
        assert!(!cells[2].editable);
        assert_eq!(cells[2].content, "Fri<br/>Sat");
    }

    #[test]
    fn test_parse_empty_record() {
        assert!(parse_rows("").unwrap().is_empty());
        assert!(parse_rows("  \n ").unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_non_row_content() {
        assert!(matches!(parse_rows("null"), Err(EditorError::Markup { .. })));
        assert!(matches!(
            parse_rows("<div>hi</div>"),
            Err(EditorError::Markup { .. })
        ));
        assert!(matches!(
            parse_rows("<tr><td>open"),
            Err(EditorError::Markup { .. })
        ));
        assert!(matches!(parse_rows("<tr><td></td>"), Err(EditorError::Markup { .. })));
    }

    #[test]
    fn test_editable_values() {
        assert!(is_editable_value(Some("true")));
        assert!(is_editable_value(Some("")));
        assert!(is_editable_value(Some("plaintext-only")));
        assert!(!is_editable_value(Some("FALSE")));
        assert!(!is_editable_value(None));
    }

    #[test]
    fn test_nested_table_stays_in_its_cell() {
        let stored = "<tr><td contenteditable=\"true\">1</td>\
            <td contenteditable=\"true\"><table><tbody><tr><td>Nimal</td><td>7</td></tr></tbody></table></td>\
            <td contenteditable=\"true\">Grade 6</td></tr>";
        let rows = parse_rows(stored).unwrap();
        assert_eq!(rows.len(), 1);
        let cells = &rows[0].cells;
        assert_eq!(cells.len(), 3);
        assert_eq!(
            cells[1].content,
            "<table><tbody><tr><td>Nimal</td><td>7</td></tr></tbody></table>"
        );
        assert_eq!(cells[2].content, "Grade 6");
        assert_eq!(render_rows(&rows), stored);
    }

    #[test]
    fn test_td_lookalikes_do_not_close_a_cell() {
        let stored = "<tr><td><tdata>x</tdata><!-- </td> -->y</td></tr>";
        let rows = parse_rows(stored).unwrap();
        assert_eq!(rows[0].cells.len(), 1);
        assert_eq!(rows[0].cells[0].content, "<tdata>x</tdata><!-- </td> -->y");
    }

    #[test]
    fn test_row_and_cell_attributes_are_kept() {
        let stored = "<tr class=\"odd\"><td contenteditable=\"true\" style=\"color: red\">1</td>\
            <td title=\"Tom &amp; &quot;Jerry&quot;\">2</td></tr>";
        let rows = parse_rows(stored).unwrap();
        let row = &rows[0];
        assert_eq!(row.attributes, [("class".to_string(), "odd".to_string())]);
        assert_eq!(
            row.cells[0].attributes,
            [("style".to_string(), "color: red".to_string())]
        );
        assert!(row.cells[0].editable);
        assert_eq!(row.cells[1].attributes[0].1, "Tom & \"Jerry\"");
        assert_eq!(render_rows(&rows), stored);
    }

    #[test]
    fn test_editable_attribute_is_written_first() {
        let rows = parse_rows("<tr><td class='n' contenteditable>1</td></tr>").unwrap();
        assert_eq!(
            render_rows(&rows),
            "<tr><td contenteditable=\"true\" class=\"n\">1</td></tr>"
        );
    }

    fn content_strategy() -> impl Strategy<Value = String> {
        let fragment = prop_oneof![
            "[a-zA-Z0-9 .,&;<>-]{0,8}".prop_map(|t| escape_text(&t)),
            "[a-zA-Z ]{0,8}".prop_map(|t| format!("<b>{t}</b>")),
            Just("<br>".to_string()),
            "[a-zA-Z ]{0,8}".prop_map(|t| format!("<span class=\"note\">{t}</span>")),
            "[a-zA-Z0-9]{0,6}".prop_map(|t| format!(
                "<table><tbody><tr><td>{t}</td><td contenteditable=\"true\"><i>{t}</i></td></tr></tbody></table>"
            )),
        ];
        prop::collection::vec(fragment, 0..4).prop_map(|parts| parts.concat())
    }

    fn attributes_strategy() -> impl Strategy<Value = Attributes> {
        prop::collection::vec(("[a-z]{1,6}", "[a-zA-Z0-9 &;\"'<>]{0,6}"), 0..3)
    }

    fn cell_strategy() -> impl Strategy<Value = Cell> {
        (content_strategy(), any::<bool>(), attributes_strategy()).prop_map(
            |(content, editable, attributes)| Cell {
                content,
                editable,
                attributes,
            },
        )
    }

    fn row_strategy() -> impl Strategy<Value = Row> {
        (prop::collection::vec(cell_strategy(), 0..5), attributes_strategy())
            .prop_map(|(cells, attributes)| Row { cells, attributes })
    }

    proptest! {
        #[test]
        fn prop_rendered_rows_decode_to_same_rows(
            rows in prop::collection::vec(row_strategy(), 0..6)
        ) {
            let markup = render_rows(&rows);
            let decoded = parse_rows(&markup).unwrap();
            prop_assert_eq!(&decoded, &rows);
            prop_assert_eq!(render_rows(&decoded), markup);
        }
    }
}
