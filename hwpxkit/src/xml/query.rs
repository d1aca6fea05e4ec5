//! Read-only schema queries over HWPX body and header trees
//!
//! These are the only places that know how HWPX nests text: paragraphs (`hp:p`)
//! hold runs (`hp:run`), runs hold text nodes (`hp:t`), and table cells (`hp:tc`)
//! hold their paragraphs inside an `hp:subList`. All lookups are lenient: missing
//! attributes fall back to defaults instead of failing.

use super::namespaces::{names, QName};
use super::tree::Element;
use crate::model::CellAddress;
use itertools::Itertools;

/// All descendants of `root` matching `qname`, in document order
pub fn find_all(root: &Element, qname: QName) -> Vec<&Element> {
    root.descendants()
        .into_iter()
        .filter(|e| e.is(qname))
        .collect()
}

/// First descendant of `root` matching `qname`
pub fn find_first(root: &Element, qname: QName) -> Option<&Element> {
    root.descendants().into_iter().find(|e| e.is(qname))
}

/// Attribute value, or `default` when the attribute is absent
pub fn attr(element: &Element, name: &str, default: &str) -> String {
    element
        .attribute(name)
        .map_or_else(|| default.to_string(), |v| v.into_owned())
}

/// Attribute parsed as a number, or `default` when absent or malformed
pub fn attr_num<T: std::str::FromStr>(element: &Element, name: &str, default: T) -> T {
    element
        .attribute(name)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Address of a table cell from its `hp:cellAddr` child
///
/// Missing or malformed `rowAddr`/`colAddr` values count as 0.
pub fn cell_address(cell: &Element) -> CellAddress {
    match cell.child(names::CELL_ADDR) {
        Some(addr) => CellAddress::new(attr_num(addr, "rowAddr", 0), attr_num(addr, "colAddr", 0)),
        None => CellAddress::new(0, 0),
    }
}

/// Text of the first `hp:t` below `element`, if there is one
pub fn first_text(element: &Element) -> Option<String> {
    find_first(element, names::T).map(Element::text)
}

/// Text of a paragraph's own runs, trimmed
///
/// Only `hp:p/hp:run/hp:t` is read, so text inside nested tables or drawing
/// objects does not leak into the paragraph.
pub fn paragraph_text(paragraph: &Element) -> String {
    paragraph
        .children_named(names::RUN)
        .flat_map(|run| run.children_named(names::T))
        .map(Element::text)
        .collect::<String>()
        .trim()
        .to_string()
}

/// Text of a table cell: one trimmed line per non-empty paragraph, joined by `\n`
pub fn cell_text(cell: &Element) -> String {
    find_all(cell, names::SUB_LIST)
        .into_iter()
        .flat_map(|sub_list| sub_list.children_named(names::P))
        .map(|p| {
            find_all(p, names::T)
                .into_iter()
                .map(Element::text)
                .collect::<String>()
                .trim()
                .to_string()
        })
        .filter(|line| !line.is_empty())
        .join("\n")
}

/// Cells of a table in row order, read from the direct `hp:tr/hp:tc` structure
///
/// Cells of tables nested inside a cell are not included.
pub fn table_cells(table: &Element) -> impl Iterator<Item = &Element> {
    table
        .children_named(names::TR)
        .flat_map(|row| row.children_named(names::TC))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::XmlDocument;

    const TABLE: &str = r#"<hp:tbl xmlns:hp="http://www.hancom.co.kr/hwpml/2011/paragraph" rowCnt="2" colCnt="1">
<hp:tr><hp:tc><hp:subList><hp:p><hp:run charPrIDRef="1"><hp:t>  first </hp:t><hp:t>line</hp:t></hp:run></hp:p><hp:p><hp:run/></hp:p><hp:p><hp:run><hp:t>second</hp:t></hp:run></hp:p></hp:subList><hp:cellAddr colAddr="0" rowAddr="0"/></hp:tc></hp:tr>
<hp:tr><hp:tc><hp:subList><hp:p><hp:run/></hp:p></hp:subList><hp:cellAddr colAddr="x" rowAddr="1"/></hp:tc></hp:tr>
</hp:tbl>"#;

    fn table() -> XmlDocument {
        XmlDocument::parse(TABLE.as_bytes()).unwrap()
    }

    #[test]
    fn test_cell_text_joins_paragraph_lines() {
        let doc = table();
        let first = table_cells(doc.root()).next().unwrap();
        assert_eq!(cell_text(first), "first line\nsecond");
    }

    #[test]
    fn test_cell_address_is_lenient() {
        let doc = table();
        let addresses: Vec<CellAddress> = table_cells(doc.root()).map(cell_address).collect();
        assert_eq!(addresses, vec![CellAddress::new(0, 0), CellAddress::new(1, 0)]);
    }

    #[test]
    fn test_attr_defaults() {
        let doc = table();
        assert_eq!(attr(doc.root(), "rowCnt", "0"), "2");
        assert_eq!(attr(doc.root(), "missing", "fallback"), "fallback");
        assert_eq!(attr_num(doc.root(), "colCnt", 0u32), 1);
        assert_eq!(attr_num(doc.root(), "missing", 7u32), 7);
    }

    #[test]
    fn test_first_text() {
        let doc = table();
        assert_eq!(first_text(doc.root()).as_deref(), Some("  first "));
        let empty_cell = table_cells(doc.root()).nth(1).unwrap();
        assert_eq!(first_text(empty_cell), None);
    }

    #[test]
    fn test_find_all_document_order() {
        let doc = table();
        assert_eq!(find_all(doc.root(), names::TC).len(), 2);
        assert_eq!(find_all(doc.root(), names::T).len(), 3);
    }
}
