//! Table structure dump and listing

use crate::archive::Container;
use crate::model::{Cell, Table, TableSummary};
use crate::xml::{names, query, Element};

/// Characters of first-cell text kept in a [`TableSummary`] preview
const PREVIEW_CHARS: usize = 50;

/// Full structure of an `hp:tbl` element
///
/// Rows come from the direct `hp:tr` children; cell text is read with
/// [`query::cell_text`]. Missing attributes fall back to `0`, `1` for spans, or
/// an empty style reference.
pub fn extract_table(tbl: &Element) -> Table {
    let size = tbl.child(names::SZ);
    let rows = tbl
        .children_named(names::TR)
        .map(|tr| tr.children_named(names::TC).map(extract_cell).collect())
        .collect();

    Table {
        row_count: query::attr_num(tbl, "rowCnt", 0),
        col_count: query::attr_num(tbl, "colCnt", 0),
        border_fill_ref: query::attr(tbl, "borderFillIDRef", ""),
        width: size.map(|sz| query::attr_num(sz, "width", 0)),
        height: size.map(|sz| query::attr_num(sz, "height", 0)),
        rows,
    }
}

fn extract_cell(tc: &Element) -> Cell {
    let address = query::cell_address(tc);
    let span = tc.child(names::CELL_SPAN);
    let size = tc.child(names::CELL_SZ);

    Cell {
        row: address.row,
        col: address.col,
        row_span: span.map_or(1, |s| query::attr_num(s, "rowSpan", 1)),
        col_span: span.map_or(1, |s| query::attr_num(s, "colSpan", 1)),
        text: query::cell_text(tc),
        border_fill_ref: query::attr(tc, "borderFillIDRef", ""),
        width: size.map(|sz| query::attr_num(sz, "width", 0)),
        height: size.map(|sz| query::attr_num(sz, "height", 0)),
    }
}

/// Summary line for one table
pub fn summarize_table(index: usize, tbl: &Element) -> TableSummary {
    let size = tbl.child(names::SZ);
    let preview = query::find_first(tbl, names::TC)
        .map(|tc| query::cell_text(tc).chars().take(PREVIEW_CHARS).collect())
        .unwrap_or_default();

    TableSummary {
        index,
        row_count: query::attr_num(tbl, "rowCnt", 0),
        col_count: query::attr_num(tbl, "colCnt", 0),
        width: size.map_or(0, |sz| query::attr_num(sz, "width", 0)),
        height: size.map_or(0, |sz| query::attr_num(sz, "height", 0)),
        preview,
    }
}

/// Every table of the document, in document order
pub fn tables(container: &Container) -> Vec<Table> {
    container.tables().into_iter().map(extract_table).collect()
}

/// One summary per table, in document order
pub fn table_summaries(container: &Container) -> Vec<TableSummary> {
    container
        .tables()
        .into_iter()
        .enumerate()
        .map(|(index, tbl)| summarize_table(index, tbl))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::XmlDocument;

    const TABLE: &str = r#"<hp:tbl xmlns:hp="http://www.hancom.co.kr/hwpml/2011/paragraph" rowCnt="2" colCnt="2" borderFillIDRef="3"><hp:sz width="42520" height="2000"/>
<hp:tr><hp:tc borderFillIDRef="4"><hp:subList><hp:p><hp:run><hp:t>가나다라마바사아자차카타파하가나다라마바사아자차카타파하가나다라마바사아자차카타파하가나다라마바사아자차카타파하</hp:t></hp:run></hp:p></hp:subList><hp:cellAddr colAddr="0" rowAddr="0"/><hp:cellSpan colSpan="2" rowSpan="1"/><hp:cellSz width="42520" height="1000"/></hp:tc></hp:tr>
<hp:tr><hp:tc borderFillIDRef="4"><hp:subList><hp:p><hp:run><hp:t>a</hp:t></hp:run></hp:p></hp:subList><hp:cellAddr colAddr="0" rowAddr="1"/></hp:tc><hp:tc><hp:subList><hp:p><hp:run/></hp:p></hp:subList><hp:cellAddr colAddr="1" rowAddr="1"/></hp:tc></hp:tr>
</hp:tbl>"#;

    #[test]
    fn test_extract_table() {
        let doc = XmlDocument::parse(TABLE.as_bytes()).unwrap();
        let table = extract_table(doc.root());
        assert_eq!((table.row_count, table.col_count), (2, 2));
        assert_eq!(table.border_fill_ref, "3");
        assert_eq!(table.width, Some(42520));
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][0].col_span, 2);
        assert_eq!(table.rows[0][0].row_span, 1);
        assert_eq!(table.rows[0][0].height, Some(1000));
        assert_eq!(table.text_at(1, 0), "a");
        assert_eq!(table.text_at(1, 1), "");
        assert_eq!(table.rows[1][1].border_fill_ref, "");
        assert_eq!(table.rows[1][1].width, None);
    }

    #[test]
    fn test_summary_preview_is_truncated() {
        let doc = XmlDocument::parse(TABLE.as_bytes()).unwrap();
        let summary = summarize_table(3, doc.root());
        assert_eq!(summary.index, 3);
        assert_eq!(summary.preview.chars().count(), PREVIEW_CHARS);
        assert_eq!((summary.width, summary.height), (42520, 2000));
    }
}
