//! Address-indexed table cell editor
//!
//! A [`TableEditor`] borrows one section of a [`crate::archive::Container`] and
//! points at one `hp:tbl` in it. Cells are indexed by their `hp:cellAddr` once,
//! when the editor is created; lookups and writes go through that index.
//!
//! Writing a cell only replaces the `hp:t` nodes of the first run of the first
//! paragraph. The run's `charPrIDRef` and every other node in the cell are left
//! as they are, so a cell whose text was split over several styled runs keeps
//! the extra runs.

use crate::archive::SectionPart;
use crate::extract::tables::extract_table;
use crate::model::{CellAddress, CellMapping, Table};
use crate::xml::{names, query, Element, Node};
use std::collections::HashMap;

/// Editor over one table of a body section
pub struct TableEditor<'a> {
    part: &'a mut SectionPart,
    table_path: Vec<usize>,
    /// Address -> child-index path from the table element to its `hp:tc`
    index: HashMap<CellAddress, Vec<usize>>,
}

impl<'a> TableEditor<'a> {
    pub(crate) fn new(part: &'a mut SectionPart, table_path: Vec<usize>) -> Self {
        let index = part
            .document
            .root()
            .at_path(&table_path)
            .map(build_index)
            .unwrap_or_default();
        Self {
            part,
            table_path,
            index,
        }
    }

    /// The `hp:tbl` element being edited
    pub fn element(&self) -> Option<&Element> {
        self.part.document.root().at_path(&self.table_path)
    }

    /// Structured copy of the table in its current state
    pub fn table(&self) -> Option<Table> {
        self.element().map(extract_table)
    }

    /// Number of distinct addresses in the table
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Whether an address exists in the table
    pub fn contains(&self, row: u32, col: u32) -> bool {
        self.index.contains_key(&CellAddress::new(row, col))
    }

    /// The `hp:tc` element at an address, or `None` when there is no such cell
    pub fn get_cell(&self, row: u32, col: u32) -> Option<&Element> {
        let cell_path = self.index.get(&CellAddress::new(row, col))?;
        self.element()?.at_path(cell_path)
    }

    /// Text of the cell at an address, or `None` when there is no such cell
    pub fn cell_text(&self, row: u32, col: u32) -> Option<String> {
        self.get_cell(row, col).map(query::cell_text)
    }

    /// `charPrIDRef` of the run that [`TableEditor::set_cell_text`] writes into
    pub fn cell_char_pr_ref(&self, row: u32, col: u32) -> Option<String> {
        let cell = self.get_cell(row, col)?;
        let paragraph = query::find_first(cell, names::P)?;
        let run = paragraph.child(names::RUN)?;
        run.attribute("charPrIDRef").map(|v| v.into_owned())
    }

    /// Replace the text of one cell
    ///
    /// The first `hp:run` directly under the first `hp:p` of the cell loses its
    /// `hp:t` children and gets a single new one holding `text`.
    ///
    /// # Returns
    /// * `true` - The cell was rewritten
    /// * `false` - No cell at the address, or the cell has no paragraph or run;
    ///   nothing was changed
    pub fn set_cell_text(&mut self, row: u32, col: u32, text: &str) -> bool {
        let address = CellAddress::new(row, col);
        let Some(cell_path) = self.index.get(&address) else {
            log::debug!("No cell at {}", address);
            return false;
        };

        let mut path = self.table_path.clone();
        path.extend_from_slice(cell_path);
        let Some(cell) = self.part.document.root_mut().at_path_mut(&path) else {
            return false;
        };

        let Some(paragraph_path) = cell.descendant_paths(names::P).into_iter().next() else {
            log::debug!("Cell {} has no paragraph", address);
            return false;
        };
        let Some(paragraph) = cell.at_path_mut(&paragraph_path) else {
            return false;
        };

        let Some(run_index) = paragraph
            .children()
            .iter()
            .position(|node| matches!(node, Node::Element(e) if e.is(names::RUN)))
        else {
            log::debug!("Cell {} has no run", address);
            return false;
        };
        let Some(run) = paragraph.at_path_mut(&[run_index]) else {
            return false;
        };

        run.remove_children(names::T);
        let mut t = run.new_in_namespace_of(names::T.local);
        t.set_text(text);
        run.push(Node::Element(t));

        self.part.dirty = true;
        true
    }

    /// Apply every entry of a mapping
    ///
    /// # Returns
    /// Number of cells actually written. Addresses missing from the table are
    /// skipped, so a count below `mapping.len()` signals a stale mapping.
    pub fn fill_cells(&mut self, mapping: &CellMapping) -> usize {
        let filled = mapping
            .iter()
            .filter(|(address, text)| self.set_cell_text(address.row, address.col, text))
            .count();
        if filled < mapping.len() {
            log::warn!(
                "Filled {}/{} cells; {} addresses were not found",
                filled,
                mapping.len(),
                mapping.len() - filled
            );
        } else {
            log::info!("Filled {} cells", filled);
        }
        filled
    }
}

/// Index the direct `hp:tr/hp:tc` cells of a table by address
///
/// Cells of nested tables are excluded; their addresses belong to the inner table.
/// The first cell in document order keeps an address that appears twice.
fn build_index(table: &Element) -> HashMap<CellAddress, Vec<usize>> {
    let mut index = HashMap::new();
    for (row_index, row_node) in table.children().iter().enumerate() {
        let Node::Element(row) = row_node else {
            continue;
        };
        if !row.is(names::TR) {
            continue;
        }
        for (cell_index, cell_node) in row.children().iter().enumerate() {
            let Node::Element(cell) = cell_node else {
                continue;
            };
            if !cell.is(names::TC) {
                continue;
            }
            let address = query::cell_address(cell);
            if index.contains_key(&address) {
                log::warn!("Duplicate cell address {}; keeping the first", address);
                continue;
            }
            index.insert(address, vec![row_index, cell_index]);
        }
    }
    index
}
