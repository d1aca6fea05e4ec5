//! Cover table decoding
//!
//! The cover is one designated table whose cells hold business fields at fixed
//! positions. A [`CoverLayout`] says where everything lives; the default matches
//! the 35x11 cover of the reference template. Lookups that miss yield empty
//! strings, so a layout applied to a slightly different template degrades
//! instead of failing.

use crate::model::{CellAddress, Contact, CoverPage, Entity, EntityOrList, Table};
use crate::template_config::{load_file, ConfigError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Where the cover fields live in the cover table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverLayout {
    /// Index of the cover table in document order
    pub table_index: usize,
    pub title: CellAddress,
    pub project_name: CellAddress,
    pub project_summary: CellAddress,
    pub task_name: CellAddress,
    pub solution_features: CellAddress,
    pub period: CellAddress,
    pub signature: CellAddress,
    pub entities: Vec<EntityLayout>,
    pub lists: Vec<ListLayout>,
}

/// A seven-row entity block
///
/// Rows from `start_row`: name / registration number, representative / corporate
/// number, headquarters / region, description, then contact name / e-mail,
/// department / phone, title / mobile. Left values sit in `value_col`, right
/// values in `right_value_col`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityLayout {
    pub key: String,
    pub start_row: u32,
    pub value_col: u32,
    pub right_value_col: u32,
}

/// A repeating company list spanning `start_row..=end_row`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListLayout {
    pub key: String,
    pub start_row: u32,
    pub end_row: u32,
    /// Data starts one row below `start_row` when set
    pub has_header: bool,
    pub columns: Vec<ListColumn>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListColumn {
    pub col: u32,
    pub field: String,
}

impl ListLayout {
    /// First row holding an item
    pub fn data_start_row(&self) -> u32 {
        if self.has_header {
            self.start_row + 1
        } else {
            self.start_row
        }
    }
}

fn company_columns() -> Vec<ListColumn> {
    [
        (1, "번호"),
        (2, "기업명"),
        (4, "대표자명"),
        (5, "전화"),
        (6, "휴대전화"),
        (8, "E-mail"),
        (10, "지역"),
    ]
    .into_iter()
    .map(|(col, field)| ListColumn {
        col,
        field: field.to_string(),
    })
    .collect()
}

impl Default for CoverLayout {
    fn default() -> Self {
        let entity = |key: &str, start_row| EntityLayout {
            key: key.to_string(),
            start_row,
            value_col: 3,
            right_value_col: 9,
        };
        Self {
            table_index: 0,
            title: CellAddress::new(0, 0),
            project_name: CellAddress::new(1, 3),
            project_summary: CellAddress::new(2, 3),
            task_name: CellAddress::new(3, 3),
            solution_features: CellAddress::new(4, 3),
            period: CellAddress::new(5, 3),
            signature: CellAddress::new(34, 0),
            entities: vec![
                entity("대표공급기업", 6),
                entity("클라우드사업자", 13),
                entity("협력기관", 19),
            ],
            lists: vec![
                ListLayout {
                    key: "참여공급기업".to_string(),
                    start_row: 25,
                    end_row: 28,
                    has_header: true,
                    columns: company_columns(),
                },
                ListLayout {
                    key: "도입실증기업".to_string(),
                    start_row: 29,
                    end_row: 33,
                    has_header: false,
                    columns: company_columns(),
                },
            ],
        }
    }
}

impl CoverLayout {
    /// Load a layout from a `.json` or `.toml` file; omitted fields keep their defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        load_file(path.as_ref())
    }
}

/// Address -> cell text, built once per table; the first cell wins a repeated address
struct CellIndex<'a> {
    cells: HashMap<CellAddress, &'a str>,
}

impl<'a> CellIndex<'a> {
    fn new(table: &'a Table) -> Self {
        let mut cells = HashMap::new();
        for cell in table.cells() {
            cells.entry(cell.address()).or_insert(cell.text.as_str());
        }
        Self { cells }
    }

    fn text(&self, row: u32, col: u32) -> String {
        self.at(CellAddress::new(row, col))
    }

    fn at(&self, address: CellAddress) -> String {
        self.cells
            .get(&address)
            .map_or_else(String::new, |t| (*t).to_string())
    }
}

/// Decode the cover fields of an extracted cover table
pub fn read_cover(table: &Table, layout: &CoverLayout) -> CoverPage {
    let index = CellIndex::new(table);

    let mut blocks = BTreeMap::new();
    for entity in &layout.entities {
        blocks.insert(
            entity.key.clone(),
            EntityOrList::Entity(read_entity(&index, entity)),
        );
    }
    for list in &layout.lists {
        blocks.insert(list.key.clone(), EntityOrList::List(read_list(&index, list)));
    }

    CoverPage {
        title: index.at(layout.title),
        project_name: index.at(layout.project_name),
        project_summary: index.at(layout.project_summary),
        task_name: index.at(layout.task_name),
        solution_features: index.at(layout.solution_features),
        period: index.at(layout.period),
        blocks,
        signature: index.at(layout.signature),
    }
}

fn read_entity(index: &CellIndex<'_>, layout: &EntityLayout) -> Entity {
    let row = |offset: u32| layout.start_row + offset;
    let left = |offset| index.text(row(offset), layout.value_col);
    let right = |offset| index.text(row(offset), layout.right_value_col);

    let contact = Contact {
        name: left(4),
        email: right(4),
        department: left(5),
        phone: right(5),
        title: left(6),
        mobile: right(6),
    };

    Entity {
        name: left(0),
        business_number: right(0),
        representative: left(1),
        corporate_number: right(1),
        headquarters: left(2),
        region: right(2),
        description: left(3),
        contact: (!contact.is_empty()).then_some(contact),
    }
}

fn read_list(index: &CellIndex<'_>, layout: &ListLayout) -> Vec<BTreeMap<String, String>> {
    (layout.data_start_row()..=layout.end_row)
        .map(|row| {
            layout
                .columns
                .iter()
                .map(|c| (c.field.clone(), index.text(row, c.col)))
                .collect()
        })
        .collect()
}
