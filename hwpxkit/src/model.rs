//! Extracted document model
//!
//! Plain data types produced by the extractors. They own their text and carry no
//! reference back into the XML tree, so they can be serialized to JSON or fed
//! back into the field mapper.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Zero-based `(row, col)` address of a cell within one table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellAddress {
    pub row: u32,
    pub col: u32,
}

impl CellAddress {
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Sparse address -> text mapping applied to one table
pub type CellMapping = BTreeMap<CellAddress, String>;

fn is_one(value: &u32) -> bool {
    *value == 1
}

/// One table cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    #[serde(rename = "rowAddr")]
    pub row: u32,
    #[serde(rename = "colAddr")]
    pub col: u32,
    #[serde(default = "one", skip_serializing_if = "is_one")]
    pub row_span: u32,
    #[serde(default = "one", skip_serializing_if = "is_one")]
    pub col_span: u32,
    /// Paragraph lines joined by `\n`
    pub text: String,
    #[serde(rename = "borderFillIDRef")]
    pub border_fill_ref: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u64>,
}

fn one() -> u32 {
    1
}

impl Cell {
    pub fn address(&self) -> CellAddress {
        CellAddress::new(self.row, self.col)
    }
}

/// Full structure of one `hp:tbl`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    #[serde(rename = "rowCnt")]
    pub row_count: u32,
    #[serde(rename = "colCnt")]
    pub col_count: u32,
    #[serde(rename = "borderFillIDRef")]
    pub border_fill_ref: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u64>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    /// All cells in row order
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.rows.iter().flatten()
    }

    /// Cell at an address; the first cell in row order wins if an address repeats
    pub fn cell(&self, row: u32, col: u32) -> Option<&Cell> {
        self.cells().find(|c| c.row == row && c.col == col)
    }

    /// Text at an address, or an empty string when the address is absent
    pub fn text_at(&self, row: u32, col: u32) -> &str {
        self.cell(row, col).map_or("", |c| c.text.as_str())
    }

    /// Number of layout slots (`rowCnt * colCnt`)
    pub fn area(&self) -> u64 {
        u64::from(self.row_count) * u64::from(self.col_count)
    }
}

/// One-line summary of a table used for listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSummary {
    pub index: usize,
    #[serde(rename = "rowCnt")]
    pub row_count: u32,
    #[serde(rename = "colCnt")]
    pub col_count: u32,
    pub width: u64,
    pub height: u64,
    /// First cell text, at most 50 characters
    pub preview: String,
}

/// A node of the body outline
///
/// `para_index` is the position of the source paragraph among the section's
/// top-level paragraphs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutlineNode {
    Section {
        title: String,
        #[serde(rename = "paraIndex")]
        para_index: usize,
        #[serde(rename = "paraPrIDRef")]
        para_pr_ref: String,
        children: Vec<OutlineNode>,
    },
    Subsection {
        title: String,
        #[serde(rename = "paraIndex")]
        para_index: usize,
        #[serde(rename = "paraPrIDRef")]
        para_pr_ref: String,
        children: Vec<OutlineNode>,
    },
    Paragraph {
        #[serde(rename = "paraIndex")]
        para_index: usize,
        text: String,
        #[serde(rename = "paraPrIDRef")]
        para_pr_ref: String,
    },
    Table {
        #[serde(rename = "paraIndex")]
        para_index: usize,
        #[serde(rename = "rowCnt")]
        row_count: u32,
        #[serde(rename = "colCnt")]
        col_count: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },
    Picture {
        #[serde(rename = "paraIndex")]
        para_index: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },
}

impl OutlineNode {
    pub fn para_index(&self) -> usize {
        match self {
            OutlineNode::Section { para_index, .. }
            | OutlineNode::Subsection { para_index, .. }
            | OutlineNode::Paragraph { para_index, .. }
            | OutlineNode::Table { para_index, .. }
            | OutlineNode::Picture { para_index, .. } => *para_index,
        }
    }

    /// Child nodes; empty for leaf content
    pub fn children(&self) -> &[OutlineNode] {
        match self {
            OutlineNode::Section { children, .. } | OutlineNode::Subsection { children, .. } => {
                children
            }
            _ => &[],
        }
    }
}

/// Contact person nested inside an entity block
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(rename = "성명")]
    pub name: String,
    #[serde(rename = "E-mail")]
    pub email: String,
    #[serde(rename = "부서")]
    pub department: String,
    #[serde(rename = "전화")]
    pub phone: String,
    #[serde(rename = "직위")]
    pub title: String,
    #[serde(rename = "휴대전화")]
    pub mobile: String,
}

impl Contact {
    pub fn is_empty(&self) -> bool {
        [
            &self.name,
            &self.email,
            &self.department,
            &self.phone,
            &self.title,
            &self.mobile,
        ]
        .iter()
        .all(|v| v.is_empty())
    }
}

/// A company or institution block of the cover table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(rename = "기업명")]
    pub name: String,
    #[serde(rename = "사업자등록번호")]
    pub business_number: String,
    #[serde(rename = "대표자명")]
    pub representative: String,
    #[serde(rename = "법인등록번호")]
    pub corporate_number: String,
    #[serde(rename = "본사정보")]
    pub headquarters: String,
    #[serde(rename = "지역")]
    pub region: String,
    #[serde(rename = "주요솔루션")]
    pub description: String,
    /// Present only when at least one contact field is non-empty
    #[serde(rename = "담당자", default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
}

/// Cover page fields; keys follow the business vocabulary so the output can be
/// used directly as field-mapper input
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoverPage {
    #[serde(rename = "문서제목")]
    pub title: String,
    #[serde(rename = "사업명")]
    pub project_name: String,
    #[serde(rename = "사업개요")]
    pub project_summary: String,
    #[serde(rename = "과제명")]
    pub task_name: String,
    #[serde(rename = "개발솔루션기능")]
    pub solution_features: String,
    #[serde(rename = "수행기간")]
    pub period: String,
    /// Entity blocks and company lists keyed by their configured name
    #[serde(flatten)]
    pub blocks: BTreeMap<String, EntityOrList>,
    #[serde(rename = "서명문구")]
    pub signature: String,
}

/// A named cover block: either a single entity or a repeating company list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityOrList {
    Entity(Entity),
    List(Vec<BTreeMap<String, String>>),
}

/// Flat dump of `Contents/header.xml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleSheet {
    /// Font list per language (`HANGUL`, `LATIN`, ...)
    pub fonts: BTreeMap<String, Vec<Font>>,
    pub char_properties: Vec<CharProperty>,
    pub para_properties: Vec<ParaProperty>,
    pub border_fills: Vec<BorderFill>,
    pub styles: Vec<Style>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Font {
    pub id: String,
    pub face: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharProperty {
    pub id: String,
    pub height: String,
    pub text_color: String,
    #[serde(rename = "borderFillIDRef")]
    pub border_fill_ref: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_ref: Option<FontRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontRef {
    pub hangul: String,
    pub latin: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParaProperty {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizontal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading_level: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorderLine {
    #[serde(rename = "type")]
    pub kind: String,
    pub width: String,
    pub color: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorderFill {
    pub id: String,
    /// Border lines keyed by side (`leftBorder`, `rightBorder`, ...)
    #[serde(flatten)]
    pub borders: BTreeMap<String, BorderLine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub eng_name: String,
    #[serde(rename = "paraPrIDRef")]
    pub para_pr_ref: String,
    #[serde(rename = "charPrIDRef")]
    pub char_pr_ref: String,
    #[serde(rename = "nextStyleIDRef")]
    pub next_style_ref: String,
}

/// Cover fields plus body outline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentStructure {
    pub cover: Option<CoverPage>,
    pub sections: Vec<OutlineNode>,
}
