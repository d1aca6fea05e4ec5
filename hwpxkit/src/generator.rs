//! Draft configuration for a new blank template
//!
//! Guesses which table is the cover (the one with the most grid cells) and turns
//! each of its empty cells into a field map slot, labelled after the nearest text
//! to the left or above. The output is a starting point and always needs a human
//! pass before use.

use crate::archive::{ArchiveError, Container};
use crate::field_map::{EntityBlock, FieldMap, FieldRow, FieldSlot, FIELD_MAP_FILE};
use crate::model::CellAddress;
use crate::template_config::{ConfigError, TemplateConfig, TEMPLATE_FILE};
use crate::xml::{query, Element};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Longest label taken from a neighbouring cell, in characters
const LABEL_MAX_CHARS: usize = 30;

/// Name and data path of the single generated entity block
const DRAFT_BLOCK: &str = "cover_fields";

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What [`generate_template_config`] wrote and found
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DraftReport {
    pub template_json: PathBuf,
    pub field_map_json: PathBuf,
    pub total_tables: usize,
    pub cover_table_index: usize,
    /// `"<rows>x<cols>"`, or `"N/A"` without any table
    pub cover_table_size: String,
    pub empty_cells_found: usize,
}

/// An empty cell and the label guessed for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyCell {
    pub address: CellAddress,
    pub label: String,
}

/// Index of the table with the largest `rowCnt * colCnt`; the first one wins ties
pub fn largest_table(tables: &[&Element]) -> Option<usize> {
    let mut best: Option<(usize, u64)> = None;
    for (index, tbl) in tables.iter().enumerate() {
        let area = query::attr_num::<u64>(tbl, "rowCnt", 0) * query::attr_num::<u64>(tbl, "colCnt", 0);
        if best.map_or(true, |(_, max)| area > max) {
            best = Some((index, area));
        }
    }
    best.map(|(index, _)| index)
}

/// Empty cells of a table in address order, each with a label hint
pub fn empty_cells(tbl: &Element) -> Vec<EmptyCell> {
    let mut texts: BTreeMap<CellAddress, String> = BTreeMap::new();
    for cell in query::table_cells(tbl) {
        texts
            .entry(query::cell_address(cell))
            .or_insert_with(|| query::cell_text(cell));
    }

    let text_at = |row: u32, col: u32| {
        texts
            .get(&CellAddress::new(row, col))
            .map(String::as_str)
            .filter(|t| !t.is_empty())
    };

    texts
        .iter()
        .filter(|(_, text)| text.trim().is_empty())
        .map(|(&address, _)| {
            let neighbour = address
                .col
                .checked_sub(1)
                .and_then(|col| text_at(address.row, col))
                .or_else(|| {
                    address
                        .row
                        .checked_sub(1)
                        .and_then(|row| text_at(row, address.col))
                });
            EmptyCell {
                address,
                label: label_hint(address, neighbour),
            }
        })
        .collect()
}

fn label_hint(address: CellAddress, neighbour: Option<&str>) -> String {
    let label: String = neighbour
        .unwrap_or_default()
        .trim()
        .replace('\n', " ")
        .chars()
        .take(LABEL_MAX_CHARS)
        .collect();
    if label.is_empty() {
        format!("row{}_col{}", address.row, address.col)
    } else {
        label
    }
}

/// One left-only field per empty cell, as a single block anchored at row 0
pub fn draft_field_map(cells: &[EmptyCell]) -> FieldMap {
    if cells.is_empty() {
        return FieldMap::default();
    }
    let fields = cells
        .iter()
        .map(|cell| FieldRow {
            offset: cell.address.row,
            left: Some(FieldSlot {
                col: cell.address.col,
                field: cell.label.clone(),
            }),
            right: None,
        })
        .collect();
    FieldMap {
        entity_blocks: vec![EntityBlock {
            name: DRAFT_BLOCK.to_string(),
            data_path: DRAFT_BLOCK.to_string(),
            start_row: 0,
            fields,
        }],
        company_lists: Vec::new(),
    }
}

/// Analyse a blank template and write draft `template.json` and `field_map.json`
///
/// # Parameters
/// * `hwpx_path` - Blank template to analyse
/// * `output_dir` - Directory receiving both files; created if missing
///
/// # Returns
/// * `Ok(DraftReport)` - Paths written plus what was found
/// * `Err(GenerateError)` - The template could not be read or a file could not be written
pub fn generate_template_config<P: AsRef<Path>, Q: AsRef<Path>>(
    hwpx_path: P,
    output_dir: Q,
) -> Result<DraftReport, GenerateError> {
    let hwpx_path = hwpx_path.as_ref();
    let output_dir = output_dir.as_ref();
    fs::create_dir_all(output_dir).map_err(|source| GenerateError::OutputDir {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let container = Container::open(hwpx_path)?;
    let tables = container.tables();
    let cover_index = largest_table(&tables);
    let cover = cover_index.and_then(|i| tables.get(i).copied());

    let cells = cover.map(empty_cells).unwrap_or_default();
    let cover_table_size = cover.map_or_else(
        || "N/A".to_string(),
        |tbl| format!("{}x{}", query::attr(tbl, "rowCnt", "?"), query::attr(tbl, "colCnt", "?")),
    );

    let stem = hwpx_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let config = TemplateConfig {
        name: stem.clone(),
        description: format!("{} 템플릿 (자동 생성, 검토 필요)", stem),
        cover_table_index: cover_index.unwrap_or(0),
        replacements: Vec::new(),
    };

    let template_json = output_dir.join(TEMPLATE_FILE);
    let field_map_json = output_dir.join(FIELD_MAP_FILE);
    config.save(&template_json)?;
    draft_field_map(&cells).save(&field_map_json)?;

    log::info!(
        "Drafted {} fields from table {} of {}",
        cells.len(),
        config.cover_table_index,
        hwpx_path.display()
    );

    Ok(DraftReport {
        template_json,
        field_map_json,
        total_tables: tables.len(),
        cover_table_index: config.cover_table_index,
        cover_table_size,
        empty_cells_found: cells.len(),
    })
}
