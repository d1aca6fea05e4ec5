//! Structure extraction from HWPX documents
//!
//! Each `extract_*` function opens the document, reads what it needs and returns
//! owned model types from [`crate::model`]. The submodules hold the same logic on
//! an already-open [`Container`] or tree.

pub mod cover;
pub mod sections;
pub mod styles;
pub mod tables;

use crate::archive::{ArchiveError, Container, HEADER_PART};
use crate::model::{CoverPage, DocumentStructure, OutlineNode, StyleSheet, Table, TableSummary};
use crate::template_config::ConfigError;
use cover::CoverLayout;
use std::path::Path;
use thiserror::Error;

/// Errors raised by the extractors
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Decode the cover table of an open container
///
/// # Returns
/// * `Ok(CoverPage)` - Cover fields; cells missing from the table read as empty
/// * `Err(ExtractError)` - `layout.table_index` is past the last table
pub fn read_cover(container: &Container, layout: &CoverLayout) -> Result<CoverPage, ExtractError> {
    let table = container.table(layout.table_index).ok_or_else(|| {
        ConfigError::TableIndexOutOfRange {
            index: layout.table_index,
            count: container.table_count(),
        }
    })?;
    Ok(cover::read_cover(&tables::extract_table(table), layout))
}

/// Cover fields of the document at `path`
pub fn extract_cover<P: AsRef<Path>>(path: P, layout: &CoverLayout) -> Result<CoverPage, ExtractError> {
    let container = Container::open(path)?;
    read_cover(&container, layout)
}

/// Section outline of the document at `path`
pub fn extract_sections<P: AsRef<Path>>(path: P) -> Result<Vec<OutlineNode>, ExtractError> {
    let container = Container::open(path)?;
    Ok(sections::outline(&container))
}

/// Style metadata of the document at `path`
pub fn extract_styles<P: AsRef<Path>>(path: P) -> Result<StyleSheet, ExtractError> {
    let container = Container::open(path)?;
    let header = container.parse_part(HEADER_PART)?;
    Ok(styles::read_styles(header.root()))
}

/// Every table of the document at `path`, fully extracted
pub fn extract_tables<P: AsRef<Path>>(path: P) -> Result<Vec<Table>, ExtractError> {
    let container = Container::open(path)?;
    Ok(tables::tables(&container))
}

/// One summary line per table of the document at `path`
pub fn list_tables<P: AsRef<Path>>(path: P) -> Result<Vec<TableSummary>, ExtractError> {
    let container = Container::open(path)?;
    Ok(tables::table_summaries(&container))
}

/// Cover plus outline of the document at `path`
///
/// A document without a table at `layout.table_index` has no cover; that is not
/// an error here.
pub fn extract_structure<P: AsRef<Path>>(
    path: P,
    layout: &CoverLayout,
) -> Result<DocumentStructure, ExtractError> {
    let container = Container::open(path)?;
    let cover = match read_cover(&container, layout) {
        Ok(cover) => Some(cover),
        Err(ExtractError::Config(e)) => {
            log::warn!("No cover: {}", e);
            None
        }
        Err(e) => return Err(e),
    };
    Ok(DocumentStructure {
        cover,
        sections: sections::outline(&container),
    })
}
