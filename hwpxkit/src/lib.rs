//! hwpxkit - HWPX template extraction and filling
//!
//! Reads HWPX documents (zipped OWPML XML) into an editable tree, extracts the
//! cover table, body outline and style metadata, and fills cover cells from
//! JSON data through a configurable field map. Saving only re-encodes the parts
//! that changed; everything else is copied byte for byte.
//!
//! ```no_run
//! use hwpxkit::{build_cell_data, Container, FieldMap};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let data: serde_json::Value = serde_json::from_str(r#"{"대표공급기업": {"기업명": "기업A"}}"#)?;
//! let field_map = FieldMap::load("templates/cloud/field_map.json")?;
//! let cells = build_cell_data(&data, &field_map);
//!
//! let mut container = Container::open("templates/cloud/blank.hwpx")?;
//! if let Some(mut table) = container.table_editor(0) {
//!     let filled = table.fill_cells(&cells);
//!     println!("{}/{} cells", filled, cells.len());
//! }
//! container.save(Some("out/filled.hwpx".as_ref()))?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::all))]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::pedantic))]
// Allow some pedantic lints that are too strict for this project
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::enum_variant_names)]

pub mod archive;
pub mod automation;
pub mod editor;
pub mod extract;
pub mod field_map;
pub mod generator;
pub mod model;
pub mod pipeline;
pub mod template_config;
pub mod xml;

pub use archive::{ArchiveError, Container};
pub use editor::TableEditor;
pub use extract::{
    extract_cover, extract_sections, extract_structure, extract_styles, extract_tables,
    list_tables, ExtractError,
};
pub use field_map::{build_cell_data, FieldMap};
pub use generator::{generate_template_config, DraftReport, GenerateError};
pub use model::{CellAddress, CellMapping};
pub use template_config::{build_replacements, ConfigError, TemplateConfig};
