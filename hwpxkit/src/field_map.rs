//! Field map descriptors and the data-to-cell mapper
//!
//! A field map projects nested JSON input onto table addresses. Entity blocks
//! describe fixed-layout records (one company spread over several rows), company
//! lists describe repeating rows. Nothing here touches a document; the result is
//! a sparse [`CellMapping`] for [`crate::editor::TableEditor::fill_cells`].

use crate::model::{CellAddress, CellMapping};
use crate::template_config::{find_config_file, load_file, save_file, ConfigError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// File name of the field map inside a template directory
pub const FIELD_MAP_FILE: &str = "field_map.json";

/// Entity blocks plus company lists, applied in that order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMap {
    #[serde(default)]
    pub entity_blocks: Vec<EntityBlock>,
    #[serde(default)]
    pub company_lists: Vec<CompanyList>,
}

/// A fixed-layout record starting at `start_row`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityBlock {
    #[serde(default)]
    pub name: String,
    /// Dotted path to the record object in the input
    pub data_path: String,
    pub start_row: u32,
    pub fields: Vec<FieldRow>,
}

/// One row of an entity block with up to two values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRow {
    /// Row offset from the block's `start_row`
    pub offset: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<FieldSlot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<FieldSlot>,
}

/// Target column and dotted path within the record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSlot {
    pub col: u32,
    pub field: String,
}

/// A repeating region, one item per row from `data_start_row`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyList {
    #[serde(default)]
    pub name: String,
    /// Dotted path to the array of items in the input
    pub data_path: String,
    /// First row that receives an item (after any header row)
    pub data_start_row: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,
    /// Last row of the region, inclusive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_row: Option<u32>,
    /// Whether the row above `data_start_row` is a header; informational
    #[serde(default)]
    pub has_header: bool,
    /// Column index (as a string key) -> item field name
    pub columns: BTreeMap<String, String>,
}

impl CompanyList {
    /// Columns with their keys parsed to indices
    ///
    /// # Returns
    /// * `Ok(Vec<(u32, &str)>)` - `(column, field)` pairs in column order
    /// * `Err(ConfigError::InvalidColumn)` - A key is not a non-negative integer
    pub fn column_indices(&self) -> Result<Vec<(u32, &str)>, ConfigError> {
        let mut columns = self
            .columns
            .iter()
            .map(|(key, field)| {
                key.trim()
                    .parse::<u32>()
                    .map(|col| (col, field.as_str()))
                    .map_err(|_| ConfigError::InvalidColumn {
                        list: self.name.clone(),
                        column: key.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        columns.sort_by_key(|(col, _)| *col);
        Ok(columns)
    }

    /// How many items fit, from `max_items` and `end_row`; `None` means unbounded
    pub fn item_limit(&self) -> Option<usize> {
        let by_rows = self.end_row.map(|end| {
            if end >= self.data_start_row {
                (end - self.data_start_row) as usize + 1
            } else {
                0
            }
        });
        match (self.max_items, by_rows) {
            (Some(max), Some(rows)) => Some(max.min(rows)),
            (max, rows) => max.or(rows),
        }
    }
}

impl FieldMap {
    /// Load and validate a field map from a `.json` or `.toml` file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let map: FieldMap = load_file(path.as_ref())?;
        map.validate()?;
        Ok(map)
    }

    /// Load `field_map.json` from a template directory
    pub fn load_from_dir<P: AsRef<Path>>(dir: P) -> Result<Self, ConfigError> {
        let dir = dir.as_ref();
        let path = find_config_file(dir, FIELD_MAP_FILE)
            .ok_or_else(|| ConfigError::MissingFile(dir.join(FIELD_MAP_FILE)))?;
        Self::load(path)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        save_file(path.as_ref(), self)
    }

    /// Check that every company-list column key is a column index
    pub fn validate(&self) -> Result<(), ConfigError> {
        for list in &self.company_lists {
            list.column_indices()?;
        }
        Ok(())
    }

    /// Number of addresses the map can write at most, ignoring unbounded lists
    pub fn slot_count(&self) -> usize {
        let block_slots: usize = self
            .entity_blocks
            .iter()
            .flat_map(|b| &b.fields)
            .map(|f| usize::from(f.left.is_some()) + usize::from(f.right.is_some()))
            .sum();
        let list_slots: usize = self
            .company_lists
            .iter()
            .map(|l| l.item_limit().unwrap_or(0) * l.columns.len())
            .sum();
        block_slots + list_slots
    }
}

/// Follow a dotted path (`담당자.성명`) through nested objects
///
/// Returns `None` as soon as a segment is missing or the current value is not an
/// object; never fails.
pub fn resolve_path<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(data, |current, segment| current.as_object()?.get(segment))
}

/// Text for a scalar value; `None` for null, empty strings, arrays and objects
///
/// Booleans use JSON spelling (`true`/`false`). Arrays and objects are skipped
/// rather than stringified so a structured value never lands in a cell as text.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => None,
        Value::Array(_) | Value::Object(_) => {
            log::debug!("Skipping non-scalar value");
            None
        }
    }
}

/// Resolve input data against a field map
///
/// Entity blocks are applied first, then company lists, each in file order.
/// When two descriptors target the same address the later one wins and the
/// overwrite is logged. Missing data never fails; the field is just absent.
pub fn build_cell_data(data: &Value, field_map: &FieldMap) -> CellMapping {
    let mut mapping = CellMapping::new();

    for block in &field_map.entity_blocks {
        let Some(record) = resolve_path(data, &block.data_path).filter(|v| v.is_object()) else {
            log::debug!("No object at '{}', skipping block", block.data_path);
            continue;
        };

        for row in &block.fields {
            let Some(address_row) = block.start_row.checked_add(row.offset) else {
                log::warn!(
                    "Row {} + {} in block '{}' is out of range, skipping",
                    block.start_row,
                    row.offset,
                    block.name
                );
                continue;
            };
            for slot in [&row.left, &row.right].into_iter().flatten() {
                if let Some(text) = resolve_path(record, &slot.field).and_then(scalar_text) {
                    record_cell(&mut mapping, CellAddress::new(address_row, slot.col), text);
                }
            }
        }
    }

    for list in &field_map.company_lists {
        let Some(items) = resolve_path(data, &list.data_path).and_then(Value::as_array) else {
            log::debug!("No array at '{}', skipping list", list.data_path);
            continue;
        };
        let columns = match list.column_indices() {
            Ok(columns) => columns,
            Err(e) => {
                log::warn!("Skipping list '{}': {}", list.name, e);
                continue;
            }
        };
        let limit = list.item_limit().unwrap_or(items.len());

        for (index, item) in items.iter().take(limit).enumerate() {
            let Some(row) = u32::try_from(index)
                .ok()
                .and_then(|i| list.data_start_row.checked_add(i))
            else {
                log::warn!("List '{}' runs past the last row, truncating", list.name);
                break;
            };
            let Some(item) = item.as_object() else {
                log::debug!("Item for row {} in '{}' is not an object", row, list.name);
                continue;
            };
            for &(col, field) in &columns {
                if let Some(text) = item.get(field).and_then(scalar_text) {
                    record_cell(&mut mapping, CellAddress::new(row, col), text);
                }
            }
        }
    }

    mapping
}

fn record_cell(mapping: &mut CellMapping, address: CellAddress, text: String) {
    if let Some(previous) = mapping.insert(address, text) {
        log::warn!("Cell {} mapped twice; replacing '{}'", address, previous);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn summary_block() -> EntityBlock {
        EntityBlock {
            name: "summary".to_string(),
            data_path: "cover".to_string(),
            start_row: 2,
            fields: vec![FieldRow {
                offset: 0,
                left: Some(FieldSlot {
                    col: 3,
                    field: "사업개요".to_string(),
                }),
                right: Some(FieldSlot {
                    col: 9,
                    field: "수행기간.개발시작".to_string(),
                }),
            }],
        }
    }

    fn field_map(blocks: Vec<EntityBlock>, lists: Vec<CompanyList>) -> FieldMap {
        FieldMap {
            entity_blocks: blocks,
            company_lists: lists,
        }
    }

    #[test]
    fn test_resolve_path() {
        let data = json!({ "a": { "b": { "c": 1 } }, "s": "x" });
        assert_eq!(resolve_path(&data, "a.b.c"), Some(&json!(1)));
        assert_eq!(resolve_path(&data, "a.x.c"), None);
        assert_eq!(resolve_path(&data, "s.deeper"), None);
    }

    #[test]
    fn test_entity_block_field() {
        let data = json!({ "cover": { "사업개요": "A" } });
        let mapping = build_cell_data(&data, &field_map(vec![summary_block()], vec![]));
        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping[&CellAddress::new(2, 3)], "A");
    }

    #[test]
    fn test_missing_nested_key_is_absent() {
        let data = json!({ "cover": { "수행기간": {} } });
        let mapping = build_cell_data(&data, &field_map(vec![summary_block()], vec![]));
        assert!(mapping.is_empty());
    }

    #[test]
    fn test_empty_and_non_scalar_values_skipped() {
        let data = json!({ "cover": { "사업개요": "", "수행기간": { "개발시작": ["x"] } } });
        let mapping = build_cell_data(&data, &field_map(vec![summary_block()], vec![]));
        assert!(mapping.is_empty());
    }

    #[test]
    fn test_company_list_truncated_and_numbers_stringified() {
        let list = CompanyList {
            name: "participants".to_string(),
            data_path: "참여공급기업".to_string(),
            data_start_row: 26,
            max_items: Some(2),
            end_row: None,
            has_header: true,
            columns: [("1", "번호"), ("2", "기업명")]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        };
        let data = json!({ "참여공급기업": [
            { "번호": 1, "기업명": "가" },
            { "번호": 2, "기업명": "" },
            { "번호": 3, "기업명": "다" }
        ]});

        let mapping = build_cell_data(&data, &field_map(vec![], vec![list]));
        let expected: CellMapping = [
            (CellAddress::new(26, 1), "1"),
            (CellAddress::new(26, 2), "가"),
            (CellAddress::new(27, 1), "2"),
        ]
        .into_iter()
        .map(|(a, t)| (a, t.to_string()))
        .collect();
        assert_eq!(mapping, expected);
    }

    #[test]
    fn test_item_limit() {
        let mut list = CompanyList {
            name: String::new(),
            data_path: String::new(),
            data_start_row: 30,
            max_items: None,
            end_row: Some(33),
            has_header: false,
            columns: BTreeMap::new(),
        };
        assert_eq!(list.item_limit(), Some(4));
        list.max_items = Some(2);
        assert_eq!(list.item_limit(), Some(2));
        list.end_row = None;
        list.max_items = None;
        assert_eq!(list.item_limit(), None);
    }

    #[test]
    fn test_later_descriptor_wins() {
        let mut second = summary_block();
        second.data_path = "other".to_string();
        let data = json!({ "cover": { "사업개요": "first" }, "other": { "사업개요": "second" } });
        let mapping = build_cell_data(&data, &field_map(vec![summary_block(), second], vec![]));
        assert_eq!(mapping[&CellAddress::new(2, 3)], "second");
    }

    #[test]
    fn test_row_overflow_skipped() {
        let mut block = summary_block();
        block.start_row = u32::MAX;
        block.fields[0].offset = 1;
        let list = CompanyList {
            name: "tail".to_string(),
            data_path: "items".to_string(),
            data_start_row: u32::MAX,
            max_items: None,
            end_row: None,
            has_header: false,
            columns: [("1".to_string(), "기업명".to_string())].into_iter().collect(),
        };
        let data = json!({
            "cover": { "사업개요": "x" },
            "items": [{ "기업명": "가" }, { "기업명": "나" }]
        });

        let mapping = build_cell_data(&data, &field_map(vec![block], vec![list]));
        let expected: CellMapping = [(CellAddress::new(u32::MAX, 1), "가".to_string())]
            .into_iter()
            .collect();
        assert_eq!(mapping, expected);
    }

    #[test]
    fn test_bool_uses_json_spelling() {
        assert_eq!(scalar_text(&json!(true)), Some("true".to_string()));
        assert_eq!(scalar_text(&json!({ "a": 1 })), None);
    }

    #[test]
    fn test_invalid_column_rejected_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(FIELD_MAP_FILE);
        std::fs::write(
            &path,
            r#"{"company_lists": [{"name": "x", "data_path": "x", "data_start_row": 1, "columns": {"two": "기업명"}}]}"#,
        )
        .unwrap();
        assert!(matches!(
            FieldMap::load(&path),
            Err(ConfigError::InvalidColumn { .. })
        ));
    }

    #[test]
    fn test_missing_file_in_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            FieldMap::load_from_dir(dir.path()),
            Err(ConfigError::MissingFile(_))
        ));
    }
}
