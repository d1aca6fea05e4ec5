use hwpxkit::extract::cover::{read_cover, CoverLayout};
use hwpxkit::model::{Cell, Table};
use hwpxkit::{build_cell_data, CellAddress, CellMapping, FieldMap, TemplateConfig};
use std::path::PathBuf;

fn template_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("templates/cloud_integrated")
}

/// Test that the bundled template configuration loads and validates
#[test]
fn test_cloud_template_loads() {
    let config = TemplateConfig::load_from_dir(template_dir()).expect("template.json should load");
    assert_eq!(config.name, "cloud_integrated");
    assert_eq!(config.cover_table_index, 0);
    assert!(!config.replacements.is_empty());

    let field_map = FieldMap::load_from_dir(template_dir()).expect("field_map.json should load");
    assert_eq!(field_map.entity_blocks.len(), 3);
    assert_eq!(field_map.company_lists.len(), 2);
    assert_eq!(field_map.company_lists[0].item_limit(), Some(3));
}

/// Test that the bundled field map writes where the default cover layout reads
#[test]
fn test_field_map_matches_cover_layout() {
    let field_map = FieldMap::load_from_dir(template_dir()).unwrap();
    let layout = CoverLayout::default();

    for entity in &layout.entities {
        let block = field_map
            .entity_blocks
            .iter()
            .find(|b| b.data_path == entity.key)
            .unwrap_or_else(|| panic!("no block for {}", entity.key));
        assert_eq!(block.start_row, entity.start_row);
        assert_eq!(block.fields.len(), 7);
        for field in &block.fields {
            assert_eq!(field.left.as_ref().unwrap().col, entity.value_col);
            if let Some(right) = &field.right {
                assert_eq!(right.col, entity.right_value_col);
            }
        }
    }

    for list in &layout.lists {
        let descriptor = field_map
            .company_lists
            .iter()
            .find(|l| l.data_path == list.key)
            .unwrap();
        assert_eq!(descriptor.data_start_row, list.data_start_row());
        assert_eq!(descriptor.end_row, Some(list.end_row));
        let columns: Vec<_> = descriptor
            .column_indices()
            .unwrap()
            .into_iter()
            .map(|(col, field)| (col, field.to_string()))
            .collect();
        let expected: Vec<_> = list.columns.iter().map(|c| (c.col, c.field.clone())).collect();
        assert_eq!(columns, expected);
    }
}

/// Test that an extracted cover fed back through the field map lands on the same cells
#[test]
fn test_extracted_cover_refills_same_cells() {
    let filled = [
        ((6, 3), "기업A"),
        ((6, 9), "111-22-33333"),
        ((10, 3), "홍길동"),
        ((15, 9), "02-000-0000"),
        ((26, 2), "참여1"),
        ((29, 2), "실증1"),
        ((29, 10), "부산"),
    ];
    let cells = filled
        .iter()
        .map(|&((row, col), text)| Cell {
            row,
            col,
            row_span: 1,
            col_span: 1,
            text: text.to_string(),
            border_fill_ref: String::new(),
            width: None,
            height: None,
        })
        .collect();
    let table = Table {
        row_count: 35,
        col_count: 11,
        border_fill_ref: String::new(),
        width: None,
        height: None,
        rows: vec![cells],
    };

    let cover = read_cover(&table, &CoverLayout::default());
    let data = serde_json::to_value(&cover).unwrap();
    let field_map = FieldMap::load_from_dir(template_dir()).unwrap();
    let mapping = build_cell_data(&data, &field_map);

    let expected: CellMapping = filled
        .iter()
        .map(|&((row, col), text)| (CellAddress::new(row, col), text.to_string()))
        .collect();
    assert_eq!(mapping, expected);
}
