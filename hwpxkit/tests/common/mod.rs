//! Builds small but realistic HWPX archives for the integration tests

#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const COVER_ROWS: u32 = 35;
pub const COVER_COLS: u32 = 11;
/// `charPrIDRef` of every run in the cover table
pub const CELL_CHAR_PR: &str = "5";

const ROOT_NAMESPACES: &str = concat!(
    r#"xmlns:ha="http://www.hancom.co.kr/hwpml/2011/app" "#,
    r#"xmlns:hp="http://www.hancom.co.kr/hwpml/2011/paragraph" "#,
    r#"xmlns:hp10="http://www.hancom.co.kr/hwpml/2016/paragraph" "#,
    r#"xmlns:hs="http://www.hancom.co.kr/hwpml/2011/section" "#,
    r#"xmlns:hc="http://www.hancom.co.kr/hwpml/2011/core" "#,
    r#"xmlns:hh="http://www.hancom.co.kr/hwpml/2011/head""#,
);

pub const SETTINGS_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes" ?>"#,
    r#"<ha:HWPApplicationSetting xmlns:ha="http://www.hancom.co.kr/hwpml/2011/app" xmlns:config="urn:oasis:names:tc:opendocument:xmlns:config:1.0">"#,
    r#"<ha:CaretPosition listIDRef="0" paraIDRef="0" pos="0"/>"#,
    r#"<config:config-item-set name="PrintInfo">"#,
    r#"<config:config-item name="PrintMethod" type="short">4</config:config-item>"#,
    r#"<config:config-item name="ZoomX" type="short">100</config:config-item>"#,
    r#"</config:config-item-set></ha:HWPApplicationSetting>"#,
);

pub const HEADER_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes" ?>"#,
    r#"<hh:head xmlns:hh="http://www.hancom.co.kr/hwpml/2011/head" xmlns:hc="http://www.hancom.co.kr/hwpml/2011/core" version="1.4" secCnt="2"><hh:refList>"#,
    r#"<hh:fontfaces itemCnt="1"><hh:fontface lang="HANGUL" fontCnt="1"><hh:font id="0" face="함초롬돋움" type="TTF" isEmbedded="0"/></hh:fontface></hh:fontfaces>"#,
    r##"<hh:borderFills itemCnt="1"><hh:borderFill id="3" threeD="0" shadow="0"><hh:topBorder type="SOLID" width="0.12 mm" color="#000000"/><hh:fillBrush><hc:winBrush faceColor="#E5E5E5" hatchColor="#999999" alpha="0"/></hh:fillBrush></hh:borderFill></hh:borderFills>"##,
    r##"<hh:charProperties itemCnt="1"><hh:charPr id="5" height="1000" textColor="#000000" shadeColor="none" borderFillIDRef="2"><hh:fontRef hangul="0" latin="0"/><hh:bold/></hh:charPr></hh:charProperties>"##,
    r#"<hh:paraProperties itemCnt="1"><hh:paraPr id="0"><hh:align horizontal="JUSTIFY" vertical="BASELINE"/><hh:heading type="NONE" idRef="0" level="0"/></hh:paraPr></hh:paraProperties>"#,
    r#"<hh:styles itemCnt="1"><hh:style id="0" type="PARA" name="바탕글" engName="Normal" paraPrIDRef="0" charPrIDRef="0" nextStyleIDRef="0" langID="1042"/></hh:styles>"#,
    r#"</hh:refList></hh:head>"#,
);

pub const CONTENT_HPF: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes" ?>"#,
    r#"<opf:package xmlns:opf="http://www.idpf.org/2007/opf/" version="" unique-identifier="" id=""><opf:manifest>"#,
    r#"<opf:item id="header" href="Contents/header.xml" media-type="application/xml"/>"#,
    r#"<opf:item id="section0" href="Contents/section0.xml" media-type="application/xml"/>"#,
    r#"<opf:item id="section1" href="Contents/section1.xml" media-type="application/xml"/>"#,
    r#"</opf:manifest></opf:package>"#,
);

/// Text the fixture puts in a cover cell: a label in column 0, nothing elsewhere
pub fn cover_label(row: u32, col: u32) -> Option<String> {
    match (row, col) {
        (0, 0) => Some("사업계획서".to_string()),
        (r, 0) => Some(format!("항목{}", r)),
        _ => None,
    }
}

fn cell_xml(row: u32, col: u32, text: Option<&str>) -> String {
    let run = match text {
        Some(text) => format!(
            r#"<hp:run charPrIDRef="{}"><hp:t>{}</hp:t></hp:run>"#,
            CELL_CHAR_PR, text
        ),
        None => format!(r#"<hp:run charPrIDRef="{}"/>"#, CELL_CHAR_PR),
    };
    format!(
        concat!(
            r#"<hp:tc name="" header="0" hasMargin="0" protect="0" editable="0" dirty="0" borderFillIDRef="4">"#,
            r#"<hp:subList id="" textDirection="HORIZONTAL" lineWrap="BREAK" vertAlign="CENTER">"#,
            r#"<hp:p id="0" paraPrIDRef="0" styleIDRef="0" pageBreak="0" columnBreak="0" merged="0">{}</hp:p>"#,
            r#"</hp:subList><hp:cellAddr colAddr="{}" rowAddr="{}"/><hp:cellSpan colSpan="1" rowSpan="1"/>"#,
            r#"<hp:cellSz width="4000" height="1200"/><hp:cellMargin left="510" right="510" top="141" bottom="141"/></hp:tc>"#,
        ),
        run, col, row
    )
}

fn table_xml(rows: u32, cols: u32, text: impl Fn(u32, u32) -> Option<String>) -> String {
    let mut xml = format!(
        r#"<hp:tbl id="1" zOrder="0" numberingType="TABLE" rowCnt="{}" colCnt="{}" cellSpacing="0" borderFillIDRef="3"><hp:sz width="{}" widthRelTo="ABSOLUTE" height="{}" heightRelTo="ABSOLUTE" protect="0"/>"#,
        rows,
        cols,
        cols * 4000,
        rows * 1200
    );
    for row in 0..rows {
        xml.push_str("<hp:tr>");
        for col in 0..cols {
            xml.push_str(&cell_xml(row, col, text(row, col).as_deref()));
        }
        xml.push_str("</hp:tr>");
    }
    xml.push_str("</hp:tbl>");
    xml
}

fn paragraph_xml(text: &str) -> String {
    format!(
        r#"<hp:p id="0" paraPrIDRef="0" styleIDRef="0" pageBreak="0" columnBreak="0" merged="0"><hp:run charPrIDRef="0"><hp:t>{}</hp:t></hp:run></hp:p>"#,
        text
    )
}

fn section_xml(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes" ?><hs:sec {}>{}</hs:sec>"#,
        ROOT_NAMESPACES, body
    )
}

/// First body part: the 35x11 cover table followed by an outlined body
pub fn section0_xml() -> String {
    let cover = format!(
        r#"<hp:p id="0" paraPrIDRef="0" styleIDRef="0" pageBreak="0" columnBreak="0" merged="0"><hp:run charPrIDRef="0">{}</hp:run></hp:p>"#,
        table_xml(COVER_ROWS, COVER_COLS, cover_label)
    );
    let body = [
        paragraph_xml("1. 사업 개요"),
        paragraph_xml("사업의 목적을 설명한다."),
        paragraph_xml("1.1 추진 배경"),
        paragraph_xml("클라우드 전환 수요 증가"),
        paragraph_xml("□ 기대 효과"),
        paragraph_xml("비용 절감"),
        paragraph_xml("2. 수행 계획"),
    ]
    .concat();
    section_xml(&(cover + &body))
}

/// Second body part: one small table and a paragraph
pub fn section1_xml() -> String {
    let small = table_xml(2, 2, |row, col| Some(format!("S{}{}", row, col)));
    section_xml(&format!(
        r#"<hp:p id="0" paraPrIDRef="0" styleIDRef="0"><hp:run charPrIDRef="0">{}<hp:t>표 1. 일정</hp:t></hp:run></hp:p>{}"#,
        small,
        paragraph_xml("3. 기대 효과")
    ))
}

/// One archive entry
pub struct Part {
    pub name: &'static str,
    pub content: Vec<u8>,
    pub method: CompressionMethod,
}

impl Part {
    pub fn new(name: &'static str, content: impl Into<Vec<u8>>, method: CompressionMethod) -> Self {
        Self {
            name,
            content: content.into(),
            method,
        }
    }
}

/// Parts of the standard fixture, `mimetype` compressed with `marker_method`
pub fn standard_parts(marker_method: CompressionMethod) -> Vec<Part> {
    vec![
        Part::new("mimetype", "application/hwp+zip", marker_method),
        Part::new("version.xml", r#"<?xml version="1.0" encoding="UTF-8" standalone="yes" ?><hv:HCFVersion xmlns:hv="http://www.hancom.co.kr/hwpml/2011/version" major="5" minor="1"/>"#, CompressionMethod::Stored),
        Part::new("Contents/header.xml", HEADER_XML, CompressionMethod::Deflated),
        Part::new("Contents/section0.xml", section0_xml(), CompressionMethod::Deflated),
        Part::new("Contents/section1.xml", section1_xml(), CompressionMethod::Deflated),
        Part::new("Contents/content.hpf", CONTENT_HPF, CompressionMethod::Deflated),
        Part::new("settings.xml", SETTINGS_XML, CompressionMethod::Deflated),
        Part::new("Preview/PrvText.txt", "사업계획서", CompressionMethod::Deflated),
    ]
}

pub fn write_archive(path: &Path, parts: &[Part]) {
    let file = File::create(path).unwrap();
    let mut writer = ZipWriter::new(file);
    for part in parts {
        let options = SimpleFileOptions::default().compression_method(part.method);
        writer.start_file(part.name, options).unwrap();
        writer.write_all(&part.content).unwrap();
    }
    writer.finish().unwrap();
}

/// Write the standard fixture as `<dir>/<name>` and return its path
pub fn sample_hwpx(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    write_archive(&path, &standard_parts(CompressionMethod::Stored));
    path
}

/// Compression method and content of one entry, read straight from the zip
pub fn read_entry(path: &Path, name: &str) -> (CompressionMethod, Vec<u8>) {
    let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut file = archive.by_name(name).unwrap();
    let method = file.compression();
    let mut content = Vec::new();
    std::io::Read::read_to_end(&mut file, &mut content).unwrap();
    (method, content)
}

/// Template directory with a field map for the first entity block and one replacement
pub fn write_template_dir(dir: &Path) {
    std::fs::create_dir_all(dir).unwrap();
    std::fs::write(
        dir.join("template.json"),
        r#"{
  "name": "cloud",
  "description": "테스트 템플릿",
  "cover_table_index": 0,
  "replacements": [
    {"find": "OO사업", "data_key": "사업명"},
    {"find": "기간", "data_key": "수행기간", "format": "{시작} ~ {종료}"}
  ]
}"#,
    )
    .unwrap();
    std::fs::write(
        dir.join("field_map.json"),
        r#"{
  "entity_blocks": [
    {
      "name": "대표공급기업",
      "data_path": "대표공급기업",
      "start_row": 6,
      "fields": [
        {"offset": 0, "left": {"col": 3, "field": "기업명"}, "right": {"col": 9, "field": "사업자등록번호"}},
        {"offset": 1, "left": {"col": 3, "field": "대표자명"}},
        {"offset": 4, "left": {"col": 3, "field": "담당자.성명"}}
      ]
    }
  ],
  "company_lists": [
    {
      "name": "참여공급기업",
      "data_path": "참여공급기업",
      "data_start_row": 26,
      "max_items": 3,
      "has_header": true,
      "columns": {"2": "기업명", "10": "지역"}
    }
  ]
}"#,
    )
    .unwrap();
}

pub const INPUT_JSON: &str = r#"{
  "사업명": "클라우드 전환 사업",
  "수행기간": {"시작": "2025.01", "종료": "2025.12"},
  "대표공급기업": {
    "기업명": "기업A",
    "사업자등록번호": "111-22-33333",
    "대표자명": "",
    "담당자": {"성명": "홍길동"}
  },
  "참여공급기업": [
    {"기업명": "참여1", "지역": "서울"},
    {"기업명": "참여2"}
  ]
}"#;
