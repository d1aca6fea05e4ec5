//! Namespace registry for HWPX parts
//!
//! HWPX parts declare a fixed set of prefixes on their root element. The tree keeps
//! every declaration verbatim as an attribute, so this registry is only used for
//! matching elements by namespace URI and for checking that a saved part still
//! declares everything it started with.

/// `hp` - paragraphs, runs, tables, pictures
pub const HP: &str = "http://www.hancom.co.kr/hwpml/2011/paragraph";
/// `hp10` - 2016 paragraph extensions
pub const HP10: &str = "http://www.hancom.co.kr/hwpml/2016/paragraph";
/// `hs` - section root
pub const HS: &str = "http://www.hancom.co.kr/hwpml/2011/section";
/// `hh` - header part (fonts, property sets, styles)
pub const HH: &str = "http://www.hancom.co.kr/hwpml/2011/head";
/// `hc` - core types
pub const HC: &str = "http://www.hancom.co.kr/hwpml/2011/core";
/// `ha` - application settings
pub const HA: &str = "http://www.hancom.co.kr/hwpml/2011/app";

/// Every prefix a Hancom writer emits, in the order it emits them.
pub const REGISTRY: &[(&str, &str)] = &[
    ("ha", HA),
    ("hp", HP),
    ("hp10", HP10),
    ("hs", HS),
    ("hc", HC),
    ("hh", HH),
    ("hhs", "http://www.hancom.co.kr/hwpml/2011/history"),
    ("hm", "http://www.hancom.co.kr/hwpml/2011/master-page"),
    ("hpf", "http://www.hancom.co.kr/schema/2011/hpf"),
    ("dc", "http://purl.org/dc/elements/1.1/"),
    ("opf", "http://www.idpf.org/2007/opf/"),
    ("ooxmlchart", "http://www.hancom.co.kr/hwpml/2016/ooxmlchart"),
    ("hwpunitchar", "http://www.hancom.co.kr/hwpml/2016/HwpUnitChar"),
    ("epub", "http://www.idpf.org/2007/ops"),
    ("config", "urn:oasis:names:tc:opendocument:xmlns:config:1.0"),
];

/// Look up the URI registered for a prefix
pub fn uri_for_prefix(prefix: &str) -> Option<&'static str> {
    REGISTRY
        .iter()
        .find(|(p, _)| *p == prefix)
        .map(|(_, uri)| *uri)
}

/// A namespace-qualified element name used for queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QName {
    /// Namespace URI
    pub ns: &'static str,
    /// Local name without prefix
    pub local: &'static str,
}

impl QName {
    /// Build a qualified name
    pub const fn new(ns: &'static str, local: &'static str) -> Self {
        Self { ns, local }
    }
}

/// Element names the extractor and editor look for
pub mod names {
    use super::{QName, HC, HH, HP};

    pub const P: QName = QName::new(HP, "p");
    pub const RUN: QName = QName::new(HP, "run");
    pub const T: QName = QName::new(HP, "t");
    pub const TBL: QName = QName::new(HP, "tbl");
    pub const TR: QName = QName::new(HP, "tr");
    pub const TC: QName = QName::new(HP, "tc");
    pub const SUB_LIST: QName = QName::new(HP, "subList");
    pub const CELL_ADDR: QName = QName::new(HP, "cellAddr");
    pub const CELL_SPAN: QName = QName::new(HP, "cellSpan");
    pub const CELL_SZ: QName = QName::new(HP, "cellSz");
    pub const SZ: QName = QName::new(HP, "sz");
    pub const PIC: QName = QName::new(HP, "pic");

    pub const FONTFACE: QName = QName::new(HH, "fontface");
    pub const FONT: QName = QName::new(HH, "font");
    pub const CHAR_PR: QName = QName::new(HH, "charPr");
    pub const BOLD: QName = QName::new(HH, "bold");
    pub const ITALIC: QName = QName::new(HH, "italic");
    pub const FONT_REF: QName = QName::new(HH, "fontRef");
    pub const PARA_PR: QName = QName::new(HH, "paraPr");
    pub const ALIGN: QName = QName::new(HH, "align");
    pub const HEADING: QName = QName::new(HH, "heading");
    pub const BORDER_FILL: QName = QName::new(HH, "borderFill");
    pub const WIN_BRUSH: QName = QName::new(HC, "winBrush");
    pub const STYLE: QName = QName::new(HH, "style");
}
