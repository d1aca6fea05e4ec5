//! Read-only dump of `Contents/header.xml`

use crate::model::{
    BorderFill, BorderLine, CharProperty, Font, FontRef, ParaProperty, Style, StyleSheet,
};
use crate::xml::namespaces::HH;
use crate::xml::{names, query, Element, QName};

const BORDER_SIDES: [&str; 4] = ["leftBorder", "rightBorder", "topBorder", "bottomBorder"];

/// Fonts, character and paragraph properties, border fills and named styles
pub fn read_styles(header: &Element) -> StyleSheet {
    let mut sheet = StyleSheet::default();

    for fontface in query::find_all(header, names::FONTFACE) {
        let fonts = fontface
            .children_named(names::FONT)
            .map(|font| Font {
                id: query::attr(font, "id", ""),
                face: query::attr(font, "face", ""),
                kind: query::attr(font, "type", ""),
            })
            .collect();
        sheet.fonts.insert(query::attr(fontface, "lang", ""), fonts);
    }

    sheet.char_properties = query::find_all(header, names::CHAR_PR)
        .into_iter()
        .map(read_char_property)
        .collect();
    sheet.para_properties = query::find_all(header, names::PARA_PR)
        .into_iter()
        .map(read_para_property)
        .collect();
    sheet.border_fills = query::find_all(header, names::BORDER_FILL)
        .into_iter()
        .map(read_border_fill)
        .collect();
    sheet.styles = query::find_all(header, names::STYLE)
        .into_iter()
        .map(|style| Style {
            id: query::attr(style, "id", ""),
            kind: query::attr(style, "type", ""),
            name: query::attr(style, "name", ""),
            eng_name: query::attr(style, "engName", ""),
            para_pr_ref: query::attr(style, "paraPrIDRef", ""),
            char_pr_ref: query::attr(style, "charPrIDRef", ""),
            next_style_ref: query::attr(style, "nextStyleIDRef", ""),
        })
        .collect();

    sheet
}

fn read_char_property(char_pr: &Element) -> CharProperty {
    CharProperty {
        id: query::attr(char_pr, "id", ""),
        height: query::attr(char_pr, "height", ""),
        text_color: query::attr(char_pr, "textColor", ""),
        border_fill_ref: query::attr(char_pr, "borderFillIDRef", ""),
        bold: char_pr.child(names::BOLD).is_some(),
        italic: char_pr.child(names::ITALIC).is_some(),
        font_ref: char_pr.child(names::FONT_REF).map(|font_ref| FontRef {
            hangul: query::attr(font_ref, "hangul", ""),
            latin: query::attr(font_ref, "latin", ""),
        }),
    }
}

fn read_para_property(para_pr: &Element) -> ParaProperty {
    let align = para_pr.child(names::ALIGN);
    let heading = para_pr.child(names::HEADING);
    ParaProperty {
        id: query::attr(para_pr, "id", ""),
        horizontal: align.map(|a| query::attr(a, "horizontal", "")),
        vertical: align.map(|a| query::attr(a, "vertical", "")),
        heading_type: heading.map(|h| query::attr(h, "type", "")),
        heading_level: heading.map(|h| query::attr(h, "level", "")),
    }
}

fn read_border_fill(border_fill: &Element) -> BorderFill {
    let borders = BORDER_SIDES
        .into_iter()
        .filter_map(|side| {
            border_fill.child(QName::new(HH, side)).map(|line| {
                (
                    side.to_string(),
                    BorderLine {
                        kind: query::attr(line, "type", ""),
                        width: query::attr(line, "width", ""),
                        color: query::attr(line, "color", ""),
                    },
                )
            })
        })
        .collect();

    BorderFill {
        id: query::attr(border_fill, "id", ""),
        borders,
        fill_color: query::find_first(border_fill, names::WIN_BRUSH)
            .map(|brush| query::attr(brush, "faceColor", "")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::XmlDocument;

    const HEADER: &str = r##"<hh:head xmlns:hh="http://www.hancom.co.kr/hwpml/2011/head" xmlns:hc="http://www.hancom.co.kr/hwpml/2011/core"><hh:refList>
<hh:fontfaces><hh:fontface lang="HANGUL" fontCnt="1"><hh:font id="0" face="함초롬바탕" type="TTF"/></hh:fontface><hh:fontface lang="LATIN"><hh:font id="0" face="Arial" type="TTF"/></hh:fontface></hh:fontfaces>
<hh:borderFills><hh:borderFill id="1"><hh:leftBorder type="SOLID" width="0.12 mm" color="#000000"/><hh:fillBrush><hc:winBrush faceColor="#FFFFFF" hatchColor="#000000" alpha="0"/></hh:fillBrush></hh:borderFill></hh:borderFills>
<hh:charProperties><hh:charPr id="7" height="1000" textColor="#000000" borderFillIDRef="2"><hh:fontRef hangul="1" latin="0"/><hh:bold/></hh:charPr></hh:charProperties>
<hh:paraProperties><hh:paraPr id="3"><hh:align horizontal="CENTER" vertical="BASELINE"/><hh:heading type="OUTLINE" level="1"/></hh:paraPr><hh:paraPr id="4"/></hh:paraProperties>
<hh:styles><hh:style id="0" type="PARA" name="바탕글" engName="Normal" paraPrIDRef="0" charPrIDRef="0" nextStyleIDRef="0"/></hh:styles>
</hh:refList></hh:head>"##;

    #[test]
    fn test_read_styles() {
        let doc = XmlDocument::parse(HEADER.as_bytes()).unwrap();
        let sheet = read_styles(doc.root());

        assert_eq!(sheet.fonts["HANGUL"][0].face, "함초롬바탕");
        assert_eq!(sheet.fonts["LATIN"][0].face, "Arial");

        let char_pr = &sheet.char_properties[0];
        assert_eq!(char_pr.id, "7");
        assert!(char_pr.bold);
        assert!(!char_pr.italic);
        assert_eq!(char_pr.font_ref.as_ref().unwrap().hangul, "1");

        assert_eq!(sheet.para_properties.len(), 2);
        assert_eq!(sheet.para_properties[0].horizontal.as_deref(), Some("CENTER"));
        assert_eq!(sheet.para_properties[0].heading_level.as_deref(), Some("1"));
        assert_eq!(sheet.para_properties[1].horizontal, None);

        let border = &sheet.border_fills[0];
        assert_eq!(border.borders["leftBorder"].kind, "SOLID");
        assert!(!border.borders.contains_key("rightBorder"));
        assert_eq!(border.fill_color.as_deref(), Some("#FFFFFF"));

        assert_eq!(sheet.styles[0].eng_name, "Normal");
    }
}
