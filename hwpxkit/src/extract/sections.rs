//! Body outline: sections, subsections and their content
//!
//! Top-level paragraphs are classified one by one, in order:
//! 1. `1. Title` opens a section and closes any open subsection
//! 2. `1.1 Title`, `2.3. Title` or `□ Title` opens a subsection of the current section
//! 3. anything else becomes a table, picture or paragraph node
//!
//! Content goes into the open subsection, else the open section, else nowhere.
//! Front matter before the first heading is not part of the outline; the cover
//! extractor covers it.

use crate::archive::Container;
use crate::model::OutlineNode;
use crate::xml::{names, query, Element};
use regex::Regex;
use std::sync::OnceLock;

const SUBSECTION_BULLET: &str = "□ ";

static SECTION_HEADER: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
static SECTION_NUMBER_PAIR: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
static SUBSECTION_HEADER: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();

fn matches(cell: &'static OnceLock<Result<Regex, regex::Error>>, pattern: &str, text: &str) -> bool {
    cell.get_or_init(|| Regex::new(pattern))
        .as_ref()
        .is_ok_and(|re| re.is_match(text))
}

/// `"1. Overview"` but not `"1.1 Background"` or `"1.10 x"`
pub fn is_section_header(text: &str) -> bool {
    matches(&SECTION_HEADER, r"^\d+\.\s+\S", text)
        && !matches(&SECTION_NUMBER_PAIR, r"^\d+\.\d+", text)
}

/// `"1.1 Background"`, `"2.3. Scope"` or a `□ ` bullet item
pub fn is_subsection_header(text: &str) -> bool {
    matches(&SUBSECTION_HEADER, r"^\d+\.\d+\.?\s+\S", text) || text.starts_with(SUBSECTION_BULLET)
}

/// Where the next content node goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    /// No heading seen yet
    Nowhere,
    Section,
    /// Last child of the last section
    Subsection,
    /// Subsection header before any section; its content is dropped
    Orphan,
}

/// Builds the outline while paragraphs are fed in order
struct OutlineBuilder {
    sections: Vec<OutlineNode>,
    target: Target,
}

impl OutlineBuilder {
    fn new() -> Self {
        Self {
            sections: Vec::new(),
            target: Target::Nowhere,
        }
    }

    fn open_section(&mut self, title: String, para_index: usize, para_pr_ref: String) {
        self.sections.push(OutlineNode::Section {
            title,
            para_index,
            para_pr_ref,
            children: Vec::new(),
        });
        self.target = Target::Section;
    }

    fn open_subsection(&mut self, title: String, para_index: usize, para_pr_ref: String) {
        let subsection = OutlineNode::Subsection {
            title,
            para_index,
            para_pr_ref,
            children: Vec::new(),
        };
        match self.sections.last_mut() {
            Some(OutlineNode::Section { children, .. }) => {
                children.push(subsection);
                self.target = Target::Subsection;
            }
            _ => {
                log::debug!("Subsection at paragraph {} has no section", para_index);
                self.target = Target::Orphan;
            }
        }
    }

    fn push_content(&mut self, node: OutlineNode) {
        let Some(OutlineNode::Section { children, .. }) = self.sections.last_mut() else {
            return;
        };
        match self.target {
            Target::Section => children.push(node),
            Target::Subsection => {
                if let Some(OutlineNode::Subsection { children, .. }) = children.last_mut() {
                    children.push(node);
                }
            }
            Target::Nowhere | Target::Orphan => {}
        }
    }

    fn finish(self) -> Vec<OutlineNode> {
        self.sections
    }
}

/// Content node for a non-heading paragraph, if it has any content
fn classify_content(paragraph: &Element, para_index: usize, text: &str, para_pr_ref: String) -> Option<OutlineNode> {
    let caption = (!text.is_empty()).then(|| text.to_string());

    let table = paragraph
        .children_named(names::RUN)
        .find_map(|run| run.child(names::TBL));
    if let Some(tbl) = table {
        return Some(OutlineNode::Table {
            para_index,
            row_count: query::attr_num(tbl, "rowCnt", 0),
            col_count: query::attr_num(tbl, "colCnt", 0),
            caption,
        });
    }

    let has_picture = paragraph
        .children_named(names::RUN)
        .any(|run| run.child(names::PIC).is_some());
    if has_picture {
        return Some(OutlineNode::Picture {
            para_index,
            caption,
        });
    }

    caption.map(|text| OutlineNode::Paragraph {
        para_index,
        text,
        para_pr_ref,
    })
}

/// Outline of a sequence of top-level paragraphs
///
/// `para_index` of each node is its position in `paragraphs`.
pub fn build_outline<'a>(paragraphs: impl IntoIterator<Item = &'a Element>) -> Vec<OutlineNode> {
    let mut builder = OutlineBuilder::new();

    for (para_index, paragraph) in paragraphs.into_iter().enumerate() {
        let text = query::paragraph_text(paragraph);
        let para_pr_ref = query::attr(paragraph, "paraPrIDRef", "");

        if is_section_header(&text) {
            builder.open_section(text, para_index, para_pr_ref);
        } else if is_subsection_header(&text) {
            builder.open_subsection(text, para_index, para_pr_ref);
        } else if let Some(node) = classify_content(paragraph, para_index, &text, para_pr_ref) {
            builder.push_content(node);
        }
    }

    builder.finish()
}

/// Outline of the whole body; sections are read in order and paragraph indices
/// run on across them
pub fn outline(container: &Container) -> Vec<OutlineNode> {
    build_outline(container.sections().iter().flat_map(|s| s.paragraphs()))
}
