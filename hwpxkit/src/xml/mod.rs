//! Namespace-aware XML tree and the schema queries built on it

pub mod namespaces;
pub mod query;
pub mod tree;

pub use namespaces::{names, QName};
pub use tree::{Attribute, Element, Node, XmlDocument};

use thiserror::Error;

/// Errors raised while parsing or writing an XML part
#[derive(Error, Debug)]
pub enum XmlError {
    /// Malformed XML reported by the reader or writer
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Malformed attribute
    #[error("XML attribute error: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    /// Names, text or attribute values that are not valid UTF-8
    #[error("Invalid UTF-8 in XML: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// A closing tag with no matching open element
    #[error("Closing tag without a matching start tag")]
    UnbalancedEnd,

    /// Input ended while an element was still open
    #[error("Element <{0}> is never closed")]
    UnclosedElement(String),

    /// The part contains no element at all
    #[error("Document has no root element")]
    NoRootElement,
}
