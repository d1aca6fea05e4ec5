//! HWPX container codec
//!
//! An HWPX file is a zip archive of XML parts. The container is read into memory
//! once: the raw archive bytes are kept so untouched entries can be copied
//! verbatim on save, and every body section (`Contents/sectionN.xml`) is parsed
//! into an editable tree.
//!
//! Saving rewrites only what changed:
//! - the `mimetype` marker is always written stored (uncompressed)
//! - modified sections and replaced parts are re-encoded with their original
//!   compression method
//! - every other entry is raw-copied, compressed bytes and all
//!
//! The archive is written to a `.tmp` sibling first and renamed over the target,
//! so a failed save never leaves a half-written file behind.

use crate::editor::TableEditor;
use crate::xml::{names, query, Element, XmlDocument, XmlError};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Cursor, Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Name of the content-type marker entry
pub const MARKER_ENTRY: &str = "mimetype";
/// Main body part; every HWPX document has at least this section
pub const MAIN_SECTION: &str = "Contents/section0.xml";
/// Style and font metadata
pub const HEADER_PART: &str = "Contents/header.xml";
/// Application settings, including print options
pub const SETTINGS_PART: &str = "settings.xml";

const PRINT_METHOD_PAGES_PER_SHEET: &str = r#""PrintMethod" type="short">4<"#;
const PRINT_METHOD_SINGLE_PAGE: &str = r#""PrintMethod" type="short">0<"#;

/// Errors raised while opening or saving a container
#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("IO error on {path}: {source}", path = .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("{path} is not an HWPX document: missing 'mimetype' entry", path = .0.display())]
    MissingMarker(PathBuf),

    #[error("Required part '{0}' not found in archive")]
    MissingPart(String),

    #[error("Failed to parse {part}: {source}")]
    Xml {
        part: String,
        #[source]
        source: XmlError,
    },
}

impl ArchiveError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        ArchiveError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Metadata of one archive entry, in archive order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub compression: CompressionMethod,
    /// Uncompressed size
    pub size: u64,
    pub is_dir: bool,
}

/// A parsed body section
#[derive(Debug, Clone)]
pub struct SectionPart {
    pub(crate) name: String,
    pub(crate) document: XmlDocument,
    pub(crate) dirty: bool,
}

impl SectionPart {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn document(&self) -> &XmlDocument {
        &self.document
    }

    /// Whether the tree was changed since the container was opened
    pub fn is_modified(&self) -> bool {
        self.dirty
    }

    /// Top-level `hp:p` paragraphs of the section
    pub fn paragraphs(&self) -> impl Iterator<Item = &Element> {
        self.document.root().children_named(names::P)
    }
}

/// An HWPX document held in memory
#[derive(Debug, Clone)]
pub struct Container {
    path: PathBuf,
    raw: Vec<u8>,
    entries: Vec<ArchiveEntry>,
    sections: Vec<SectionPart>,
    replaced: BTreeMap<String, Vec<u8>>,
}

/// Section number of a body part name (`Contents/section<N>.xml`), if it is one
fn section_number(name: &str) -> Option<u32> {
    let digits = name
        .strip_prefix("Contents/section")?
        .strip_suffix(".xml")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

impl Container {
    /// Open an HWPX file
    ///
    /// # Parameters
    /// * `path` - Path to the `.hwpx` file
    ///
    /// # Returns
    /// * `Ok(Container)` - The archive with every body section parsed
    /// * `Err(ArchiveError)` - The file cannot be read, is not a zip archive, lacks
    ///   the `mimetype` marker or `Contents/section0.xml`, or a section is malformed
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ArchiveError> {
        let path = path.as_ref();
        let raw = fs::read(path).map_err(|e| ArchiveError::io(path, e))?;
        Self::from_bytes(path, raw)
    }

    /// Build a container from archive bytes already in memory
    ///
    /// `path` becomes the default destination of [`Container::save`].
    pub fn from_bytes<P: AsRef<Path>>(path: P, raw: Vec<u8>) -> Result<Self, ArchiveError> {
        let path = path.as_ref().to_path_buf();
        let mut archive = ZipArchive::new(Cursor::new(raw.as_slice()))?;

        let mut entries = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let file = archive.by_index_raw(index)?;
            entries.push(ArchiveEntry {
                name: file.name().to_string(),
                compression: file.compression(),
                size: file.size(),
                is_dir: file.is_dir(),
            });
        }

        if !entries.iter().any(|e| e.name == MARKER_ENTRY) {
            return Err(ArchiveError::MissingMarker(path));
        }
        if !entries.iter().any(|e| e.name == MAIN_SECTION) {
            return Err(ArchiveError::MissingPart(MAIN_SECTION.to_string()));
        }

        let mut section_names: Vec<(u32, String)> = entries
            .iter()
            .filter_map(|e| section_number(&e.name).map(|n| (n, e.name.clone())))
            .collect();
        section_names.sort();

        let mut sections = Vec::with_capacity(section_names.len());
        for (_, name) in section_names {
            let bytes = read_entry(&mut archive, &name)?;
            let document = XmlDocument::parse(&bytes).map_err(|source| ArchiveError::Xml {
                part: name.clone(),
                source,
            })?;
            sections.push(SectionPart {
                name,
                document,
                dirty: false,
            });
        }

        drop(archive);

        log::info!(
            "Opened {} ({} entries, {} sections)",
            path.display(),
            entries.len(),
            sections.len()
        );

        Ok(Self {
            path,
            raw,
            entries,
            sections,
            replaced: BTreeMap::new(),
        })
    }

    /// Path the container was opened from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Entries in archive order
    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    pub fn entry(&self, name: &str) -> Option<&ArchiveEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Body sections in section-number order
    pub fn sections(&self) -> &[SectionPart] {
        &self.sections
    }

    /// Current bytes of a part, reflecting in-memory edits
    pub fn part_bytes(&self, name: &str) -> Result<Vec<u8>, ArchiveError> {
        if let Some(bytes) = self.replaced.get(name) {
            return Ok(bytes.clone());
        }
        if let Some(section) = self.sections.iter().find(|s| s.name == name) {
            return section.document.to_bytes().map_err(|source| ArchiveError::Xml {
                part: name.to_string(),
                source,
            });
        }
        let mut archive = self.reader()?;
        read_entry(&mut archive, name)
    }

    /// Parse any XML part into a detached tree
    pub fn parse_part(&self, name: &str) -> Result<XmlDocument, ArchiveError> {
        let bytes = self.part_bytes(name)?;
        XmlDocument::parse(&bytes).map_err(|source| ArchiveError::Xml {
            part: name.to_string(),
            source,
        })
    }

    /// Replace the content of an existing, non-section part
    ///
    /// The entry keeps its position and compression method.
    pub fn replace_part(&mut self, name: &str, bytes: Vec<u8>) -> Result<(), ArchiveError> {
        if self.entry(name).is_none() || section_number(name).is_some() {
            return Err(ArchiveError::MissingPart(name.to_string()));
        }
        self.replaced.insert(name.to_string(), bytes);
        Ok(())
    }

    /// Whether any part differs from the bytes that were opened
    pub fn is_modified(&self) -> bool {
        !self.replaced.is_empty() || self.sections.iter().any(|s| s.dirty)
    }

    /// Every `hp:tbl` in document order, nested tables included
    pub fn tables(&self) -> Vec<&Element> {
        self.sections
            .iter()
            .flat_map(|s| query::find_all(s.document.root(), names::TBL))
            .collect()
    }

    pub fn table_count(&self) -> usize {
        self.sections
            .iter()
            .map(|s| s.document.root().descendant_paths(names::TBL).len())
            .sum()
    }

    /// The `index`-th table, or `None` when out of range
    pub fn table(&self, index: usize) -> Option<&Element> {
        self.tables().into_iter().nth(index)
    }

    /// Editor over the `index`-th table, or `None` when out of range
    pub fn table_editor(&mut self, index: usize) -> Option<TableEditor<'_>> {
        let mut remaining = index;
        for part in &mut self.sections {
            let mut paths = part.document.root().descendant_paths(names::TBL);
            if remaining < paths.len() {
                let path = paths.swap_remove(remaining);
                return Some(TableEditor::new(part, path));
            }
            remaining -= paths.len();
        }
        None
    }

    /// Switch the print layout in `settings.xml` from two pages per sheet to one
    ///
    /// # Returns
    /// * `Ok(true)` - The setting was rewritten
    /// * `Ok(false)` - No `settings.xml`, or the setting was already single-page
    pub fn fix_print_method(&mut self) -> Result<bool, ArchiveError> {
        if self.entry(SETTINGS_PART).is_none() {
            log::debug!("No {} in {}", SETTINGS_PART, self.path.display());
            return Ok(false);
        }
        let bytes = self.part_bytes(SETTINGS_PART)?;
        let Ok(text) = String::from_utf8(bytes) else {
            log::warn!("{} is not valid UTF-8, leaving it unchanged", SETTINGS_PART);
            return Ok(false);
        };
        if !text.contains(PRINT_METHOD_PAGES_PER_SHEET) {
            return Ok(false);
        }
        let fixed = text.replace(PRINT_METHOD_PAGES_PER_SHEET, PRINT_METHOD_SINGLE_PAGE);
        self.replaced
            .insert(SETTINGS_PART.to_string(), fixed.into_bytes());
        log::info!("Set PrintMethod to single page in {}", self.path.display());
        Ok(true)
    }

    /// Write the container to `path`, or back to where it was opened from
    ///
    /// # Returns
    /// * `Ok(())` - The destination now holds the new archive
    /// * `Err(ArchiveError)` - Nothing was replaced; the destination is unchanged
    pub fn save(&self, path: Option<&Path>) -> Result<(), ArchiveError> {
        let target = path.unwrap_or(&self.path);
        if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ArchiveError::io(parent, e))?;
        }

        let tmp = temp_path_for(target);
        let result = self
            .write_archive(&tmp)
            .and_then(|()| fs::rename(&tmp, target).map_err(|e| ArchiveError::io(target, e)));

        if result.is_err() && tmp.exists() {
            if let Err(e) = fs::remove_file(&tmp) {
                log::warn!("Failed to remove {}: {}", tmp.display(), e);
            }
        }
        result?;

        log::info!("Saved {}", target.display());
        Ok(())
    }

    fn reader(&self) -> Result<ZipArchive<Cursor<&[u8]>>, ArchiveError> {
        Ok(ZipArchive::new(Cursor::new(self.raw.as_slice()))?)
    }

    /// New content for an entry, if it has to be re-encoded
    fn pending_content(&self, name: &str) -> Result<Option<Vec<u8>>, ArchiveError> {
        if let Some(bytes) = self.replaced.get(name) {
            return Ok(Some(bytes.clone()));
        }
        match self.sections.iter().find(|s| s.name == name && s.dirty) {
            Some(section) => section
                .document
                .to_bytes()
                .map(Some)
                .map_err(|source| ArchiveError::Xml {
                    part: name.to_string(),
                    source,
                }),
            None => Ok(None),
        }
    }

    fn write_archive(&self, tmp: &Path) -> Result<(), ArchiveError> {
        let file = File::create(tmp).map_err(|e| ArchiveError::io(tmp, e))?;
        let mut writer = ZipWriter::new(BufWriter::new(file));
        let mut archive = self.reader()?;

        for (index, entry) in self.entries.iter().enumerate() {
            if entry.name == MARKER_ENTRY {
                let mut content = Vec::new();
                archive
                    .by_index(index)?
                    .read_to_end(&mut content)
                    .map_err(|e| ArchiveError::io(tmp, e))?;
                let options =
                    SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
                writer.start_file(entry.name.as_str(), options)?;
                writer.write_all(&content).map_err(|e| ArchiveError::io(tmp, e))?;
            } else if let Some(content) = self.pending_content(&entry.name)? {
                let options = SimpleFileOptions::default().compression_method(entry.compression);
                writer.start_file(entry.name.as_str(), options)?;
                writer.write_all(&content).map_err(|e| ArchiveError::io(tmp, e))?;
            } else {
                writer.raw_copy_file(archive.by_index_raw(index)?)?;
            }
        }

        let file = writer
            .finish()?
            .into_inner()
            .map_err(|e| ArchiveError::io(tmp, e.into_error()))?;
        file.sync_all().map_err(|e| ArchiveError::io(tmp, e))?;
        Ok(())
    }
}

fn read_entry(
    archive: &mut ZipArchive<Cursor<&[u8]>>,
    name: &str,
) -> Result<Vec<u8>, ArchiveError> {
    let mut file = archive.by_name(name).map_err(|e| match e {
        zip::result::ZipError::FileNotFound => ArchiveError::MissingPart(name.to_string()),
        other => ArchiveError::Zip(other),
    })?;
    let mut content = Vec::new();
    file.read_to_end(&mut content)
        .map_err(|e| ArchiveError::io(Path::new(name), e))?;
    Ok(content)
}

/// `out.hwpx` -> `out.hwpx.tmp`, in the same directory so the rename stays on one filesystem
fn temp_path_for(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    target.with_file_name(name)
}
