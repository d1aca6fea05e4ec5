//! Template-driven document generation
//!
//! Generation runs in stages over a copy of the template:
//! 1. **Fill**: project input data onto the cover table through the field map
//! 2. **Print fix**: force single-page printing in `settings.xml`
//! 3. **Engine**: hand text replacements and PDF export to an automation engine
//!
//! The template itself is never written. A failed fill falls back to the
//! untouched copy and is reported as a warning; an engine failure aborts.

use crate::archive::{ArchiveError, Container};
use crate::automation::{AutomationEngine, AutomationError, EngineJob};
use crate::field_map::{build_cell_data, FieldMap};
use crate::template_config::{build_replacements, ConfigError, TemplateConfig};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name of the generated document inside the output directory
pub const OUTPUT_HWPX: &str = "generated.hwpx";
/// File name of the exported PDF inside the output directory
pub const OUTPUT_PDF: &str = "generated.pdf";

/// Everything [`generate`] needs to know
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    /// Blank template document
    pub template: PathBuf,
    /// JSON input; `None` only copies, fixes and exports the template
    pub data: Option<PathBuf>,
    /// Directory with `template.json` and `field_map.json`; defaults to the
    /// template's own directory
    pub template_dir: Option<PathBuf>,
    pub output_dir: PathBuf,
    /// Ask the engine for a PDF as well
    pub pdf: bool,
}

impl GenerateRequest {
    pub fn config_dir(&self) -> PathBuf {
        self.template_dir.clone().unwrap_or_else(|| {
            self.template
                .parent()
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
        })
    }
}

/// Cells requested by the field map versus cells actually written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FillOutcome {
    pub requested: usize,
    pub filled: usize,
}

/// What [`generate`] produced
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenerationReport {
    pub output_hwpx: PathBuf,
    /// Set only when the engine exported a PDF
    pub output_pdf: Option<PathBuf>,
    pub fill: Option<FillOutcome>,
    pub print_fixed: bool,
    /// Replacement pairs built from the input data
    pub replacements: usize,
    pub replacements_applied: bool,
    /// Degraded but non-fatal outcomes, in the order they happened
    pub warnings: Vec<String>,
}

impl GenerationReport {
    fn warn(&mut self, message: String) {
        log::warn!("{}", message);
        self.warnings.push(message);
    }
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("IO error on {path}: {source}", path = .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid input data in {path}: {source}", path = .path.display())]
    Data {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Automation(#[from] AutomationError),
}

/// Read a JSON input file
pub fn load_data(path: &Path) -> Result<Value, PipelineError> {
    let text = fs::read_to_string(path).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| PipelineError::Data {
        path: path.to_path_buf(),
        source,
    })
}

/// Fill the cover table of `input` from `data` and save the result to `output`
///
/// The cover table is `cover_table_index` of the template configuration. The
/// output is written even when nothing could be filled.
///
/// # Returns
/// * `Ok(FillOutcome)` - `filled < requested` when some addresses are not in the table
/// * `Err(PipelineError)` - Missing field map, bad table index, or unreadable document
pub fn fill_cover(
    input: &Path,
    output: &Path,
    data: &Value,
    template_dir: &Path,
) -> Result<FillOutcome, PipelineError> {
    let config = TemplateConfig::load_from_dir(template_dir)?;
    let field_map = FieldMap::load_from_dir(template_dir)?;
    let cells = build_cell_data(data, &field_map);

    let mut container = Container::open(input)?;
    let table_count = container.table_count();
    let mut editor = container
        .table_editor(config.cover_table_index)
        .ok_or(ConfigError::TableIndexOutOfRange {
            index: config.cover_table_index,
            count: table_count,
        })?;
    let filled = editor.fill_cells(&cells);
    container.save(Some(output))?;

    log::info!("Filled {}/{} cells", filled, cells.len());
    Ok(FillOutcome {
        requested: cells.len(),
        filled,
    })
}

fn copy_file(from: &Path, to: &Path) -> Result<(), PipelineError> {
    fs::copy(from, to).map(drop).map_err(|source| PipelineError::Io {
        path: to.to_path_buf(),
        source,
    })
}

/// Rewrite the print method in place; returns whether anything changed
fn fix_print(path: &Path) -> Result<bool, PipelineError> {
    let mut container = Container::open(path)?;
    let fixed = container.fix_print_method()?;
    if fixed {
        container.save(None)?;
    }
    Ok(fixed)
}

/// Generate a document from a template
///
/// # Parameters
/// * `request` - Template, input data and output location
/// * `engine` - Automation engine for text replacement and PDF export; without one
///   those steps are skipped and listed in the report's warnings
///
/// # Returns
/// * `Ok(GenerationReport)` - `generated.hwpx` exists in the output directory
/// * `Err(PipelineError)` - Template, input or output unusable, or the engine failed
pub fn generate(
    request: &GenerateRequest,
    engine: Option<&dyn AutomationEngine>,
) -> Result<GenerationReport, PipelineError> {
    fs::create_dir_all(&request.output_dir).map_err(|source| PipelineError::Io {
        path: request.output_dir.clone(),
        source,
    })?;
    let output_hwpx = request.output_dir.join(OUTPUT_HWPX);
    let output_pdf = request.output_dir.join(OUTPUT_PDF);

    let mut report = GenerationReport {
        output_hwpx: output_hwpx.clone(),
        ..GenerationReport::default()
    };

    copy_file(&request.template, &output_hwpx)?;

    let mut pairs = Vec::new();
    if let Some(data_path) = &request.data {
        let data = load_data(data_path)?;
        let template_dir = request.config_dir();
        let config = TemplateConfig::load_from_dir(&template_dir)?;

        // Stage 1: fill the cover table, falling back to the plain copy
        match fill_cover(&output_hwpx, &output_hwpx, &data, &template_dir) {
            Ok(outcome) => {
                if outcome.filled < outcome.requested {
                    report.warn(format!(
                        "Only {} of {} cells were found in the cover table",
                        outcome.filled, outcome.requested
                    ));
                }
                report.fill = Some(outcome);
            }
            Err(e) => {
                report.warn(format!("Cell fill failed, using the unfilled template: {}", e));
                copy_file(&request.template, &output_hwpx)?;
            }
        }

        pairs = build_replacements(&data, &config);
        report.replacements = pairs.len();
    }

    // Stage 2
    report.print_fixed = fix_print(&output_hwpx)?;

    // Stage 3
    let wants_engine = !pairs.is_empty() || request.pdf;
    match engine {
        Some(engine) if wants_engine => {
            let has_replacements = !pairs.is_empty();
            let mut job = EngineJob::new(&output_hwpx).with_replacements(pairs);
            if has_replacements {
                job = job.save_hwpx(&output_hwpx);
            }
            if request.pdf {
                job = job.save_pdf(&output_pdf);
            }
            engine.execute(&job)?;

            report.replacements_applied = has_replacements;
            if has_replacements {
                // The engine saves with its own print settings
                fix_print(&output_hwpx)?;
            }
            if request.pdf {
                if output_pdf.is_file() {
                    report.output_pdf = Some(output_pdf);
                } else {
                    report.warn(format!("Engine did not write {}", output_pdf.display()));
                }
            }
        }
        Some(_) => log::info!("Nothing for the automation engine to do"),
        None => {
            if !pairs.is_empty() {
                report.warn(format!(
                    "{} text replacements skipped: no automation engine",
                    pairs.len()
                ));
            }
            if request.pdf {
                report.warn("PDF export skipped: no automation engine".to_string());
            }
        }
    }

    log::info!("Generated {}", output_hwpx.display());
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_dir_defaults_to_template_dir() {
        let request = GenerateRequest {
            template: PathBuf::from("templates/cloud/blank.hwpx"),
            data: None,
            template_dir: None,
            output_dir: PathBuf::from("out"),
            pdf: false,
        };
        assert_eq!(request.config_dir(), PathBuf::from("templates/cloud"));

        let explicit = GenerateRequest {
            template_dir: Some(PathBuf::from("configs")),
            ..request
        };
        assert_eq!(explicit.config_dir(), PathBuf::from("configs"));
    }

    #[test]
    fn test_load_data_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(load_data(&missing), Err(PipelineError::Io { .. })));

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{ not json").unwrap();
        assert!(matches!(load_data(&broken), Err(PipelineError::Data { .. })));

        let good = dir.path().join("input.json");
        fs::write(&good, r#"{"사업명": "클라우드"}"#).unwrap();
        assert_eq!(load_data(&good).unwrap()["사업명"], "클라우드");
    }
}
