//! hwpxkit - HWPX template extraction and filling toolkit
//!
//! A CLI tool for reading HWPX document structure, filling template tables
//! from JSON data and preparing documents for printing.

#![deny(unsafe_code)]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::all))]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::pedantic))]
// Allow some pedantic lints that are too strict for this project
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::needless_pass_by_value)]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, ExtractKind};
use hwpxkit::automation::{AutomationEngine, CommandEngine};
use hwpxkit::extract::cover::CoverLayout;
use hwpxkit::pipeline::{self, GenerateRequest};
use hwpxkit::Container;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main entry point for the hwpxkit CLI application
fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:?}", e);
        std::process::exit(1);
    }
}

/// Run the CLI application
fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut logger = env_logger::Builder::from_default_env();
    if cli.verbose {
        logger.filter_level(log::LevelFilter::Info);
    }
    logger.init();

    match cli.command {
        Commands::Extract {
            hwpx,
            kind,
            cover_layout,
            output,
        } => {
            handle_extract_command(hwpx, kind, cover_layout, output)?;
        }

        Commands::Fill {
            hwpx,
            data,
            template_dir,
            output,
        } => {
            handle_fill_command(hwpx, data, template_dir, output)?;
        }

        Commands::InitConfig { hwpx, output } => {
            handle_init_config_command(hwpx, output)?;
        }

        Commands::FixPrint { hwpx, output } => {
            handle_fix_print_command(hwpx, output)?;
        }

        Commands::Generate {
            template,
            data,
            template_dir,
            output,
            engine,
            engine_args,
            timeout,
            no_pdf,
            translate_paths,
        } => {
            let engine = engine.map(|program| CommandEngine {
                program,
                args: engine_args,
                timeout: Duration::from_secs(timeout),
                translate_paths,
            });
            let request = GenerateRequest {
                template,
                data,
                template_dir,
                output_dir: output,
                pdf: !no_pdf,
            };
            handle_generate_command(&request, engine.as_ref())?;
        }
    }

    Ok(())
}

/// Pretty JSON to a file, or to stdout without one
fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to encode JSON")?;
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory {}", parent.display()))?;
            }
            std::fs::write(path, json + "\n")
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("✓ Wrote {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

/// Handle the extract command
fn handle_extract_command(
    hwpx: PathBuf,
    kind: ExtractKind,
    cover_layout: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<()> {
    let layout = match &cover_layout {
        Some(path) => CoverLayout::load(path)
            .with_context(|| format!("Failed to load cover layout {}", path.display()))?,
        None => CoverLayout::default(),
    };
    let context = || format!("Failed to extract from {}", hwpx.display());
    let output = output.as_deref();

    match kind {
        ExtractKind::Structure => {
            write_json(&hwpxkit::extract_structure(&hwpx, &layout).with_context(context)?, output)
        }
        ExtractKind::Cover => {
            write_json(&hwpxkit::extract_cover(&hwpx, &layout).with_context(context)?, output)
        }
        ExtractKind::Sections => {
            write_json(&hwpxkit::extract_sections(&hwpx).with_context(context)?, output)
        }
        ExtractKind::Styles => {
            write_json(&hwpxkit::extract_styles(&hwpx).with_context(context)?, output)
        }
        ExtractKind::Tables => {
            write_json(&hwpxkit::extract_tables(&hwpx).with_context(context)?, output)
        }
        ExtractKind::ListTables => {
            let summaries = hwpxkit::list_tables(&hwpx).with_context(context)?;
            if output.is_some() {
                return write_json(&summaries, output);
            }
            println!("{} tables in {}", summaries.len(), hwpx.display());
            for table in &summaries {
                println!(
                    "  [{}] {}x{}  {}x{}  {}",
                    table.index,
                    table.row_count,
                    table.col_count,
                    table.width,
                    table.height,
                    table.preview
                );
            }
            Ok(())
        }
    }
}

/// Handle the fill command
fn handle_fill_command(
    hwpx: PathBuf,
    data: PathBuf,
    template_dir: PathBuf,
    output: Option<PathBuf>,
) -> Result<()> {
    let output = output.unwrap_or_else(|| hwpx.clone());
    let input = pipeline::load_data(&data)
        .with_context(|| format!("Failed to load input data {}", data.display()))?;

    println!("Filling {}...", hwpx.display());
    let outcome = pipeline::fill_cover(&hwpx, &output, &input, &template_dir)
        .with_context(|| format!("Failed to fill {}", hwpx.display()))?;

    println!("✓ Filled {}/{} cells", outcome.filled, outcome.requested);
    if outcome.filled < outcome.requested {
        println!(
            "  {} addresses were not found in the cover table; check the field map",
            outcome.requested - outcome.filled
        );
    }
    println!("✓ Saved {}", output.display());
    Ok(())
}

/// Handle the init-config command
fn handle_init_config_command(hwpx: PathBuf, output: PathBuf) -> Result<()> {
    println!("Analysing {}...", hwpx.display());
    let report = hwpxkit::generate_template_config(&hwpx, &output)
        .with_context(|| format!("Failed to generate configuration for {}", hwpx.display()))?;

    println!("✓ Tables: {}", report.total_tables);
    println!(
        "✓ Cover table: #{} ({})",
        report.cover_table_index, report.cover_table_size
    );
    println!("✓ Empty cells: {}", report.empty_cells_found);
    println!("✓ Wrote {}", report.template_json.display());
    println!("✓ Wrote {}", report.field_map_json.display());
    println!();
    println!("These files are a draft. Review the field names and rows before use.");
    Ok(())
}

/// Handle the fix-print command
fn handle_fix_print_command(hwpx: PathBuf, output: Option<PathBuf>) -> Result<()> {
    let mut container =
        Container::open(&hwpx).with_context(|| format!("Failed to open {}", hwpx.display()))?;
    let changed = container
        .fix_print_method()
        .with_context(|| format!("Failed to read print settings of {}", hwpx.display()))?;

    match (&output, changed) {
        (None, false) => {
            println!("Print method already single page, nothing to do");
            return Ok(());
        }
        (_, true) => println!("✓ Print method set to single page"),
        (Some(_), false) => println!("Print method already single page"),
    }

    let target = output.as_deref().unwrap_or(hwpx.as_path());
    container
        .save(Some(target))
        .with_context(|| format!("Failed to save {}", target.display()))?;
    println!("✓ Saved {}", target.display());
    Ok(())
}

/// Handle the generate command
fn handle_generate_command(request: &GenerateRequest, engine: Option<&CommandEngine>) -> Result<()> {
    println!("Generating from {}...", request.template.display());
    if engine.is_none() {
        println!("No --engine given: text replacement and PDF export are skipped");
    }

    let report = pipeline::generate(request, engine.map(|e| e as &dyn AutomationEngine))
        .with_context(|| format!("Failed to generate from {}", request.template.display()))?;

    if let Some(fill) = report.fill {
        println!("✓ Cells: {}/{}", fill.filled, fill.requested);
    }
    if report.print_fixed {
        println!("✓ Print method set to single page");
    }
    if report.replacements_applied {
        println!("✓ Replacements: {}", report.replacements);
    }
    println!("✓ HWPX: {}", report.output_hwpx.display());
    if let Some(pdf) = &report.output_pdf {
        println!("✓ PDF: {}", pdf.display());
    }
    for warning in &report.warnings {
        println!("  warning: {}", warning);
    }
    Ok(())
}
