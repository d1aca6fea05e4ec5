//! Command-line interface definitions for hwpxkit

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// What the extract command dumps
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum ExtractKind {
    /// Cover fields plus section outline
    #[default]
    Structure,
    /// Cover table fields only
    Cover,
    /// Section outline only
    Sections,
    /// Fonts, character/paragraph properties, border fills and styles
    Styles,
    /// Every table with all of its cells
    Tables,
    /// One summary line per table
    ListTables,
}

/// CLI structure for the hwpxkit application
#[derive(Parser)]
#[command(name = "hwpxkit")]
#[command(version)]
#[command(about = "HWPX template extraction and filling toolkit", long_about = None)]
pub struct Cli {
    /// Log progress (RUST_LOG still applies when unset)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for hwpxkit
#[derive(Subcommand)]
pub enum Commands {
    /// Dump document structure as JSON
    Extract {
        /// HWPX document to read
        hwpx: PathBuf,

        /// What to extract
        #[arg(short, long, value_enum, default_value = "structure")]
        kind: ExtractKind,

        /// Cover layout file (.json or .toml) overriding the built-in layout
        #[arg(long, value_name = "FILE")]
        cover_layout: Option<PathBuf>,

        /// Write JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Fill the cover table from JSON input data
    Fill {
        /// HWPX document to fill
        hwpx: PathBuf,

        /// JSON input data
        #[arg(short, long, value_name = "FILE")]
        data: PathBuf,

        /// Directory holding template.json and field_map.json
        #[arg(short, long, value_name = "DIR")]
        template_dir: PathBuf,

        /// Output document (defaults to overwriting the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Draft template.json and field_map.json for a new blank template
    InitConfig {
        /// Blank HWPX template to analyse
        hwpx: PathBuf,

        /// Directory to write the configuration files to
        #[arg(short, long, value_name = "DIR")]
        output: PathBuf,
    },

    /// Switch the print method to single page
    FixPrint {
        /// HWPX document to fix
        hwpx: PathBuf,

        /// Output document (defaults to overwriting the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate a document from a template and input data
    Generate {
        /// Blank HWPX template
        #[arg(long, value_name = "HWPX")]
        template: PathBuf,

        /// JSON input data; without it the template is only prepared for printing
        #[arg(short, long, value_name = "FILE")]
        data: Option<PathBuf>,

        /// Directory holding template.json and field_map.json (defaults to the template's directory)
        #[arg(short, long, value_name = "DIR")]
        template_dir: Option<PathBuf>,

        /// Output directory
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// Automation engine program for text replacement and PDF export
        #[arg(long, value_name = "PROGRAM")]
        engine: Option<PathBuf>,

        /// Extra argument passed to the engine before the job file (repeatable)
        #[arg(long = "engine-arg", value_name = "ARG", allow_hyphen_values = true)]
        engine_args: Vec<String>,

        /// Engine timeout in seconds
        #[arg(long, default_value_t = 300)]
        timeout: u64,

        /// Skip PDF export
        #[arg(long)]
        no_pdf: bool,

        /// Pass Windows paths to the engine (WSL to Windows)
        #[arg(long)]
        translate_paths: bool,
    },
}
