use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "redact")]
#[command(about = "Find and replace personal data in Russian texts", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file to use instead of the global one
    #[arg(long, global = true, env = "REDACT_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create redact.toml in the current directory
    Init {
        /// Token map location, relative to the project root
        #[arg(long)]
        mapping: Option<PathBuf>,
    },

    /// Detect candidates and save them as raw JSON
    Detect {
        /// Text file to scan
        input: PathBuf,

        #[arg(short, long, default_value = "candidates_raw.json")]
        out: PathBuf,

        /// Also write a `;`-separated preview table
        #[arg(short, long)]
        preview: Option<PathBuf>,

        /// Recognizer output (JSON list or JSON lines of entity spans)
        #[arg(long)]
        ner: Option<PathBuf>,

        /// Input encoding (default from config)
        #[arg(long)]
        encoding: Option<String>,
    },

    /// Validate raw candidates (JSON or CSV) and assign tokens
    Validate {
        /// Raw candidates file
        input: PathBuf,

        #[arg(short, long, default_value = "candidates.json")]
        out: PathBuf,

        /// Token map (default from redact.toml, else mapping.json)
        #[arg(long)]
        mapping: Option<PathBuf>,

        /// Export the validated document as a table for review
        #[arg(long)]
        export_csv: Option<PathBuf>,
    },

    /// Apply a candidate document to a text
    Apply {
        /// Text file to rewrite
        text: PathBuf,

        /// Validated candidate document
        candidates: PathBuf,

        #[arg(short, long, default_value = "out.txt")]
        out: PathBuf,

        #[arg(long, default_value = "report.json")]
        report: PathBuf,

        /// Input encoding (default from config)
        #[arg(long)]
        encoding: Option<String>,
    },

    /// Show token assignments
    Tokens {
        /// Token map (default from redact.toml, else mapping.json)
        #[arg(long)]
        mapping: Option<PathBuf>,

        /// Only this entity type (SNILS, PHONE, ADDR, PER)
        #[arg(long = "type")]
        typ: Option<String>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}
