//! Detect command - find candidates in a text file

use std::path::Path;

use anyhow::{Context as _, Result};
use redact_engine::{detect_file, export_raw_csv, save_json_pretty};

use super::Context;

pub fn handle(
    ctx: &Context,
    input: &Path,
    out: &Path,
    preview: Option<&Path>,
    ner: Option<&Path>,
    encoding: Option<String>,
) -> Result<()> {
    let detector = ctx.detector(ner)?;
    let encoding = ctx.encoding(encoding);

    let found = detect_file(input, &detector, &encoding)
        .with_context(|| format!("Failed to detect candidates in {}", input.display()))?;

    save_json_pretty(out, &found)
        .with_context(|| format!("Failed to write {}", out.display()))?;
    println!("✓ {} candidates written to {}", found.len(), out.display());

    if let Some(preview) = preview {
        export_raw_csv(preview, &found)
            .with_context(|| format!("Failed to write {}", preview.display()))?;
        println!("  Preview: {}", preview.display());
    }

    Ok(())
}
