//! Validate command - fill defaults and assign tokens

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use redact_engine::{export_csv, validate_file};

use super::Context;

pub fn handle(
    ctx: &Context,
    input: &Path,
    out: &Path,
    mapping: Option<PathBuf>,
    export: Option<&Path>,
) -> Result<()> {
    let mapping = ctx.mapping_path(mapping);

    let doc = validate_file(input, out, &mapping)
        .with_context(|| format!("Failed to validate {}", input.display()))?;

    let flagged = doc.items.iter().filter(|i| i.apply).count();
    println!(
        "✓ {} candidates validated ({} to apply): {}",
        doc.items.len(),
        flagged,
        out.display()
    );
    println!("  Token map: {}", mapping.display());

    if let Some(export) = export {
        export_csv(export, &doc)
            .with_context(|| format!("Failed to export {}", export.display()))?;
        println!("  Review table: {}", export.display());
    }

    Ok(())
}
