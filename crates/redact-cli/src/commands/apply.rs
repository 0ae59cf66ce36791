//! Apply command - rewrite a text from a candidate document

use std::path::Path;

use anyhow::{Context as _, Result};
use redact_engine::apply_file;

use super::Context;

pub fn handle(
    ctx: &Context,
    text: &Path,
    candidates: &Path,
    out: &Path,
    report: &Path,
    encoding: Option<String>,
) -> Result<()> {
    let encoding = ctx.encoding(encoding);

    let result = apply_file(
        text,
        candidates,
        out,
        report,
        &encoding,
        &ctx.config.priority,
    )
    .with_context(|| {
        format!(
            "Failed to apply {} to {}",
            candidates.display(),
            text.display()
        )
    })?;

    let counts = result.counts;
    println!(
        "✓ {} of {} candidates applied ({} skipped)",
        counts.applied, counts.total, counts.skipped
    );
    for item in result.items.iter().filter(|i| !i.ok_slice) {
        println!("  Not found: {} {:?}", item.id, item.old);
    }
    println!("  Output: {}", out.display());
    println!("  Report: {}", report.display());

    Ok(())
}
