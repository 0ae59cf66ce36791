use std::path::PathBuf;

use anyhow::Result;
use redact_config::ProjectConfig;

pub fn handle(mapping: Option<PathBuf>) -> Result<()> {
    let current_dir = std::env::current_dir()?;
    let redact_toml = current_dir.join(ProjectConfig::FILE_NAME);

    if redact_toml.exists() {
        anyhow::bail!("redact.toml already exists in current directory");
    }

    let mut project_config = ProjectConfig::default();
    if let Some(mapping) = mapping {
        project_config.project.mapping = mapping;
    }
    project_config.save(&current_dir)?;

    println!("✓ Created redact.toml");
    println!(
        "  Token map: {}",
        project_config.mapping_path(&current_dir).display()
    );
    println!("  Run 'redact detect <file>' to find candidates");

    Ok(())
}
