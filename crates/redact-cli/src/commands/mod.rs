pub mod apply;
pub mod detect;
pub mod init;
pub mod tokens;
pub mod validate;

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use redact_config::{Config, MorphologyKind, ProjectConfig};
use redact_detect::{Detector, JsonRecognizer, LexiconMorphology};
use tracing::debug;

/// Settings every command runs with: the global config, overridden by the
/// enclosing project's redact.toml when there is one
pub struct Context {
    pub config: Config,
    pub project: Option<(PathBuf, ProjectConfig)>,
}

impl Context {
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let global = match config_path {
            Some(path) => Config::load_from(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => Config::load().context("Failed to load global config")?,
        };
        let project = ProjectConfig::find_and_load().context("Failed to load redact.toml")?;

        let config = match &project {
            Some((root, p)) => {
                debug!("Using project at {}", root.display());
                p.effective(global)
            }
            None => global,
        };
        Ok(Self { config, project })
    }

    /// Token map to use: explicit, else the project's, else `mapping.json`
    pub fn mapping_path(&self, explicit: Option<PathBuf>) -> PathBuf {
        if let Some(path) = explicit {
            return path;
        }
        match &self.project {
            Some((root, project)) => project.mapping_path(root),
            None => PathBuf::from("mapping.json"),
        }
    }

    pub fn encoding(&self, explicit: Option<String>) -> String {
        explicit.unwrap_or_else(|| self.config.encoding.clone())
    }

    /// Detector built from the settings, fed by recognizer output if given
    pub fn detector(&self, ner: Option<&Path>) -> Result<Detector> {
        let detector = Detector::new(self.config.detector_settings());
        let detector = match self.config.morphology {
            MorphologyKind::Lexicon => detector.with_morphology(LexiconMorphology::new()),
            MorphologyKind::Permissive => detector,
        };

        match ner {
            Some(path) => {
                let recognizer = JsonRecognizer::from_path(path).with_context(|| {
                    format!("Failed to load recognizer output {}", path.display())
                })?;
                Ok(detector.with_recognizer(recognizer))
            }
            None => Ok(detector),
        }
    }
}
