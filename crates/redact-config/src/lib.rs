use redact_core::EntityKind;
use redact_detect::{AddressRules, DetectorSettings, PersonRules, PhoneRules, ScoringProfile};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ============================================================================
// Global Config (<config dir>/config.toml)
// ============================================================================

/// Detection and I/O settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Entity kinds from highest to lowest priority
    #[serde(default = "default_priority")]
    pub priority: Vec<EntityKind>,

    #[serde(default)]
    pub morphology: MorphologyKind,

    /// Text encoding of input documents
    #[serde(default = "default_encoding")]
    pub encoding: String,

    #[serde(default)]
    pub scoring: ScoringProfile,

    #[serde(default)]
    pub address: AddressRules,

    #[serde(default)]
    pub person: PersonRules,

    #[serde(default)]
    pub phone: PhoneRules,
}

/// Which morphology provider detection uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MorphologyKind {
    /// Accept every token
    Permissive,
    /// Built-in word lists and suffix rules
    #[default]
    Lexicon,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            priority: default_priority(),
            scoring: ScoringProfile::default(),
            address: AddressRules::default(),
            person: PersonRules::default(),
            phone: PhoneRules::default(),
            morphology: MorphologyKind::default(),
            encoding: default_encoding(),
        }
    }
}

fn default_priority() -> Vec<EntityKind> {
    EntityKind::ALL.to_vec()
}

fn default_encoding() -> String {
    "utf-8".to_string()
}

fn default_mapping() -> PathBuf {
    PathBuf::from("mapping.json")
}

impl Config {
    /// Load config from default location or create default if not found
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_path();

        if path.exists() {
            Self::load_from(&path)
        } else {
            let config = Config::default();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let content = toml::to_string_pretty(&config)?;
            std::fs::write(&path, content)?;
            Ok(config)
        }
    }

    /// Load config from an explicit path
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Get config file path
    pub fn config_path() -> PathBuf {
        if let Some(dirs) = directories::ProjectDirs::from("com", "redact", "redact") {
            dirs.config_dir().join("config.toml")
        } else {
            PathBuf::from("~/.redact/config.toml")
        }
    }

    /// Settings for the detection pipeline
    pub fn detector_settings(&self) -> DetectorSettings {
        DetectorSettings {
            priority: self.priority.clone(),
            scoring: self.scoring,
            address: self.address.clone(),
            person: self.person.clone(),
            phone: self.phone.clone(),
        }
    }
}

// ============================================================================
// Project Config (redact.toml)
// ============================================================================

/// Project-level configuration (redact.toml)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ProjectConfig {
    #[serde(default)]
    pub project: ProjectSettings,

    /// Replaces the global settings when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detection: Option<Config>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSettings {
    /// Token map shared by every document in the project, relative to the
    /// project root
    #[serde(default = "default_mapping")]
    pub mapping: PathBuf,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            mapping: default_mapping(),
        }
    }
}

impl ProjectConfig {
    pub const FILE_NAME: &'static str = "redact.toml";

    /// Find and load redact.toml from current or parent directories
    pub fn find_and_load() -> anyhow::Result<Option<(PathBuf, Self)>> {
        if let Some(path) = Self::find_project_root()? {
            let config = Self::load(&path)?;
            Ok(Some((path, config)))
        } else {
            Ok(None)
        }
    }

    /// Find redact.toml by walking up from current directory
    pub fn find_project_root() -> anyhow::Result<Option<PathBuf>> {
        let current = std::env::current_dir()?;
        Self::find_project_root_from(&current)
    }

    /// Find redact.toml by walking up from given directory
    pub fn find_project_root_from(start: &Path) -> anyhow::Result<Option<PathBuf>> {
        let mut current = start.to_path_buf();

        loop {
            if current.join(Self::FILE_NAME).exists() {
                return Ok(Some(current));
            }

            if !current.pop() {
                break;
            }
        }

        Ok(None)
    }

    /// Load redact.toml from project root
    pub fn load(project_root: &Path) -> anyhow::Result<Self> {
        let path = project_root.join(Self::FILE_NAME);
        let content = std::fs::read_to_string(&path)?;
        let config: ProjectConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save redact.toml to project root
    pub fn save(&self, project_root: &Path) -> anyhow::Result<()> {
        let path = project_root.join(Self::FILE_NAME);
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Absolute token map path for a project rooted at `project_root`
    pub fn mapping_path(&self, project_root: &Path) -> PathBuf {
        if self.project.mapping.is_absolute() {
            self.project.mapping.clone()
        } else {
            project_root.join(&self.project.mapping)
        }
    }

    /// Project settings if given, the global ones otherwise
    pub fn effective(&self, global: Config) -> Config {
        self.detection.clone().unwrap_or(global)
    }
}
