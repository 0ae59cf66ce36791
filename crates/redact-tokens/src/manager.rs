//! Token manager backed by a JSON map file

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use redact_core::{EntityKind, Error, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// On-disk shape of the token map
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMapFile {
    /// kind label -> normalized key -> token
    #[serde(default)]
    pub tokens: BTreeMap<String, BTreeMap<String, String>>,
    /// kind label -> last index handed out
    #[serde(default)]
    pub counters: BTreeMap<String, u32>,
}

/// Normalize a lookup key: trim, lower-case, collapse inner whitespace
pub fn normalize_key(key: &str) -> String {
    key.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn format_token(kind: EntityKind, index: u32) -> String {
    format!("[{}_{:03}]", kind.label(), index)
}

/// Index embedded in a token like `[PER_007]`, if it belongs to `kind`
fn token_index(kind: EntityKind, token: &str) -> Option<u32> {
    let digits = token
        .strip_prefix('[')?
        .strip_suffix(']')?
        .strip_prefix(kind.label())?
        .strip_prefix('_')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Assigns each distinct (kind, key) a stable, never reused token.
///
/// The whole map is rewritten on every new assignment. Single writer per
/// map file is assumed; there is no locking.
#[derive(Debug, Clone)]
pub struct TokenManager {
    path: PathBuf,
    map: TokenMapFile,
}

impl TokenManager {
    /// Open the map at `path`, loading it if the file exists
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut map = if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| Error::TokenMap {
                path: path.clone(),
                message: e.to_string(),
            })?;
            serde_json::from_str::<TokenMapFile>(&content).map_err(|e| Error::TokenMap {
                path: path.clone(),
                message: e.to_string(),
            })?
        } else {
            TokenMapFile::default()
        };

        // Counters never fall below what the stored tokens already use
        for kind in EntityKind::ALL {
            let label = kind.label().to_string();
            let issued = map.tokens.entry(label.clone()).or_default();
            let max_index = issued
                .values()
                .filter_map(|t| token_index(kind, t))
                .max()
                .unwrap_or(0);
            let counter = map.counters.entry(label).or_insert(0);
            *counter = (*counter).max(max_index);
        }

        debug!("Opened token map {:?}", path);
        Ok(Self { path, map })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Token for (kind, key), minting and persisting a new one if absent.
    ///
    /// A mint whose save fails is undone, so memory never holds a token
    /// the file does not.
    pub fn get(&mut self, kind: EntityKind, key: &str) -> Result<String> {
        if let Some(token) = self.lookup(kind, key) {
            return Ok(token.to_string());
        }

        let token = self.mint(kind, key);
        if let Err(e) = self.save() {
            self.unmint(kind, key);
            return Err(e);
        }

        debug!("Minted {}", token);
        Ok(token)
    }

    /// Token for (kind, key), assigning a new one in memory only. Call
    /// [`save`](Self::save) to persist.
    pub fn mint(&mut self, kind: EntityKind, key: &str) -> String {
        let label = kind.label();
        let key = normalize_key(key);

        if let Some(token) = self.map.tokens.get(label).and_then(|m| m.get(&key)) {
            return token.clone();
        }

        let counter = self.map.counters.entry(label.to_string()).or_insert(0);
        *counter += 1;
        let token = format_token(kind, *counter);

        self.map
            .tokens
            .entry(label.to_string())
            .or_default()
            .insert(key, token.clone());
        token
    }

    /// Drop the assignment just made by [`mint`](Self::mint)
    fn unmint(&mut self, kind: EntityKind, key: &str) {
        let label = kind.label();
        if let Some(assigned) = self.map.tokens.get_mut(label) {
            assigned.remove(&normalize_key(key));
        }
        if let Some(counter) = self.map.counters.get_mut(label) {
            *counter = counter.saturating_sub(1);
        }
    }

    /// Like [`get`](Self::get), with the kind given as a label
    pub fn get_by_label(&mut self, typ: &str, key: &str) -> Result<String> {
        let kind: EntityKind = typ.parse()?;
        self.get(kind, key)
    }

    /// Read-only lookup; never mints
    pub fn lookup(&self, kind: EntityKind, key: &str) -> Option<&str> {
        self.map
            .tokens
            .get(kind.label())
            .and_then(|m| m.get(&normalize_key(key)))
            .map(String::as_str)
    }

    /// Copy of every assignment, by kind label
    pub fn all_items(&self) -> BTreeMap<String, BTreeMap<String, String>> {
        self.map.tokens.clone()
    }

    pub fn counter(&self, kind: EntityKind) -> u32 {
        self.map.counters.get(kind.label()).copied().unwrap_or(0)
    }

    /// Write a complete snapshot, replacing the file atomically
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.map)?;
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "mapping.json".to_string());
        let tmp = self.path.with_file_name(format!(".{}.tmp", file_name));
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
