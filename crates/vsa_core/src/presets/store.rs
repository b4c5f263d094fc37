//! Preset persistence.
//!
//! Presets live in one JSON object keyed by preset name. The store is an
//! explicit value: load it from a path, pass it to whoever needs a style,
//! and every mutation is written back atomically.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::style_config::{StyleConfig, DEFAULT_PRESET_NAME};

#[derive(Error, Debug)]
pub enum PresetError {
    #[error("The '{0}' preset cannot be deleted")]
    ProtectedPreset(String),

    #[error("Preset not found: {0}")]
    NotFound(String),

    #[error("Preset name must not be empty")]
    EmptyName,

    #[error("Failed to save presets to '{path}': {source}")]
    Save {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Named styles backed by a JSON file.
#[derive(Debug, Clone)]
pub struct PresetStore {
    path: PathBuf,
    presets: BTreeMap<String, StyleConfig>,
}

impl PresetStore {
    /// Load presets from `path`.
    ///
    /// A missing file is created with the default preset. An unreadable or
    /// corrupt file yields the default preset only (the file is left as is
    /// until the next save).
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        if !path.exists() {
            let store = Self::with_defaults(path);
            if let Err(e) = store.save() {
                tracing::warn!("{}", e);
            }
            return store;
        }

        let presets = match fs::read_to_string(&path) {
            Ok(content) => match parse_presets(&content) {
                Ok(presets) => {
                    tracing::debug!("Loaded {} presets from {}", presets.len(), path.display());
                    presets
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}", path.display(), e);
                    BTreeMap::new()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", path.display(), e);
                BTreeMap::new()
            }
        };

        let mut store = Self { path, presets };
        store.ensure_default();
        store
    }

    /// Store with only the default preset, not yet written.
    pub fn with_defaults(path: impl Into<PathBuf>) -> Self {
        let mut store = Self {
            path: path.into(),
            presets: BTreeMap::new(),
        };
        store.ensure_default();
        store
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write all presets (temp file + rename).
    pub fn save(&self) -> Result<(), PresetError> {
        let save_err = |source| PresetError::Save {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(save_err)?;
            }
        }

        let json = serde_json::to_string_pretty(&self.presets)
            .map_err(|e| save_err(io::Error::new(io::ErrorKind::Other, e)))?;

        let temp = self.path.with_extension("json.tmp");
        fs::write(&temp, json).map_err(save_err)?;
        fs::rename(&temp, &self.path).map_err(save_err)?;

        tracing::debug!("Saved {} presets to {}", self.presets.len(), self.path.display());
        Ok(())
    }

    pub fn names(&self) -> Vec<&str> {
        self.presets.keys().map(String::as_str).collect()
    }

    pub fn get(&self, name: &str) -> Option<&StyleConfig> {
        self.presets.get(name)
    }

    /// Preset by name, falling back to the default preset.
    pub fn get_or_default(&self, name: &str) -> StyleConfig {
        self.presets
            .get(name)
            .or_else(|| self.presets.get(DEFAULT_PRESET_NAME))
            .cloned()
            .unwrap_or_default()
    }

    /// Add or replace a preset under its own name and persist.
    pub fn upsert(&mut self, style: StyleConfig) -> Result<(), PresetError> {
        if style.name.trim().is_empty() {
            return Err(PresetError::EmptyName);
        }
        self.presets.insert(style.name.clone(), style);
        self.save()
    }

    /// Delete a preset and persist. The default preset is protected.
    pub fn delete(&mut self, name: &str) -> Result<StyleConfig, PresetError> {
        if name == DEFAULT_PRESET_NAME {
            return Err(PresetError::ProtectedPreset(name.to_string()));
        }
        let removed = self
            .presets
            .remove(name)
            .ok_or_else(|| PresetError::NotFound(name.to_string()))?;
        self.save()?;
        Ok(removed)
    }

    fn ensure_default(&mut self) {
        self.presets
            .entry(DEFAULT_PRESET_NAME.to_string())
            .or_insert_with(StyleConfig::default);
    }
}

fn parse_presets(content: &str) -> Result<BTreeMap<String, StyleConfig>, serde_json::Error> {
    let mut presets: BTreeMap<String, StyleConfig> = serde_json::from_str(content)?;
    // the map key is authoritative
    for (name, style) in presets.iter_mut() {
        style.name = name.clone();
    }
    Ok(presets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_is_created_with_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("subtitle_presets.json");

        let store = PresetStore::load(&path);

        assert!(path.exists());
        assert_eq!(store.names(), vec!["Default"]);
        assert_eq!(store.get("Default"), Some(&StyleConfig::default()));
    }

    #[test]
    fn default_preset_cannot_be_deleted() {
        let dir = tempdir().unwrap();
        let mut store = PresetStore::load(dir.path().join("p.json"));

        let err = store.delete("Default").unwrap_err();
        assert!(matches!(err, PresetError::ProtectedPreset(_)));
        assert!(store.get("Default").is_some());
    }

    #[test]
    fn delete_is_persisted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("p.json");
        let mut store = PresetStore::load(&path);
        store.upsert(StyleConfig::named("Bold Yellow")).unwrap();
        store.upsert(StyleConfig::named("Top")).unwrap();

        store.delete("Bold Yellow").unwrap();

        let reloaded = PresetStore::load(&path);
        assert_eq!(reloaded.names(), vec!["Default", "Top"]);
    }

    #[test]
    fn upsert_is_persisted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("p.json");
        let mut store = PresetStore::load(&path);
        let mut style = StyleConfig::named("Top");
        style.alignment = "8".to_string();

        store.upsert(style).unwrap();

        let reloaded = PresetStore::load(&path);
        assert_eq!(reloaded.names(), vec!["Default", "Top"]);
        assert_eq!(reloaded.get("Top").unwrap().alignment, "8");
    }

    #[test]
    fn delete_unknown_is_not_found() {
        let dir = tempdir().unwrap();
        let mut store = PresetStore::load(dir.path().join("p.json"));
        assert!(matches!(
            store.delete("Nope").unwrap_err(),
            PresetError::NotFound(_)
        ));
    }

    #[test]
    fn corrupt_file_loads_default_only() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("p.json");
        fs::write(&path, "{ not json").unwrap();

        let store = PresetStore::load(&path);
        assert_eq!(store.names(), vec!["Default"]);
    }

    #[test]
    fn reads_legacy_file_and_adds_missing_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("p.json");
        fs::write(
            &path,
            r#"{ "Karaoke": { "font": "Impact", "font_size": "60", "alignment": "8", "name": "Karaoke" } }"#,
        )
        .unwrap();

        let store = PresetStore::load(&path);
        assert_eq!(store.names(), vec!["Default", "Karaoke"]);
        assert_eq!(store.get("Karaoke").unwrap().font, "Impact");
        assert_eq!(store.get_or_default("missing").name, "Default");
    }

    #[test]
    fn upsert_rejects_empty_name() {
        let dir = tempdir().unwrap();
        let mut store = PresetStore::load(dir.path().join("p.json"));
        assert!(matches!(
            store.upsert(StyleConfig::named("  ")).unwrap_err(),
            PresetError::EmptyName
        ));
    }
}
