use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::app_dirs::AppDirs;

/// Persisted defaults; command-line flags take precedence.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub stats_dir: Option<PathBuf>,
    /// Fixed seed for practice draws; entropy when unset.
    pub seed: Option<u64>,
    /// Read the exercise corpus from here instead of the built-in one.
    pub catalog_dir: Option<PathBuf>,
}

impl Config {
    /// Overlays values given on the command line.
    pub fn merged(
        &self,
        stats_dir: Option<PathBuf>,
        seed: Option<u64>,
        catalog_dir: Option<PathBuf>,
    ) -> Config {
        Config {
            stats_dir: stats_dir.or_else(|| self.stats_dir.clone()),
            seed: seed.or(self.seed),
            catalog_dir: catalog_dir.or_else(|| self.catalog_dir.clone()),
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            match serde_json::from_slice::<Config>(&bytes) {
                Ok(cfg) => return cfg,
                Err(e) => {
                    warn!(path = %self.path.display(), error = %e, "ignoring malformed config")
                }
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config::default();
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn save_and_load_custom_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config {
            stats_dir: Some(dir.path().join("stats")),
            seed: Some(99),
            catalog_dir: Some(PathBuf::from("corpus")),
        };
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn malformed_config_falls_back_to_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, b"[1, 2").unwrap();
        assert_eq!(FileConfigStore::with_path(&path).load(), Config::default());
    }

    #[test]
    fn flags_override_saved_values() {
        let saved = Config {
            stats_dir: Some(PathBuf::from("saved")),
            seed: Some(1),
            catalog_dir: None,
        };
        let merged = saved.merged(None, Some(5), Some(PathBuf::from("flag")));
        assert_eq!(merged.stats_dir, Some(PathBuf::from("saved")));
        assert_eq!(merged.seed, Some(5));
        assert_eq!(merged.catalog_dir, Some(PathBuf::from("flag")));
    }
}
