use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::app_dirs::AppDirs;
use crate::error::Result;
use crate::stats::UserStats;

pub const STATS_FILE: &str = "stats.json";

/// Persistence for [`UserStats`]. Loading never fails: a missing or
/// unreadable record reads as a fresh user. Saving reports I/O errors.
pub trait StatsStore {
    fn load(&self) -> Option<UserStats>;
    fn save(&self, stats: &UserStats) -> Result<()>;
    fn reset(&self) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileStatsStore {
    path: PathBuf,
}

impl FileStatsStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self::in_dir(AppDirs::stats_dir(None))
    }

    /// `stats.json` inside `dir`.
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        Self::with_path(dir.as_ref().join(STATS_FILE))
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

impl Default for FileStatsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsStore for FileStatsStore {
    fn load(&self) -> Option<UserStats> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no saved stats");
                return None;
            }
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "could not read stats; starting fresh"
                );
                return None;
            }
        };
        match serde_json::from_slice::<UserStats>(&bytes) {
            Ok(stats) => Some(stats),
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "stats file is malformed; starting fresh"
                );
                None
            }
        }
    }

    /// Writes a sibling temp file and renames it over the record, so readers
    /// see either the old or the new stats.
    fn save(&self, stats: &UserStats) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(stats)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, data)?;
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), "stats saved");
        Ok(())
    }

    fn reset(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "stats reset");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
