use directories::ProjectDirs;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "vimdrill";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// Where `stats.json` lives: an explicit override, then
    /// `$HOME/.config/vimdrill`, then the platform data directory.
    pub fn stats_dir(override_dir: Option<&Path>) -> PathBuf {
        if let Some(dir) = override_dir {
            return dir.to_path_buf();
        }
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(".config").join(APP_NAME);
        }
        ProjectDirs::from("", "", APP_NAME)
            .map(|proj_dirs| proj_dirs.data_local_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(format!(".{APP_NAME}")))
    }

    pub fn config_path() -> PathBuf {
        if let Some(pd) = ProjectDirs::from("", "", APP_NAME) {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from(format!("{APP_NAME}_config.json"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_wins() {
        let dir = Path::new("/tmp/elsewhere");
        assert_eq!(AppDirs::stats_dir(Some(dir)), dir);
    }

    #[test]
    fn default_dir_is_named_after_the_app() {
        let dir = AppDirs::stats_dir(None);
        assert!(dir.to_string_lossy().contains(APP_NAME));
        assert!(AppDirs::config_path().ends_with("config.json"));
    }
}
