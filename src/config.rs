use std::path::PathBuf;

use directories::ProjectDirs;
use serde::Deserialize;

/// Application configuration loaded from TOML config file.
/// Every field has a default, so the config file is optional.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding the dataset CSVs (overrides the current directory).
    pub data_dir: Option<PathBuf>,
    /// File names of the three datasets inside `data_dir`.
    pub files: DatasetFiles,
    /// Number of recommended tracks to show.
    pub recommendations: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            files: DatasetFiles::default(),
            recommendations: crate::DEFAULT_RECOMMENDATIONS,
        }
    }
}

/// Dataset file names, relative to the data directory.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatasetFiles {
    pub tracks: PathBuf,
    pub artists: PathBuf,
    pub playlists: PathBuf,
}

impl Default for DatasetFiles {
    fn default() -> Self {
        Self {
            tracks: PathBuf::from("tracks.csv"),
            artists: PathBuf::from("artists.csv"),
            playlists: PathBuf::from("playlists.csv"),
        }
    }
}

impl AppConfig {
    /// Load config from `~/.config/trackboard/config.toml`.
    /// Returns default config if file doesn't exist.
    /// Logs a warning if the file exists but can't be parsed.
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) if path.exists() => match std::fs::read_to_string(&path) {
                Ok(contents) => match Self::from_toml(&contents) {
                    Ok(config) => {
                        log::info!("Loaded config from {}", path.display());
                        config
                    }
                    Err(e) => {
                        log::warn!(
                            "Failed to parse {}: {}. Using defaults.",
                            path.display(),
                            e
                        );
                        Self::default()
                    }
                },
                Err(e) => {
                    log::warn!(
                        "Failed to read {}: {}. Using defaults.",
                        path.display(),
                        e
                    );
                    Self::default()
                }
            },
            _ => {
                log::debug!("No config file found, using defaults");
                Self::default()
            }
        }
    }

    /// Parse a config document. Missing keys fall back to defaults.
    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Resolve the data directory: CLI > config > current directory.
    pub fn resolve_data_dir(&self, cli: Option<PathBuf>) -> PathBuf {
        cli.or_else(|| self.data_dir.clone())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Get the config file path.
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", crate::APP_NAME)
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
