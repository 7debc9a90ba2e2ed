//! Engine Configuration
//!
//! Centralized configuration loading for the visualization engine, backed by
//! an optional TOML file plus environment overrides.
//!
//! # Configuration Priority
//!
//! Values are applied with the following priority (highest first):
//! 1. Environment variables
//! 2. TOML configuration file
//! 3. Default values
//!
//! # XDG Base Directory Compliance
//!
//! The configuration file lives at
//! `$XDG_CONFIG_HOME/alchetree/engine.toml` (typically
//! `~/.config/alchetree/engine.toml`).
//!
//! # Example Configuration
//!
//! ```toml
//! [playback]
//! bfs_step_ms = 350
//! dfs_step_ms = 600
//! bidirectional_step_ms = 350
//! min_speed = 0.1
//! max_speed = 8.0
//! remote_connect_timeout_ms = 3000
//!
//! [layout]
//! min_h_spacing = 80.0
//! min_v_spacing = 90.0
//! fallback_level_spacing = 100.0
//!
//! [remote]
//! enabled = true
//! url = "ws://localhost:8080"
//!
//! [backend]
//! api_url = "http://localhost:8080/api"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::layout::LayoutConfig;
use crate::playback::PlaybackConfig;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but could not be read
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// Path that failed
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// The config file is not valid TOML for this schema
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        /// Path that failed
        path: PathBuf,
        /// Underlying TOML error
        source: toml::de::Error,
    },
}

// =============================================================================
// TOML Schema
// =============================================================================

/// On-disk TOML schema; every field optional so partial files work
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EngineToml {
    /// `[playback]` section
    #[serde(default)]
    pub playback: Option<PlaybackToml>,
    /// `[layout]` section
    #[serde(default)]
    pub layout: Option<LayoutToml>,
    /// `[remote]` section
    #[serde(default)]
    pub remote: Option<RemoteToml>,
    /// `[backend]` section
    #[serde(default)]
    pub backend: Option<BackendToml>,
}

/// `[playback]` overrides
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PlaybackToml {
    /// Base BFS step delay in milliseconds
    pub bfs_step_ms: Option<u64>,
    /// Base DFS step delay in milliseconds
    pub dfs_step_ms: Option<u64>,
    /// Base bidirectional step delay in milliseconds
    pub bidirectional_step_ms: Option<u64>,
    /// Lower speed bound
    pub min_speed: Option<f64>,
    /// Upper speed bound
    pub max_speed: Option<f64>,
    /// Remote connect timeout in milliseconds
    pub remote_connect_timeout_ms: Option<u64>,
}

/// `[layout]` overrides
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LayoutToml {
    /// Floor for horizontal spacing
    pub min_h_spacing: Option<f64>,
    /// Floor for vertical spacing
    pub min_v_spacing: Option<f64>,
    /// Level spacing for repaired coordinates
    pub fallback_level_spacing: Option<f64>,
}

/// `[remote]` overrides
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RemoteToml {
    /// Whether the remote reveal stream is attempted at all
    pub enabled: Option<bool>,
    /// WebSocket base URL
    pub url: Option<String>,
}

/// `[backend]` overrides
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BackendToml {
    /// REST base URL of the recipe-search service
    pub api_url: Option<String>,
}

// =============================================================================
// Resolved Configuration
// =============================================================================

/// Remote stream settings
#[derive(Clone, Debug, PartialEq)]
pub struct RemoteConfig {
    /// Whether a remote connection is attempted on playback start
    pub enabled: bool,
    /// WebSocket base URL of the animation stream
    pub url: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: "ws://localhost:8080".to_string(),
        }
    }
}

/// Fully resolved engine configuration
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// Playback pacing
    pub playback: PlaybackConfig,
    /// Layout spacing
    pub layout: LayoutConfig,
    /// Remote stream settings
    pub remote: RemoteConfig,
    /// REST base URL of the recipe-search service
    pub api_url: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            playback: PlaybackConfig::default(),
            layout: LayoutConfig::default(),
            remote: RemoteConfig::default(),
            api_url: "http://localhost:8080/api".to_string(),
        }
    }
}

impl EngineConfig {
    /// Defaults, then the default config file (if present), then environment
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the default config file exists but cannot
    /// be read or parsed. A missing file is not an error.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(path) = Self::default_config_path() {
            if path.exists() {
                config.apply_toml(&read_toml(&path)?);
            }
        }
        config.apply_env();
        Ok(config)
    }

    /// Defaults, then a specific config file, then environment
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_toml(&read_toml(path)?);
        config.apply_env();
        Ok(config)
    }

    /// Defaults plus environment overrides only
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// The XDG-compliant default config file location
    #[must_use]
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("alchetree").join("engine.toml"))
    }

    /// Apply a parsed TOML document over the current values
    pub fn apply_toml(&mut self, doc: &EngineToml) {
        if let Some(playback) = &doc.playback {
            if let Some(ms) = playback.bfs_step_ms {
                self.playback.bfs_step = Duration::from_millis(ms);
            }
            if let Some(ms) = playback.dfs_step_ms {
                self.playback.dfs_step = Duration::from_millis(ms);
            }
            if let Some(ms) = playback.bidirectional_step_ms {
                self.playback.bidirectional_step = Duration::from_millis(ms);
            }
            if let Some(min) = playback.min_speed {
                self.playback.min_speed = min;
            }
            if let Some(max) = playback.max_speed {
                self.playback.max_speed = max;
            }
            if let Some(ms) = playback.remote_connect_timeout_ms {
                self.playback.remote_connect_timeout = Duration::from_millis(ms);
            }
        }
        if let Some(layout) = &doc.layout {
            if let Some(v) = layout.min_h_spacing {
                self.layout.min_h_spacing = v;
            }
            if let Some(v) = layout.min_v_spacing {
                self.layout.min_v_spacing = v;
            }
            if let Some(v) = layout.fallback_level_spacing {
                self.layout.fallback_level_spacing = v;
            }
        }
        if let Some(remote) = &doc.remote {
            if let Some(enabled) = remote.enabled {
                self.remote.enabled = enabled;
            }
            if let Some(url) = &remote.url {
                self.remote.url.clone_from(url);
            }
        }
        if let Some(backend) = &doc.backend {
            if let Some(url) = &backend.api_url {
                self.api_url.clone_from(url);
            }
        }
    }

    /// Apply environment variable overrides
    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("ALCHETREE_API_URL") {
            self.api_url = url;
        }
        if let Ok(url) = std::env::var("ALCHETREE_REMOTE_URL") {
            self.remote.url = url;
        }
        if let Ok(enabled) = std::env::var("ALCHETREE_REMOTE") {
            self.remote.enabled = enabled == "1" || enabled.to_lowercase() == "true";
        }
        if let Ok(ms) = std::env::var("ALCHETREE_CONNECT_TIMEOUT_MS") {
            if let Ok(ms) = ms.parse() {
                self.playback.remote_connect_timeout = Duration::from_millis(ms);
            }
        }
    }
}

fn read_toml(path: &Path) -> Result<EngineToml, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::from_env();
        assert!(!config.remote.enabled);
        assert_eq!(config.playback.bfs_step, Duration::from_millis(350));
        assert!(config.api_url.starts_with("http://"));
    }

    #[test]
    fn test_partial_toml_overrides() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[playback]
dfs_step_ms = 900

[remote]
enabled = true
url = "ws://example:9999"
"#
        )
        .unwrap();

        let config = EngineConfig::load_from_path(file.path()).unwrap();
        assert_eq!(config.playback.dfs_step, Duration::from_millis(900));
        // Untouched values keep their defaults.
        assert_eq!(config.playback.bfs_step, Duration::from_millis(350));
        assert!(config.remote.enabled);
        assert_eq!(config.remote.url, "ws://example:9999");
    }

    #[test]
    fn test_invalid_toml_is_a_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[playback\nbroken").unwrap();
        let result = EngineConfig::load_from_path(file.path());
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_missing_file_is_a_read_error() {
        let result = EngineConfig::load_from_path(Path::new("/nonexistent/engine.toml"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_env_wins_over_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[backend]\napi_url = \"http://from-file/api\"").unwrap();

        std::env::set_var("ALCHETREE_API_URL", "http://from-env/api");
        let config = EngineConfig::load_from_path(file.path()).unwrap();
        std::env::remove_var("ALCHETREE_API_URL");

        assert_eq!(config.api_url, "http://from-env/api");
    }

    #[test]
    fn test_toml_roundtrip() {
        let doc = EngineToml {
            playback: Some(PlaybackToml {
                bfs_step_ms: Some(200),
                ..PlaybackToml::default()
            }),
            ..EngineToml::default()
        };
        let text = toml::to_string(&doc).unwrap();
        let parsed: EngineToml = toml::from_str(&text).unwrap();
        assert_eq!(parsed.playback.unwrap().bfs_step_ms, Some(200));
    }
}
