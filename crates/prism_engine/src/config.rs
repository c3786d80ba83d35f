//! # Engine Configuration
//!
//! Configuration for the renderer and engine behavior, loadable from TOML.
//!
//! ## Design Goals
//!
//! - **Centralized**: backend selection and renderer settings in one place
//! - **Serializable**: TOML on disk, strongly typed in memory
//! - **Defaults**: every field has a sensible default so a missing file is
//!   never fatal during development

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read from disk
    #[error("failed to read config file '{path}': {source}")]
    Io {
        /// Path that failed to read
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The config file contents are not valid TOML for [`EngineConfig`]
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Which graphics backend the renderer should run on
///
/// Selecting a backend that is not implemented in this build is a fatal
/// configuration error at startup, not a recoverable runtime condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackendKind {
    /// OpenGL 4.3+ backend (the default)
    OpenGl,
    /// Vulkan backend; selectable but not implemented in this build
    Vulkan,
    /// CPU-side recording backend used by tests and headless tools
    Headless,
}

impl Default for BackendKind {
    fn default() -> Self {
        Self::OpenGl
    }
}

/// Renderer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Graphics backend to initialize
    pub backend: BackendKind,
    /// Initial offscreen target width in pixels
    pub width: u32,
    /// Initial offscreen target height in pixels
    pub height: u32,
    /// Multisample count for offscreen targets (1 = disabled)
    pub samples: u32,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            width: 1280,
            height: 720,
            samples: 1,
        }
    }
}

/// Top-level engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Application name, used in log output
    pub application_name: String,
    /// Renderer subsystem configuration
    pub renderer: RendererConfig,
}

impl EngineConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(toml::from_str(&contents)?)
    }

    /// Load configuration from a file, falling back to defaults if missing
    pub fn from_file_or_default(path: impl AsRef<Path>) -> Self {
        match Self::from_file(path.as_ref()) {
            Ok(config) => config,
            Err(err) => {
                log::warn!(
                    "using default config ({}): {err}",
                    path.as_ref().display()
                );
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_backend_is_opengl() {
        let config = EngineConfig::default();
        assert_eq!(config.renderer.backend, BackendKind::OpenGl);
        assert_eq!(config.renderer.width, 1280);
        assert_eq!(config.renderer.height, 720);
    }

    #[test]
    fn parses_partial_toml() {
        let config: EngineConfig = toml::from_str(
            r#"
            application_name = "demo"

            [renderer]
            backend = "Headless"
            width = 640
            "#,
        )
        .expect("valid config");
        assert_eq!(config.application_name, "demo");
        assert_eq!(config.renderer.backend, BackendKind::Headless);
        assert_eq!(config.renderer.width, 640);
        // Unspecified fields fall back to defaults.
        assert_eq!(config.renderer.height, 720);
    }

    #[test]
    fn round_trips_through_toml() {
        let mut config = EngineConfig::default();
        config.renderer.backend = BackendKind::Vulkan;
        let text = toml::to_string(&config).expect("serialize");
        let back: EngineConfig = toml::from_str(&text).expect("parse");
        assert_eq!(back.renderer.backend, BackendKind::Vulkan);
    }
}
