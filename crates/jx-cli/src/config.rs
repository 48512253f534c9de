//! Configuration loading and management.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Default output line format.
    pub format: Option<String>,
    /// Format of index files that lack a headline.
    pub index_format: Option<String>,
    /// Default `PATH:EXT` to scan.
    pub source: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            format: None,
            index_format: None,
            source: ".:JPG".to_string(),
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (JEXIFS_*)
        figment = figment.merge(Env::prefixed("JEXIFS_"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for jexifs.
///
/// On Linux: `~/.config/jexifs`
pub fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("jexifs"))
}
