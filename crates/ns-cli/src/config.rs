//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use ns_core::LabelLocale;
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,
    /// Where the home-screen widget snapshot is written.
    pub widget_path: PathBuf,
    /// Gemini API key, required only for `ns analyze`.
    pub gemini_api_key: Option<String>,
    pub vision_model: String,
    pub foods_base_url: String,
    /// Language of day headers in `ns log`.
    pub label_locale: LabelLocale,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_path", &self.database_path)
            .field("widget_path", &self.widget_path)
            .field(
                "gemini_api_key",
                &self.gemini_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("vision_model", &self.vision_model)
            .field("foods_base_url", &self.foods_base_url)
            .field("label_locale", &self.label_locale)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("nutriscan.db"),
            widget_path: data_dir.join("widget.json"),
            gemini_api_key: None,
            vision_model: ns_vision::DEFAULT_MODEL.to_string(),
            foods_base_url: ns_foods::DEFAULT_BASE_URL.to_string(),
            label_locale: LabelLocale::default(),
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    ///
    /// Later sources win: defaults, `~/.config/nutriscan/config.toml`, the
    /// given file, then `NS_*` environment variables.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed("NS_"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for nutriscan.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("nutriscan"))
}

/// Returns the platform-specific data directory for nutriscan.
///
/// On Linux: `~/.local/share/nutriscan`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("nutriscan"))
}
