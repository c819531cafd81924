use crate::settings::{Aliases, LanguageSettings, NetworkSettings, PluginSettings};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Name of the application directory under the platform config dir
pub const APP_DIR: &str = "netgpt";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not determine config directory")]
    NoConfigDir,

    #[error("invalid server URL '{0}' (expected http(s)://host[:port])")]
    InvalidServerUrl(String),

    #[error("failed to write config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the NetGPT server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_url: Option<String>,

    /// Last greeting received from the server, shown while offline
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub greeting: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<NetworkSettings>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<LanguageSettings>,

    #[serde(default)]
    pub aliases: Aliases,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub plugins: Vec<PluginSettings>,

    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// "auto", "rgb" or "256"
    #[serde(default = "default_color_mode")]
    pub color_mode: String,

    /// Show message times next to the sender label
    #[serde(default = "default_show_timestamps")]
    pub show_timestamps: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            color_mode: default_color_mode(),
            show_timestamps: default_show_timestamps(),
        }
    }
}

fn default_color_mode() -> String {
    "auto".to_string()
}

fn default_show_timestamps() -> bool {
    true
}

/// Check that a server URL is a bare http(s) origin, optionally with a port.
///
/// # Examples
///
/// ```
/// use netgpt::config::validate_server_url;
///
/// assert!(validate_server_url("https://netgpt.example.com"));
/// assert!(validate_server_url("http://localhost:8000/"));
/// assert!(!validate_server_url("ftp://example.com"));
/// assert!(!validate_server_url("https://example.com/api"));
/// ```
pub fn validate_server_url(url: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^(http|https)://[a-zA-Z0-9.-]+(:[0-9]{1,5})?/?$").unwrap())
        .is_match(url)
}

impl Config {
    /// Get the XDG-style config directory (~/.config/netgpt)
    /// This is preferred on macOS for CLI tools and cross-platform dotfiles
    #[cfg(target_os = "macos")]
    fn xdg_config_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".config").join(APP_DIR))
    }

    /// Get the platform-specific config directory
    /// - macOS: ~/Library/Application Support/netgpt (unless ~/.config/netgpt exists)
    /// - Linux: ~/.config/netgpt
    /// - Windows: %APPDATA%/netgpt
    pub fn config_dir() -> Option<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            if let Some(xdg_dir) = Self::xdg_config_dir() {
                if xdg_dir.is_dir() {
                    return Some(xdg_dir);
                }
            }
        }

        dirs::config_dir().map(|p| p.join(APP_DIR))
    }

    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("config.toml"))
    }

    /// Load config from the default location, or return default if the file
    /// doesn't exist or can't be parsed
    pub fn load() -> Self {
        Self::config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), "ignoring unreadable config: {e}");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::config_path().ok_or(ConfigError::NoConfigDir)?;
        self.save_to(&path)
    }

    /// Save config atomically: write a temp file beside the target, then rename
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let parent = path.parent().unwrap_or(Path::new("."));
        fs::create_dir_all(parent)?;

        let contents = toml::to_string_pretty(self)?;
        let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
        tmp.write_all(contents.as_bytes())?;
        tmp.persist(path).map_err(|e| e.error)?;

        tracing::debug!(path = %path.display(), "config saved");
        Ok(())
    }

    /// Server URL without a trailing slash
    pub fn server(&self) -> Option<&str> {
        self.server_url.as_deref().map(|url| url.trim_end_matches('/'))
    }

    pub fn set_server_url(&mut self, url: &str) -> Result<(), ConfigError> {
        let url = url.trim();
        if !validate_server_url(url) {
            return Err(ConfigError::InvalidServerUrl(url.to_string()));
        }
        self.server_url = Some(url.trim_end_matches('/').to_string());
        Ok(())
    }

    pub fn set_network(&mut self, network: NetworkSettings) {
        self.network = Some(network);
    }

    pub fn set_language(&mut self, language: LanguageSettings) {
        self.language = Some(language);
    }

    pub fn set_alias(&mut self, label: &str, value: &str) {
        self.aliases.insert(label.to_string(), value.to_string());
    }

    /// Remove an alias, returning its value if it existed
    pub fn remove_alias(&mut self, label: &str) -> Option<String> {
        self.aliases.remove(label)
    }

    pub fn set_greeting(&mut self, greeting: Option<String>) {
        self.greeting = greeting.filter(|g| !g.trim().is_empty());
    }

    /// Network settings, if present and fully filled in
    pub fn complete_network(&self) -> Option<&NetworkSettings> {
        self.network.as_ref().filter(|n| n.is_complete())
    }

    /// Language settings, if present and fully filled in
    pub fn complete_language(&self) -> Option<&LanguageSettings> {
        self.language.as_ref().filter(|l| l.is_complete())
    }

    /// Server, network and language settings are all present
    pub fn is_configured(&self) -> bool {
        self.server().is_some()
            && self.complete_network().is_some()
            && self.complete_language().is_some()
    }
}
