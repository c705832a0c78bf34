//! Application configuration.
//!
//! Read from `<config dir>/logo-colorist/config.toml`. Every key is optional:
//!
//! ```toml
//! [export]
//! base_size = 600
//! supersample = 3
//! logo_width = 540.0
//! format = "png"
//! quality = 0.95
//!
//! [gallery]
//! url = "https://xyz.supabase.co"
//! anon_key = "..."
//! recent_limit = 12
//!
//! [share]
//! origin = "https://succinctcolors.netlify.app/"
//!
//! [downloads]
//! dir = "/home/me/Pictures"
//! ```
//!
//! `LOGO_COLORIST_GALLERY_URL` and `LOGO_COLORIST_GALLERY_KEY` override the
//! gallery credentials.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::gallery::{COVER_LIMIT, GALLERY_LIMIT, KeepAliveConfig};
use crate::raster::ExportConfig;
use crate::share::ShareConfig;
use crate::sink::DirectoryDownloads;

pub const GALLERY_URL_ENV: &str = "LOGO_COLORIST_GALLERY_URL";
pub const GALLERY_KEY_ENV: &str = "LOGO_COLORIST_GALLERY_KEY";

// ============================================================================
// Sections
// ============================================================================

/// Remote gallery settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    pub url: Option<String>,
    pub anon_key: Option<String>,
    pub recent_limit: usize,
    pub cover_limit: usize,
    pub keep_alive_interval_secs: u64,
    pub keep_alive_activity_secs: u64,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        let keep_alive = KeepAliveConfig::default();
        Self {
            url: None,
            anon_key: None,
            recent_limit: GALLERY_LIMIT,
            cover_limit: COVER_LIMIT,
            keep_alive_interval_secs: keep_alive.interval.as_secs(),
            keep_alive_activity_secs: keep_alive.activity_threshold.as_secs(),
        }
    }
}

impl GalleryConfig {
    /// URL and key, when both are set and non-empty.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let url = self.url.as_deref().filter(|s| !s.trim().is_empty())?;
        let key = self.anon_key.as_deref().filter(|s| !s.trim().is_empty())?;
        Some((url, key))
    }

    pub fn keep_alive(&self) -> KeepAliveConfig {
        KeepAliveConfig {
            interval: Duration::from_secs(self.keep_alive_interval_secs.max(1)),
            activity_threshold: Duration::from_secs(self.keep_alive_activity_secs),
        }
    }
}

/// Where downloads are written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadsConfig {
    /// Defaults to the platform download directory.
    pub dir: Option<PathBuf>,
}

impl DownloadsConfig {
    pub fn sink(&self) -> DirectoryDownloads {
        match &self.dir {
            Some(dir) => DirectoryDownloads::new(dir),
            None => DirectoryDownloads::user_default(),
        }
    }
}

// ============================================================================
// AppConfig
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub export: ExportConfig,
    pub gallery: GalleryConfig,
    pub share: ShareConfig,
    pub downloads: DownloadsConfig,
}

impl AppConfig {
    /// `<config dir>/logo-colorist`.
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("logo-colorist"))
    }

    pub fn default_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("config.toml"))
    }

    /// Loads the default file, then applies environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::default_path() {
            Some(path) => Self::load_from(&path)?,
            None => Self::default(),
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Loads `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Overrides gallery credentials from `lookup` (normally the process
    /// environment).
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(GALLERY_URL_ENV) {
            self.gallery.url = Some(url);
        }
        if let Some(key) = lookup(GALLERY_KEY_ENV) {
            self.gallery.anon_key = Some(key);
        }
    }
}
