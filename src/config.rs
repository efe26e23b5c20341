/// Application configuration
///
/// Read from an optional TOML file. Every field has a default, so a missing
/// file (or a file that only sets a few keys) is fine.
///
/// Lookup order:
/// - `$GREETING_CARD_CONFIG`
/// - `<config dir>/greeting-card/config.toml`
///   (~/.config/greeting-card/config.toml on Linux)

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::card::reveal::DEFAULT_NARROW_BREAKPOINT;
use crate::card::typewriter::DEFAULT_INTERVAL;
use crate::error::ConfigError;
use crate::gallery::thumbnail;

pub const CONFIG_ENV: &str = "GREETING_CARD_CONFIG";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the photo database and uploaded files live
    pub library_dir: PathBuf,
    /// Where grid thumbnails are cached
    pub thumbnail_dir: PathBuf,
    /// Viewports narrower than this use the tap-to-open card
    pub narrow_breakpoint: f32,
    /// Height of the card's scroll region, in viewport heights
    pub scroll_region_screens: f32,
    pub typing_interval_ms: u64,
    /// How often the gallery checks the store for changes
    pub refresh_interval_ms: u64,
    pub card: CardText,
}

/// Everything written on the card
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CardText {
    pub cover_title: String,
    pub cover_subtitle: String,
    pub inside_note: String,
    pub salutation: String,
    pub message: String,
    pub signature: String,
}

impl Default for CardText {
    fn default() -> Self {
        Self {
            cover_title: "Merry Christmas".to_string(),
            cover_subtitle: "From down under".to_string(),
            inside_note: "Have a great christmas in America".to_string(),
            salutation: "Merry Christmas,".to_string(),
            message: "Wishing you all an amazing christmas, can't believe that it's been a year \
                      already since I was over there. Had such a great time with you guys last \
                      year, I really appreciated you having me over, you are a wonderful family. \
                      Things seem to be going well for me career wise, so hopefully I'll end up \
                      working in America in a few years and I'll be able to see you all then!"
                .to_string(),
            signature: "- Toby".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let mut library_dir = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        library_dir.push("greeting-card");

        Self {
            library_dir,
            thumbnail_dir: thumbnail::default_cache_dir(),
            narrow_breakpoint: DEFAULT_NARROW_BREAKPOINT,
            scroll_region_screens: 4.0,
            typing_interval_ms: DEFAULT_INTERVAL.as_millis() as u64,
            refresh_interval_ms: 2000,
            card: CardText::default(),
        }
    }
}

impl Config {
    /// Load the configuration from the default location
    pub fn load() -> Result<Self, ConfigError> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    fn config_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|dir| dir.join("greeting-card").join("config.toml"))
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// Never zero; timers can't tick with a zero period
    pub fn typing_interval(&self) -> Duration {
        Duration::from_millis(self.typing_interval_ms.max(1))
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms.max(100))
    }
}
