//! Configuration management
//!
//! Voice settings and the highlight color persist in a small INI file.
//! Missing or unreadable settings never fail the caller: defaults are used
//! and, when the file does not exist yet, written out.

use crate::coordinator::SpeechSettings;
use crate::styled::Color;
use crate::{ReadalongError, Result};
use ini::Ini;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

const SPEECH: &str = "speech";
const DISPLAY: &str = "display";

/// Persistent settings
pub struct Config {
    /// INI configuration storage
    ini: Ini,

    /// Config file path (~/.readalong.cfg)
    path: PathBuf,
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Self {
        Self::load_from(Self::config_path())
    }

    /// Load configuration from `path`, registering defaults if absent
    pub fn load_from(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        debug!("Loading config from {:?}", path);

        let ini = if path.exists() {
            match Self::parse_file(&path) {
                Ok(ini) => ini,
                Err(e) => {
                    warn!("{}, using defaults", e);
                    Self::default_config()
                }
            }
        } else {
            info!("Config file not found, creating default");
            let default = Self::default_config();
            if let Err(e) = default.write_to_file(&path) {
                warn!("Failed to write default config to {:?}: {}", path, e);
            }
            default
        };

        Self { ini, path }
    }

    fn parse_file(path: &Path) -> Result<Ini> {
        Ini::load_from_file(path).map_err(|e| {
            ReadalongError::IniParse(format!("Failed to load config {:?}: {}", path, e))
        })
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        debug!("Saving config to {:?}", self.path);
        self.ini
            .write_to_file(&self.path)
            .map_err(|e| ReadalongError::Config(format!("Failed to save config: {}", e)))
    }

    /// Get config file path (~/.readalong.cfg)
    fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".readalong.cfg")
    }

    /// Expose the config file path for display
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create default configuration
    fn default_config() -> Ini {
        let mut ini = Ini::new();

        ini.with_section(Some(SPEECH))
            .set("rate", SpeechSettings::DEFAULT_RATE.to_string())
            .set("pitch", SpeechSettings::DEFAULT_PITCH.to_string())
            .set("volume", SpeechSettings::DEFAULT_VOLUME.to_string());

        ini.with_section(Some(DISPLAY))
            .set("highlight_color", hex_digits(Color::ORANGE));

        ini
    }

    /// Get a float value from config
    pub fn get_float(&self, section: &str, key: &str, default: f32) -> f32 {
        match self.ini.get_from(Some(section), key) {
            Some(value) => value.trim().parse().unwrap_or_else(|_| {
                warn!("Invalid {}.{} = {:?}, using {}", section, key, value, default);
                default
            }),
            None => default,
        }
    }

    /// Get a string value from config, `None` if absent or blank
    pub fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.ini
            .get_from(Some(section), key)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    /// Set a value in config
    pub fn set(&mut self, section: &str, key: &str, value: &str) {
        self.ini.with_section(Some(section)).set(key, value);
    }

    /// Voice settings, falling back to defaults per key
    pub fn speech_settings(&self) -> SpeechSettings {
        SpeechSettings {
            rate: self.get_float(SPEECH, "rate", SpeechSettings::DEFAULT_RATE),
            pitch: self.get_float(SPEECH, "pitch", SpeechSettings::DEFAULT_PITCH),
            volume: self.get_float(SPEECH, "volume", SpeechSettings::DEFAULT_VOLUME),
            voice_language: self.get_string(SPEECH, "voice"),
        }
    }

    pub fn set_speech_settings(&mut self, settings: &SpeechSettings) {
        self.set(SPEECH, "rate", &settings.rate.to_string());
        self.set(SPEECH, "pitch", &settings.pitch.to_string());
        self.set(SPEECH, "volume", &settings.volume.to_string());
        match &settings.voice_language {
            Some(code) => self.set(SPEECH, "voice", code),
            None => {
                self.ini.delete_from(Some(SPEECH), "voice");
            }
        }
    }

    /// Highlight color for the word being spoken
    pub fn highlight_color(&self) -> Color {
        match self.get_string(DISPLAY, "highlight_color") {
            Some(hex) => Color::from_hex(&hex).unwrap_or_else(|| {
                warn!("Invalid highlight color {:?}, using default", hex);
                Color::ORANGE
            }),
            None => Color::ORANGE,
        }
    }

    pub fn set_highlight_color(&mut self, color: Color) {
        self.set(DISPLAY, "highlight_color", &hex_digits(color));
    }
}

/// `rrggbb` without the `#`, which INI readers take for a comment
fn hex_digits(color: Color) -> String {
    color.to_hex().trim_start_matches('#').to_string()
}
