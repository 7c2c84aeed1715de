//! Configuration loading tests
//!
//! Settings load from an INI file, fall back to defaults, and are written
//! out when missing.

use readalong::config::Config;
use readalong::{Color, SpeechSettings};
use std::fs;

#[test]
fn test_missing_config_registers_defaults() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("readalong.cfg");

    let config = Config::load_from(&path);

    assert_eq!(config.speech_settings(), SpeechSettings::default());
    assert_eq!(config.highlight_color(), Color::ORANGE);

    // Defaults were persisted
    let written = fs::read_to_string(&path).expect("default config written");
    assert!(written.contains("[speech]"));
    assert!(written.contains("rate"));
    assert!(written.contains("pitch"));
    assert!(written.contains("volume"));
}

#[test]
fn test_loads_existing_values() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("readalong.cfg");
    fs::write(&path, "[speech]\nrate=0.25\npitch=0.8\nvolume=0.5\nvoice=de-DE\n")
        .expect("write config");

    let settings = Config::load_from(&path).speech_settings();

    assert_eq!(settings.rate, 0.25);
    assert_eq!(settings.pitch, 0.8);
    assert_eq!(settings.volume, 0.5);
    assert_eq!(settings.voice_language.as_deref(), Some("de-DE"));
}

#[test]
fn test_partial_config_falls_back_per_key() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("readalong.cfg");
    fs::write(&path, "[speech]\nrate=0.9\nvolume=not-a-number\n").expect("write config");

    let config = Config::load_from(&path);
    let settings = config.speech_settings();

    assert_eq!(settings.rate, 0.9);
    assert_eq!(settings.pitch, SpeechSettings::DEFAULT_PITCH);
    assert_eq!(settings.volume, SpeechSettings::DEFAULT_VOLUME);
    assert_eq!(settings.voice_language, None);
    assert_eq!(config.highlight_color(), Color::ORANGE);
}

#[test]
fn test_save_round_trip() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("readalong.cfg");

    let mut config = Config::load_from(&path);
    let settings = SpeechSettings {
        rate: 0.6,
        pitch: 1.3,
        volume: 0.4,
        voice_language: Some("en-AU".to_string()),
    };
    config.set_speech_settings(&settings);
    config.set_highlight_color(Color::rgb(0x12, 0x34, 0x56));
    config.save().expect("save config");

    let reloaded = Config::load_from(&path);
    assert_eq!(reloaded.speech_settings(), settings);
    assert_eq!(reloaded.highlight_color(), Color::rgb(0x12, 0x34, 0x56));

    // Clearing the voice removes the key
    let mut config = reloaded;
    config.set_speech_settings(&SpeechSettings::default());
    config.save().expect("save config");
    assert_eq!(Config::load_from(&path).speech_settings().voice_language, None);
}

#[test]
fn test_config_path_is_kept() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("custom.cfg");

    let config = Config::load_from(&path);
    assert_eq!(config.path(), path.as_path());
}
