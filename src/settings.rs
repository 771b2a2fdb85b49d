use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_SETTINGS_TOML: &str = include_str!("../settings.toml");

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub source_lang: String,
    pub target_lang: String,
    pub concurrency: usize,
    pub timeout_secs: Option<u64>,
    pub overlay_font_path: Option<String>,
    pub overlay_font_family: Option<String>,
    pub overlay_text_color: String,
    pub overlay_fill_color: String,
    pub text_class_id: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            provider: None,
            model: None,
            source_lang: "JA".to_string(),
            target_lang: "EN-US".to_string(),
            concurrency: 4,
            timeout_secs: Some(30),
            overlay_font_path: None,
            overlay_font_family: None,
            overlay_text_color: "#000000".to_string(),
            overlay_fill_color: "#ffffff".to_string(),
            text_class_id: 3,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    translator: Option<TranslatorSettings>,
    overlay: Option<OverlaySettings>,
    detection: Option<DetectionSettings>,
}

#[derive(Debug, Default, Deserialize)]
struct TranslatorSettings {
    provider: Option<String>,
    model: Option<String>,
    source_lang: Option<String>,
    target_lang: Option<String>,
    concurrency: Option<usize>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct OverlaySettings {
    font_path: Option<String>,
    font_family: Option<String>,
    text_color: Option<String>,
    fill_color: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct DetectionSettings {
    text_class_id: Option<u32>,
}

/// Built-in defaults, then `settings.toml` / `settings.local.toml` in the
/// working directory, then the same pair under `~/.manga-translator-rust/`,
/// then `extra_path`. Later files override earlier ones key by key.
pub fn load_settings(extra_path: Option<&Path>) -> Result<Settings> {
    let mut settings = Settings::default();
    settings.merge(
        toml::from_str(DEFAULT_SETTINGS_TOML).with_context(|| "failed to parse built-in settings")?,
    );
    ensure_home_settings_file()?;

    let mut ordered_paths = vec![
        PathBuf::from("settings.toml"),
        PathBuf::from("settings.local.toml"),
    ];
    if let Some(home) = home_dir() {
        ordered_paths.push(home.join("settings.toml"));
        ordered_paths.push(home.join("settings.local.toml"));
    }
    if let Some(extra) = extra_path {
        if !extra.exists() {
            return Err(anyhow!("settings file not found: {}", extra.display()));
        }
        ordered_paths.push(extra.to_path_buf());
    }

    for path in ordered_paths {
        if path.exists() {
            settings.merge(read_settings_file(&path)?);
        }
    }
    Ok(settings)
}

fn read_settings_file(path: &Path) -> Result<SettingsFile> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings: {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("failed to parse settings: {}", path.display()))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

impl Settings {
    fn merge(&mut self, incoming: SettingsFile) {
        if let Some(translator) = incoming.translator {
            if let Some(provider) = non_empty(translator.provider) {
                self.provider = Some(provider);
            }
            if let Some(model) = non_empty(translator.model) {
                self.model = Some(model);
            }
            if let Some(lang) = non_empty(translator.source_lang) {
                self.source_lang = lang;
            }
            if let Some(lang) = non_empty(translator.target_lang) {
                self.target_lang = lang;
            }
            if let Some(concurrency) = translator.concurrency.filter(|value| *value > 0) {
                self.concurrency = concurrency;
            }
            if let Some(timeout) = translator.timeout_secs {
                self.timeout_secs = (timeout > 0).then_some(timeout);
            }
        }
        if let Some(overlay) = incoming.overlay {
            if let Some(path) = non_empty(overlay.font_path) {
                self.overlay_font_path = Some(path);
            }
            if let Some(family) = non_empty(overlay.font_family) {
                self.overlay_font_family = Some(family);
            }
            if let Some(color) = non_empty(overlay.text_color) {
                self.overlay_text_color = color;
            }
            if let Some(color) = non_empty(overlay.fill_color) {
                self.overlay_fill_color = color;
            }
        }
        if let Some(detection) = incoming.detection {
            if let Some(class_id) = detection.text_class_id {
                self.text_class_id = class_id;
            }
        }
    }
}

fn ensure_home_settings_file() -> Result<()> {
    let Some(home) = home_dir() else {
        return Ok(());
    };
    fs::create_dir_all(&home)
        .with_context(|| format!("failed to create settings directory: {}", home.display()))?;
    let path = home.join("settings.toml");
    if !path.exists() {
        fs::write(&path, DEFAULT_SETTINGS_TOML)
            .with_context(|| format!("failed to write settings: {}", path.display()))?;
    }
    Ok(())
}

fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME").ok().and_then(|home| {
        let home = home.trim();
        if home.is_empty() {
            None
        } else {
            Some(Path::new(home).join(".manga-translator-rust"))
        }
    })
}
