// Opacity settings engine
// Loads and saves `BrowserSettings` as pretty JSON and updates single values by
// dot-separated key path.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info};

use crate::platform;
use crate::types::errors::SettingsError;
use crate::types::settings::BrowserSettings;

/// Trait defining the settings engine interface.
pub trait SettingsEngineTrait {
    fn load(&mut self) -> Result<BrowserSettings, SettingsError>;
    fn save(&self) -> Result<(), SettingsError>;
    fn get_settings(&self) -> &BrowserSettings;
    fn set_value(&mut self, key: &str, value: Value) -> Result<(), SettingsError>;
    fn reset(&mut self) -> Result<(), SettingsError>;
    fn config_path(&self) -> &Path;
}

/// Settings persisted to a JSON file.
pub struct SettingsEngine {
    config_path: PathBuf,
    settings: BrowserSettings,
}

impl SettingsEngine {
    /// Uses `path_override` when given, otherwise `settings.json` in the
    /// platform config directory. Nothing is read until [`load`](SettingsEngineTrait::load).
    pub fn new(path_override: Option<PathBuf>) -> Self {
        let config_path =
            path_override.unwrap_or_else(|| platform::get_config_dir().join("settings.json"));

        Self {
            config_path,
            settings: BrowserSettings::default(),
        }
    }
}

/// Replaces the leaf at `path` inside a JSON object tree. Only existing keys
/// can be replaced.
fn replace_at(root: &mut Value, path: &[&str], value: Value) -> Result<(), String> {
    let Some((leaf, parents)) = path.split_last() else {
        return Err("Key cannot be empty".to_string());
    };

    let mut node = root;
    for part in parents {
        node = node
            .get_mut(*part)
            .ok_or_else(|| format!("'{part}' not found in settings"))?;
    }

    match node.as_object_mut() {
        Some(map) if map.contains_key(*leaf) => {
            map.insert((*leaf).to_string(), value);
            Ok(())
        }
        Some(_) => Err(format!("'{leaf}' not found in settings")),
        None => Err(format!("'{leaf}' is not inside a settings section")),
    }
}

impl SettingsEngineTrait for SettingsEngine {
    /// Reads the settings file. A missing file yields defaults; a malformed
    /// one is an error and leaves the in-memory settings untouched.
    fn load(&mut self) -> Result<BrowserSettings, SettingsError> {
        if !self.config_path.exists() {
            debug!(path = %self.config_path.display(), "No settings file, using defaults");
            self.settings = BrowserSettings::default();
            return Ok(self.settings.clone());
        }

        let content = fs::read_to_string(&self.config_path)
            .map_err(|e| SettingsError::IoError(format!("Failed to read config file: {e}")))?;

        self.settings = serde_json::from_str(&content).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to parse config file: {e}"))
        })?;

        info!(path = %self.config_path.display(), "Settings loaded");
        Ok(self.settings.clone())
    }

    fn save(&self) -> Result<(), SettingsError> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SettingsError::IoError(format!("Failed to create config directory: {e}"))
            })?;
        }

        let json = serde_json::to_string_pretty(&self.settings).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to serialize settings: {e}"))
        })?;

        fs::write(&self.config_path, json)
            .map_err(|e| SettingsError::IoError(format!("Failed to write config file: {e}")))?;

        debug!(path = %self.config_path.display(), "Settings saved");
        Ok(())
    }

    fn get_settings(&self) -> &BrowserSettings {
        &self.settings
    }

    /// Updates one value, e.g. `"privacy.blocking_level"`, validates the
    /// result against `BrowserSettings` and saves it.
    fn set_value(&mut self, key: &str, value: Value) -> Result<(), SettingsError> {
        if key.is_empty() {
            return Err(SettingsError::InvalidKey("Key cannot be empty".to_string()));
        }

        let mut tree = serde_json::to_value(&self.settings).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to serialize settings: {e}"))
        })?;

        let path: Vec<&str> = key.split('.').collect();
        replace_at(&mut tree, &path, value).map_err(SettingsError::InvalidKey)?;

        self.settings = serde_json::from_value(tree).map_err(|e| {
            SettingsError::InvalidValue(format!("Invalid value for key '{key}': {e}"))
        })?;

        info!(key, "Setting updated");
        self.save()
    }

    fn reset(&mut self) -> Result<(), SettingsError> {
        self.settings = BrowserSettings::default();
        self.save()
    }

    fn config_path(&self) -> &Path {
        &self.config_path
    }
}
