use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::{debug, warn};

use crate::types::errors::LocaleError;

/// Locales shipped with the binary.
const BUILTIN_LOCALES: &[(&str, &str)] = &[
    ("en", include_str!("../../locales/en.json")),
    ("ko", include_str!("../../locales/ko.json")),
];

/// Fallback locale for unsupported languages and missing keys.
const DEFAULT_LOCALE: &str = "en";

/// Trait defining the localization engine interface.
pub trait LocalizationEngineTrait {
    fn set_locale(&mut self, lang: &str) -> Result<(), LocaleError>;
    fn get_locale(&self) -> &str;
    fn t(&self, key: &str, params: Option<&HashMap<String, String>>) -> String;
    fn detect_system_locale(&self) -> String;
    fn get_available_locales(&self) -> Vec<String>;
}

/// Translation catalogs keyed by locale, looked up with dot-separated keys.
#[derive(Debug, Clone)]
pub struct LocalizationEngine {
    current_locale: String,
    locales: HashMap<String, Value>,
}

impl LocalizationEngine {
    /// Engine with the built-in `en` and `ko` catalogs, `en` active.
    pub fn new() -> Result<Self, LocaleError> {
        let mut locales = HashMap::new();
        for (name, source) in BUILTIN_LOCALES {
            let data: Value = serde_json::from_str(source)
                .map_err(|e| LocaleError::Malformed(format!("{name}: {e}")))?;
            locales.insert((*name).to_string(), data);
        }

        Ok(Self {
            current_locale: DEFAULT_LOCALE.to_string(),
            locales,
        })
    }

    /// Loads every `<locale>.json` in `dir` on top of the built-in catalogs.
    /// A file replaces the built-in catalog of the same name.
    pub fn with_override_dir(dir: &Path) -> Result<Self, LocaleError> {
        if !dir.is_dir() {
            return Err(LocaleError::FileNotFound(dir.display().to_string()));
        }

        let mut engine = Self::new()?;
        let entries = fs::read_dir(dir)
            .map_err(|e| LocaleError::FileNotFound(format!("{}: {e}", dir.display())))?;

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };

            let content = fs::read_to_string(&path)
                .map_err(|e| LocaleError::FileNotFound(format!("{}: {e}", path.display())))?;
            let data: Value = serde_json::from_str(&content)
                .map_err(|e| LocaleError::Malformed(format!("{}: {e}", path.display())))?;

            debug!(locale = name, path = %path.display(), "Locale catalog loaded");
            engine.locales.insert(name.to_string(), data);
        }

        Ok(engine)
    }

    fn lookup<'a>(data: &'a Value, key: &str) -> Option<&'a str> {
        key.split('.')
            .try_fold(data, |node, part| node.get(part))
            .and_then(Value::as_str)
    }

    fn interpolate(template: &str, params: &HashMap<String, String>) -> String {
        params.iter().fold(template.to_string(), |text, (name, value)| {
            text.replace(&format!("{{{name}}}"), value)
        })
    }

    /// Shorthand for a lookup with one `{name}` parameter.
    pub fn t_with(&self, key: &str, name: &str, value: &str) -> String {
        let params = HashMap::from([(name.to_string(), value.to_string())]);
        self.t(key, Some(&params))
    }
}

impl LocalizationEngineTrait for LocalizationEngine {
    fn set_locale(&mut self, lang: &str) -> Result<(), LocaleError> {
        if !self.locales.contains_key(lang) {
            return Err(LocaleError::UnsupportedLocale(lang.to_string()));
        }
        self.current_locale = lang.to_string();
        debug!(locale = lang, "Locale switched");
        Ok(())
    }

    fn get_locale(&self) -> &str {
        &self.current_locale
    }

    /// Translates `key` in the active locale, then in the default locale.
    /// Returns the key itself when neither has it.
    fn t(&self, key: &str, params: Option<&HashMap<String, String>>) -> String {
        let text = [self.current_locale.as_str(), DEFAULT_LOCALE]
            .iter()
            .filter_map(|locale| self.locales.get(*locale))
            .find_map(|data| Self::lookup(data, key));

        match (text, params) {
            (Some(text), Some(p)) => Self::interpolate(text, p),
            (Some(text), None) => text.to_string(),
            (None, _) => {
                warn!(key, locale = %self.current_locale, "Missing translation");
                key.to_string()
            }
        }
    }

    /// Language part of `LANG` (`ko_KR.UTF-8` → `ko`) when a catalog exists
    /// for it, otherwise the default locale.
    fn detect_system_locale(&self) -> String {
        let lang = std::env::var("LANG").unwrap_or_default();
        let code = lang
            .split(['_', '.', '-'])
            .next()
            .unwrap_or_default()
            .to_lowercase();

        if self.locales.contains_key(&code) {
            code
        } else {
            DEFAULT_LOCALE.to_string()
        }
    }

    fn get_available_locales(&self) -> Vec<String> {
        let mut locales: Vec<String> = self.locales.keys().cloned().collect();
        locales.sort();
        locales
    }
}
