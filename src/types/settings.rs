use serde::{Deserialize, Serialize};

use super::privacy::BlockingLevel;

/// Top-level browser settings container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct BrowserSettings {
    pub general: GeneralSettings,
    pub privacy: PrivacySettings,
    pub window: WindowSettings,
}

/// General browser settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneralSettings {
    pub language: String,
    pub homepage: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            homepage: "opacity://new-tab".to_string(),
        }
    }
}

/// Privacy-related settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PrivacySettings {
    pub blocking_level: BlockingLevel,
}

/// Geometry used for newly opened windows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WindowSettings {
    pub width: f64,
    pub height: f64,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            width: 1400.0,
            height: 800.0,
        }
    }
}
