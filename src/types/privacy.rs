use serde::{Deserialize, Serialize};

/// Identifier the compiled content rules are installed under.
pub const CONTENT_RULES_IDENTIFIER: &str = "ContentBlockingRules";

/// How aggressively trackers are blocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BlockingLevel {
    None,
    Light,
    #[default]
    Moderate,
    Strong,
}

impl BlockingLevel {
    /// Rule resource compiled for this level. `None` installs nothing.
    pub fn rule_resource(self) -> Option<&'static str> {
        match self {
            BlockingLevel::None => None,
            BlockingLevel::Light => Some("blockingLevel1Rules"),
            BlockingLevel::Moderate => Some("blockingLevel2Rules"),
            BlockingLevel::Strong => Some("blockingLevel3Rules"),
        }
    }
}
