//! Content blocking rule management.
//!
//! The web engine compiles and enforces the rules; this module only decides
//! which rule list belongs to a [`BlockingLevel`] and swaps the installed list
//! through a [`ContentRuleStore`] whenever the level changes.

use std::collections::HashMap;

use serde_json::{json, Value};
use tracing::{debug, info};

use crate::types::errors::ContentBlockingError;
use crate::types::privacy::{BlockingLevel, CONTENT_RULES_IDENTIFIER};

/// Analytics and telemetry hosts, blocked from the light level up.
const ANALYTICS_DOMAINS: &[&str] = &[
    "google-analytics.com", "googletagmanager.com", "analytics.google.com",
    "scorecardresearch.com", "quantserve.com", "hotjar.com", "mixpanel.com",
    "segment.io", "amplitude.com", "heapanalytics.com", "fullstory.com",
    "clarity.ms", "nr-data.net", "mc.yandex.ru", "analytics.tiktok.com",
];

/// Ad networks, blocked from the moderate level up.
const AD_DOMAINS: &[&str] = &[
    "doubleclick.net", "googlesyndication.com", "googleadservices.com",
    "adservice.google.com", "amazon-adsystem.com", "outbrain.com", "taboola.com",
    "criteo.com", "criteo.net", "adsrvr.org", "adnxs.com", "rubiconproject.com",
    "pubmatic.com", "openx.net", "casalemedia.com", "moatads.com",
    "doubleverify.com", "adsafeprotected.com", "bat.bing.com", "ads.yahoo.com",
];

/// Social widgets and pixels, blocked only at the strong level.
const SOCIAL_DOMAINS: &[&str] = &[
    "pixel.facebook.com", "connect.facebook.net", "platform.twitter.com",
    "syndication.twitter.com", "static.ads-twitter.com", "platform.linkedin.com",
    "snap.licdn.com",
];

/// Ad-serving path fragments, blocked only at the strong level.
const AD_PATH_PATTERNS: &[&str] = &["/ads/", "/adserver", "/adclick", "/pagead/", "/adframe"];

/// Compiled rule lists as held by the web engine.
pub trait ContentRuleStore {
    /// Identifiers of the rule lists currently installed.
    fn available_identifiers(&self) -> Vec<String>;
    fn remove(&mut self, identifier: &str) -> Result<(), ContentBlockingError>;
    /// Compiles `encoded_rules` (a JSON rule array) and installs it under
    /// `identifier`.
    fn compile(&mut self, identifier: &str, encoded_rules: &str)
        -> Result<(), ContentBlockingError>;
}

/// Builds rule lists per level and installs them.
#[derive(Debug, Default)]
pub struct ContentBlocker {
    level: Option<BlockingLevel>,
}

impl ContentBlocker {
    pub fn new() -> Self {
        Self { level: None }
    }

    /// Level most recently applied, if any.
    pub fn current_level(&self) -> Option<BlockingLevel> {
        self.level
    }

    /// Rule array for `level` in the engine's trigger/action format.
    pub fn rule_list(level: BlockingLevel) -> Value {
        let domains: Vec<&str> = match level {
            BlockingLevel::None => Vec::new(),
            BlockingLevel::Light => ANALYTICS_DOMAINS.to_vec(),
            BlockingLevel::Moderate => [ANALYTICS_DOMAINS, AD_DOMAINS].concat(),
            BlockingLevel::Strong => [ANALYTICS_DOMAINS, AD_DOMAINS, SOCIAL_DOMAINS].concat(),
        };
        let paths: &[&str] = match level {
            BlockingLevel::Strong => AD_PATH_PATTERNS,
            _ => &[],
        };

        let domain_rules = domains.into_iter().map(|domain| {
            json!({
                "trigger": {
                    "url-filter": format!("^https?://([^/]+\\.)?{}", escape_filter(domain)),
                    "load-type": ["third-party"],
                },
                "action": { "type": "block" },
            })
        });
        let path_rules = paths.iter().map(|path| {
            json!({
                "trigger": { "url-filter": escape_filter(path) },
                "action": { "type": "block" },
            })
        });

        Value::Array(domain_rules.chain(path_rules).collect())
    }

    /// Removes the installed list, then installs the list for `level`.
    /// `BlockingLevel::None` leaves nothing installed.
    pub fn apply(
        &mut self,
        level: BlockingLevel,
        store: &mut dyn ContentRuleStore,
    ) -> Result<(), ContentBlockingError> {
        let installed = store
            .available_identifiers()
            .iter()
            .any(|id| id == CONTENT_RULES_IDENTIFIER);
        if installed {
            store.remove(CONTENT_RULES_IDENTIFIER)?;
            debug!(identifier = CONTENT_RULES_IDENTIFIER, "Content rules removed");
        }

        if let Some(resource) = level.rule_resource() {
            let rules = Self::rule_list(level);
            let encoded = serde_json::to_string(&rules).map_err(|e| {
                ContentBlockingError::Compile {
                    identifier: CONTENT_RULES_IDENTIFIER.to_string(),
                    message: e.to_string(),
                }
            })?;
            store.compile(CONTENT_RULES_IDENTIFIER, &encoded)?;
            let count = rules.as_array().map_or(0, Vec::len);
            info!(?level, resource, rules = count, "Content rules installed");
        } else {
            info!("Content blocking disabled");
        }

        self.level = Some(level);
        Ok(())
    }
}

/// Escapes regex metacharacters the engine's url-filter would interpret.
fn escape_filter(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '.' | '?' | '+' | '*' | '(' | ')' | '[' | ']' | '^' | '$' | '|') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// One call made against an [`InMemoryRuleStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleStoreOp {
    Remove(String),
    Compile(String),
}

/// Rule store that keeps compiled lists in memory, for headless runs.
#[derive(Debug, Default)]
pub struct InMemoryRuleStore {
    installed: HashMap<String, Value>,
    ops: Vec<RuleStoreOp>,
}

impl InMemoryRuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rules(&self, identifier: &str) -> Option<&Value> {
        self.installed.get(identifier)
    }

    /// Every remove and compile call, in order.
    pub fn ops(&self) -> &[RuleStoreOp] {
        &self.ops
    }
}

impl ContentRuleStore for InMemoryRuleStore {
    fn available_identifiers(&self) -> Vec<String> {
        self.installed.keys().cloned().collect()
    }

    fn remove(&mut self, identifier: &str) -> Result<(), ContentBlockingError> {
        self.ops.push(RuleStoreOp::Remove(identifier.to_string()));
        self.installed
            .remove(identifier)
            .map(|_| ())
            .ok_or_else(|| ContentBlockingError::Remove(identifier.to_string()))
    }

    fn compile(
        &mut self,
        identifier: &str,
        encoded_rules: &str,
    ) -> Result<(), ContentBlockingError> {
        self.ops.push(RuleStoreOp::Compile(identifier.to_string()));
        let rules: Value =
            serde_json::from_str(encoded_rules).map_err(|e| ContentBlockingError::Compile {
                identifier: identifier.to_string(),
                message: e.to_string(),
            })?;
        if !rules.is_array() {
            return Err(ContentBlockingError::Compile {
                identifier: identifier.to_string(),
                message: "rule list must be an array".to_string(),
            });
        }
        self.installed.insert(identifier.to_string(), rules);
        Ok(())
    }
}
