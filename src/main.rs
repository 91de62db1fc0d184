//! Opacity: headless demo of the browser shell core.
//!
//! Opens two windows, drags tabs between them and drives one tab through a
//! failed load against an in-memory rendering surface. Set `RUST_LOG=debug`
//! to watch every transition.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;
use url::Url;

use opacity::app::{App, Collaborators};
use opacity::managers::tab_manager::TabCollectionTrait;
use opacity::managers::window_manager::WindowRegistryTrait;
use opacity::services::content_blocker::InMemoryRuleStore;
use opacity::services::favicon_loader::OfflineFaviconDownloader;
use opacity::services::localization_engine::LocalizationEngine;
use opacity::services::persistence::SqlitePersistence;
use opacity::services::settings_engine::SettingsEngine;
use opacity::surface::{RenderingSurface, ScriptEvaluator, TrustProbe};
use opacity::types::certificate::ServerTrust;
use opacity::types::errors::{ProbeError, ScriptError};
use opacity::types::navigation::{ChallengeDisposition, LoadError, NavigationEvent};
use opacity::types::tab::BackForwardItem;
use opacity::types::window::Point;

/// Surface that records loads and scripts instead of rendering.
struct HeadlessSurface {
    url: Option<Url>,
    scripts: Arc<Mutex<Vec<String>>>,
}

struct NoScripts;

#[async_trait]
impl ScriptEvaluator for NoScripts {
    async fn evaluate(&self, _script: &str) -> Result<Value, ScriptError> {
        Err(ScriptError::SurfaceGone)
    }
}

impl RenderingSurface for HeadlessSurface {
    fn url(&self) -> Option<Url> {
        self.url.clone()
    }
    fn estimated_progress(&self) -> f64 {
        0.1
    }
    fn can_go_back(&self) -> bool {
        false
    }
    fn can_go_forward(&self) -> bool {
        false
    }
    fn back_list(&self) -> Vec<BackForwardItem> {
        Vec::new()
    }
    fn forward_list(&self) -> Vec<BackForwardItem> {
        Vec::new()
    }
    fn load(&mut self, url: &Url) {
        info!(%url, "Surface load");
        self.url = Some(url.clone());
    }
    fn run_script(&mut self, script: &str) {
        if let Ok(mut scripts) = self.scripts.lock() {
            scripts.push(script.to_string());
        }
    }
    fn script_evaluator(&self) -> Arc<dyn ScriptEvaluator> {
        Arc::new(NoScripts)
    }
}

struct OfflineProbe;

#[async_trait]
impl TrustProbe for OfflineProbe {
    async fn probe(&self, url: &Url) -> Result<ServerTrust, ProbeError> {
        Err(ProbeError::Network(format!("offline demo: {url}")))
    }

    fn resolve(&self, url: &Url, disposition: ChallengeDisposition) {
        info!(%url, ?disposition, "Challenge answered");
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let dir = std::env::temp_dir().join("opacity-demo");
    let collaborators = Collaborators {
        persistence: Box::new(SqlitePersistence::in_memory()?),
        rule_store: Box::new(InMemoryRuleStore::new()),
        trust_probe: Arc::new(OfflineProbe),
        downloader: Arc::new(OfflineFaviconDownloader),
    };
    let mut app = App::new(
        SettingsEngine::new(Some(dir.join("settings.json"))),
        LocalizationEngine::new()?,
        collaborators,
        tokio::runtime::Handle::current(),
    );
    app.startup()?;

    let first = app.open_window(vec![
        Url::parse("https://example.com")?,
        Url::parse("https://rust-lang.org")?,
    ])?;
    let second = app.open_window(vec![Url::parse("https://docs.rs")?])?;

    let dragged = app
        .registry()
        .window(first)
        .and_then(|w| w.tabs.tab_order().first().copied())
        .ok_or("first window has no tabs")?;
    app.begin_drag(dragged, first);
    let outcome = app.drop_at(second, 0);
    app.end_drag();
    info!(?outcome, "Cross-window drop");

    let scripts = Arc::new(Mutex::new(Vec::new()));
    app.attach_surface(
        dragged,
        Box::new(HeadlessSurface {
            url: None,
            scripts: Arc::clone(&scripts),
        }),
    );
    app.sync_tab(dragged);
    app.handle_navigation(dragged, NavigationEvent::Started);
    app.handle_navigation(
        dragged,
        NavigationEvent::Failed(LoadError::new(
            -1003,
            "A server with the specified hostname could not be found.",
        )),
    );
    app.handle_navigation(dragged, NavigationEvent::Started);
    app.handle_navigation(dragged, NavigationEvent::Finished);

    if let Some(tab) = app.registry().tab(dragged) {
        info!(
            title = %tab.title,
            url = %tab.print_url,
            error = ?tab.error_kind,
            "Tab after failed load"
        );
    }
    if let Ok(scripts) = scripts.lock() {
        for script in scripts.iter() {
            info!(script = %script, "Injected");
        }
    }

    let outcome = app.drop_outside(Point::new(5000.0, 5000.0));
    info!(?outcome, windows = app.registry().window_count(), "Release without a drag");
    Ok(())
}
