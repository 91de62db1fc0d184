//! App core for Opacity.
//!
//! [`App`] is the single logical owner of every window, tab, drag session and
//! engine. Background work (trust probes, metadata joins, favicon downloads)
//! runs on tokio and reports back through a [`ShellMessage`] channel; nothing
//! touches tab or window state until [`App::process_pending`] or
//! [`App::process_next`] applies the message on the owner.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};
use url::Url;

use crate::managers::drag_coordinator::{DragCoordinator, DropOutcome};
use crate::managers::window_manager::{CloseOutcome, WindowRegistry, WindowRegistryTrait};
use crate::services::certificate_validator::CertificateValidator;
use crate::services::content_blocker::{ContentBlocker, ContentRuleStore};
use crate::services::localization_engine::{LocalizationEngine, LocalizationEngineTrait};
use crate::services::metadata_joiner::{build_visit, MetadataJoiner};
use crate::services::navigation_controller::NavigationController;
use crate::services::persistence::PersistenceSink;
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::surface::{FaviconDownloader, RenderingSurface, TrustProbe};
use crate::types::bookmark::BookmarkMutation;
use crate::types::errors::{AppError, NavigationError, SettingsError};
use crate::types::history::VisitRecord;
use crate::types::navigation::{
    ChallengeDisposition, LoadDecision, NavigationEvent, NavigationTask, ScriptMessage, Transition,
};
use crate::types::privacy::BlockingLevel;
use crate::types::tab::TabId;
use crate::types::window::{Point, Rect, WindowId};

/// Results of background work, marshaled back to the owner.
#[derive(Debug)]
pub enum ShellMessage {
    Navigation {
        tab_id: TabId,
        event: NavigationEvent,
    },
    /// A credential challenge waiting for the validator's answer.
    Challenge {
        tab_id: TabId,
        event: NavigationEvent,
        responder: oneshot::Sender<ChallengeDisposition>,
    },
    VisitReady(VisitRecord),
}

/// External collaborators the owner hands work to.
pub struct Collaborators {
    pub persistence: Box<dyn PersistenceSink>,
    pub rule_store: Box<dyn ContentRuleStore>,
    pub trust_probe: Arc<dyn TrustProbe>,
    pub downloader: Arc<dyn FaviconDownloader>,
}

/// Central application struct holding all managers and services.
pub struct App {
    registry: WindowRegistry,
    drag: DragCoordinator,
    validator: CertificateValidator,
    localization: LocalizationEngine,
    settings: SettingsEngine,
    content_blocker: ContentBlocker,
    rule_store: Box<dyn ContentRuleStore>,
    persistence: Box<dyn PersistenceSink>,
    trust_probe: Arc<dyn TrustProbe>,
    downloader: Arc<dyn FaviconDownloader>,
    surfaces: HashMap<TabId, Box<dyn RenderingSurface>>,
    runtime: Handle,
    sender: UnboundedSender<ShellMessage>,
    receiver: UnboundedReceiver<ShellMessage>,
}

impl App {
    /// Creates the owner. Background work is spawned on `runtime`.
    pub fn new(
        settings: SettingsEngine,
        localization: LocalizationEngine,
        collaborators: Collaborators,
        runtime: Handle,
    ) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let Collaborators {
            persistence,
            rule_store,
            trust_probe,
            downloader,
        } = collaborators;

        Self {
            registry: WindowRegistry::new(),
            drag: DragCoordinator::new(),
            validator: CertificateValidator::new(),
            localization,
            settings,
            content_blocker: ContentBlocker::new(),
            rule_store,
            persistence,
            trust_probe,
            downloader,
            surfaces: HashMap::new(),
            runtime,
            sender,
            receiver,
        }
    }

    /// Startup sequence: load settings, pick the locale, install content rules.
    pub fn startup(&mut self) -> Result<(), AppError> {
        let settings = self.settings.load()?;

        let language = settings.general.language;
        if self.localization.set_locale(&language).is_err() {
            let detected = self.localization.detect_system_locale();
            warn!(language = %language, fallback = %detected, "Configured language unavailable");
            let _ = self.localization.set_locale(&detected);
        }

        self.content_blocker
            .apply(settings.privacy.blocking_level, self.rule_store.as_mut())?;

        info!(
            locale = self.localization.get_locale(),
            blocking_level = ?settings.privacy.blocking_level,
            "Application started"
        );
        Ok(())
    }

    pub fn registry(&self) -> &WindowRegistry {
        &self.registry
    }

    pub fn drag(&self) -> &DragCoordinator {
        &self.drag
    }

    pub fn validator(&self) -> &CertificateValidator {
        &self.validator
    }

    pub fn localization(&self) -> &LocalizationEngine {
        &self.localization
    }

    pub fn settings(&self) -> &SettingsEngine {
        &self.settings
    }

    pub fn content_blocker(&self) -> &ContentBlocker {
        &self.content_blocker
    }

    // --- Windows and tabs ---

    /// Opens a window sized from the window settings with one tab per URL.
    pub fn open_window(&mut self, urls: Vec<Url>) -> Result<WindowId, AppError> {
        let size = &self.settings.get_settings().window;
        let frame = Rect::new(0.0, 0.0, size.width, size.height);
        Ok(self.registry.open_window(frame, urls)?)
    }

    pub fn new_tab(&mut self, window_id: WindowId, url: Url) -> Result<TabId, AppError> {
        Ok(self.registry.new_tab(window_id, url)?)
    }

    /// Closes a tab and releases its surface. The exit path removes nothing.
    pub fn close_tab(
        &mut self,
        window_id: WindowId,
        tab_id: TabId,
    ) -> Result<CloseOutcome, AppError> {
        let outcome = self.registry.close_tab(window_id, tab_id)?;
        if outcome != CloseOutcome::ExitApplication {
            self.surfaces.remove(&tab_id);
        }
        Ok(outcome)
    }

    /// Binds the rendering surface the presentation layer created for a tab.
    pub fn attach_surface(&mut self, tab_id: TabId, surface: Box<dyn RenderingSurface>) {
        self.surfaces.insert(tab_id, surface);
    }

    // --- Drag protocol ---

    pub fn begin_drag(&mut self, tab_id: TabId, source_window: WindowId) -> bool {
        self.drag.begin_drag(&mut self.registry, tab_id, source_window)
    }

    pub fn drop_at(&mut self, target_window: WindowId, target_index: usize) -> DropOutcome {
        self.drag
            .drop_at(&mut self.registry, target_window, target_index)
    }

    /// Releases the dragged tab at `point`, measured against the frame of
    /// the window the drag started in.
    pub fn drop_outside(&mut self, point: Point) -> DropOutcome {
        let frame = self
            .drag
            .session()
            .and_then(|session| self.registry.window(session.source_window))
            .map(|window| window.frame)
            .unwrap_or_default();
        self.drag.drop_outside(&mut self.registry, point, frame)
    }

    pub fn end_drag(&mut self) {
        self.drag.end_drag();
    }

    // --- Navigation ---

    /// Points the tab at a user-typed address and loads it.
    pub fn navigate(&mut self, tab_id: TabId, url: Url) -> Option<LoadDecision> {
        self.registry.tab_mut(tab_id)?.request_search(url);
        self.sync_tab(tab_id)
    }

    /// Loads the tab's origin URL into its surface when needed.
    pub fn sync_tab(&mut self, tab_id: TabId) -> Option<LoadDecision> {
        let tab = self.registry.tab_mut(tab_id)?;
        let surface = self.surfaces.get_mut(&tab_id)?;
        let decision = NavigationController::sync_surface(tab, surface.as_mut());
        debug!(tab_id = %tab_id, ?decision, "Surface synced");
        Some(decision)
    }

    pub fn find_in_page(
        &mut self,
        tab_id: TabId,
        term: &str,
        backwards: bool,
    ) -> Result<(), NavigationError> {
        let (Some(tab), Some(surface)) =
            (self.registry.tab(tab_id), self.surfaces.get_mut(&tab_id))
        else {
            return Err(NavigationError::NoSurface(tab_id.to_string()));
        };
        NavigationController::find_in_page(tab, surface.as_mut(), term, backwards)
    }

    /// Feeds one navigation event to the tab's state machine and dispatches
    /// the work it asks for. Returns `None` for unknown or detached tabs.
    pub fn handle_navigation(
        &mut self,
        tab_id: TabId,
        event: NavigationEvent,
    ) -> Option<Transition> {
        let Some(tab) = self.registry.tab_mut(tab_id) else {
            debug!(tab_id = %tab_id, "Event for closed tab dropped");
            return None;
        };
        let surface = self.surfaces.get_mut(&tab_id)?;

        let mut controller = NavigationController::new(&self.localization, &mut self.validator);
        let transition = controller.handle_event(tab, surface.as_mut(), event);

        for task in &transition.tasks {
            self.dispatch(task.clone());
        }
        Some(transition)
    }

    fn dispatch(&self, task: NavigationTask) {
        let sender = self.sender.clone();
        match task {
            NavigationTask::VerifyCertificate { tab_id, check, url } => {
                let Some(host) = url.host_str().map(str::to_string) else {
                    return;
                };
                let probe = Arc::clone(&self.trust_probe);
                self.runtime.spawn(async move {
                    let trust = match probe.probe(&url).await {
                        Ok(trust) => trust,
                        Err(e) => {
                            warn!(tab_id = %tab_id, error = %e, "Trust probe failed");
                            return;
                        }
                    };

                    let (responder, answer) = oneshot::channel();
                    let event = NavigationEvent::CredentialChallenge { check, host, trust };
                    send(
                        &sender,
                        ShellMessage::Challenge {
                            tab_id,
                            event,
                            responder,
                        },
                    );
                    // An owner that went away never accepts the credential.
                    let disposition = answer.await.unwrap_or(ChallengeDisposition::CancelChallenge);
                    probe.resolve(&url, disposition);
                });
            }
            NavigationTask::FetchMetadata {
                tab_id,
                navigation,
                page_url,
            } => {
                let Some(surface) = self.surfaces.get(&tab_id) else {
                    return;
                };
                let joiner = MetadataJoiner::new(surface.script_evaluator());
                self.runtime.spawn(async move {
                    let metadata = joiner.join(&page_url).await;
                    let event = NavigationEvent::MetadataJoined {
                        navigation,
                        metadata,
                    };
                    send(&sender, ShellMessage::Navigation { tab_id, event });
                });
            }
            NavigationTask::DownloadFavicon {
                visit_url,
                title,
                favicon_url,
            } => {
                let downloader = Arc::clone(&self.downloader);
                self.runtime.spawn(async move {
                    let visit =
                        build_visit(downloader.as_ref(), &visit_url, title, &favicon_url).await;
                    send(&sender, ShellMessage::VisitReady(visit));
                });
            }
        }
    }

    fn apply(&mut self, message: ShellMessage) {
        match message {
            ShellMessage::Navigation { tab_id, event } => {
                self.handle_navigation(tab_id, event);
            }
            ShellMessage::Challenge {
                tab_id,
                event,
                responder,
            } => {
                let disposition = self
                    .handle_navigation(tab_id, event)
                    .and_then(|transition| transition.disposition)
                    .unwrap_or(ChallengeDisposition::CancelChallenge);
                if responder.send(disposition).is_err() {
                    debug!(tab_id = %tab_id, "Challenge task is gone, answer dropped");
                }
            }
            ShellMessage::VisitReady(visit) => {
                if let Err(e) = self.persistence.add_visit(&visit) {
                    warn!(url = %visit.url, error = %e, "Failed to persist visit");
                }
            }
        }
    }

    /// Applies every message that has already arrived. Never blocks.
    pub fn process_pending(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(message) = self.receiver.try_recv() {
            self.apply(message);
            applied += 1;
        }
        applied
    }

    /// Waits for the next message and applies it.
    pub async fn process_next(&mut self) -> bool {
        match self.receiver.recv().await {
            Some(message) => {
                self.apply(message);
                true
            }
            None => false,
        }
    }

    /// Parses a message posted through the script bridge.
    pub fn handle_script_message(&self, tab_id: TabId, body: Value) -> Option<ScriptMessage> {
        match serde_json::from_value::<ScriptMessage>(body) {
            Ok(message) => {
                if message.is_hash_change() {
                    debug!(tab_id = %tab_id, location = %message.value, "Hash changed");
                }
                Some(message)
            }
            Err(e) => {
                warn!(tab_id = %tab_id, error = %e, "Malformed script message");
                None
            }
        }
    }

    // --- Settings and persistence ---

    /// Stores the new level and swaps the installed content rules.
    pub fn set_blocking_level(&mut self, level: BlockingLevel) -> Result<(), AppError> {
        let value = serde_json::to_value(level)
            .map_err(|e| SettingsError::SerializationError(e.to_string()))?;
        self.settings.set_value("privacy.blocking_level", value)?;
        if self.content_blocker.current_level() == Some(level) {
            debug!(?level, "Blocking level unchanged, rules kept");
            return Ok(());
        }
        self.content_blocker.apply(level, self.rule_store.as_mut())?;
        Ok(())
    }

    pub fn apply_bookmark(
        &mut self,
        mutation: BookmarkMutation,
    ) -> Result<Option<String>, AppError> {
        self.persistence.apply_bookmark(mutation)
    }
}

fn send(sender: &UnboundedSender<ShellMessage>, message: ShellMessage) {
    if sender.send(message).is_err() {
        debug!("Owner is gone, background result dropped");
    }
}
