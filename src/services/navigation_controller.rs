//! Per-tab navigation state machine.
//!
//! Every engine callback becomes a [`NavigationEvent`] fed through
//! [`NavigationController::handle_event`], which mutates the tab, drives the
//! rendering surface and returns the asynchronous [`NavigationTask`]s the owner
//! has to dispatch. Results of those tasks come back as events tagged with the
//! navigation they belong to; results for a superseded navigation are dropped.
//!
//! ```text
//! Idle -> Provisional -> (Redirected)* -> Committed -> Finished
//!         Provisional | Redirected | Committed -> Failed
//! ```

use std::collections::HashSet;

use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use crate::services::certificate_validator::CertificateValidator;
use crate::services::error_classifier::classify;
use crate::services::localization_engine::{LocalizationEngine, LocalizationEngineTrait};
use crate::surface::RenderingSurface;
use crate::types::certificate::{CertificateStatus, ServerTrust};
use crate::types::errors::NavigationError;
use crate::types::navigation::{
    is_internal, ErrorKind, ErrorPagePayload, InternalPage, LoadDecision, LoadError,
    NavigationEvent, NavigationPhase, NavigationTask, PageMetadata, SkipReason, Transition,
    BRIDGE_HANDLER,
};
use crate::types::tab::{HistorySite, Tab};

/// Script that forwards `hashchange` events to the bridge handler.
pub fn hash_change_listener_script() -> String {
    format!(
        "window.addEventListener('hashchange', function() {{\n  \
         window.webkit.messageHandlers.{BRIDGE_HANDLER}.postMessage({{\n    \
         name: \"hashChange\",\n    \
         value: window.location.href\n  \
         }});\n}});"
    )
}

/// Script handing the payload to the error page template.
pub fn error_page_script(payload: &ErrorPagePayload) -> String {
    let data = serde_json::to_value(payload).unwrap_or(Value::Null);
    format!("window.opacityPage.initPageData({data});")
}

/// Script running the engine's find for `term`.
pub fn find_script(term: &str, backwards: bool) -> String {
    let term = Value::String(term.to_string());
    format!("window.find({term}, false, {backwards}, true);")
}

/// Borrows what one dispatch needs: the active locale for error pages and
/// titles, and the session certificate cache.
pub struct NavigationController<'a> {
    localization: &'a LocalizationEngine,
    validator: &'a mut CertificateValidator,
}

impl<'a> NavigationController<'a> {
    pub fn new(
        localization: &'a LocalizationEngine,
        validator: &'a mut CertificateValidator,
    ) -> Self {
        Self {
            localization,
            validator,
        }
    }

    /// Single entry point for navigation events.
    pub fn handle_event(
        &mut self,
        tab: &mut Tab,
        surface: &mut dyn RenderingSurface,
        event: NavigationEvent,
    ) -> Transition {
        let from = tab.navigation.phase;
        let transition = match event {
            NavigationEvent::Started => self.on_started(tab, surface),
            NavigationEvent::Redirected => self.on_redirected(tab, surface),
            NavigationEvent::Committed => self.on_committed(tab, surface),
            NavigationEvent::Progress(value) => {
                if from.is_loading() {
                    tab.advance_progress(value);
                }
                Transition::to(from)
            }
            NavigationEvent::Finished => self.on_finished(tab, surface),
            NavigationEvent::Failed(error) => self.on_failed(tab, surface, &error),
            NavigationEvent::CredentialChallenge { check, host, trust } => {
                self.on_credential_challenge(tab, check, &host, &trust)
            }
            NavigationEvent::MetadataJoined {
                navigation,
                metadata,
            } => self.on_metadata_joined(tab, surface, navigation, metadata),
        };

        tab.navigation.phase = transition.phase;
        if from != transition.phase {
            debug!(tab_id = %tab.id, ?from, to = ?transition.phase, "Navigation transition");
        }
        transition
    }

    fn on_started(&mut self, tab: &mut Tab, surface: &dyn RenderingSurface) -> Transition {
        let state = &mut tab.navigation;
        state.navigation_id += 1;
        state.certificate_check = None;
        state.cached_title = None;
        state.cached_favicon = None;

        if !tab.is_error {
            tab.error_kind = None;
        }
        tab.progress = 0.0;
        tab.advance_progress(surface.estimated_progress());

        Transition::to(NavigationPhase::Provisional)
    }

    fn on_redirected(&mut self, tab: &mut Tab, surface: &dyn RenderingSurface) -> Transition {
        let phase = tab.navigation.phase;
        if !matches!(phase, NavigationPhase::Provisional | NavigationPhase::Redirected) {
            debug!(tab_id = %tab.id, ?phase, "Redirect outside provisional load ignored");
            return Transition::to(phase);
        }

        if let Some(url) = surface.url() {
            if url != tab.origin_url {
                info!(tab_id = %tab.id, from = %tab.origin_url, to = %url, "Server redirect");
                tab.redirect_url(url);
            }
        }
        Transition::to(NavigationPhase::Redirected)
    }

    fn on_committed(&mut self, tab: &mut Tab, surface: &dyn RenderingSurface) -> Transition {
        let phase = tab.navigation.phase;
        if !matches!(phase, NavigationPhase::Provisional | NavigationPhase::Redirected) {
            return Transition::to(phase);
        }
        tab.advance_progress(surface.estimated_progress());
        Transition::to(NavigationPhase::Committed)
    }

    fn on_finished(&mut self, tab: &mut Tab, surface: &mut dyn RenderingSurface) -> Transition {
        let phase = tab.navigation.phase;
        if !phase.is_loading() {
            debug!(tab_id = %tab.id, ?phase, "Finish without a load in flight ignored");
            return Transition::to(phase);
        }

        let navigation = tab.navigation.navigation_id;
        let mut transition = Transition::to(NavigationPhase::Finished);

        tab.progress = 1.0;
        tab.can_go_back = surface.can_go_back();
        tab.can_go_forward = surface.can_go_forward();
        tab.back_list = surface.back_list();
        tab.forward_list = surface.forward_list();

        let finished_url = surface.url();
        if let Some(url) = &finished_url {
            if is_internal(url) {
                // Keep the error page address out of the address bar.
                let origin = tab.origin_url.clone();
                tab.redirect_url(origin);
            } else {
                if *url != tab.origin_url {
                    tab.redirect_url(url.clone());
                }
                self.begin_certificate_check(tab, url);
                transition.tasks.push(NavigationTask::VerifyCertificate {
                    tab_id: tab.id,
                    check: navigation,
                    url: url.clone(),
                });
            }
        }

        let reachable: HashSet<Url> = tab.reachable_urls().cloned().collect();
        let before = tab.history_sites.len();
        tab.history_sites.retain(|site| reachable.contains(&site.url));
        if tab.history_sites.len() != before {
            let pruned = before - tab.history_sites.len();
            debug!(tab_id = %tab.id, pruned, "History sites pruned");
        }

        if tab.is_error {
            if let Some(payload) = self.error_payload(tab) {
                surface.run_script(&error_page_script(&payload));
            }
            tab.is_error = false;
        }

        surface.run_script(&hash_change_listener_script());

        if let Some(page_url) = finished_url {
            transition.tasks.push(NavigationTask::FetchMetadata {
                tab_id: tab.id,
                navigation,
                page_url,
            });
        }

        info!(tab_id = %tab.id, url = %tab.origin_url, "Load finished");
        transition
    }

    /// Resets the tab's certificate state for a new check, showing the cached
    /// summary for the host until the check answers.
    fn begin_certificate_check(&self, tab: &mut Tab, url: &Url) {
        tab.certificate = url
            .host_str()
            .and_then(|host| self.validator.cached_summary(host))
            .map(CertificateStatus::valid)
            .unwrap_or_else(CertificateStatus::invalid);
        tab.navigation.certificate_check = Some(tab.navigation.navigation_id);
    }

    fn on_failed(
        &mut self,
        tab: &mut Tab,
        surface: &mut dyn RenderingSurface,
        error: &LoadError,
    ) -> Transition {
        let phase = tab.navigation.phase;
        if !phase.is_loading() {
            debug!(tab_id = %tab.id, ?phase, "Failure without a load in flight ignored");
            return Transition::to(phase);
        }

        tab.advance_progress(surface.estimated_progress());

        let kind = classify(error);
        if kind.is_ignored() {
            debug!(tab_id = %tab.id, %error, "Load cancelled");
            return Transition::to(NavigationPhase::Idle);
        }

        warn!(tab_id = %tab.id, url = %tab.origin_url, %error, ?kind, "Load failed");
        tab.is_error = true;
        tab.error_kind = Some(kind);

        if let Some(url) = kind.page().and_then(InternalPage::url) {
            surface.load(&url);
        }
        Transition::to(NavigationPhase::Failed)
    }

    fn on_credential_challenge(
        &mut self,
        tab: &mut Tab,
        check: u64,
        host: &str,
        trust: &ServerTrust,
    ) -> Transition {
        let (verdict, disposition) = self.validator.validate(host, trust);

        if tab.navigation.certificate_check == Some(check) {
            tab.certificate = verdict.status();
            info!(tab_id = %tab.id, host, valid = verdict.is_valid(), "Certificate checked");
        } else {
            debug!(tab_id = %tab.id, host, check, "Stale certificate result discarded");
        }

        let mut transition = Transition::to(tab.navigation.phase);
        transition.disposition = Some(disposition);
        transition
    }

    fn on_metadata_joined(
        &mut self,
        tab: &mut Tab,
        surface: &dyn RenderingSurface,
        navigation: u64,
        metadata: PageMetadata,
    ) -> Transition {
        let phase = tab.navigation.phase;
        if navigation != tab.navigation.navigation_id {
            debug!(tab_id = %tab.id, navigation, "Stale page metadata discarded");
            return Transition::to(phase);
        }

        let PageMetadata { title, favicon_url } = metadata;
        tab.navigation.cached_title = title.clone();
        tab.navigation.cached_favicon = favicon_url.clone();
        if favicon_url.is_some() {
            tab.favicon_url = favicon_url.clone();
        }

        let mut transition = Transition::to(phase);
        let Some(title) = title else {
            return transition;
        };

        let page_url = surface.url().unwrap_or_else(|| tab.origin_url.clone());
        tab.title = self
            .title_override(&page_url)
            .unwrap_or_else(|| title.clone());

        tab.history_sites.push(HistorySite {
            title: title.clone(),
            url: tab.origin_url.clone(),
            favicon_url: favicon_url.clone(),
        });

        if let Some(favicon_url) = favicon_url {
            transition.tasks.push(NavigationTask::DownloadFavicon {
                visit_url: page_url,
                title,
                favicon_url,
            });
        }
        transition
    }

    /// Localized title for the settings and new tab pages.
    fn title_override(&self, url: &Url) -> Option<String> {
        match InternalPage::from_url(url)? {
            InternalPage::Settings => Some(self.localization.t("tabs.settings", None)),
            InternalPage::NewTab => Some(self.localization.t("tabs.new_tab", None)),
            _ => None,
        }
    }

    /// Data for the error page of the tab's current error kind.
    pub fn error_payload(&self, tab: &Tab) -> Option<ErrorPagePayload> {
        let kind = tab.error_kind?;
        let key = kind.locale_key()?;
        let button = match kind {
            ErrorKind::ContentBlocked => "error_page.go_back",
            _ => "error_page.refresh",
        };

        Some(ErrorPagePayload {
            lang: self.localization.get_locale().to_string(),
            href: tab.origin_url.to_string(),
            head_title: tab.print_url.clone(),
            title: self.localization.t(&format!("{key}.title"), None),
            refresh_btn: self.localization.t(button, None),
            message: self
                .localization
                .t_with(&format!("{key}.message"), "url", &tab.print_url),
        })
    }

    /// Decides whether the surface must load the tab's origin URL.
    pub fn sync_surface(tab: &mut Tab, surface: &mut dyn RenderingSurface) -> LoadDecision {
        if !tab.is_update_by_search && tab.is_error {
            return LoadDecision::Skipped(SkipReason::ErrorPagePending);
        }

        let searched = std::mem::take(&mut tab.is_update_by_search);
        if searched {
            tab.is_error = false;
            tab.error_kind = None;
        }

        let Some(current) = surface.url() else {
            surface.load(&tab.origin_url);
            return LoadDecision::LoadedOrigin;
        };

        if searched {
            debug!(tab_id = %tab.id, url = %tab.origin_url, "Loading searched address");
            surface.load(&tab.origin_url);
            return LoadDecision::ReloadedBySearch;
        }

        if current == tab.origin_url {
            LoadDecision::Skipped(SkipReason::AlreadyCurrent)
        } else {
            LoadDecision::Skipped(SkipReason::Diverged)
        }
    }

    /// Forwards a find request to the page.
    pub fn find_in_page(
        tab: &Tab,
        surface: &mut dyn RenderingSurface,
        term: &str,
        backwards: bool,
    ) -> Result<(), NavigationError> {
        if tab.is_error {
            return Err(NavigationError::ErrorPagePending);
        }
        if term.is_empty() {
            return Err(NavigationError::EmptyFindTerm);
        }
        surface.run_script(&find_script(term, backwards));
        Ok(())
    }
}
