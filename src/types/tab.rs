use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use super::certificate::CertificateStatus;
use super::navigation::{ErrorKind, NavigationState};

/// Stable identity of a tab across windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TabId(Uuid);

impl TabId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TabId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One entry of the rendering surface's back/forward list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackForwardItem {
    pub url: Url,
    pub title: Option<String>,
}

/// A site visited during this tab's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistorySite {
    pub title: String,
    pub url: Url,
    pub favicon_url: Option<Url>,
}

/// Represents a browser tab with its current state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tab {
    pub id: TabId,
    /// The address the tab is meant to show. Loads and history use it.
    pub origin_url: Url,
    /// The address as displayed in the address bar.
    pub print_url: String,
    pub title: String,
    pub favicon_url: Option<Url>,
    pub progress: f64,
    pub can_go_back: bool,
    pub can_go_forward: bool,
    pub back_list: Vec<BackForwardItem>,
    pub forward_list: Vec<BackForwardItem>,
    /// Set while an error page is being substituted for a failed load.
    pub is_error: bool,
    pub error_kind: Option<ErrorKind>,
    pub certificate: CertificateStatus,
    pub history_sites: Vec<HistorySite>,
    /// Set when the user typed a new address or query for this tab.
    pub is_update_by_search: bool,
    #[serde(skip)]
    pub navigation: NavigationState,
}

impl Tab {
    pub fn new(url: Url) -> Self {
        Self {
            id: TabId::new(),
            print_url: url.to_string(),
            title: url.to_string(),
            origin_url: url,
            favicon_url: None,
            progress: 0.0,
            can_go_back: false,
            can_go_forward: false,
            back_list: Vec::new(),
            forward_list: Vec::new(),
            is_error: false,
            error_kind: None,
            certificate: CertificateStatus::default(),
            history_sites: Vec::new(),
            is_update_by_search: false,
            navigation: NavigationState::default(),
        }
    }

    /// Adopts a URL reported by the engine as the tab's address without
    /// issuing a load.
    pub fn redirect_url(&mut self, url: Url) {
        self.print_url = url.to_string();
        self.origin_url = url;
    }

    /// Records a user-typed address; the next surface sync reloads it.
    pub fn request_search(&mut self, url: Url) {
        self.redirect_url(url);
        self.is_update_by_search = true;
    }

    /// Raises the progress, never lowering it within one navigation.
    pub fn advance_progress(&mut self, value: f64) {
        let value = value.clamp(0.0, 1.0);
        if value > self.progress {
            self.progress = value;
        }
    }

    /// URLs reachable through the back and forward lists.
    pub fn reachable_urls(&self) -> impl Iterator<Item = &Url> {
        self.back_list
            .iter()
            .chain(self.forward_list.iter())
            .map(|item| &item.url)
    }
}
