use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use super::certificate::ServerTrust;
use super::tab::TabId;

/// Reserved scheme for app-rendered pages. Never sent over the network.
pub const INTERNAL_SCHEME: &str = "opacity";

/// Name of the script message handler the rendered page posts to.
pub const BRIDGE_HANDLER: &str = "opacityBrowser";

/// Pages served under the internal scheme, one host each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InternalPage {
    NotFindHost,
    NotConnectHost,
    OccurredSslError,
    NotConnectInternet,
    BlockedContent,
    Unknown,
    Settings,
    NewTab,
}

impl InternalPage {
    pub const ALL: [InternalPage; 8] = [
        InternalPage::NotFindHost,
        InternalPage::NotConnectHost,
        InternalPage::OccurredSslError,
        InternalPage::NotConnectInternet,
        InternalPage::BlockedContent,
        InternalPage::Unknown,
        InternalPage::Settings,
        InternalPage::NewTab,
    ];

    pub fn host(self) -> &'static str {
        match self {
            InternalPage::NotFindHost => "not-find-host",
            InternalPage::NotConnectHost => "not-connect-host",
            InternalPage::OccurredSslError => "occurred-ssl-error",
            InternalPage::NotConnectInternet => "not-connect-internet",
            InternalPage::BlockedContent => "blocked-content",
            InternalPage::Unknown => "unknown",
            InternalPage::Settings => "settings",
            InternalPage::NewTab => "new-tab",
        }
    }

    pub fn href(self) -> String {
        format!("{}://{}", INTERNAL_SCHEME, self.host())
    }

    pub fn url(self) -> Option<Url> {
        Url::parse(&self.href()).ok()
    }

    /// Resolves an internal URL back to its page. Returns `None` for any
    /// other scheme or an unrecognised host.
    pub fn from_url(url: &Url) -> Option<Self> {
        if !is_internal(url) {
            return None;
        }
        let host = url.host_str()?;
        Self::ALL.into_iter().find(|page| page.host() == host)
    }
}

/// Whether the URL uses the internal pseudo-scheme.
pub fn is_internal(url: &Url) -> bool {
    url.scheme() == INTERNAL_SCHEME
}

/// Semantic classification of a failed load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// User cancellation, or a load the engine interrupted on its own
    /// (policy change on download hand-off). Never surfaced.
    UserCancelled,
    ContentBlocked,
    HostNotFound,
    HostUnreachable,
    TlsFailure,
    NoConnectivity,
    Unknown,
}

impl ErrorKind {
    pub fn is_ignored(self) -> bool {
        matches!(self, ErrorKind::UserCancelled)
    }

    /// Error page that renders this kind.
    pub fn page(self) -> Option<InternalPage> {
        match self {
            ErrorKind::UserCancelled => None,
            ErrorKind::ContentBlocked => Some(InternalPage::BlockedContent),
            ErrorKind::HostNotFound => Some(InternalPage::NotFindHost),
            ErrorKind::HostUnreachable => Some(InternalPage::NotConnectHost),
            ErrorKind::TlsFailure => Some(InternalPage::OccurredSslError),
            ErrorKind::NoConnectivity => Some(InternalPage::NotConnectInternet),
            ErrorKind::Unknown => Some(InternalPage::Unknown),
        }
    }

    /// Localization key prefix for the error page texts.
    pub fn locale_key(self) -> Option<&'static str> {
        match self {
            ErrorKind::UserCancelled => None,
            ErrorKind::ContentBlocked => Some("error_page.blocked_content"),
            ErrorKind::HostNotFound => Some("error_page.not_find_host"),
            ErrorKind::HostUnreachable => Some("error_page.not_connect_host"),
            ErrorKind::TlsFailure => Some("error_page.occurred_ssl_error"),
            ErrorKind::NoConnectivity => Some("error_page.not_connect_internet"),
            ErrorKind::Unknown => Some("error_page.unknown"),
        }
    }
}

/// Raw failure reported by the rendering surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadError {
    pub code: i64,
    pub description: String,
}

impl LoadError {
    pub fn new(code: i64, description: impl Into<String>) -> Self {
        Self {
            code,
            description: description.into(),
        }
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.description, self.code)
    }
}

/// Phase of the current navigation of one tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NavigationPhase {
    #[default]
    Idle,
    Provisional,
    Redirected,
    Committed,
    Finished,
    Failed,
}

impl NavigationPhase {
    /// Phases in which a load is still in flight.
    pub fn is_loading(self) -> bool {
        matches!(
            self,
            NavigationPhase::Provisional | NavigationPhase::Redirected | NavigationPhase::Committed
        )
    }
}

/// Per-tab navigation bookkeeping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavigationState {
    pub phase: NavigationPhase,
    /// Incremented every time a navigation starts.
    pub navigation_id: u64,
    /// Navigation whose certificate verdict may still update the tab.
    pub certificate_check: Option<u64>,
    pub cached_title: Option<String>,
    pub cached_favicon: Option<Url>,
}

/// Typed events fed into the navigation controller.
#[derive(Debug, Clone)]
pub enum NavigationEvent {
    Started,
    Redirected,
    Committed,
    Progress(f64),
    Finished,
    Failed(LoadError),
    CredentialChallenge {
        check: u64,
        host: String,
        trust: ServerTrust,
    },
    MetadataJoined {
        navigation: u64,
        metadata: PageMetadata,
    },
}

/// Asynchronous work the owner must dispatch after a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum NavigationTask {
    VerifyCertificate {
        tab_id: TabId,
        check: u64,
        url: Url,
    },
    FetchMetadata {
        tab_id: TabId,
        navigation: u64,
        page_url: Url,
    },
    DownloadFavicon {
        visit_url: Url,
        title: String,
        favicon_url: Url,
    },
}

/// Server answer to a credential challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeDisposition {
    UseCredential,
    CancelChallenge,
}

/// Result of feeding one event to the controller.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub phase: NavigationPhase,
    pub tasks: Vec<NavigationTask>,
    pub disposition: Option<ChallengeDisposition>,
}

impl Transition {
    pub fn to(phase: NavigationPhase) -> Self {
        Self {
            phase,
            tasks: Vec::new(),
            disposition: None,
        }
    }
}

/// Why a surface sync did not issue a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    ErrorPagePending,
    AlreadyCurrent,
    Diverged,
}

/// What `sync_surface` did with the rendering surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadDecision {
    LoadedOrigin,
    ReloadedBySearch,
    Skipped(SkipReason),
}

/// Title and favicon gathered after a finished load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMetadata {
    pub title: Option<String>,
    pub favicon_url: Option<Url>,
}

/// Data handed to the error page template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPagePayload {
    pub lang: String,
    pub href: String,
    pub head_title: String,
    pub title: String,
    pub refresh_btn: String,
    pub message: String,
}

/// Message posted by a rendered page through the script bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptMessage {
    pub name: String,
    pub value: String,
}

impl ScriptMessage {
    pub fn is_hash_change(&self) -> bool {
        self.name == "hashChange"
    }
}
