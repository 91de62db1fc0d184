//! Favicon discovery and download.
//!
//! [`resolve_favicon_href`] turns whatever the page's `<link rel*=icon>`
//! attribute holds into an absolute URL. [`HttpFaviconDownloader`] fetches the
//! bytes for the visit history.

use async_trait::async_trait;
use url::Url;

use crate::surface::FaviconDownloader;
use crate::types::errors::FaviconError;
use crate::types::navigation::is_internal;

/// Reads the first icon link's raw `href` attribute.
pub const FAVICON_QUERY_SCRIPT: &str =
    "document.querySelector(\"link[rel*='icon']\").getAttribute(\"href\")";

/// Reads the document title.
pub const TITLE_QUERY_SCRIPT: &str = "document.title";

/// Resolves a favicon reference found on the page at `current`.
///
/// Line breaks and tabs are stripped from `href` first. A missing or blank
/// reference falls back to `/favicon.ico` on the page's origin. Internal
/// pages never have a favicon.
pub fn resolve_favicon_href(current: &Url, href: Option<&str>) -> Option<Url> {
    if is_internal(current) {
        return None;
    }

    let cleaned: Option<String> = href
        .map(|raw| raw.chars().filter(|c| !matches!(c, '\n' | '\r' | '\t')).collect())
        .filter(|s: &String| !s.is_empty());

    let resolved = match cleaned.as_deref() {
        Some(href) if href.starts_with("http") => Url::parse(href).ok(),
        Some(href) if href.starts_with("//") => Url::parse(&format!("https:{href}")).ok(),
        Some(href) if href.starts_with('/') => with_absolute_path(current, href),
        Some(href) => current.join(href).ok(),
        None => None,
    };

    resolved.or_else(|| fallback_favicon(current))
}

/// `/favicon.ico` on the origin of `current`.
pub fn fallback_favicon(current: &Url) -> Option<Url> {
    if is_internal(current) || current.cannot_be_a_base() {
        return None;
    }
    current.join("/favicon.ico").ok()
}

/// Replaces the path and query of `current` with those in `href`, keeping
/// scheme, host and port.
fn with_absolute_path(current: &Url, href: &str) -> Option<Url> {
    if current.cannot_be_a_base() {
        return None;
    }
    let (path, query) = match href.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (href, None),
    };

    let mut url = current.clone();
    url.set_path(path);
    url.set_query(query);
    url.set_fragment(None);
    Some(url)
}

#[cfg(feature = "network")]
pub use http::HttpFaviconDownloader;

#[cfg(feature = "network")]
mod http {
    use std::time::Duration;

    use reqwest::Client;
    use tracing::debug;

    use super::*;

    const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

    /// Downloads favicons over HTTP(S) with `reqwest`.
    #[derive(Debug, Clone)]
    pub struct HttpFaviconDownloader {
        client: Client,
    }

    impl HttpFaviconDownloader {
        pub fn new() -> Result<Self, FaviconError> {
            let client = Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .map_err(|e| FaviconError::Network(e.to_string()))?;
            Ok(Self { client })
        }
    }

    #[async_trait]
    impl FaviconDownloader for HttpFaviconDownloader {
        async fn download(&self, url: &Url) -> Result<Vec<u8>, FaviconError> {
            let response = self
                .client
                .get(url.clone())
                .send()
                .await
                .map_err(|e| FaviconError::Network(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(FaviconError::Status(status.as_u16()));
            }

            let bytes = response
                .bytes()
                .await
                .map_err(|e| FaviconError::Network(e.to_string()))?;
            debug!(url = %url, size = bytes.len(), "Favicon downloaded");
            Ok(bytes.to_vec())
        }
    }
}

/// Downloader for builds without networking; every download fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineFaviconDownloader;

#[async_trait]
impl FaviconDownloader for OfflineFaviconDownloader {
    async fn download(&self, _url: &Url) -> Result<Vec<u8>, FaviconError> {
        Err(FaviconError::Unavailable)
    }
}
