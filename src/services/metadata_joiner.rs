//! Title and favicon fetch after a finished load.
//!
//! Both scripts run concurrently on the page; the result is only produced once
//! both have answered. The owner decides what to record from it.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::services::favicon_loader::{
    resolve_favicon_href, FAVICON_QUERY_SCRIPT, TITLE_QUERY_SCRIPT,
};
use crate::surface::{FaviconDownloader, ScriptEvaluator};
use crate::types::history::VisitRecord;
use crate::types::navigation::{is_internal, PageMetadata};

/// Fans out the title and favicon queries and joins them.
#[derive(Clone)]
pub struct MetadataJoiner {
    evaluator: Arc<dyn ScriptEvaluator>,
}

impl MetadataJoiner {
    pub fn new(evaluator: Arc<dyn ScriptEvaluator>) -> Self {
        Self { evaluator }
    }

    /// Reads the title and resolves the favicon of the page at `page_url`.
    pub async fn join(&self, page_url: &Url) -> PageMetadata {
        let (title, favicon_url) = tokio::join!(self.fetch_title(), self.fetch_favicon(page_url));
        debug!(
            url = %page_url,
            has_title = title.is_some(),
            has_favicon = favicon_url.is_some(),
            "Page metadata joined"
        );
        PageMetadata { title, favicon_url }
    }

    async fn fetch_title(&self) -> Option<String> {
        match self.evaluator.evaluate(TITLE_QUERY_SCRIPT).await {
            Ok(Value::String(title)) => Some(title),
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, "Title query failed");
                None
            }
        }
    }

    async fn fetch_favicon(&self, page_url: &Url) -> Option<Url> {
        if is_internal(page_url) {
            return None;
        }

        let href = match self.evaluator.evaluate(FAVICON_QUERY_SCRIPT).await {
            Ok(Value::String(href)) => Some(href),
            Ok(_) => None,
            Err(e) => {
                debug!(error = %e, "Favicon query failed, using fallback");
                None
            }
        };
        resolve_favicon_href(page_url, href.as_deref())
    }
}

/// Downloads the favicon and builds the visit to persist. A failed download
/// still yields the visit, without favicon bytes.
pub async fn build_visit(
    downloader: &dyn FaviconDownloader,
    visit_url: &Url,
    title: String,
    favicon_url: &Url,
) -> VisitRecord {
    let favicon = match downloader.download(favicon_url).await {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            warn!(url = %favicon_url, error = %e, "Favicon download failed");
            None
        }
    };

    VisitRecord {
        url: visit_url.to_string(),
        title,
        favicon,
    }
}
