//! Collaborator seams towards the web engine.
//!
//! The core never renders anything. It reads state from a [`RenderingSurface`],
//! asks it to load URLs and run scripts, and hands asynchronous work to
//! [`ScriptEvaluator`], [`TrustProbe`] and [`FaviconDownloader`] implementations
//! that may run off the owner thread.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use crate::types::certificate::ServerTrust;
use crate::types::errors::{FaviconError, ProbeError, ScriptError};
use crate::types::navigation::ChallengeDisposition;
use crate::types::tab::BackForwardItem;

/// Evaluates a script in the page and returns its JSON result.
#[async_trait]
pub trait ScriptEvaluator: Send + Sync {
    async fn evaluate(&self, script: &str) -> Result<Value, ScriptError>;
}

/// The web view that backs one tab. Only used from the owner thread.
pub trait RenderingSurface {
    /// Currently committed URL, if anything has been loaded.
    fn url(&self) -> Option<Url>;
    /// Engine load estimate in `0.0..=1.0`.
    fn estimated_progress(&self) -> f64;
    fn can_go_back(&self) -> bool;
    fn can_go_forward(&self) -> bool;
    fn back_list(&self) -> Vec<BackForwardItem>;
    fn forward_list(&self) -> Vec<BackForwardItem>;
    /// Issues a navigation request.
    fn load(&mut self, url: &Url);
    /// Runs a script without waiting for its result.
    fn run_script(&mut self, script: &str);
    /// Handle for evaluating scripts from background tasks.
    fn script_evaluator(&self) -> Arc<dyn ScriptEvaluator>;
}

/// Server trust challenges raised by the engine for a loaded URL.
#[async_trait]
pub trait TrustProbe: Send + Sync {
    /// Opens the challenge for `url` and reports the server trust chain.
    async fn probe(&self, url: &Url) -> Result<ServerTrust, ProbeError>;
    /// Completes the challenge opened by [`probe`](TrustProbe::probe).
    fn resolve(&self, url: &Url, disposition: ChallengeDisposition);
}

/// Downloads favicon bytes.
#[async_trait]
pub trait FaviconDownloader: Send + Sync {
    async fn download(&self, url: &Url) -> Result<Vec<u8>, FaviconError>;
}
