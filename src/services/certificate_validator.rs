//! Server trust validation against the navigated host.
//!
//! A chain is accepted when the platform already trusts it and one of its
//! certificates carries a subject alternative name matching the host. The
//! first matching certificate's subject summary is cached per host for the
//! session; a failed validation drops the host's entry.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::types::certificate::{CertificateVerdict, ServerTrust};
use crate::types::navigation::ChallengeDisposition;

/// Summary shown when a matching certificate carries none.
const UNKNOWN_SUMMARY: &str = "Unknown";

/// Whether a SAN `pattern` covers `host`.
///
/// Exact names match case-insensitively. A `*.suffix` pattern matches hosts
/// exactly one label longer than `suffix` whose trailing labels equal it.
pub fn matches_domain(pattern: &str, host: &str) -> bool {
    let pattern = pattern.to_ascii_lowercase();
    let host = host.to_ascii_lowercase();

    if pattern == host {
        return true;
    }

    let Some(suffix) = pattern.strip_prefix("*.") else {
        return false;
    };
    if suffix.is_empty() {
        return false;
    }

    match host.split_once('.') {
        Some((label, rest)) => !label.is_empty() && rest == suffix,
        None => false,
    }
}

/// Validates trust chains and remembers the accepted subject per host.
#[derive(Debug, Default)]
pub struct CertificateValidator {
    cache: HashMap<String, String>,
}

impl CertificateValidator {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
        }
    }

    /// Summary cached by the last successful validation of `host`.
    pub fn cached_summary(&self, host: &str) -> Option<&str> {
        self.cache.get(host).map(String::as_str)
    }

    /// Evaluates `trust` for `host` and answers the credential challenge.
    pub fn validate(
        &mut self,
        host: &str,
        trust: &ServerTrust,
    ) -> (CertificateVerdict, ChallengeDisposition) {
        if !trust.trusted {
            warn!(host, "Server trust evaluation failed");
            return self.reject(host);
        }

        let matching = trust.chain.iter().find(|cert| {
            cert.subject_name.is_some()
                && cert
                    .subject_alt_names
                    .iter()
                    .any(|name| matches_domain(name, host))
        });

        let Some(cert) = matching else {
            warn!(host, chain_len = trust.chain.len(), "No certificate matches host");
            return self.reject(host);
        };

        let summary = cert
            .subject_summary
            .clone()
            .unwrap_or_else(|| UNKNOWN_SUMMARY.to_string());
        self.cache.insert(host.to_string(), summary.clone());
        debug!(host, summary = %summary, "Certificate accepted");

        (
            CertificateVerdict::Valid { summary },
            ChallengeDisposition::UseCredential,
        )
    }

    fn reject(&mut self, host: &str) -> (CertificateVerdict, ChallengeDisposition) {
        self.cache.remove(host);
        (CertificateVerdict::Invalid, ChallengeDisposition::CancelChallenge)
    }
}
