use serde::{Deserialize, Serialize};

/// One certificate of a server trust chain, reduced to the fields host
/// matching needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateInfo {
    /// Subject distinguished name. Certificates without one never match.
    pub subject_name: Option<String>,
    /// Human readable subject summary shown in the address bar.
    pub subject_summary: Option<String>,
    pub subject_alt_names: Vec<String>,
}

/// A trust chain as received from a TLS handshake, with the platform trust
/// evaluation already applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerTrust {
    pub trusted: bool,
    pub chain: Vec<CertificateInfo>,
}

/// Certificate state of a tab, as shown to the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateStatus {
    pub summary: String,
    pub is_valid: bool,
}

impl CertificateStatus {
    pub fn valid(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            is_valid: true,
        }
    }

    pub fn invalid() -> Self {
        Self::default()
    }
}

/// Outcome of validating a chain against a host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CertificateVerdict {
    Valid { summary: String },
    Invalid,
}

impl CertificateVerdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, CertificateVerdict::Valid { .. })
    }

    pub fn status(&self) -> CertificateStatus {
        match self {
            CertificateVerdict::Valid { summary } => CertificateStatus::valid(summary.clone()),
            CertificateVerdict::Invalid => CertificateStatus::invalid(),
        }
    }
}
