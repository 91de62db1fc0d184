//! Maps raw load failure codes to [`ErrorKind`]s.

use tracing::debug;

use crate::types::navigation::{ErrorKind, LoadError};

/// Low-level codes reported by the rendering surface.
pub mod codes {
    pub const CANCELLED: i64 = -999;
    pub const CANNOT_FIND_HOST: i64 = -1003;
    pub const CANNOT_CONNECT_TO_HOST: i64 = -1004;
    pub const NOT_CONNECTED_TO_INTERNET: i64 = -1009;
    pub const SECURE_CONNECTION_FAILED: i64 = -1200;
    pub const SERVER_CERTIFICATE_HAS_BAD_DATE: i64 = -1201;
    /// Frame load interrupted because the response is handed to a download.
    pub const FRAME_LOAD_INTERRUPTED_BY_POLICY_CHANGE: i64 = 102;
    /// Load blocked by an installed content rule list.
    pub const CONTENT_BLOCKED: i64 = 104;
}

/// Total over all codes; anything unrecognised is [`ErrorKind::Unknown`].
pub fn classify(error: &LoadError) -> ErrorKind {
    let kind = match error.code {
        codes::CANCELLED | codes::FRAME_LOAD_INTERRUPTED_BY_POLICY_CHANGE => {
            ErrorKind::UserCancelled
        }
        codes::CONTENT_BLOCKED => ErrorKind::ContentBlocked,
        codes::CANNOT_FIND_HOST => ErrorKind::HostNotFound,
        codes::CANNOT_CONNECT_TO_HOST => ErrorKind::HostUnreachable,
        codes::SECURE_CONNECTION_FAILED | codes::SERVER_CERTIFICATE_HAS_BAD_DATE => {
            ErrorKind::TlsFailure
        }
        codes::NOT_CONNECTED_TO_INTERNET => ErrorKind::NoConnectivity,
        _ => ErrorKind::Unknown,
    };
    debug!(code = error.code, ?kind, "Load error classified");
    kind
}
