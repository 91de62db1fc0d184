use serde::{Deserialize, Serialize};

/// A visit handed to the persistence collaborator once the page metadata
/// has been joined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitRecord {
    pub url: String,
    pub title: String,
    pub favicon: Option<Vec<u8>>,
}
