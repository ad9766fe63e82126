use serde::{Deserialize, Serialize};

/// A downloadable artifact published for a release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseUrl {
    /// Download address of the artifact
    pub url: String,
    /// Upload timestamp as reported by the index, if any
    #[serde(default)]
    pub upload_time: Option<String>,
}

/// Descriptive metadata of a single release
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseMetadata {
    pub author: String,
    pub summary: String,
    pub release_url: String,
    pub package_url: String,
}
