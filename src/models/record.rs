use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Latest known release of one tracked package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRecord {
    /// Latest release identifier
    pub version: String,
    /// Upload time of the first artifact (UTC)
    #[serde(
        default,
        with = "snapshot_time",
        skip_serializing_if = "Option::is_none"
    )]
    pub upload_time: Option<NaiveDateTime>,
    /// Whole days between the upload and the run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_ago: Option<u64>,
    pub release_url: String,
    pub author: String,
    /// Chosen download address
    pub url: String,
    pub package_url: String,
    /// Final path segment of `url`
    pub filename: String,
    pub summary: String,
}

/// One RSS entry announcing a release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    pub title: String,
    pub author: String,
    pub link: String,
    pub description: String,
    pub pub_date: Option<NaiveDateTime>,
    /// Hex digest identifying the (package, version) pair
    pub guid: String,
}

impl FeedItem {
    pub fn from_record(package: &str, record: &PackageRecord, guid: String) -> Self {
        Self {
            title: format!("{} - {}", package, record.version),
            author: record.author.clone(),
            link: record.release_url.clone(),
            description: record.summary.clone(),
            pub_date: record.upload_time,
            guid,
        }
    }
}

/// Result of one polling pass over the configured packages
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub records: BTreeMap<String, PackageRecord>,
    /// Feed entries in package-iteration order
    pub feed_items: Vec<FeedItem>,
    /// Previous snapshot entries of skipped packages, written back unchanged
    pub carried_over: BTreeMap<String, serde_yaml::Value>,
}

/// `YYYY-MM-DD HH:MM:SS` representation used in the YAML snapshot
mod snapshot_time {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(time) => serializer.serialize_str(&time.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|s| NaiveDateTime::parse_from_str(&s, FORMAT).map_err(serde::de::Error::custom))
            .transpose()
    }
}
