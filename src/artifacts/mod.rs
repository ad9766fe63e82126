pub mod feed;
pub mod prettify;
pub mod template;

pub use feed::feed_xml;
pub use prettify::prettify;
pub use template::PageTemplate;

use crate::config::RunConfig;
use crate::error::{Result, ResultIoExt};
use crate::models::Snapshot;
use chrono::{Local, Utc};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Serialize the snapshot as a block-style YAML mapping
///
/// Fresh records take precedence over carried-over entries of the same name.
pub fn snapshot_yaml(snapshot: &Snapshot) -> Result<String> {
    let mut entries: BTreeMap<&str, serde_yaml::Value> = snapshot
        .carried_over
        .iter()
        .map(|(name, entry)| (name.as_str(), entry.clone()))
        .collect();

    for (name, record) in &snapshot.records {
        entries.insert(name, serde_yaml::to_value(record)?);
    }

    Ok(serde_yaml::to_string(&entries)?)
}

/// Render the page and write every configured artifact
///
/// Artifacts are written in the order YAML, HTML, feed, each overwriting any
/// previous file. A failure leaves earlier artifacts in place. Returns the
/// paths that were written.
pub async fn render_artifacts(
    snapshot: &Snapshot,
    config: &RunConfig,
    template: &PageTemplate,
) -> Result<Vec<PathBuf>> {
    let page = template.render(snapshot, config, Utc::now())?;
    let mut written = Vec::new();

    if let Some(path) = &config.files.yaml {
        write_artifact(path, snapshot_yaml(snapshot)?).await?;
        written.push(path.clone());
    }

    if let Some(path) = &config.files.html {
        write_artifact(path, prettify(&page)).await?;
        written.push(path.clone());
    }

    if let Some(path) = &config.files.feed {
        let xml = feed_xml(&snapshot.feed_items, config, Local::now());
        write_artifact(path, xml).await?;
        written.push(path.clone());
    }

    Ok(written)
}

async fn write_artifact(path: &Path, content: String) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await.map_io_err(parent)?;
    }

    fs::write(path, content).await.map_io_err(path)?;
    tracing::info!(path = %path.display(), "Wrote artifact");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PackageRecord;

    fn record(version: &str) -> PackageRecord {
        PackageRecord {
            version: version.to_string(),
            upload_time: None,
            days_ago: None,
            release_url: String::new(),
            author: String::new(),
            url: format!("http://x/nova-{version}.tar.gz"),
            package_url: String::new(),
            filename: format!("nova-{version}.tar.gz"),
            summary: String::new(),
        }
    }

    #[test]
    fn test_snapshot_yaml_sorted_by_name() {
        let mut snapshot = Snapshot::default();
        snapshot.records.insert("zeta".to_string(), record("1.0"));
        snapshot.records.insert("alpha".to_string(), record("2.0"));

        let yaml = snapshot_yaml(&snapshot).unwrap();
        let alpha = yaml.find("alpha:").unwrap();
        let zeta = yaml.find("zeta:").unwrap();
        assert!(alpha < zeta);
    }

    #[test]
    fn test_snapshot_yaml_keeps_carried_over_entries() {
        let mut snapshot = Snapshot::default();
        snapshot.records.insert("nova".to_string(), record("2.0"));
        snapshot.carried_over.insert(
            "nova".to_string(),
            serde_yaml::from_str("version: 1.0").unwrap(),
        );
        snapshot
            .carried_over
            .insert("cinder".to_string(), serde_yaml::from_str("{}").unwrap());

        let yaml = snapshot_yaml(&snapshot).unwrap();
        let parsed: BTreeMap<String, serde_yaml::Value> = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.keys().collect::<Vec<_>>(), vec!["cinder", "nova"]);
        assert_eq!(parsed["nova"]["version"].as_str(), Some("2.0"));
        assert!(parsed["cinder"].as_mapping().is_some_and(|m| m.is_empty()));
    }
}
