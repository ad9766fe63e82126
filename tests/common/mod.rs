#![allow(dead_code)]

use pypi_versions::config::{FilesConfig, RunConfig};
use pypi_versions::error::{Error, Result};
use pypi_versions::index::PackageIndex;
use pypi_versions::models::{ReleaseMetadata, ReleaseUrl};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;

pub const TEMPLATE: &str = r#"<!DOCTYPE html>
<html><head><title>{{ title }}</title><link rel="alternate" href="{{ feed_url }}"></head>
<body><h1>{{ title }}</h1><table>
{% for name, pkg in packages %}<tr><td>{{ name }}</td><td>{{ pkg.version }}</td><td>{{ pkg.filename }}</td></tr>
{% endfor %}</table><p>Updated {{ timestamp }}</p></body></html>
"#;

/// Canned index responses for one package
#[derive(Default, Clone)]
pub struct FakePackage {
    pub releases: Vec<String>,
    pub urls: Vec<ReleaseUrl>,
    pub metadata: ReleaseMetadata,
}

/// In-memory index that records every query it receives
#[derive(Default)]
pub struct FakeIndex {
    pub packages: HashMap<String, FakePackage>,
    pub failing: Option<String>,
    pub calls: RefCell<Vec<String>>,
}

impl FakeIndex {
    pub fn with(mut self, name: &str, package: FakePackage) -> Self {
        self.packages.insert(name.to_string(), package);
        self
    }

    pub fn failing_on(mut self, name: &str) -> Self {
        self.failing = Some(name.to_string());
        self
    }

    fn lookup(&self, call: String, name: &str) -> Result<Option<&FakePackage>> {
        self.calls.borrow_mut().push(call);
        if self.failing.as_deref() == Some(name) {
            return Err(Error::MalformedResponse {
                package: name.to_string(),
                msg: "connection reset".to_string(),
            });
        }
        Ok(self.packages.get(name))
    }
}

impl PackageIndex for FakeIndex {
    async fn latest_releases(&self, name: &str) -> Result<Vec<String>> {
        let package = self.lookup(format!("latest_releases {name}"), name)?;
        Ok(package.map(|p| p.releases.clone()).unwrap_or_default())
    }

    async fn release_urls(&self, name: &str, version: &str) -> Result<Vec<ReleaseUrl>> {
        let package = self.lookup(format!("release_urls {name} {version}"), name)?;
        Ok(package.map(|p| p.urls.clone()).unwrap_or_default())
    }

    async fn release_metadata(&self, name: &str, version: &str) -> Result<ReleaseMetadata> {
        let package = self.lookup(format!("release_metadata {name} {version}"), name)?;
        Ok(package.map(|p| p.metadata.clone()).unwrap_or_default())
    }
}

pub fn release_url(url: &str, upload_time: Option<&str>) -> ReleaseUrl {
    ReleaseUrl {
        url: url.to_string(),
        upload_time: upload_time.map(str::to_string),
    }
}

/// The `alpha` release used throughout the end-to-end tests
pub fn alpha() -> FakePackage {
    FakePackage {
        releases: vec!["2.0.0".to_string()],
        urls: vec![release_url(
            "http://x/alpha-2.0.0.tar.gz",
            Some("20200101T00:00:00"),
        )],
        metadata: ReleaseMetadata {
            author: "a".to_string(),
            summary: "s".to_string(),
            release_url: "http://r".to_string(),
            package_url: "http://p".to_string(),
        },
    }
}

/// Configuration writing all three artifacts into `dir`
pub fn run_config(dir: &Path, packages: &[&str]) -> RunConfig {
    RunConfig {
        title: "Test packages".to_string(),
        description: "Latest test releases".to_string(),
        baseurl: "https://example.com".to_string(),
        basepath: String::new(),
        files: FilesConfig {
            template: dir.join("page.tmpl"),
            yaml: Some(dir.join("versions.yaml")),
            html: Some(dir.join("versions.html")),
            feed: Some(dir.join("versions.xml")),
        },
        packages: packages.iter().map(|p| p.to_string()).collect(),
        index_url: "https://pypi.org".to_string(),
        page_title: None,
        previous: Default::default(),
    }
}

pub fn write_template(dir: &Path) {
    std::fs::write(dir.join("page.tmpl"), TEMPLATE).unwrap();
}
