use super::PackageIndex;
use crate::error::{Error, Result};
use crate::models::{ReleaseMetadata, ReleaseUrl};
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, HeaderValue, USER_AGENT};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Client for the PyPI JSON API
#[derive(Debug)]
pub struct PypiClient {
    api_base: Url,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ProjectResponse {
    info: ProjectInfo,
    #[serde(default)]
    urls: Vec<FileEntry>,
}

#[derive(Debug, Deserialize)]
struct ProjectInfo {
    version: String,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    release_url: Option<String>,
    #[serde(default)]
    package_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FileEntry {
    url: String,
    #[serde(default)]
    upload_time: Option<String>,
}

impl PypiClient {
    pub fn new(api_base: &str) -> Result<Self> {
        let api_base = Url::parse(api_base).map_err(|e| Error::Config {
            msg: format!("Invalid index URL '{}': {}", api_base, e),
        })?;

        if api_base.cannot_be_a_base() {
            return Err(Error::Config {
                msg: format!("Index URL cannot be used as a base: {}", api_base),
            });
        }

        let headers = [
            (USER_AGENT, HeaderValue::from_static(APP_USER_AGENT)),
            (ACCEPT, HeaderValue::from_static("application/json")),
        ]
        .into_iter()
        .collect();

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self { api_base, client })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.api_base.clone();
        // checked in `new`
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push("pypi").extend(segments).push("json");
        }
        url
    }

    /// GET a JSON document, mapping 404 to `None`
    async fn fetch<T: DeserializeOwned>(&self, url: Url) -> Result<Option<T>> {
        let response = self.client.get(url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        Ok(Some(response.error_for_status()?.json().await?))
    }

    async fn release(&self, name: &str, version: &str) -> Result<Option<ProjectResponse>> {
        self.fetch(self.endpoint(&[name, version])).await
    }
}

impl PackageIndex for PypiClient {
    #[instrument(skip(self))]
    async fn latest_releases(&self, name: &str) -> Result<Vec<String>> {
        let project: Option<ProjectResponse> = self.fetch(self.endpoint(&[name])).await?;

        Ok(project
            .map(|p| p.info.version)
            .filter(|version| !version.is_empty())
            .into_iter()
            .collect())
    }

    #[instrument(skip(self))]
    async fn release_urls(&self, name: &str, version: &str) -> Result<Vec<ReleaseUrl>> {
        let Some(release) = self.release(name, version).await? else {
            return Ok(Vec::new());
        };

        Ok(release
            .urls
            .into_iter()
            .map(|file| ReleaseUrl {
                url: file.url,
                upload_time: file.upload_time,
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn release_metadata(&self, name: &str, version: &str) -> Result<ReleaseMetadata> {
        let release = self
            .release(name, version)
            .await?
            .ok_or_else(|| Error::MalformedResponse {
                package: name.to_string(),
                msg: format!("release {} not found", version),
            })?;

        let info = release.info;
        Ok(ReleaseMetadata {
            author: info.author.unwrap_or_default(),
            summary: info.summary.unwrap_or_default(),
            release_url: info.release_url.unwrap_or_default(),
            package_url: info.package_url.unwrap_or_default(),
        })
    }
}
