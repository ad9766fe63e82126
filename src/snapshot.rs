use crate::config::RunConfig;
use crate::error::{Error, Result};
use crate::index::PackageIndex;
use crate::models::{FeedItem, PackageRecord, ReleaseUrl, Snapshot};
use chrono::{DateTime, NaiveDateTime, Utc};

/// Upload timestamp format of the index
const INDEX_TIME_FORMAT: &str = "%Y%m%dT%H:%M:%S";

/// ISO form reported by the JSON API
const ISO_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const WHEEL_EXTENSION: &str = ".whl";

/// Poll the index for every configured package
pub async fn build_snapshot<I: PackageIndex>(config: &RunConfig, index: &I) -> Result<Snapshot> {
    build_snapshot_at(config, index, Utc::now()).await
}

/// Poll the index, measuring `days_ago` against `now`
///
/// Packages without releases or without published files are skipped; their
/// entry in `config.previous`, if any, is carried over. Any other index
/// failure aborts the whole pass.
pub async fn build_snapshot_at<I: PackageIndex>(
    config: &RunConfig,
    index: &I,
    now: DateTime<Utc>,
) -> Result<Snapshot> {
    let mut snapshot = Snapshot::default();

    for package in &config.packages {
        tracing::debug!(package, "Checking package");

        let Some(version) = index.latest_releases(package).await?.into_iter().next() else {
            tracing::debug!(package, "No releases, skipping");
            carry_over(&mut snapshot, config, package);
            continue;
        };

        let urls = index.release_urls(package, &version).await?;
        let Some(first) = urls.first() else {
            tracing::debug!(package, version, "No release files, skipping");
            carry_over(&mut snapshot, config, package);
            continue;
        };

        let metadata = index.release_metadata(package, &version).await?;

        let upload_time = first
            .upload_time
            .as_deref()
            .map(|raw| {
                parse_upload_time(raw).ok_or_else(|| Error::MalformedResponse {
                    package: package.clone(),
                    msg: format!("unparseable upload time '{}'", raw),
                })
            })
            .transpose()?;

        let url = choose_download_url(package, &urls).to_string();

        let record = PackageRecord {
            days_ago: upload_time.map(|t| days_between(t, now)),
            upload_time,
            filename: filename_from_url(&url).to_string(),
            url,
            release_url: metadata.release_url,
            author: metadata.author,
            package_url: metadata.package_url,
            summary: metadata.summary,
            version,
        };

        let guid = feed_guid(package, &record.version);
        snapshot
            .feed_items
            .push(FeedItem::from_record(package, &record, guid));

        tracing::info!(package, version = %record.version, "Found release");
        snapshot.records.insert(package.clone(), record);
    }

    Ok(snapshot)
}

fn carry_over(snapshot: &mut Snapshot, config: &RunConfig, package: &str) {
    if let Some(entry) = config.previous.get(package) {
        snapshot
            .carried_over
            .insert(package.to_string(), entry.clone());
    }
}

/// Parse an index upload timestamp (UTC)
pub fn parse_upload_time(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, INDEX_TIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, ISO_TIME_FORMAT))
        .ok()
}

/// Whole days elapsed since `upload`, zero for future timestamps
pub fn days_between(upload: NaiveDateTime, now: DateTime<Utc>) -> u64 {
    (now.naive_utc() - upload).num_days().max(0) as u64
}

/// Prefer a source archive over a wheel
///
/// When the first file is a wheel the second file is used instead, if there
/// is one.
pub fn choose_download_url<'a>(package: &str, urls: &'a [ReleaseUrl]) -> &'a str {
    match urls {
        [first, second, ..] if first.url.ends_with(WHEEL_EXTENSION) => &second.url,
        [first, ..] => {
            if first.url.ends_with(WHEEL_EXTENSION) {
                tracing::warn!(package, url = %first.url, "Only a wheel is available");
            }
            &first.url
        }
        [] => "",
    }
}

/// Final path segment of a URL
pub fn filename_from_url(url: &str) -> &str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/').next().unwrap_or(path)
}

/// Stable feed identity of a release
pub fn feed_guid(package: &str, version: &str) -> String {
    let digest = md5::compute(format!("{}-{}", package, version));
    format!("{:x}", digest)
}
