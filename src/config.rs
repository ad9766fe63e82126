use crate::error::{Error, Result, ResultIoExt};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Settings for a single polling run
#[derive(Debug, Deserialize, Clone)]
pub struct RunConfig {
    /// Feed channel title, also the page title unless `page_title` is set
    pub title: String,

    #[serde(default)]
    pub page_title: Option<String>,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub baseurl: String,

    #[serde(default)]
    pub basepath: String,

    pub files: FilesConfig,

    /// Package names, processed in this order
    #[serde(default)]
    pub packages: Vec<String>,

    #[serde(default = "default_index_url")]
    pub index_url: String,

    /// Entries of the snapshot being overwritten, written back for packages
    /// skipped in this run. Only populated in category mode.
    #[serde(skip)]
    pub previous: BTreeMap<String, serde_yaml::Value>,
}

/// Input template and output artifact locations
#[derive(Debug, Deserialize, Clone)]
pub struct FilesConfig {
    pub template: PathBuf,

    #[serde(default)]
    pub yaml: Option<PathBuf>,

    #[serde(default)]
    pub html: Option<PathBuf>,

    #[serde(default)]
    pub feed: Option<PathBuf>,
}

fn default_index_url() -> String {
    "https://pypi.org".to_string()
}

const DEFAULT_BASEURL: &str = "http://ghostcloud.net";

impl RunConfig {
    /// Load a structured YAML configuration file
    ///
    /// Environment variables prefixed with `PYPI_VERSIONS__` override values
    /// from the file. Relative paths under `files` are resolved against the
    /// directory holding the configuration file.
    pub fn load(config_path: &Path) -> Result<Self> {
        if !config_path.is_file() {
            return Err(Error::Config {
                msg: format!("Configuration file not found: {}", config_path.display()),
            });
        }

        Self::load_with_env(config_path, environment())
    }

    fn load_with_env(config_path: &Path, env: config::Environment) -> Result<Self> {
        let builder = config::Config::builder()
            .add_source(
                config::File::from(config_path)
                    .required(true)
                    .format(config::FileFormat::Yaml),
            )
            .add_source(env);

        let config = builder.build().map_err(|e| Error::Config {
            msg: format!("Failed to load configuration: {}", e),
        })?;

        let mut run: RunConfig = config.try_deserialize().map_err(|e| Error::Config {
            msg: format!("Failed to deserialize configuration: {}", e),
        })?;

        if let Some(dir) = config_path.parent() {
            run.files.resolve_relative_to(dir);
        }

        Ok(run)
    }

    /// Build the configuration of a category run
    ///
    /// `<path>/openstack_<category>_versions.yaml` lists the packages (as
    /// mapping keys) and is overwritten with the new snapshot. Its entries
    /// are kept for packages that are skipped, so every key stays tracked.
    pub fn for_category(category: &str, path: &Path) -> Result<Self> {
        let snapshot_path = path.join(format!("openstack_{}_versions.yaml", category));

        let content = std::fs::read_to_string(&snapshot_path).map_io_err(&snapshot_path)?;
        let entries = snapshot_entries(&content).map_err(|msg| Error::Config {
            msg: format!("{}: {}", snapshot_path.display(), msg),
        })?;
        let packages = entries.iter().map(|(name, _)| name.clone()).collect();

        Ok(Self {
            title: format!("OpenStack {} packages on PyPi", category),
            page_title: Some(category.to_string()),
            description: format!("The latest available OpenStack {} packages on PyPi.", category),
            baseurl: DEFAULT_BASEURL.to_string(),
            basepath: String::new(),
            files: FilesConfig {
                template: path.join("pypi_versions.tmpl"),
                yaml: Some(snapshot_path),
                html: Some(path.join(format!("openstack_{}_versions.html", category))),
                feed: Some(path.join(format!("openstack_{}_versions.xml", category))),
            },
            packages,
            index_url: default_index_url(),
            previous: entries.into_iter().collect(),
        })
    }

    /// Title bound in the page template
    pub fn page_title(&self) -> &str {
        self.page_title.as_deref().unwrap_or(&self.title)
    }

    /// Default location of the configuration file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("pypi-versions").join("config.yaml"))
    }

    /// Public URL of the HTML page
    pub fn page_url(&self) -> String {
        self.public_url(self.files.html.as_deref())
    }

    /// Public URL of the RSS feed
    pub fn feed_url(&self) -> String {
        self.public_url(self.files.feed.as_deref())
    }

    fn public_url(&self, file: Option<&Path>) -> String {
        let base = self.baseurl.trim_end_matches('/');
        match file.and_then(Path::file_name) {
            Some(name) => format!("{}/{}", base, name.to_string_lossy()),
            None => base.to_string(),
        }
    }
}

impl FilesConfig {
    fn resolve_relative_to(&mut self, dir: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = dir.join(&*p);
            }
        };

        resolve(&mut self.template);
        for path in [&mut self.yaml, &mut self.html, &mut self.feed]
            .into_iter()
            .flatten()
        {
            resolve(path);
        }
    }
}

/// `PYPI_VERSIONS__*` overrides; `packages` takes a comma separated list
fn environment() -> config::Environment {
    config::Environment::with_prefix("PYPI_VERSIONS")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("packages")
}

/// Top-level entries of a snapshot, in file order
///
/// The keys are the package names; values are kept as written.
fn snapshot_entries(
    content: &str,
) -> std::result::Result<Vec<(String, serde_yaml::Value)>, String> {
    let value: serde_yaml::Value = serde_yaml::from_str(content).map_err(|e| e.to_string())?;

    match value {
        serde_yaml::Value::Null => Ok(Vec::new()),
        serde_yaml::Value::Mapping(mapping) => mapping
            .into_iter()
            .map(|(key, entry)| match key {
                serde_yaml::Value::String(name) => Ok((name, entry)),
                other => Err(format!("Package name must be a string, got {:?}", other)),
            })
            .collect(),
        _ => Err("Expected a mapping of package names".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn names(entries: &[(String, serde_yaml::Value)]) -> Vec<&str> {
        entries.iter().map(|(name, _)| name.as_str()).collect()
    }

    #[test]
    fn test_snapshot_entries_keep_file_order() {
        let content = "nova: {}\ncinder:\n  version: 1.0.0\nglance: {}\n";
        let entries = snapshot_entries(content).unwrap();
        assert_eq!(names(&entries), vec!["nova", "cinder", "glance"]);
        assert_eq!(entries[1].1["version"].as_str(), Some("1.0.0"));
    }

    #[test]
    fn test_snapshot_entries_empty_file() {
        assert!(snapshot_entries("").unwrap().is_empty());
    }

    #[test]
    fn test_snapshot_entries_rejects_list() {
        assert!(snapshot_entries("- nova\n- cinder\n").is_err());
    }

    #[test]
    fn test_for_category_paths() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("openstack_clients_versions.yaml"),
            "python-novaclient: {}\npython-glanceclient: {}\n",
        )
        .unwrap();

        let config = RunConfig::for_category("clients", dir.path()).unwrap();
        assert_eq!(config.title, "OpenStack clients packages on PyPi");
        assert_eq!(config.page_title(), "clients");
        assert_eq!(config.previous.len(), 2);
        assert_eq!(
            config.files.yaml.as_deref(),
            Some(dir.path().join("openstack_clients_versions.yaml").as_path())
        );
        assert_eq!(config.files.template, dir.path().join("pypi_versions.tmpl"));
        assert_eq!(config.packages, vec!["python-novaclient", "python-glanceclient"]);
        assert_eq!(
            config.page_url(),
            "http://ghostcloud.net/openstack_clients_versions.html"
        );
        assert_eq!(
            config.feed_url(),
            "http://ghostcloud.net/openstack_clients_versions.xml"
        );
    }

    #[test]
    fn test_for_category_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = RunConfig::for_category("servers", dir.path());
        assert!(matches!(result, Err(Error::File { .. })));
    }

    #[test]
    fn test_load_structured_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            r#"
title: Tracked packages
description: Latest releases
baseurl: https://example.com/
basepath: /static
files:
  template: page.tmpl
  html: /srv/www/index.html
  feed: feed.xml
packages:
  - alpha
  - beta
"#,
        )
        .unwrap();

        let config = RunConfig::load(&path).unwrap();
        assert_eq!(config.title, "Tracked packages");
        assert_eq!(config.packages, vec!["alpha", "beta"]);
        assert_eq!(config.files.template, dir.path().join("page.tmpl"));
        assert_eq!(
            config.files.html.as_deref(),
            Some(Path::new("/srv/www/index.html"))
        );
        assert_eq!(config.files.feed, Some(dir.path().join("feed.xml")));
        assert!(config.files.yaml.is_none());
        assert_eq!(config.index_url, "https://pypi.org");
        assert_eq!(config.page_url(), "https://example.com/index.html");
        assert_eq!(config.page_title(), "Tracked packages");
        assert!(config.previous.is_empty());
    }

    #[test]
    fn test_environment_overrides_packages_and_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "title: Tracked\nfiles:\n  template: page.tmpl\npackages: [alpha]\n",
        )
        .unwrap();

        let vars = [
            ("PYPI_VERSIONS__PACKAGES", "nova,cinder,glance"),
            ("PYPI_VERSIONS__FILES__FEED", "feed.xml"),
            ("PYPI_VERSIONS__TITLE", "Overridden"),
        ]
        .into_iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();

        let config = RunConfig::load_with_env(&path, environment().source(Some(vars))).unwrap();
        assert_eq!(config.packages, vec!["nova", "cinder", "glance"]);
        assert_eq!(config.files.feed, Some(dir.path().join("feed.xml")));
        assert_eq!(config.title, "Overridden");
    }

    #[test]
    fn test_single_package_from_environment() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "title: Tracked\nfiles:\n  template: page.tmpl\n").unwrap();

        let vars = [("PYPI_VERSIONS__PACKAGES".to_string(), "nova".to_string())]
            .into_iter()
            .collect();

        let config = RunConfig::load_with_env(&path, environment().source(Some(vars))).unwrap();
        assert_eq!(config.packages, vec!["nova"]);
    }

    #[test]
    fn test_load_missing_config() {
        let dir = TempDir::new().unwrap();
        let result = RunConfig::load(&dir.path().join("absent.yaml"));
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_load_rejects_missing_files_section() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "title: x\npackages: [a]\n").unwrap();

        let result = RunConfig::load(&path);
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
