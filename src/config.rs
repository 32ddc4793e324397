//! Project configuration describing where the build manifest lives and how it is served.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::warn;

use crate::manifest::{DEFAULT_DIRECTORY, DEFAULT_MANIFEST_FILE};
use crate::version::ContentRoot;

const DEFAULT_CONFIG_FILE: &str = "asset-manifest.config.json";

/// Discoverable configuration for a [`crate::Manifest`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ManifestConfig {
  /// Project directory containing the build directory.
  pub path: PathBuf,
  /// Public URL of the project directory.
  pub url: String,
  /// Build directory name, relative to `path` and `url`.
  pub directory: String,
  /// Manifest file name inside the build directory.
  pub file_name: String,
  /// Optional site-wide root used for cache-busting versions.
  pub content_root: Option<ContentRootConfig>,
}

/// Serialised form of a [`ContentRoot`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContentRootConfig {
  /// Public URL of the content directory.
  pub url: String,
  /// Directory on disk serving `url`.
  pub path: PathBuf,
}

impl Default for ManifestConfig {
  fn default() -> Self {
    Self {
      path: PathBuf::from("."),
      url: "/".into(),
      directory: DEFAULT_DIRECTORY.into(),
      file_name: DEFAULT_MANIFEST_FILE.into(),
      content_root: None,
    }
  }
}

impl ManifestConfig {
  /// Load configuration from `dir`, falling back to defaults.
  ///
  /// When the configuration file is missing the defaults are used, with
  /// `path` pointing at `dir`. A file that exists but cannot be read or
  /// parsed is logged as a warning before falling back the same way.
  pub fn discover(dir: &Path) -> Self {
    let candidate = dir.join(DEFAULT_CONFIG_FILE);
    let defaults = || Self {
      path: dir.to_path_buf(),
      ..Self::default()
    };

    if !candidate.exists() {
      return defaults();
    }

    match Self::from_path(&candidate) {
      Ok(config) => config,
      Err(err) => {
        let reason = format!("{err:#}");
        warn!(path = %candidate.display(), error = %reason, "ignoring unusable manifest configuration");
        defaults()
      }
    }
  }

  /// Read configuration from a specific JSON file.
  pub fn from_path(path: &Path) -> Result<Self> {
    let content = fs::read_to_string(path)
      .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content)
      .with_context(|| format!("failed to parse manifest configuration at {}", path.display()))
  }

  /// Configured versioning root, if any.
  pub fn content_root(&self) -> Option<ContentRoot> {
    self
      .content_root
      .as_ref()
      .map(|root| ContentRoot::new(root.url.clone(), root.path.clone()))
  }

  /// Location of the manifest JSON file described by this configuration.
  pub fn manifest_path(&self) -> PathBuf {
    self.path.join(&self.directory).join(&self.file_name)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  use crate::Manifest;

  #[test]
  fn discover_falls_back_to_defaults() {
    let temp = tempdir().unwrap();
    let config = ManifestConfig::discover(temp.path());

    assert_eq!(config.path, temp.path());
    assert_eq!(config.directory, "dist");
    assert_eq!(config.file_name, "asset-manifest.json");
    assert_eq!(config.content_root(), None);
  }

  #[test]
  fn reads_partial_configuration() {
    let temp = tempdir().unwrap();
    fs::write(
      temp.path().join(DEFAULT_CONFIG_FILE),
      r#"{
        "path": "/srv/theme",
        "url": "https://x.test/theme",
        "file_name": "manifest.json",
        "content_root": { "url": "https://x.test/wp-content", "path": "/srv/wp-content" }
      }"#,
    )
    .unwrap();

    let config = ManifestConfig::discover(temp.path());
    assert_eq!(config.directory, "dist");
    assert_eq!(config.manifest_path(), PathBuf::from("/srv/theme/dist/manifest.json"));
    assert_eq!(
      config.content_root(),
      Some(ContentRoot::new("https://x.test/wp-content", "/srv/wp-content"))
    );

    let manifest = Manifest::from_config(&config);
    assert_eq!(manifest.json_path(), config.manifest_path());
    assert_eq!(manifest.url(), "https://x.test/theme/dist/");
  }

  #[test]
  fn discover_falls_back_when_configuration_is_malformed() {
    let temp = tempdir().unwrap();
    let candidate = temp.path().join(DEFAULT_CONFIG_FILE);
    fs::write(&candidate, "{").unwrap();

    let config = ManifestConfig::discover(temp.path());
    assert_eq!(config.path, temp.path());
    assert_eq!(config.url, "/");
    assert_eq!(config.directory, "dist");

    let err = ManifestConfig::from_path(&candidate).unwrap_err();
    assert!(format!("{err:#}").contains("failed to parse manifest configuration"));
  }

  #[test]
  fn invalid_configuration_reports_the_path() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("broken.json");
    fs::write(&path, "{").unwrap();

    let err = ManifestConfig::from_path(&path).unwrap_err();
    assert!(err.to_string().contains("broken.json"));
  }
}
