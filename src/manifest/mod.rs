//! Build manifests: lazy loading, entrypoint sets and file URL lookups.

mod store;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::warn;

use crate::config::ManifestConfig;
use crate::entrypoints::{EntryPoints, RawEntrypoints};
use crate::error::ManifestError;
use crate::fs::{FileSystem, LocalFileSystem};
use crate::version::ContentRoot;

pub use store::{JsonStore, lookup};

/// Directory, relative to the project root, that the build writes into.
pub const DEFAULT_DIRECTORY: &str = "dist";

/// File name of the manifest inside the build directory.
pub const DEFAULT_MANIFEST_FILE: &str = "asset-manifest.json";

/// An asset manifest produced by an external build step.
///
/// The file is read on first use and cached. A missing file is logged and
/// treated as an empty manifest; malformed JSON is returned as
/// [`ManifestError::FileInvalid`].
#[derive(Debug)]
pub struct Manifest {
  path: PathBuf,
  url: String,
  directory: String,
  file_name: String,
  content_root: Option<ContentRoot>,
  fs: Arc<dyn FileSystem>,
  store: JsonStore,
}

impl Manifest {
  /// Manifest for the build `directory` below the project `path`, served from `url`.
  pub fn new(path: impl AsRef<Path>, url: &str, directory: &str) -> Self {
    let directory = directory.trim_matches(['/', '\\']);
    let root = url.trim_end_matches(['/', '\\']);
    let url = if directory.is_empty() {
      format!("{root}/")
    } else {
      format!("{root}/{directory}/")
    };
    let path = path.as_ref().join(directory);
    let fs: Arc<dyn FileSystem> = Arc::new(LocalFileSystem);

    Self {
      store: JsonStore::new(path.join(DEFAULT_MANIFEST_FILE), Arc::clone(&fs)),
      path,
      url,
      directory: directory.to_string(),
      file_name: DEFAULT_MANIFEST_FILE.to_string(),
      content_root: None,
      fs,
    }
  }

  /// Manifest described by `config`.
  pub fn from_config(config: &ManifestConfig) -> Self {
    let manifest = Self::new(&config.path, &config.url, &config.directory)
      .with_file_name(&config.file_name);

    match config.content_root() {
      Some(root) => manifest.with_content_root(root),
      None => manifest,
    }
  }

  /// Read the manifest from `file_name` inside the build directory.
  pub fn with_file_name(mut self, file_name: &str) -> Self {
    self.file_name = file_name.to_string();
    self.store = JsonStore::new(self.path.join(&self.file_name), Arc::clone(&self.fs));
    self
  }

  /// Read the manifest and asset timestamps through `fs`.
  pub fn with_file_system(mut self, fs: Arc<dyn FileSystem>) -> Self {
    self.store = JsonStore::new(self.json_path(), Arc::clone(&fs));
    self.fs = fs;
    self
  }

  /// Version every entry point set against `root`.
  pub fn with_content_root(mut self, root: ContentRoot) -> Self {
    self.content_root = Some(root);
    self
  }

  /// Build directory on disk.
  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Public URL of the build directory, with a trailing `/`.
  pub fn url(&self) -> &str {
    &self.url
  }

  /// Location of the manifest JSON file.
  pub fn json_path(&self) -> PathBuf {
    self.path.join(&self.file_name)
  }

  /// Whole manifest document, loading it on first access.
  pub fn get_all(&self) -> Result<&Map<String, Value>, ManifestError> {
    self.store.get_all_or_else(|| match self.store.load() {
      Err(err) if err.is_not_found() => {
        warn!(path = %err.path().display(), "{err}; treating manifest as empty");
        Ok(Map::new())
      }
      other => other,
    })
  }

  /// Value at a dotted `key`.
  pub fn get(&self, key: &str) -> Result<Option<&Value>, ManifestError> {
    Ok(lookup(self.get_all()?, key))
  }

  /// Value at a dotted `key`, or `default` when absent.
  pub fn get_or<'a>(&'a self, key: &str, default: &'a Value) -> Result<&'a Value, ManifestError> {
    Ok(self.get(key)?.unwrap_or(default))
  }

  /// Entry point set for the manifest's `entrypoints`, namespaced under `id`.
  pub fn entrypoints(&self, id: &str) -> Result<EntryPoints, ManifestError> {
    let raw = RawEntrypoints::from_value(self.get("entrypoints")?);
    let entrypoints = EntryPoints::new(id, &self.path, &self.url, &raw)
      .with_file_system(Arc::clone(&self.fs));

    Ok(match &self.content_root {
      Some(root) => entrypoints.with_content_root(root.clone()),
      None => entrypoints,
    })
  }

  /// Public URLs for every entry of the manifest's `files` map.
  pub fn files(&self) -> Result<IndexMap<String, String>, ManifestError> {
    let Some(Value::Object(files)) = self.get("files")? else {
      return Ok(IndexMap::new());
    };

    Ok(
      files
        .iter()
        .filter_map(|(name, value)| {
          let path = value.as_str()?;
          Some((name.clone(), self.file_url(path)))
        })
        .collect(),
    )
  }

  /// Public URL for the `files` entry called `name`.
  pub fn file(&self, name: &str) -> Result<Option<String>, ManifestError> {
    Ok(self.files()?.shift_remove(name))
  }

  fn file_url(&self, path: &str) -> String {
    let marker = format!("/{}/", self.directory);
    let rest = match path.find(&marker) {
      Some(index) if !self.directory.is_empty() => &path[index + marker.len()..],
      _ => path.trim_start_matches('/'),
    };
    format!("{}{}", self.url, rest.trim())
  }
}
