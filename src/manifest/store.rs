//! Lazily loaded JSON documents with dotted-key lookups.

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use serde::de::Error as _;
use serde_json::{Map, Value};

use crate::error::ManifestError;
use crate::fs::FileSystem;

/// JSON object read from disk once and cached for the lifetime of the store.
pub struct JsonStore {
  path: PathBuf,
  fs: Arc<dyn FileSystem>,
  cache: OnceLock<Map<String, Value>>,
}

impl JsonStore {
  /// Store for the JSON file at `path`.
  pub fn new(path: impl Into<PathBuf>, fs: Arc<dyn FileSystem>) -> Self {
    Self {
      path: path.into(),
      fs,
      cache: OnceLock::new(),
    }
  }

  /// Path of the backing file.
  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Returns `true` once the document has been loaded.
  pub fn is_loaded(&self) -> bool {
    self.cache.get().is_some()
  }

  /// Read and parse the backing file, bypassing the cache.
  pub fn load(&self) -> Result<Map<String, Value>, ManifestError> {
    if !self.fs.exists(&self.path) {
      return Err(ManifestError::FileNotFound {
        path: self.path.clone(),
      });
    }

    let bytes = self.fs.read(&self.path).map_err(|source| ManifestError::Io {
      path: self.path.clone(),
      source,
    })?;

    let invalid = |source| ManifestError::FileInvalid {
      path: self.path.clone(),
      source,
    };
    match serde_json::from_slice::<Value>(&bytes).map_err(invalid)? {
      Value::Object(map) => Ok(map),
      _ => Err(invalid(serde_json::Error::custom(
        "expected a JSON object at the document root",
      ))),
    }
  }

  /// Whole document, loading it on first access.
  pub fn get_all(&self) -> Result<&Map<String, Value>, ManifestError> {
    self.get_all_or_else(|| self.load())
  }

  /// Like [`JsonStore::get_all`] with a caller-supplied loader for the first access.
  pub(crate) fn get_all_or_else<F>(&self, load: F) -> Result<&Map<String, Value>, ManifestError>
  where
    F: FnOnce() -> Result<Map<String, Value>, ManifestError>,
  {
    if let Some(cached) = self.cache.get() {
      return Ok(cached);
    }

    let loaded = load()?;
    Ok(self.cache.get_or_init(|| loaded))
  }

  /// Value at a dotted `key`, or `None` when any segment is absent.
  pub fn get(&self, key: &str) -> Result<Option<&Value>, ManifestError> {
    Ok(lookup(self.get_all()?, key))
  }
}

impl std::fmt::Debug for JsonStore {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("JsonStore")
      .field("path", &self.path)
      .field("loaded", &self.is_loaded())
      .finish_non_exhaustive()
  }
}

/// Resolve a dotted `key` against `map`.
///
/// An exact top-level key wins. Otherwise the key is walked one segment at a
/// time, indexing arrays with numeric segments. When that walk finds nothing,
/// the longest exact key is tried at each level, so `files.app.js` matches a
/// `files` object containing an `app.js` key.
pub fn lookup<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
  map
    .get(key)
    .or_else(|| walk(map, key))
    .or_else(|| dotted(map, key))
}

fn child<'a>(value: &'a Value, segment: &str) -> Option<&'a Value> {
  match value {
    Value::Object(map) => map.get(segment),
    Value::Array(items) => items.get(segment.parse::<usize>().ok()?),
    _ => None,
  }
}

fn walk<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
  let mut segments = key.split('.');
  let first = map.get(segments.next()?)?;
  segments.try_fold(first, |value, segment| child(value, segment))
}

fn dotted<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
  if let Some(value) = map.get(key) {
    return Some(value);
  }

  let mut split = key.len();
  while let Some(dot) = key[..split].rfind('.') {
    if let Some(value) = map.get(&key[..dot])
      && let Some(found) = dotted_in(value, &key[dot + 1..])
    {
      return Some(found);
    }
    split = dot;
  }

  None
}

fn dotted_in<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
  match value {
    Value::Object(map) => dotted(map, key),
    Value::Array(_) => match key.split_once('.') {
      Some((index, rest)) => dotted_in(child(value, index)?, rest),
      None => child(value, key),
    },
    _ => None,
  }
}
