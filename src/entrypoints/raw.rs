//! Shapes accepted for the manifest's `entrypoints` key.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

/// Raw `entrypoints` value, before filtering into scripts and styles.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawEntrypoints {
  /// Flat list of paths, as emitted by create-react-app style builds.
  Flat(Vec<String>),
  /// Logical entrypoint names mapped to the files they emit.
  Named(IndexMap<String, EntryFiles>),
}

impl Default for RawEntrypoints {
  fn default() -> Self {
    Self::Flat(Vec::new())
  }
}

/// Files emitted for one named entrypoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum EntryFiles {
  /// A single file.
  One(String),
  /// Ordered list of files.
  Many(Vec<String>),
}

impl RawEntrypoints {
  /// Interpret a manifest value, treating absent or unrecognised shapes as empty.
  pub fn from_value(value: Option<&Value>) -> Self {
    match value {
      None | Some(Value::Null) => Self::default(),
      Some(value) => Self::deserialize(value).unwrap_or_else(|err| {
        warn!(error = %err, "ignoring unrecognised entrypoints value");
        Self::default()
      }),
    }
  }

  /// Every listed path, in document order.
  pub fn paths(&self) -> Vec<&str> {
    match self {
      Self::Flat(paths) => paths.iter().map(String::as_str).collect(),
      Self::Named(named) => named
        .values()
        .flat_map(|files| match files {
          EntryFiles::One(path) => std::slice::from_ref(path),
          EntryFiles::Many(paths) => paths.as_slice(),
        })
        .map(String::as_str)
        .collect(),
    }
  }
}

impl<S: Into<String>> FromIterator<S> for RawEntrypoints {
  fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
    Self::Flat(iter.into_iter().map(Into::into).collect())
  }
}
