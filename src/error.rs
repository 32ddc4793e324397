//! Errors raised while reading an asset manifest.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Failure modes of [`crate::JsonStore`] and [`crate::Manifest`].
#[derive(Debug, Error)]
pub enum ManifestError {
  /// The manifest file does not exist.
  #[error("the required {} file is missing", file_label(.path))]
  FileNotFound {
    /// Path that was probed.
    path: PathBuf,
  },

  /// The manifest is malformed JSON or its root is not an object.
  #[error("the required {} file is not valid JSON ({source})", file_label(.path))]
  FileInvalid {
    /// Path of the rejected manifest.
    path: PathBuf,
    /// Parser error, including its category and position.
    source: serde_json::Error,
  },

  /// Any other filesystem failure while reading the manifest.
  #[error("failed to read {}: {source}", .path.display())]
  Io {
    /// Path being read.
    path: PathBuf,
    /// Source I/O error.
    source: std::io::Error,
  },
}

impl ManifestError {
  /// Returns `true` for [`ManifestError::FileNotFound`].
  pub fn is_not_found(&self) -> bool {
    matches!(self, Self::FileNotFound { .. })
  }

  /// Path of the manifest the error refers to.
  pub fn path(&self) -> &Path {
    match self {
      Self::FileNotFound { path } | Self::FileInvalid { path, .. } | Self::Io { path, .. } => path,
    }
  }
}

fn file_label(path: &Path) -> String {
  path
    .file_name()
    .map(|name| name.to_string_lossy().into_owned())
    .unwrap_or_else(|| path.display().to_string())
}
