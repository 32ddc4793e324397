//! Cache-busting versions derived from on-disk modification times.

use std::borrow::Cow;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use std::time::UNIX_EPOCH;

use regex::Regex;
use tracing::debug;

use crate::fs::{FileSystem, LocalFileSystem};

/// Version token attached to a registered asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Version {
  /// Last modification time of the backing file, in seconds since the Unix epoch.
  Modified(u64),
  /// External, missing or otherwise unresolvable asset.
  Unversioned,
}

impl Version {
  /// Timestamp carried by [`Version::Modified`].
  pub fn timestamp(self) -> Option<u64> {
    match self {
      Self::Modified(timestamp) => Some(timestamp),
      Self::Unversioned => None,
    }
  }
}

/// Pairing of a public URL prefix with the directory that serves it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRoot {
  /// Public URL under which the directory is served.
  pub url: String,
  /// Filesystem directory backing `url`.
  pub path: PathBuf,
}

impl ContentRoot {
  /// Create a content root from a URL prefix and directory.
  pub fn new(url: impl Into<String>, path: impl Into<PathBuf>) -> Self {
    Self {
      url: url.into(),
      path: path.into(),
    }
  }
}

/// Computes [`Version`] tokens for asset URLs below a [`ContentRoot`].
#[derive(Debug, Clone)]
pub struct VersionResolver {
  root: ContentRoot,
  fs: Arc<dyn FileSystem>,
}

impl VersionResolver {
  /// Resolver reading modification times from the local disk.
  pub fn new(root: ContentRoot) -> Self {
    Self::with_file_system(root, Arc::new(LocalFileSystem))
  }

  /// Resolver reading modification times through `fs`.
  pub fn with_file_system(root: ContentRoot, fs: Arc<dyn FileSystem>) -> Self {
    Self { root, fs }
  }

  /// Content root this resolver maps URLs against.
  pub fn root(&self) -> &ContentRoot {
    &self.root
  }

  /// Version for `src`, or [`Version::Unversioned`] when the file cannot be located.
  pub fn version(&self, src: &str) -> Version {
    let Some(path) = self.local_path(src) else {
      return Version::Unversioned;
    };

    if !self.fs.exists(&path) {
      debug!(src, path = %path.display(), "asset missing on disk, leaving unversioned");
      return Version::Unversioned;
    }

    match self.fs.modified(&path) {
      Ok(modified) => modified
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| Version::Modified(elapsed.as_secs()))
        .unwrap_or(Version::Unversioned),
      Err(err) => {
        debug!(src, path = %path.display(), error = %err, "failed to read modification time");
        Version::Unversioned
      }
    }
  }

  /// Translate an in-root URL into the file that serves it.
  ///
  /// Returns `None` for URLs outside the content root. `http:`, `https:` and
  /// scheme-relative forms of the same URL are treated alike.
  pub fn local_path(&self, src: &str) -> Option<PathBuf> {
    let src = remove_protocol(src);
    let root_url = remove_protocol(&self.root.url);

    if is_external_url(&src, &root_url) {
      return None;
    }

    let mut path = self.root.path.clone();
    for segment in src[root_url.len()..].split('/').filter(|s| !s.is_empty()) {
      path.push(segment);
    }
    Some(path)
  }
}

fn protocol_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| Regex::new(r"(?i)^https?:").expect("invalid protocol regex"))
}

/// Strip a leading `http:` or `https:` scheme, case-insensitively.
pub fn remove_protocol(url: &str) -> Cow<'_, str> {
  protocol_pattern().replace(url, "")
}

/// Returns `true` unless `url` starts with `root_url`, ignoring ASCII case.
pub fn is_external_url(url: &str, root_url: &str) -> bool {
  url
    .get(..root_url.len())
    .is_none_or(|prefix| !prefix.eq_ignore_ascii_case(root_url))
}
