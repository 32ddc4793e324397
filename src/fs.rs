//! Filesystem access used for manifest reads and cache-busting versions.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::time::SystemTime;

/// Minimal read-only filesystem capability.
pub trait FileSystem: fmt::Debug + Send + Sync {
  /// Returns `true` when something exists at `path`.
  fn exists(&self, path: &Path) -> bool;

  /// Read the full contents of the file at `path`.
  fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

  /// Last modification time of the file at `path`.
  fn modified(&self, path: &Path) -> io::Result<SystemTime>;
}

/// [`FileSystem`] backed by the local disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

impl FileSystem for LocalFileSystem {
  fn exists(&self, path: &Path) -> bool {
    path.exists()
  }

  fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
    fs::read(path)
  }

  fn modified(&self, path: &Path) -> io::Result<SystemTime> {
    fs::metadata(path)?.modified()
  }
}
