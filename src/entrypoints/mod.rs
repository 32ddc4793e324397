//! Entry point sets: a manifest's scripts and stylesheets, filtered, named and resolved.

mod condition;
mod raw;
mod record;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;

use crate::fs::{FileSystem, LocalFileSystem};
use crate::registration::{AssetHost, AssetSource, Registrar};
use crate::version::{ContentRoot, VersionResolver};

pub use condition::Condition;
pub use raw::{EntryFiles, RawEntrypoints};
pub use record::{AssetKind, EntryRecord, derive_handle, full_handle, resolve_url};

/// Ordered scripts and stylesheets for one namespace `id`.
///
/// Each bucket is keyed by handle. When several files share a handle the last
/// one listed wins, keeping the position of the first.
#[derive(Debug, Clone)]
pub struct EntryPoints {
  id: String,
  path: PathBuf,
  uri: String,
  scripts: IndexMap<String, EntryRecord>,
  styles: IndexMap<String, EntryRecord>,
  conditional: bool,
  content_root: ContentRoot,
  fs: Arc<dyn FileSystem>,
}

impl EntryPoints {
  /// Build the set from raw manifest entrypoints.
  ///
  /// `path` and `uri` are the directory and URL the manifest paths are relative to.
  pub fn new(
    id: impl Into<String>,
    path: impl Into<PathBuf>,
    uri: impl Into<String>,
    raw: &RawEntrypoints,
  ) -> Self {
    let path = path.into();
    let uri = uri.into();
    let paths = raw.paths();
    let scripts = index_records(&filter(&paths, AssetKind::Script), AssetKind::Script, &uri);
    let styles = index_records(&filter(&paths, AssetKind::Style), AssetKind::Style, &uri);

    Self {
      id: id.into(),
      content_root: ContentRoot::new(uri.clone(), path.clone()),
      path,
      uri,
      scripts,
      styles,
      conditional: true,
      fs: Arc::new(LocalFileSystem),
    }
  }

  /// Version assets against `root` instead of this set's own path and URI.
  pub fn with_content_root(mut self, root: ContentRoot) -> Self {
    self.content_root = root;
    self
  }

  /// Read modification times through `fs`.
  pub fn with_file_system(mut self, fs: Arc<dyn FileSystem>) -> Self {
    self.fs = fs;
    self
  }

  /// Namespace prefixed to every handle.
  pub fn id(&self) -> &str {
    &self.id
  }

  /// Directory the manifest paths are relative to.
  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Base URL the manifest paths resolve against.
  pub fn uri(&self) -> &str {
    &self.uri
  }

  /// Current gating state set by [`EntryPoints::when`].
  pub fn is_active(&self) -> bool {
    self.conditional
  }

  /// Gate the set on `condition`; closures are evaluated immediately.
  pub fn when(&mut self, condition: impl Condition) -> &mut Self {
    self.conditional = condition.evaluate();
    self
  }

  /// Gate the set on `predicate(args)`, evaluated immediately.
  pub fn when_with<A>(&mut self, predicate: impl FnOnce(A) -> bool, args: A) -> &mut Self {
    self.conditional = predicate(args);
    self
  }

  /// Scripts in manifest order; empty while the set is gated off.
  pub fn js(&self) -> Vec<&EntryRecord> {
    self.gated(&self.scripts)
  }

  /// Stylesheets in manifest order; empty while the set is gated off.
  pub fn css(&self) -> Vec<&EntryRecord> {
    self.gated(&self.styles)
  }

  /// Call `visitor` with `(full handle, url, dependencies)` for every active script.
  pub fn each_js<F>(&self, mut visitor: F) -> &Self
  where
    F: FnMut(&str, &str, &[String]),
  {
    for record in self.js() {
      visitor(&full_handle(&self.id, &record.handle), &record.url, &[]);
    }
    self
  }

  /// Call `visitor` with `(full handle, url)` for every active stylesheet.
  pub fn each_css<F>(&self, mut visitor: F) -> &Self
  where
    F: FnMut(&str, &str),
  {
    for record in self.css() {
      visitor(&full_handle(&self.id, &record.handle), &record.url);
    }
    self
  }

  /// All scripts in manifest order, ignoring the gate.
  pub fn scripts(&self) -> impl ExactSizeIterator<Item = &EntryRecord> + '_ {
    self.scripts.values()
  }

  /// All stylesheets in manifest order, ignoring the gate.
  pub fn styles(&self) -> impl ExactSizeIterator<Item = &EntryRecord> + '_ {
    self.styles.values()
  }

  /// Resolver used to version this set's assets.
  pub fn version_resolver(&self) -> VersionResolver {
    VersionResolver::with_file_system(self.content_root.clone(), Arc::clone(&self.fs))
  }

  /// Start registering this set with `host`.
  pub fn register<'a, H>(&'a self, host: &'a mut H) -> Registrar<'a, Self, H>
  where
    H: AssetHost + ?Sized,
  {
    Registrar::new(self, host)
  }

  fn gated<'a>(&self, records: &'a IndexMap<String, EntryRecord>) -> Vec<&'a EntryRecord> {
    if !self.conditional {
      return Vec::new();
    }
    records.values().collect()
  }
}

impl AssetSource for EntryPoints {
  fn each_script(&self, visitor: &mut dyn FnMut(&str, &str, &[String])) {
    self.each_js(visitor);
  }

  fn each_style(&self, visitor: &mut dyn FnMut(&str, &str)) {
    self.each_css(visitor);
  }

  fn script_handles(&self) -> Vec<String> {
    self
      .scripts
      .keys()
      .map(|handle| full_handle(&self.id, handle))
      .collect()
  }

  fn versions(&self) -> VersionResolver {
    self.version_resolver()
  }
}

/// Keep the paths whose extension selects `kind`, in their original order.
pub fn filter<'a>(paths: &[&'a str], kind: AssetKind) -> Vec<&'a str> {
  paths.iter().copied().filter(|path| kind.matches(path)).collect()
}

fn index_records(paths: &[&str], kind: AssetKind, uri: &str) -> IndexMap<String, EntryRecord> {
  let mut records = IndexMap::new();
  for path in paths {
    let handle = derive_handle(path).to_string();
    let record = EntryRecord {
      handle: handle.clone(),
      kind,
      source_path: (*path).to_string(),
      url: resolve_url(path, uri),
    };
    records.insert(handle, record);
  }
  records
}
