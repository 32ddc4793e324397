//! Enqueue, dequeue, inline and localize protocol driving an [`AssetHost`].

mod host;
mod memory;

use indexmap::IndexSet;
use serde_json::Value;
use tracing::debug;

use crate::version::VersionResolver;

pub use host::{AssetHost, InlinePosition, ParsePositionError};
pub use memory::{InlineScript, MemoryHost, ScriptRegistration, StyleRegistration};

/// Source of scripts and stylesheets a [`Registrar`] drives.
pub trait AssetSource {
  /// Visit active scripts as `(full handle, url, declared dependencies)`.
  fn each_script(&self, visitor: &mut dyn FnMut(&str, &str, &[String]));

  /// Visit active stylesheets as `(full handle, url)`.
  fn each_style(&self, visitor: &mut dyn FnMut(&str, &str));

  /// Full handles of every script in manifest order, regardless of gating.
  fn script_handles(&self) -> Vec<String>;

  /// Resolver producing cache-busting versions for this source's URLs.
  fn versions(&self) -> VersionResolver;
}

/// Registers an [`AssetSource`] with an [`AssetHost`].
///
/// Every asset registered in one call depends on the ones registered before
/// it, so the host loads them in manifest order.
pub struct Registrar<'a, S, H>
where
  S: AssetSource + ?Sized,
  H: AssetHost + ?Sized,
{
  source: &'a S,
  host: &'a mut H,
  versions: VersionResolver,
}

impl<'a, S, H> Registrar<'a, S, H>
where
  S: AssetSource + ?Sized,
  H: AssetHost + ?Sized,
{
  /// Registrar for `source` against `host`.
  pub fn new(source: &'a S, host: &'a mut H) -> Self {
    Self {
      versions: source.versions(),
      source,
      host,
    }
  }

  /// Enqueue stylesheets for `all` media with no extra dependencies.
  pub fn enqueue_css(&mut self) -> &mut Self {
    self.enqueue_css_with("all", Vec::<String>::new())
  }

  /// Enqueue stylesheets for `media`, each depending on `dependencies` and its predecessors.
  pub fn enqueue_css_with<I>(&mut self, media: &str, dependencies: I) -> &mut Self
  where
    I: IntoIterator,
    I::Item: Into<String>,
  {
    let mut dependencies = dedup(dependencies);
    let versions = &self.versions;
    let host = &mut *self.host;

    self.source.each_style(&mut |handle, src| {
      let version = versions.version(src);
      debug!(handle, src, ?version, "registering style");
      host.register_style(handle, src, &dependencies, version, media);
      merge_dependencies(&mut dependencies, &[handle.to_string()]);
    });

    self
  }

  /// Enqueue scripts in the footer with no extra dependencies.
  pub fn enqueue_js(&mut self) -> &mut Self {
    self.enqueue_js_with(true, Vec::<String>::new())
  }

  /// Enqueue scripts, each depending on `dependencies`, its own declared
  /// dependencies and its predecessors.
  pub fn enqueue_js_with<I>(&mut self, in_footer: bool, dependencies: I) -> &mut Self
  where
    I: IntoIterator,
    I::Item: Into<String>,
  {
    let mut dependencies = dedup(dependencies);
    let versions = &self.versions;
    let host = &mut *self.host;

    self.source.each_script(&mut |handle, src, declared| {
      merge_dependencies(&mut dependencies, declared);
      let version = versions.version(src);
      debug!(handle, src, ?version, "registering script");
      host.register_script(handle, src, &dependencies, version, in_footer);
      merge_dependencies(&mut dependencies, &[handle.to_string()]);
    });

    self
  }

  /// Enqueue stylesheets then scripts with default options.
  pub fn enqueue(&mut self) -> &mut Self {
    self.enqueue_css().enqueue_js()
  }

  /// Remove every active stylesheet from the host queue.
  pub fn dequeue_css(&mut self) -> &mut Self {
    let host = &mut *self.host;
    self.source.each_style(&mut |handle, _| host.unregister_style(handle));
    self
  }

  /// Remove every active script from the host queue.
  pub fn dequeue_js(&mut self) -> &mut Self {
    let host = &mut *self.host;
    self.source.each_script(&mut |handle, _, _| host.unregister_script(handle));
    self
  }

  /// Dequeue stylesheets then scripts.
  pub fn dequeue(&mut self) -> &mut Self {
    self.dequeue_css().dequeue_js()
  }

  /// Attach `contents` before the first script or after the last one.
  ///
  /// Does nothing when the source has no scripts.
  pub fn inline(&mut self, contents: &str, position: InlinePosition) -> &mut Self {
    let handles = self.source.script_handles();
    let anchor = match position {
      InlinePosition::Before => handles.first(),
      InlinePosition::After => handles.last(),
    };

    if let Some(handle) = anchor {
      self.host.attach_inline_script(handle, contents, position);
    }
    self
  }

  /// Expose `data` as the global `name` on the first script.
  ///
  /// Does nothing when the source has no scripts.
  pub fn localize(&mut self, name: &str, data: &Value) -> &mut Self {
    if let Some(handle) = self.source.script_handles().first() {
      self.host.attach_script_data(handle, name, data);
    }
    self
  }
}

/// Union `more` into `dependencies`, keeping first-seen order and dropping duplicates.
pub fn merge_dependencies(dependencies: &mut Vec<String>, more: &[String]) {
  let merged: IndexSet<String> = dependencies.drain(..).chain(more.iter().cloned()).collect();
  dependencies.extend(merged);
}

fn dedup<I>(dependencies: I) -> Vec<String>
where
  I: IntoIterator,
  I::Item: Into<String>,
{
  let mut merged = Vec::new();
  let more: Vec<String> = dependencies.into_iter().map(Into::into).collect();
  merge_dependencies(&mut merged, &more);
  merged
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::fs::{self, File};
  use std::time::{Duration, SystemTime};

  use pretty_assertions::assert_eq;
  use serde_json::json;
  use tempfile::tempdir;

  use crate::entrypoints::{EntryPoints, RawEntrypoints};
  use crate::version::Version;

  fn entrypoints(paths: &[&str]) -> EntryPoints {
    let raw: RawEntrypoints = paths.iter().copied().collect();
    EntryPoints::new("site", "/srv/site/dist", "https://x.test/dist/", &raw)
  }

  fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
  }

  #[test]
  fn merge_is_an_ordered_union() {
    let mut deps = strings(&["jquery", "wp-i18n"]);
    merge_dependencies(&mut deps, &strings(&["wp-i18n", "site/app", "jquery"]));
    assert_eq!(deps, strings(&["jquery", "wp-i18n", "site/app"]));
  }

  #[test]
  fn styles_chain_onto_earlier_styles() {
    let set = entrypoints(&["vendor.1.css", "app.2.css"]);
    let mut host = MemoryHost::default();
    set.register(&mut host).enqueue_css_with("screen", ["fonts"]);

    let vendor = host.style("site/vendor").unwrap();
    let app = host.style("site/app").unwrap();
    assert_eq!(vendor.deps, strings(&["fonts"]));
    assert_eq!(vendor.media, "screen");
    assert_eq!(app.deps, strings(&["fonts", "site/vendor"]));
    assert_eq!(app.src, "https://x.test/dist/app.2.css");
  }

  #[test]
  fn scripts_chain_onto_earlier_scripts() {
    let set = entrypoints(&["runtime.1.js", "vendor.2.js", "app.3.js"]);
    let mut host = MemoryHost::default();
    set.register(&mut host).enqueue_js_with(false, ["jquery"]);

    let app = host.script("site/app").unwrap();
    assert_eq!(app.deps, strings(&["jquery", "site/runtime", "site/vendor"]));
    assert!(!app.in_footer);
    assert_eq!(host.script("site/runtime").unwrap().deps, strings(&["jquery"]));
  }

  #[test]
  fn repeated_enqueues_do_not_duplicate_dependencies() {
    let set = entrypoints(&["vendor.js", "app.js"]);
    let mut host = MemoryHost::default();
    let base = strings(&["jquery", "jquery"]);

    set
      .register(&mut host)
      .enqueue_js_with(true, base.clone())
      .enqueue_js_with(true, base);

    assert_eq!(host.script("site/vendor").unwrap().deps, strings(&["jquery"]));
    assert_eq!(host.script("site/app").unwrap().deps, strings(&["jquery", "site/vendor"]));
  }

  #[test]
  fn same_handle_lives_in_both_registries() {
    let set = entrypoints(&["/static/app.abc123.js", "/static/app.abc123.css"]);
    let mut host = MemoryHost::default();
    set.register(&mut host).enqueue();

    assert_eq!(host.script("site/app").unwrap().src, "https://x.test/dist/static/app.abc123.js");
    assert_eq!(host.style("site/app").unwrap().src, "https://x.test/dist/static/app.abc123.css");
    assert_eq!(host.style("site/app").unwrap().media, "all");
    assert!(host.script("site/app").unwrap().in_footer);
  }

  #[test]
  fn gated_sets_register_nothing() {
    let mut set = entrypoints(&["app.js", "app.css"]);
    set.when(false);
    let mut host = MemoryHost::default();
    set.register(&mut host).enqueue();

    assert!(host.scripts().is_empty());
    assert!(host.styles().is_empty());
  }

  #[test]
  fn dequeue_removes_registered_assets() {
    let mut set = entrypoints(&["app.js", "app.css", "admin.js"]);
    let mut host = MemoryHost::default();
    set.register(&mut host).enqueue();
    assert_eq!(host.scripts().len(), 2);

    set.when(false);
    set.register(&mut host).dequeue();
    assert_eq!(host.scripts().len(), 2);

    set.when(true);
    set.register(&mut host).dequeue();
    assert!(host.scripts().is_empty());
    assert!(host.styles().is_empty());
  }

  #[test]
  fn inline_code_anchors_to_first_or_last_script() {
    let set = entrypoints(&["runtime.js", "app.js"]);
    let mut host = MemoryHost::default();
    set
      .register(&mut host)
      .inline("window.before = 1;", InlinePosition::Before)
      .inline("window.after = 1;", InlinePosition::After);

    assert_eq!(host.inline_scripts("site/runtime"), &[InlineScript {
      code: "window.before = 1;".to_string(),
      position: InlinePosition::Before,
    }]);
    assert_eq!(host.inline_scripts("site/app"), &[InlineScript {
      code: "window.after = 1;".to_string(),
      position: InlinePosition::After,
    }]);
  }

  #[test]
  fn inline_and_localize_without_scripts_do_nothing() {
    let set = entrypoints(&["app.css"]);
    let mut host = MemoryHost::default();
    set
      .register(&mut host)
      .inline("noop()", InlinePosition::After)
      .localize("siteData", &json!({ "a": 1 }));

    assert!(host.inline_scripts("site/app").is_empty());
    assert_eq!(host.script_data("site/app", "siteData"), None);
  }

  #[test]
  fn localize_targets_the_first_script() {
    let set = entrypoints(&["runtime.js", "app.js"]);
    let mut host = MemoryHost::default();
    let data = json!({ "ajaxUrl": "/admin-ajax.php", "nonce": "abc" });
    set.register(&mut host).localize("siteData", &data);

    assert_eq!(host.script_data("site/runtime", "siteData"), Some(&data));
    assert_eq!(host.script_data("site/app", "siteData"), None);
  }

  #[test]
  fn versions_come_from_files_under_the_content_root() {
    let temp = tempdir().unwrap();
    fs::create_dir_all(temp.path().join("static")).unwrap();
    let file = temp.path().join("static/app.abc.js");
    fs::write(&file, "app()").unwrap();
    File::options()
      .write(true)
      .open(&file)
      .unwrap()
      .set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000))
      .unwrap();

    let raw: RawEntrypoints = ["/static/app.abc.js", "https://cdn.test/lib.js"].into_iter().collect();
    let set = EntryPoints::new("site", temp.path(), "https://x.test/dist/", &raw);
    let mut host = MemoryHost::default();
    set.register(&mut host).enqueue_js();

    assert_eq!(host.script("site/app").unwrap().version, Version::Modified(1_700_000_000));
    assert_eq!(host.script("site/lib").unwrap().version, Version::Unversioned);
  }
}
