//! Individual script and stylesheet records resolved from a manifest.

use std::path::Path;

use url::Url;

/// Asset bucket a manifest path belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
  /// JavaScript (`.js`).
  Script,
  /// Stylesheet (`.css`).
  Style,
}

impl AssetKind {
  /// File extension, without the leading dot, selecting this bucket.
  pub fn extension(self) -> &'static str {
    match self {
      Self::Script => "js",
      Self::Style => "css",
    }
  }

  /// Returns `true` when `path` has exactly this kind's extension.
  pub fn matches(self, path: &str) -> bool {
    Path::new(path)
      .extension()
      .is_some_and(|ext| ext == self.extension())
  }
}

/// A manifest path resolved to the handle and URL used for registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRecord {
  /// Short logical name derived from the file name.
  pub handle: String,
  /// Bucket the record was filtered into.
  pub kind: AssetKind,
  /// Path exactly as listed in the manifest.
  pub source_path: String,
  /// Absolute URL the asset is served from.
  pub url: String,
}

/// Derive the registration handle for `path`: its file name up to the first `.`.
///
/// `static/js/app.a1b2c3.js` becomes `app`.
pub fn derive_handle(path: &str) -> &str {
  let basename = path.rsplit(['/', '\\']).next().unwrap_or(path);
  basename.split('.').next().unwrap_or(basename)
}

/// Resolve a manifest path against `base_url`.
///
/// Paths that already name a host are returned untouched.
pub fn resolve_url(path: &str, base_url: &str) -> String {
  if has_host(path) {
    return path.to_string();
  }

  format!(
    "{}/{}",
    base_url.trim_end_matches('/'),
    path.trim_start_matches('/')
  )
}

/// Namespaced handle exposed to the host registry.
pub fn full_handle(id: &str, handle: &str) -> String {
  format!("{id}/{handle}")
}

fn has_host(path: &str) -> bool {
  if let Some(rest) = path.strip_prefix("//") {
    return rest.split(['/', '?', '#']).next().is_some_and(|host| !host.is_empty());
  }

  Url::parse(path).is_ok_and(|url| url.host_str().is_some_and(|host| !host.is_empty()))
}

#[cfg(test)]
mod tests {
  use super::*;
  use rstest::rstest;

  #[rstest]
  #[case("app.a1b2.js", "app")]
  #[case("/static/js/app.a1b2c3.js", "app")]
  #[case("static\\css\\theme.9f.min.css", "theme")]
  #[case("https://cdn.test/lib/vendor.js", "vendor")]
  #[case("runtime", "runtime")]
  fn handles_come_from_the_basename(#[case] path: &str, #[case] expected: &str) {
    assert_eq!(derive_handle(path), expected);
  }

  #[rstest]
  #[case("app.js", AssetKind::Script, true)]
  #[case("app.js.map", AssetKind::Script, false)]
  #[case("app.css", AssetKind::Script, false)]
  #[case("theme.abc.css", AssetKind::Style, true)]
  #[case("README", AssetKind::Style, false)]
  fn kinds_match_on_extension(#[case] path: &str, #[case] kind: AssetKind, #[case] expected: bool) {
    assert_eq!(kind.matches(path), expected);
  }

  #[test]
  fn root_relative_paths_join_without_double_slashes() {
    assert_eq!(
      resolve_url("/app.js", "https://x.test/assets/"),
      "https://x.test/assets/app.js"
    );
    assert_eq!(
      resolve_url("static/app.js", "https://x.test/assets"),
      "https://x.test/assets/static/app.js"
    );
  }

  #[test]
  fn urls_with_hosts_are_unchanged() {
    assert_eq!(
      resolve_url("https://cdn.test/app.js", "https://x.test/assets/"),
      "https://cdn.test/app.js"
    );
    assert_eq!(
      resolve_url("//cdn.test/app.js", "https://x.test/assets/"),
      "//cdn.test/app.js"
    );
  }

  #[test]
  fn full_handles_are_namespaced_by_id() {
    assert_eq!(full_handle("site", "app"), "site/app");
  }
}
