//! In-process [`AssetHost`] that records everything it is asked to do.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::host::{AssetHost, InlinePosition};
use crate::version::Version;

/// A stylesheet held by [`MemoryHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRegistration {
  /// Stylesheet URL.
  pub src: String,
  /// Handles that must load first.
  pub deps: Vec<String>,
  /// Cache-busting version.
  pub version: Version,
  /// Media query the stylesheet applies to.
  pub media: String,
}

/// A script held by [`MemoryHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptRegistration {
  /// Script URL.
  pub src: String,
  /// Handles that must load first.
  pub deps: Vec<String>,
  /// Cache-busting version.
  pub version: Version,
  /// Whether the script is printed in the page footer.
  pub in_footer: bool,
}

/// Inline code attached to a script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineScript {
  /// Raw code.
  pub code: String,
  /// Whether the code runs before or after its script.
  #[serde(serialize_with = "serialize_position")]
  pub position: InlinePosition,
}

/// Asset registry kept in memory.
///
/// Styles and scripts are separate namespaces. Inline sources persist across
/// requests until [`MemoryHost::reset_inlined_sources`] is called.
#[derive(Debug, Clone, Default)]
pub struct MemoryHost {
  styles: IndexMap<String, StyleRegistration>,
  scripts: IndexMap<String, ScriptRegistration>,
  inlined: IndexMap<String, Vec<InlineScript>>,
  data: IndexMap<String, IndexMap<String, Value>>,
}

impl MemoryHost {
  /// Registered stylesheet for `handle`.
  pub fn style(&self, handle: &str) -> Option<&StyleRegistration> {
    self.styles.get(handle)
  }

  /// Registered script for `handle`.
  pub fn script(&self, handle: &str) -> Option<&ScriptRegistration> {
    self.scripts.get(handle)
  }

  /// All registered stylesheets in registration order.
  pub fn styles(&self) -> &IndexMap<String, StyleRegistration> {
    &self.styles
  }

  /// All registered scripts in registration order.
  pub fn scripts(&self) -> &IndexMap<String, ScriptRegistration> {
    &self.scripts
  }

  /// Inline code attached to `handle`, in attachment order.
  pub fn inline_scripts(&self, handle: &str) -> &[InlineScript] {
    self.inlined.get(handle).map(Vec::as_slice).unwrap_or(&[])
  }

  /// Data exposed to `handle` under `name`.
  pub fn script_data(&self, handle: &str, name: &str) -> Option<&Value> {
    self.data.get(handle)?.get(name)
  }

  /// Forget every inline source attached so far.
  pub fn reset_inlined_sources(&mut self) {
    self.inlined.clear();
  }

  /// Inline sources as a JSON document keyed by handle.
  pub fn inlined_sources_json(&self) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&self.inlined)
  }
}

impl AssetHost for MemoryHost {
  fn register_style(&mut self, handle: &str, src: &str, deps: &[String], version: Version, media: &str) {
    self.styles.insert(handle.to_string(), StyleRegistration {
      src: src.to_string(),
      deps: deps.to_vec(),
      version,
      media: media.to_string(),
    });
  }

  fn register_script(
    &mut self,
    handle: &str,
    src: &str,
    deps: &[String],
    version: Version,
    in_footer: bool,
  ) {
    self.scripts.insert(handle.to_string(), ScriptRegistration {
      src: src.to_string(),
      deps: deps.to_vec(),
      version,
      in_footer,
    });
  }

  fn unregister_style(&mut self, handle: &str) {
    if self.styles.shift_remove(handle).is_none() {
      debug!(handle, "style was not registered");
    }
  }

  fn unregister_script(&mut self, handle: &str) {
    if self.scripts.shift_remove(handle).is_none() {
      debug!(handle, "script was not registered");
    }
  }

  fn attach_inline_script(&mut self, handle: &str, code: &str, position: InlinePosition) {
    self
      .inlined
      .entry(handle.to_string())
      .or_default()
      .push(InlineScript {
        code: code.to_string(),
        position,
      });
  }

  fn attach_script_data(&mut self, handle: &str, name: &str, data: &Value) {
    self
      .data
      .entry(handle.to_string())
      .or_default()
      .insert(name.to_string(), data.clone());
  }
}

fn serialize_position<S>(position: &InlinePosition, serializer: S) -> Result<S::Ok, S::Error>
where
  S: serde::Serializer,
{
  serializer.serialize_str(position.as_str())
}
