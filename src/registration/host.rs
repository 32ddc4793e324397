//! Host registration primitives and inline script placement.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::version::Version;

/// Registration primitives of the page-rendering host.
///
/// Scripts and styles live in separate registries, so the same handle may be
/// registered once in each.
pub trait AssetHost {
  /// Register and enqueue a stylesheet.
  fn register_style(&mut self, handle: &str, src: &str, deps: &[String], version: Version, media: &str);

  /// Register and enqueue a script.
  fn register_script(
    &mut self,
    handle: &str,
    src: &str,
    deps: &[String],
    version: Version,
    in_footer: bool,
  );

  /// Remove a stylesheet from the queue.
  fn unregister_style(&mut self, handle: &str);

  /// Remove a script from the queue.
  fn unregister_script(&mut self, handle: &str);

  /// Attach raw code to run before or after the script `handle`.
  fn attach_inline_script(&mut self, handle: &str, code: &str, position: InlinePosition);

  /// Expose `data` to the script `handle` under the global `name`.
  fn attach_script_data(&mut self, handle: &str, name: &str, data: &Value);
}

/// Where inline code runs relative to the script it is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InlinePosition {
  /// Before the script loads.
  Before,
  /// After the script loads.
  #[default]
  After,
}

impl InlinePosition {
  /// Lowercase name used by hosts.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Before => "before",
      Self::After => "after",
    }
  }
}

impl fmt::Display for InlinePosition {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Error returned when parsing an unknown [`InlinePosition`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown inline position `{0}`, expected `before` or `after`")]
pub struct ParsePositionError(String);

impl FromStr for InlinePosition {
  type Err = ParsePositionError;

  fn from_str(value: &str) -> Result<Self, Self::Err> {
    match value {
      "before" => Ok(Self::Before),
      "after" => Ok(Self::After),
      other => Err(ParsePositionError(other.to_string())),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn positions_round_trip_through_strings() {
    assert_eq!("before".parse(), Ok(InlinePosition::Before));
    assert_eq!(InlinePosition::default().to_string(), "after");
    assert!("middle".parse::<InlinePosition>().is_err());
  }
}
