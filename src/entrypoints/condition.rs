//! Gating values accepted by [`crate::EntryPoints::when`].

/// A value that decides whether an entry point set is active.
///
/// Implemented for `bool` and for zero-argument closures returning `bool`.
/// Closures are evaluated once, at the moment they are passed in.
pub trait Condition {
  /// Resolve the condition to its current truth value.
  fn evaluate(self) -> bool;
}

impl Condition for bool {
  fn evaluate(self) -> bool {
    self
  }
}

impl<F> Condition for F
where
  F: FnOnce() -> bool,
{
  fn evaluate(self) -> bool {
    self()
  }
}
