//! Leaf predicate trait.
//!
//! This module defines the [`Predicate`] trait implemented by the leaf type of
//! an [`Expression`](crate::Expression). The trait is generic over the target
//! type `T`, so the same tree machinery can evaluate any read-only view.

use crate::Outcome;

/// A leaf predicate that can be evaluated against a target.
pub trait Predicate<T: ?Sized> {
    /// Evaluate this predicate against the given target.
    ///
    /// Targets are borrowed immutably; predicates never mutate what they
    /// inspect.
    fn evaluate(&self, target: &T) -> Outcome;

    /// Returns `false` if this predicate was built from data that can never
    /// be evaluated meaningfully (e.g. an inverted range).
    fn is_valid(&self) -> bool {
        true
    }
}
