//! Builder utilities for ergonomic expression construction.
//!
//! Instead of writing `Expression::All(vec![Expression::Leaf(a), ...])`, use
//! shorter functions like `all(vec![leaf(a), ...])`.

use crate::Expression;

/// Wraps a predicate in a leaf node.
#[inline]
pub fn leaf<L>(predicate: L) -> Expression<L> {
    Expression::Leaf(predicate)
}

/// Creates an AND node.
#[inline]
pub fn all<L>(children: Vec<Expression<L>>) -> Expression<L> {
    Expression::All(children)
}

/// Creates an OR node.
#[inline]
pub fn any<L>(children: Vec<Expression<L>>) -> Expression<L> {
    Expression::Any(children)
}

/// Creates a negation node.
#[inline]
pub fn not<L>(child: Expression<L>) -> Expression<L> {
    Expression::Not(Box::new(child))
}
