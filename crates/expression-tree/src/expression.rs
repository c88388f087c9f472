//! Composite expression nodes.
//!
//! An [`Expression`] is a closed sum type: either a leaf predicate or one of
//! the three composites [`Expression::All`] (AND), [`Expression::Any`] (OR)
//! and [`Expression::Not`] (negation). Traversal and rewriting are plain
//! pattern matches, so finding every leaf of one kind and replacing it needs
//! no downcasting.

use crate::{Outcome, Predicate};

/// A tree of predicates combined with AND/OR/NOT.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression<L> {
    /// A single predicate.
    Leaf(L),

    /// Passes when every child passes.
    ///
    /// # Semantics
    ///
    /// Children are evaluated left to right and the first non-`Pass` result
    /// is returned immediately. An empty `All` passes.
    All(Vec<Expression<L>>),

    /// Passes when any child passes.
    ///
    /// # Semantics
    ///
    /// Children are evaluated left to right and the first `Pass` is returned
    /// immediately. Otherwise the highest-priority failure among the children
    /// is returned (`Discard` over `Fail`). An empty `Any` passes.
    Any(Vec<Expression<L>>),

    /// Inverts its single child: `Pass` becomes `Fail`, any failure becomes
    /// `Pass`.
    Not(Box<Expression<L>>),
}

impl<L> Default for Expression<L> {
    fn default() -> Self {
        Expression::All(Vec::new())
    }
}

impl<L> Expression<L> {
    /// Creates an expression that matches everything.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Evaluates the expression against `target`.
    pub fn evaluate<T: ?Sized>(&self, target: &T) -> Outcome
    where
        L: Predicate<T>,
    {
        match self {
            Expression::Leaf(leaf) => leaf.evaluate(target),
            Expression::All(children) => {
                for child in children {
                    match child.evaluate(target) {
                        Outcome::Pass => continue,
                        failure => return failure, // Short-circuit
                    }
                }
                Outcome::Pass
            }
            Expression::Any(children) => {
                if children.is_empty() {
                    return Outcome::Pass;
                }
                let mut worst = Outcome::Fail;
                for child in children {
                    match child.evaluate(target) {
                        Outcome::Pass => return Outcome::Pass, // Short-circuit
                        failure if failure.priority() > worst.priority() => worst = failure,
                        _ => {}
                    }
                }
                worst
            }
            Expression::Not(child) => child.evaluate(target).negate(),
        }
    }

    /// Returns `true` if this node can never change an evaluation outcome and
    /// may be pruned.
    ///
    /// Leaves are never superfluous. Composites are superfluous when empty or
    /// when all of their children are.
    pub fn is_superfluous(&self) -> bool {
        match self {
            Expression::Leaf(_) => false,
            Expression::All(children) | Expression::Any(children) => {
                children.iter().all(Expression::is_superfluous)
            }
            Expression::Not(child) => child.is_superfluous(),
        }
    }

    /// Returns `true` if every leaf is valid.
    pub fn is_valid<T: ?Sized>(&self) -> bool
    where
        L: Predicate<T>,
    {
        match self {
            Expression::Leaf(leaf) => leaf.is_valid(),
            Expression::All(children) | Expression::Any(children) => {
                children.iter().all(Expression::is_valid::<T>)
            }
            Expression::Not(child) => child.is_valid::<T>(),
        }
    }

    /// Recursively removes superfluous children.
    pub fn reduce(&mut self) {
        match self {
            Expression::Leaf(_) => {}
            Expression::All(children) | Expression::Any(children) => {
                for child in children.iter_mut() {
                    child.reduce();
                }
                children.retain(|child| !child.is_superfluous());
            }
            Expression::Not(child) => child.reduce(),
        }
    }

    /// Rewrites every leaf through `f`, preserving the tree shape.
    ///
    /// Returning `None` from `f` omits that leaf. A `Not` whose child was
    /// omitted is omitted as well, so a negation never ends up without an
    /// operand. Composites left empty stay in place (and are superfluous).
    ///
    /// Returns `None` only when the root itself was omitted.
    pub fn filter_map_leaves<M, F>(self, f: &mut F) -> Option<Expression<M>>
    where
        F: FnMut(L) -> Option<M>,
    {
        match self {
            Expression::Leaf(leaf) => f(leaf).map(Expression::Leaf),
            Expression::All(children) => Some(Expression::All(
                children
                    .into_iter()
                    .filter_map(|child| child.filter_map_leaves(f))
                    .collect(),
            )),
            Expression::Any(children) => Some(Expression::Any(
                children
                    .into_iter()
                    .filter_map(|child| child.filter_map_leaves(f))
                    .collect(),
            )),
            Expression::Not(child) => child
                .filter_map_leaves(f)
                .map(|child| Expression::Not(Box::new(child))),
        }
    }

    /// Visits every leaf in depth-first, left-to-right order.
    pub fn for_each_leaf<F>(&self, f: &mut F)
    where
        F: FnMut(&L),
    {
        match self {
            Expression::Leaf(leaf) => f(leaf),
            Expression::All(children) | Expression::Any(children) => {
                for child in children {
                    child.for_each_leaf(f);
                }
            }
            Expression::Not(child) => child.for_each_leaf(f),
        }
    }

    /// Returns `true` if any leaf satisfies `predicate`.
    pub fn any_leaf<F>(&self, predicate: &F) -> bool
    where
        F: Fn(&L) -> bool,
    {
        match self {
            Expression::Leaf(leaf) => predicate(leaf),
            Expression::All(children) | Expression::Any(children) => {
                children.iter().any(|child| child.any_leaf(predicate))
            }
            Expression::Not(child) => child.any_leaf(predicate),
        }
    }

    /// Number of leaves in the tree.
    pub fn leaf_count(&self) -> usize {
        let mut count = 0;
        self.for_each_leaf(&mut |_| count += 1);
        count
    }
}

impl<L: core::fmt::Display> core::fmt::Display for Expression<L> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let (children, separator) = match self {
            Expression::Leaf(leaf) => return write!(f, "{leaf}"),
            Expression::Not(child) => return write!(f, "NOT {child}"),
            Expression::All(children) => (children, " AND "),
            Expression::Any(children) => (children, " OR "),
        };

        match children.as_slice() {
            [] => f.write_str("*"),
            [only] => write!(f, "{only}"),
            _ => {
                f.write_str("(")?;
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        f.write_str(separator)?;
                    }
                    write!(f, "{child}")?;
                }
                f.write_str(")")
            }
        }
    }
}
