//! Three-valued expression trees for rule filters.
//!
//! This library provides a small, allocation-light expression tree used to
//! decide whether a rule applies to a target:
//!
//! - **Three outcomes**: `Pass`, `Fail`, and `Discard` (a failure that must
//!   not be retried)
//! - **Closed node set**: leaves plus AND/OR/NOT composites, traversed by
//!   pattern matching
//! - **One-shot rewriting**: placeholder leaves can be replaced or removed in
//!   a single pass after construction
//! - **Zero dependencies**: Pure Rust with no external crates
//!
//! # Architecture
//!
//! - [`Predicate`]: Trait implemented by the leaf type
//! - [`Outcome`]: Result of an evaluation
//! - [`Expression`]: The tree itself
//! - [`builder`]: Shorthand constructors

pub mod builder;
pub mod expression;
pub mod outcome;
pub mod predicate;

pub use expression::Expression;
pub use outcome::Outcome;
pub use predicate::Predicate;
