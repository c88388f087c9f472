//! Dependency ordering for distributable values.
//!
//! [`DependencyResolver`] stores nodes in an arena and edges as index sets, so
//! the graph is dropped as one allocation once [`resolve`](DependencyResolver::resolve)
//! has produced an order. Edges are validated before they are linked: a
//! rejected edge leaves the graph exactly as it was.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::error::{CoreError, ErrorSeverity};

/// Errors raised when an edge cannot be added.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DependencyError<V> {
    /// A value was asked to depend on itself.
    #[error("{0:?} cannot depend on itself")]
    SelfReference(V),

    /// The dependency already depends on the parent, directly or not.
    #[error("{parent:?} -> {dependency:?} would create a cycle")]
    CyclicDependency { parent: V, dependency: V },

    /// The parent already depends on the dependency through another path.
    #[error("{parent:?} already depends on {dependency:?}")]
    SuperfluousDependency { parent: V, dependency: V },
}

impl<V: core::fmt::Debug> CoreError for DependencyError<V> {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::SelfReference(_) | Self::CyclicDependency { .. } => ErrorSeverity::Validation,
            Self::SuperfluousDependency { .. } => ErrorSeverity::Recoverable,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::SelfReference(_) => "DEPENDENCY_SELF_REFERENCE",
            Self::CyclicDependency { .. } => "DEPENDENCY_CYCLE",
            Self::SuperfluousDependency { .. } => "DEPENDENCY_SUPERFLUOUS",
        }
    }
}

#[derive(Debug)]
struct Node<V> {
    value: V,
    /// Arena indices of direct dependencies.
    dependencies: BTreeSet<usize>,
}

/// Builds a dependency graph and orders its values.
///
/// Values are identified by the comparator: two values comparing `Equal` are
/// the same node.
pub struct DependencyResolver<V, C = fn(&V, &V) -> Ordering> {
    nodes: Vec<Node<V>>,
    comparator: C,
}

impl<V: Ord + Clone> DependencyResolver<V> {
    /// Creates a resolver ordered by `V`'s natural order.
    pub fn new() -> Self {
        Self::with_comparator(V::cmp)
    }
}

impl<V: Ord + Clone> Default for DependencyResolver<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, C> DependencyResolver<V, C>
where
    V: Clone,
    C: Fn(&V, &V) -> Ordering,
{
    /// Creates a resolver using `comparator` for identity and tie-breaking.
    pub fn with_comparator(comparator: C) -> Self {
        Self {
            nodes: Vec::new(),
            comparator,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Adds a value with no dependencies, if it is not known yet.
    pub fn add_isolated(&mut self, value: V) {
        self.node(value);
    }

    /// Records that `parent` must come after `dependency`.
    ///
    /// # Errors
    ///
    /// Returns a [`DependencyError`] and leaves the graph untouched when the
    /// edge is a self-reference, would close a cycle, or is already implied.
    pub fn add_dependency(&mut self, parent: V, dependency: V) -> Result<(), DependencyError<V>> {
        if (self.comparator)(&parent, &dependency) == Ordering::Equal {
            return Err(DependencyError::SelfReference(parent));
        }

        let p = self.node(parent);
        let d = self.node(dependency);

        if self.depends_on(d, p) {
            return Err(DependencyError::CyclicDependency {
                parent: self.nodes[p].value.clone(),
                dependency: self.nodes[d].value.clone(),
            });
        }
        if self.depends_on(p, d) {
            return Err(DependencyError::SuperfluousDependency {
                parent: self.nodes[p].value.clone(),
                dependency: self.nodes[d].value.clone(),
            });
        }

        self.nodes[p].dependencies.insert(d);
        Ok(())
    }

    /// Returns true if `from` reaches `target` through one or more edges.
    fn depends_on(&self, from: usize, target: usize) -> bool {
        let mut stack = vec![from];
        let mut seen = vec![false; self.nodes.len()];
        while let Some(current) = stack.pop() {
            for &next in &self.nodes[current].dependencies {
                if next == target {
                    return true;
                }
                if !seen[next] {
                    seen[next] = true;
                    stack.push(next);
                }
            }
        }
        false
    }

    fn node(&mut self, value: V) -> usize {
        if let Some(index) = self
            .nodes
            .iter()
            .position(|node| (self.comparator)(&node.value, &value) == Ordering::Equal)
        {
            return index;
        }
        self.nodes.push(Node {
            value,
            dependencies: BTreeSet::new(),
        });
        self.nodes.len() - 1
    }

    /// Tie-break between independent nodes: fewer direct dependencies first,
    /// then the comparator.
    fn tie_break(&self, a: usize, b: usize) -> Ordering {
        let (na, nb) = (&self.nodes[a], &self.nodes[b]);
        na.dependencies
            .len()
            .cmp(&nb.dependencies.len())
            .then_with(|| (self.comparator)(&na.value, &nb.value))
    }

    /// Consumes the graph and returns every value, dependencies first.
    pub fn resolve(self) -> Vec<V> {
        let mut roots: Vec<usize> = (0..self.nodes.len()).collect();
        roots.sort_by(|&a, &b| self.tie_break(a, b));

        let mut visited = vec![false; self.nodes.len()];
        let mut order = Vec::with_capacity(self.nodes.len());
        for root in roots {
            self.visit(root, &mut visited, &mut order);
        }

        let mut slots: Vec<Option<V>> = self.nodes.into_iter().map(|n| Some(n.value)).collect();
        order
            .into_iter()
            .filter_map(|index| slots[index].take())
            .collect()
    }

    fn visit(&self, index: usize, visited: &mut [bool], order: &mut Vec<usize>) {
        if visited[index] {
            return;
        }
        visited[index] = true;

        let mut dependencies: Vec<usize> = self.nodes[index].dependencies.iter().copied().collect();
        dependencies.sort_by(|&a, &b| self.tie_break(a, b));
        for dependency in dependencies {
            self.visit(dependency, visited, order);
        }
        order.push(index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(order: &[&str], value: &str) -> usize {
        order.iter().position(|v| *v == value).unwrap()
    }

    #[test]
    fn dependencies_come_first() {
        let mut resolver = DependencyResolver::new();
        resolver.add_dependency("c", "b").unwrap();
        resolver.add_dependency("b", "a").unwrap();
        resolver.add_dependency("d", "a").unwrap();

        let order = resolver.resolve();
        assert!(position(&order, "a") < position(&order, "b"));
        assert!(position(&order, "b") < position(&order, "c"));
        assert!(position(&order, "a") < position(&order, "d"));
    }

    #[test]
    fn self_reference_is_rejected_without_side_effects() {
        let mut resolver = DependencyResolver::new();
        assert_eq!(
            resolver.add_dependency("x", "x"),
            Err(DependencyError::SelfReference("x"))
        );
        assert!(resolver.is_empty());
    }

    #[test]
    fn second_edge_of_pair_is_a_cycle() {
        let mut resolver = DependencyResolver::new();
        resolver.add_dependency("a", "b").unwrap();
        let err = resolver.add_dependency("b", "a").unwrap_err();
        assert_eq!(
            err,
            DependencyError::CyclicDependency { parent: "b", dependency: "a" }
        );
        assert_eq!(err.severity(), ErrorSeverity::Validation);
        assert_eq!(resolver.resolve(), vec!["b", "a"]);
    }

    #[test]
    fn implied_edge_is_superfluous() {
        let mut resolver = DependencyResolver::new();
        resolver.add_dependency("a", "b").unwrap();
        resolver.add_dependency("b", "c").unwrap();
        let err = resolver.add_dependency("a", "c").unwrap_err();
        assert!(err.severity().is_recoverable());
        assert_eq!(resolver.resolve(), vec!["c", "b", "a"]);
    }

    #[test]
    fn independent_values_sort_by_dependency_count_then_value() {
        let mut resolver = DependencyResolver::new();
        resolver.add_isolated("zeta");
        resolver.add_isolated("alpha");
        resolver.add_dependency("beta", "gamma").unwrap();
        assert_eq!(resolver.resolve(), vec!["alpha", "gamma", "zeta", "beta"]);
    }

    #[test]
    fn default_resolver_orders_owned_values() {
        let mut resolver: DependencyResolver<String> = DependencyResolver::default();
        resolver
            .add_dependency("ArmorHeavy".to_string(), "ArmorMaterial".to_string())
            .unwrap();
        assert_eq!(resolver.len(), 2);
        assert_eq!(resolver.resolve(), ["ArmorMaterial", "ArmorHeavy"]);
    }

    #[test]
    fn custom_comparator_defines_identity() {
        let mut resolver =
            DependencyResolver::with_comparator(|a: &String, b: &String| {
                a.to_ascii_lowercase().cmp(&b.to_ascii_lowercase())
            });
        let err = resolver.add_dependency("Kw".to_string(), "kW".to_string());
        assert!(matches!(err, Err(DependencyError::SelfReference(_))));
    }
}
