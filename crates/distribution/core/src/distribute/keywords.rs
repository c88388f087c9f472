//! Keyword ordering.
//!
//! Keyword entries may filter on other distributed keywords, so a keyword
//! has to be granted after every keyword its filters name. The order comes
//! from a [`DependencyResolver`] keyed by lowercase editor id; keywords with
//! no relationship are ordered by dependency count, then alphabetically.

use std::collections::{BTreeSet, HashMap};

use super::Distributable;
use crate::dependency::{DependencyError, DependencyResolver};
use crate::error::CoreError;

/// Reorders `keywords` so that dependencies come first.
///
/// Offending edges (self-references, cycles) are logged and skipped.
pub fn sort_by_dependencies(keywords: &mut [Distributable]) {
    if keywords.len() < 2 {
        return;
    }

    let names: Vec<String> = keywords
        .iter()
        .map(|entry| entry.form.editor_id.to_ascii_lowercase())
        .collect();
    let known: BTreeSet<&str> = names.iter().map(String::as_str).collect();

    let mut resolver = DependencyResolver::new();
    for name in &names {
        resolver.add_isolated(name.clone());
    }

    for (entry, name) in keywords.iter().zip(&names) {
        for dependency in referenced_keywords(entry, &known) {
            if let Err(err) = resolver.add_dependency(name.clone(), dependency.to_string()) {
                log_rejected_edge(entry, &err);
            }
        }
    }

    let rank: HashMap<String, usize> = resolver
        .resolve()
        .into_iter()
        .enumerate()
        .map(|(rank, name)| (name, rank))
        .collect();
    keywords.sort_by_key(|entry| {
        rank.get(&entry.form.editor_id.to_ascii_lowercase())
            .copied()
            .unwrap_or(usize::MAX)
    });
}

/// Keyword names mentioned by string leaves of `entry`'s filters.
fn referenced_keywords<'a>(entry: &Distributable, known: &BTreeSet<&'a str>) -> BTreeSet<&'a str> {
    let mut found = BTreeSet::new();
    entry.filters.for_each_leaf(&mut |leaf| {
        let Some(text) = leaf.string_value() else {
            return;
        };
        let text = text.to_ascii_lowercase();
        if matches!(leaf, crate::filter::Filter::Wildcard(_)) {
            found.extend(known.iter().copied().filter(|name| name.contains(&text)));
        } else if let Some(name) = known.get(text.as_str()) {
            found.insert(*name);
        }
    });
    found
}

fn log_rejected_edge(entry: &Distributable, err: &DependencyError<String>) {
    if err.severity().is_recoverable() {
        tracing::debug!(
            keyword = %entry.form,
            path = %entry.path,
            code = err.error_code(),
            "skipping keyword dependency: {err}"
        );
    } else {
        tracing::warn!(
            keyword = %entry.form,
            path = %entry.path,
            code = err.error_code(),
            "skipping keyword dependency: {err}"
        );
    }
}
