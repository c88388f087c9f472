//! Resolving raw rules into distribution tables.
//!
//! Filters are built in two passes. The first turns a record into a filter
//! tree whose form leaves are [`Filter::Unresolved`] placeholders; the second
//! rewrites every placeholder through the [`FormOracle`]. A record whose
//! target fails to resolve is dropped and logged with its source path. A
//! filter form that fails to resolve is logged and left out of the tree; the
//! rest of the record still loads.

use std::collections::BTreeMap;

use expression_tree::builder::{all, any, leaf, not};

use super::{RawFormGroup, RawLinkedRecord, RawRecord, RuleSet, StringFilters};
use crate::distribute::{
    sort_by_dependencies, Distributable, DistributableForms, DistributionTables, DistributionType,
    IndexOrCount, RecordKind,
};
use crate::env::{FormOracle, LookupError};
use crate::error::CoreError;
use crate::exclusion::FormGroups;
use crate::filter::{Filter, Filters};
use crate::form::{FormKind, FormRef, RawForm};

/// Builds the distribution tables for `rules`.
///
/// Never fails: bad records are logged and skipped.
pub fn lookup(rules: &RuleSet, forms: &dyn FormOracle) -> DistributionTables {
    let mut tables = DistributionTables::new();
    let mut dropped = 0usize;

    for record in &rules.records {
        match build_record(record, forms) {
            Ok(entry) => match record.effective_scope() {
                DistributionType::Regular => tables.regular.push(record.kind, entry),
                DistributionType::Death => tables.death.push(record.kind, entry),
            },
            Err(err) => {
                dropped += 1;
                log_dropped(&record.path, &record.form, &err);
            }
        }
    }

    for link in &rules.linked {
        if !register_linked(link, forms, &mut tables) {
            dropped += 1;
        }
    }

    register_groups(&rules.exclusion_groups, forms, &mut tables.exclusion_groups);
    register_groups(&rules.exclusive_groups, forms, &mut tables.exclusive_groups);

    sort_by_dependencies(tables.regular.get_mut(RecordKind::Keyword));
    sort_by_dependencies(tables.death.get_mut(RecordKind::Keyword));

    log_summary("regular", &tables.regular);
    log_summary("death", &tables.death);
    tracing::info!(
        linked = tables.linked.len(),
        exclusion_groups = tables.exclusion_groups.len(),
        exclusive_groups = tables.exclusive_groups.len(),
        dropped,
        "distribution tables built"
    );
    tables
}

fn build_record(record: &RawRecord, forms: &dyn FormOracle) -> Result<Distributable, LookupError> {
    let form = resolve_target(record.kind, &record.form, forms)?;
    let filters = resolve_filters(record_filters(record), forms, &record.path);

    if record.is_final && record.kind != RecordKind::Outfit {
        tracing::debug!(path = %record.path, form = %record.form, "final flag only applies to outfits");
    }

    Ok(Distributable::new(form, filters, record.path.clone())
        .with_index_or_count(index_or_count(record.kind, record.index_or_count))
        .with_final(record.is_final && record.kind == RecordKind::Outfit))
}

/// Registers one linked record under each parent that resolves.
///
/// Returns false if the record was dropped.
fn register_linked(
    link: &RawLinkedRecord,
    forms: &dyn FormOracle,
    tables: &mut DistributionTables,
) -> bool {
    let form = match resolve_target(link.kind, &link.form, forms) {
        Ok(form) => form,
        Err(err) => {
            log_dropped(&link.path, &link.form, &err);
            return false;
        }
    };

    let parents: Vec<_> = link
        .parents
        .iter()
        .filter_map(|raw| match forms.lookup(raw) {
            Ok(parent) => Some(parent.id),
            Err(err) => {
                log_dropped(&link.path, raw, &err);
                None
            }
        })
        .collect();
    if parents.is_empty() {
        tracing::warn!(path = %link.path, form = %link.form, "linked record has no valid parent");
        return false;
    }

    let filters = chance_filter(link.chance).map_or_else(Filters::empty, |chance| all(vec![chance]));
    let entry = Distributable::new(form, filters, link.path.clone())
        .with_index_or_count(index_or_count(link.kind, link.index_or_count));
    tables
        .linked
        .insert_with_parents(link.scope, parents, link.kind, entry);
    true
}

fn register_groups(groups: &[RawFormGroup], forms: &dyn FormOracle, target: &mut FormGroups) {
    for group in groups {
        let members: Vec<FormRef> = group
            .forms
            .iter()
            .filter_map(|raw| match forms.lookup(raw) {
                Ok(form) => Some(form),
                Err(err) => {
                    log_dropped(&group.path, raw, &err);
                    None
                }
            })
            .collect();
        if members.len() < 2 {
            tracing::warn!(path = %group.path, group = %group.name, "group has fewer than two valid forms");
        }
        target.insert(&group.name, members);
    }
}

/// Resolves the form a record distributes and checks it fits the kind.
///
/// Unknown keyword editor ids create a new keyword.
fn resolve_target(
    kind: RecordKind,
    raw: &RawForm,
    forms: &dyn FormOracle,
) -> Result<FormRef, LookupError> {
    let form = match forms.lookup(raw) {
        Ok(form) => form,
        Err(LookupError::UnknownEditorId(editor_id)) if kind == RecordKind::Keyword => {
            let created = forms.create_keyword(&editor_id)?;
            tracing::debug!(keyword = %created, "created keyword");
            created
        }
        Err(err) => return Err(err),
    };

    if !kind.accepts(form.kind) {
        return Err(LookupError::MismatchedFormType {
            form: form.id,
            expected: kind.expected(),
            actual: form.kind,
        });
    }
    Ok(form)
}

/// First pass: every filter of `record`, forms still unresolved.
fn record_filters(record: &RawRecord) -> Filters {
    let levels = &record.levels;
    let traits = &record.traits;

    let mut level_leaves: Vec<Filter> = levels.level.into_iter().map(Filter::Level).collect();
    level_leaves.extend(levels.skills.iter().map(|(skill, range)| Filter::Skill(*skill, *range)));
    level_leaves.extend(
        levels
            .skill_weights
            .iter()
            .map(|(skill, range)| Filter::SkillWeight(*skill, *range)),
    );

    let trait_leaves: Vec<Filter> = [
        traits.sex.map(Filter::Sex),
        traits.unique.map(Filter::Unique),
        traits.summonable.map(Filter::Summonable),
        traits.child.map(Filter::Child),
        traits.leveled.map(Filter::Leveled),
        traits.teammate.map(Filter::Teammate),
    ]
    .into_iter()
    .flatten()
    .collect();

    let mut sections = vec![
        string_section(&record.strings),
        section(
            record.forms.all.iter().cloned().map(Filter::Unresolved).collect(),
            record.forms.not.iter().cloned().map(Filter::Unresolved).collect(),
            record.forms.matches.iter().cloned().map(Filter::Unresolved).collect(),
        ),
        section(level_leaves, Vec::new(), Vec::new()),
        section(trait_leaves, Vec::new(), Vec::new()),
    ];
    sections.extend(chance_filter(record.chance));
    all(sections)
}

fn string_section(strings: &StringFilters) -> Filters {
    let mut children = vec![section(
        strings.all.iter().map(|text| string_leaf(text)).collect(),
        strings.not.iter().map(|text| string_leaf(text)).collect(),
        strings.matches.iter().map(|text| string_leaf(text)).collect(),
    )];
    if !strings.any.is_empty() {
        let wildcards = strings
            .any
            .iter()
            .map(|text| leaf(Filter::Wildcard(text.trim_start_matches('*').to_string())))
            .collect();
        children.push(any(wildcards));
    }
    all(children)
}

fn string_leaf(text: &str) -> Filter {
    match text.strip_prefix('*') {
        Some(rest) => Filter::Wildcard(rest.to_string()),
        None => Filter::Match(text.to_string()),
    }
}

/// `all` AND NOT (any of `none`) AND (any of `some`).
fn section(every: Vec<Filter>, none: Vec<Filter>, some: Vec<Filter>) -> Filters {
    let mut children: Vec<Filters> = every.into_iter().map(leaf).collect();
    if !none.is_empty() {
        children.push(not(any(none.into_iter().map(leaf).collect())));
    }
    if !some.is_empty() {
        children.push(any(some.into_iter().map(leaf).collect()));
    }
    all(children)
}

fn chance_filter(chance: f32) -> Option<Filters> {
    let chance = chance.clamp(0.0, 100.0);
    (chance < 100.0).then(|| leaf(Filter::Chance(chance)))
}

/// Second pass: resolves placeholders and prunes empty branches.
///
/// Placeholders that fail to resolve are removed from the tree.
fn resolve_filters(filters: Filters, forms: &dyn FormOracle, path: &str) -> Filters {
    let resolved = filters.filter_map_leaves(&mut |filter| match filter {
        Filter::Unresolved(raw) => match resolve_filter_form(&raw, forms) {
            Ok(resolved) => Some(resolved),
            Err(err) => {
                tracing::warn!(
                    path,
                    form = %raw,
                    code = err.error_code(),
                    "omitting filter: {err}"
                );
                None
            }
        },
        other => Some(other),
    });

    let mut resolved = resolved.unwrap_or_default();
    resolved.reduce();
    resolved
}

fn resolve_filter_form(raw: &RawForm, forms: &dyn FormOracle) -> Result<Filter, LookupError> {
    if let RawForm::File(file) = raw {
        if !forms.has_file(file) {
            return Err(LookupError::UnknownMod(file.clone()));
        }
        return Ok(Filter::Mod(file.clone()));
    }

    let form = forms.lookup(raw)?;
    if !form.kind.is_filterable() {
        return Err(LookupError::UnsupportedFormType {
            form: form.id,
            kind: form.kind,
        });
    }
    if form.kind == FormKind::FormList && form.list_members().is_empty() {
        tracing::debug!(form = %form, "filtering on an empty form list");
    }
    Ok(Filter::Form(form))
}

fn index_or_count(kind: RecordKind, configured: Option<IndexOrCount>) -> IndexOrCount {
    configured.unwrap_or(if kind.uses_index() {
        IndexOrCount::Index(0)
    } else {
        IndexOrCount::default()
    })
}

fn log_dropped(path: &str, raw: &RawForm, err: &LookupError) {
    tracing::warn!(
        path,
        form = %raw,
        code = err.error_code(),
        severity = err.severity().as_str(),
        "skipping record: {err}"
    );
}

fn log_summary(table: &str, forms: &DistributableForms) {
    let counts: BTreeMap<RecordKind, usize> = forms.iter().map(|(kind, list)| (kind, list.len())).collect();
    for (kind, count) in counts {
        tracing::info!(table, %kind, count, "registered entries");
    }
}
