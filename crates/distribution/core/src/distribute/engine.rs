//! Distribution engine.
//!
//! [`Distributor`] walks a [`DistributionSet`] kind by kind and decides, for
//! one NPC, which entries to grant. For every entry, in configured order:
//!
//! 1. reject if a mutually exclusive form is already possessed or was
//!    accepted earlier in this pass
//! 2. reject if the NPC already has the form (unique kinds only)
//! 3. evaluate the filters
//! 4. resolve the index or count, expanding leveled lists
//! 5. record the grant for auditing and for the linked pass
//!
//! Grants of one kind are applied to the host in a single call once the
//! kind's list has been walked. Outfits are not applied here; the choice is
//! returned in the [`DistributionReport`] for the outfit manager.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use expression_tree::Outcome;

use super::{Distributable, DistributionSet, DistributionTables, DistributionType, RecordKind};
use crate::config::DistributionConfig;
use crate::env::{NpcHost, RngOracle};
use crate::filter::FilterContext;
use crate::form::{Form, FormId, FormKind, FormRef};
use crate::level_mult::{DistributedEntry, LevelMultCache, LevelMultInput};
use crate::npc::NpcSnapshot;

/// Per-call switches.
#[derive(Clone, Copy, Default)]
pub struct DistributeOptions<'a> {
    /// Evaluate level and skill ranges for NPCs whose level follows the player.
    pub include_level_scaled: bool,
    /// Restrict the pass to one kind.
    pub only: Option<RecordKind>,
    /// Level-up pass: only entries with level filters are evaluated, and
    /// rejections are recorded in the cache.
    pub level_cache: Option<(&'a LevelMultCache, &'a LevelMultInput)>,
}

impl<'a> DistributeOptions<'a> {
    /// Options evaluating only outfit entries.
    pub fn outfits_only() -> Self {
        Self {
            only: Some(RecordKind::Outfit),
            ..Self::default()
        }
    }
}

/// The outfit picked by a pass.
#[derive(Clone, Debug, PartialEq)]
pub struct OutfitChoice {
    pub outfit: FormRef,
    pub is_final: bool,
    pub path: String,
}

/// Outcome of one distribution pass.
#[derive(Clone, Debug, Default)]
pub struct DistributionReport {
    /// Every `(form, rule file)` pair granted, in grant order.
    pub granted: Vec<(FormRef, String)>,
    /// Grants as applied to the host, with resolved counts.
    pub distributed: Vec<DistributedEntry>,
    pub outfit: Option<OutfitChoice>,
}

impl DistributionReport {
    pub fn is_empty(&self) -> bool {
        self.granted.is_empty() && self.outfit.is_none()
    }

    /// Returns true if `form` was granted.
    pub fn contains(&self, form: FormId) -> bool {
        self.granted.iter().any(|(granted, _)| granted.id == form)
    }

    pub fn granted_ids(&self) -> impl Iterator<Item = FormId> + '_ {
        self.granted.iter().map(|(form, _)| form.id)
    }

    fn merge(&mut self, other: DistributionReport) {
        self.granted.extend(other.granted);
        self.distributed.extend(other.distributed);
        if self.outfit.is_none() {
            self.outfit = other.outfit;
        }
    }
}

/// Grants collected for one kind before they are applied.
#[derive(Default)]
struct Pending {
    forms: Vec<FormRef>,
    items: BTreeMap<FormId, (FormRef, u32)>,
    packages: Vec<(FormRef, i32)>,
}

/// Decides and applies grants for NPCs.
pub struct Distributor {
    tables: Arc<DistributionTables>,
    rng: Arc<dyn RngOracle>,
    config: DistributionConfig,
}

impl Distributor {
    pub fn new(tables: Arc<DistributionTables>, rng: Arc<dyn RngOracle>) -> Self {
        Self {
            tables,
            rng,
            config: DistributionConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: DistributionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn tables(&self) -> &DistributionTables {
        &self.tables
    }

    pub fn config(&self) -> &DistributionConfig {
        &self.config
    }

    pub(crate) fn rng(&self) -> &dyn RngOracle {
        self.rng.as_ref()
    }

    /// Runs the regular tables and their linked entries against `npc`.
    pub fn distribute(
        &self,
        npc: &mut NpcSnapshot,
        host: &mut dyn NpcHost,
        options: &DistributeOptions<'_>,
    ) -> DistributionReport {
        let set = self.tables.regular.as_set();
        let mut report = self.run(&set, npc, host, options);
        if options.only.is_none() {
            self.run_linked(DistributionType::Regular, npc, host, &mut report);
        }
        tracing::trace!(npc = %npc.npc, granted = report.granted.len(), "distributed");
        report
    }

    /// Evaluates the entries linked to this pass's grants, once.
    pub(crate) fn run_linked(
        &self,
        scope: DistributionType,
        npc: &mut NpcSnapshot,
        host: &mut dyn NpcHost,
        report: &mut DistributionReport,
    ) {
        let set = self.tables.linked.linked_set(scope, report.granted_ids());
        if set.is_empty() {
            return;
        }
        let linked = self.run(&set, npc, host, &DistributeOptions::default());
        tracing::trace!(%scope, granted = linked.granted.len(), "linked pass");
        report.merge(linked);
    }

    /// Walks every kind of `set` in distribution order.
    pub(crate) fn run(
        &self,
        set: &DistributionSet<'_>,
        npc: &mut NpcSnapshot,
        host: &mut dyn NpcHost,
        options: &DistributeOptions<'_>,
    ) -> DistributionReport {
        let mut report = DistributionReport::default();
        let mut accepted = BTreeSet::new();
        for kind in RecordKind::ALL {
            if options.only.is_some_and(|only| only != kind) {
                continue;
            }
            let entries = set.get(kind);
            if !entries.is_empty() {
                self.run_kind(kind, entries, npc, host, options, &mut accepted, &mut report);
            }
        }
        report
    }

    #[allow(clippy::too_many_arguments)]
    fn run_kind(
        &self,
        kind: RecordKind,
        entries: &[&Distributable],
        npc: &mut NpcSnapshot,
        host: &mut dyn NpcHost,
        options: &DistributeOptions<'_>,
        accepted: &mut BTreeSet<FormId>,
        report: &mut DistributionReport,
    ) {
        let mut pending = Pending::default();

        for (index, entry) in entries.iter().enumerate() {
            let form = &entry.form;

            if self.is_excluded(form.id, npc, host, accepted) {
                continue;
            }
            if kind.is_unique_per_npc()
                && (accepted.contains(&form.id) || possesses(npc, host, form))
            {
                continue;
            }

            let cache = options
                .level_cache
                .filter(|_| npc.is_pc_level_mult());
            if let Some((cache, input)) = cache {
                if !entry.has_level_filters()
                    || cache.is_distributed(input, form.id)
                    || cache.find_rejected_entry(input, form.id, index)
                    || cache.find_discarded_entry(input, form.id, index)
                {
                    continue;
                }
            }

            let ctx = FilterContext::new(npc, self.rng()).with_level_scaled(options.include_level_scaled);
            match entry.filters.evaluate(&ctx) {
                Outcome::Pass => {}
                Outcome::Fail => {
                    if let Some((cache, input)) = cache {
                        cache.insert_rejected_entry(input, form.id, index);
                    }
                    continue;
                }
                Outcome::Discard => {
                    if let Some((cache, input)) = cache {
                        cache.insert_discarded_entry(input, form.id, index);
                    }
                    continue;
                }
            }

            accepted.insert(form.id);
            entry.record_grant();
            report.granted.push((form.clone(), entry.path.clone()));

            match kind {
                RecordKind::Outfit => {
                    report.outfit = Some(OutfitChoice {
                        outfit: form.clone(),
                        is_final: entry.is_final,
                        path: entry.path.clone(),
                    });
                }
                RecordKind::Skin => host.set_skin(form),
                RecordKind::SleepOutfit => host.set_sleep_outfit(form),
                RecordKind::Item | RecordKind::DeathItem => {
                    let count = entry.index_or_count.count(self.rng());
                    self.collect_items(form, count, npc.level, 0, &mut pending.items);
                }
                RecordKind::Package => {
                    pending
                        .packages
                        .push((form.clone(), entry.index_or_count.index()));
                }
                _ => {
                    if kind == RecordKind::Keyword {
                        npc.insert_keyword(form);
                    }
                    pending.forms.push(form.clone());
                }
            }

            if kind.is_first_match() {
                if kind != RecordKind::Outfit {
                    report.distributed.push(DistributedEntry {
                        form: form.clone(),
                        kind,
                        quantity: 1,
                    });
                }
                break;
            }
        }

        self.apply(kind, pending, host, report);
    }

    fn apply(
        &self,
        kind: RecordKind,
        pending: Pending,
        host: &mut dyn NpcHost,
        report: &mut DistributionReport,
    ) {
        if !pending.items.is_empty() {
            let items: Vec<(FormRef, u32)> = pending.items.into_values().collect();
            for (item, count) in &items {
                report.distributed.push(DistributedEntry {
                    form: item.clone(),
                    kind,
                    quantity: *count,
                });
            }
            host.add_items(&items);
        }
        if !pending.packages.is_empty() {
            for (package, index) in &pending.packages {
                report.distributed.push(DistributedEntry {
                    form: package.clone(),
                    kind,
                    quantity: u32::try_from(*index).unwrap_or(0),
                });
            }
            host.insert_packages(&pending.packages);
        }
        if !pending.forms.is_empty() {
            for form in &pending.forms {
                report.distributed.push(DistributedEntry {
                    form: form.clone(),
                    kind,
                    quantity: 1,
                });
            }
            host.grant(kind, &pending.forms);
        }
    }

    /// Returns true if a form exclusive with `form` is held or accepted.
    fn is_excluded(
        &self,
        form: FormId,
        npc: &NpcSnapshot,
        host: &dyn NpcHost,
        accepted: &BTreeSet<FormId>,
    ) -> bool {
        self.tables
            .mutually_exclusive_forms(form)
            .iter()
            .any(|other| accepted.contains(&other.id) || possesses(npc, host, other))
    }

    /// Adds `count` of `form` to `items`, expanding leveled lists by `level`.
    fn collect_items(
        &self,
        form: &FormRef,
        count: u32,
        level: u16,
        depth: usize,
        items: &mut BTreeMap<FormId, (FormRef, u32)>,
    ) {
        let Some(list) = form.leveled() else {
            items
                .entry(form.id)
                .or_insert_with(|| (form.clone(), 0))
                .1 += count;
            return;
        };
        if depth >= DistributionConfig::MAX_LEVELED_LIST_DEPTH {
            tracing::debug!(list = %form, "leveled list nesting too deep");
            return;
        }

        let eligible: Vec<_> = list.entries.iter().filter(|e| e.level <= level).collect();
        if eligible.is_empty() {
            return;
        }
        if list.use_all {
            for row in eligible {
                let total = count.saturating_mul(u32::from(row.count.max(1)));
                self.collect_items(&row.form, total, level, depth + 1, items);
            }
        } else {
            let rows: Vec<_> = if list.from_all_levels {
                eligible
            } else {
                let top = eligible.iter().map(|row| row.level).max().unwrap_or_default();
                eligible.into_iter().filter(|row| row.level == top).collect()
            };
            for _ in 0..count {
                let pick = self.rng().range(0, (rows.len() - 1) as u32) as usize;
                let row = rows[pick.min(rows.len() - 1)];
                self.collect_items(&row.form, u32::from(row.count.max(1)), level, depth + 1, items);
            }
        }
    }

    /// Logs how often every entry was granted.
    pub fn log_statistics(&self) {
        let tables = &self.tables;
        for (scope, forms) in [("regular", &tables.regular), ("death", &tables.death)] {
            for (kind, entries) in forms.iter() {
                for entry in entries {
                    tracing::info!(
                        scope,
                        %kind,
                        form = %entry.form,
                        path = %entry.path,
                        granted = entry.granted(),
                        "distribution statistics"
                    );
                }
            }
        }
        for (kind, entry) in tables.linked.iter() {
            tracing::info!(
                scope = "linked",
                %kind,
                form = %entry.form,
                path = %entry.path,
                granted = entry.granted(),
                "distribution statistics"
            );
        }
    }
}

impl core::fmt::Debug for Distributor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Distributor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Returns true if the NPC already has `form`.
///
/// Keywords are matched by editor id as well, since two plugins may define
/// keywords with the same name.
pub(crate) fn possesses(npc: &NpcSnapshot, host: &dyn NpcHost, form: &Form) -> bool {
    match form.kind {
        FormKind::Keyword => {
            npc.has_keyword_id(form.id)
                || npc.has_keyword_str(&form.editor_id)
                || host.has_form(form)
        }
        _ => host.has_form(form),
    }
}
