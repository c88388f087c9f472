//! Distribution tables shared by every evaluation.

use std::collections::BTreeMap;

use super::{Distributable, LinkedForms, RecordKind};
use crate::exclusion::FormGroups;
use crate::form::{FormId, FormRef};

/// One list of entries per record kind, in configured order.
#[derive(Debug, Default)]
pub struct DistributableForms {
    lists: BTreeMap<RecordKind, Vec<Distributable>>,
}

impl DistributableForms {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: RecordKind, entry: Distributable) {
        self.lists.entry(kind).or_default().push(entry);
    }

    pub fn get(&self, kind: RecordKind) -> &[Distributable] {
        self.lists.get(&kind).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn get_mut(&mut self, kind: RecordKind) -> &mut Vec<Distributable> {
        self.lists.entry(kind).or_default()
    }

    /// Total number of entries.
    pub fn len(&self) -> usize {
        self.lists.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Non-empty lists in distribution order.
    pub fn iter(&self) -> impl Iterator<Item = (RecordKind, &[Distributable])> {
        self.lists
            .iter()
            .filter(|(_, list)| !list.is_empty())
            .map(|(kind, list)| (*kind, list.as_slice()))
    }

    /// Borrows every entry as a [`DistributionSet`].
    pub fn as_set(&self) -> DistributionSet<'_> {
        let mut set = DistributionSet::default();
        for (kind, list) in self.iter() {
            set.lists.insert(kind, list.iter().collect());
        }
        set
    }
}

/// Borrowed entries to evaluate in one pass.
#[derive(Debug, Default)]
pub struct DistributionSet<'a> {
    lists: BTreeMap<RecordKind, Vec<&'a Distributable>>,
}

impl<'a> DistributionSet<'a> {
    pub fn push(&mut self, kind: RecordKind, entry: &'a Distributable) {
        self.lists.entry(kind).or_default().push(entry);
    }

    pub fn get(&self, kind: RecordKind) -> &[&'a Distributable] {
        self.lists.get(&kind).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.lists.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Every table the engine reads.
///
/// Built once by the lookup step, then shared read-only.
#[derive(Debug, Default)]
pub struct DistributionTables {
    pub regular: DistributableForms,
    /// Entries applied when an NPC dies.
    pub death: DistributableForms,
    pub linked: LinkedForms,
    pub exclusion_groups: FormGroups,
    pub exclusive_groups: FormGroups,
}

impl DistributionTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forms that may not coexist with `form`, from both group systems.
    pub fn mutually_exclusive_forms(&self, form: FormId) -> Vec<FormRef> {
        let mut forms = self.exclusion_groups.mutually_exclusive_forms_for_form(form);
        for other in self.exclusive_groups.mutually_exclusive_forms_for_form(form) {
            if !forms.iter().any(|f| f.id == other.id) {
                forms.push(other);
            }
        }
        forms
    }

    pub fn is_empty(&self) -> bool {
        self.regular.is_empty() && self.death.is_empty() && self.linked.is_empty()
    }
}
