//! Entries triggered by another grant.

use std::collections::{BTreeSet, HashMap};

use super::{Distributable, DistributionSet, RecordKind};
use crate::form::FormId;

/// Which table a linked entry follows.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, strum::Display, strum::EnumString,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(ascii_case_insensitive)]
pub enum DistributionType {
    #[default]
    Regular,
    Death,
}

/// Parent form to linked entries, per scope.
///
/// Entries live in one arena; an entry with several parents is stored once
/// and referenced from each parent.
#[derive(Debug, Default)]
pub struct LinkedForms {
    entries: Vec<(RecordKind, Distributable)>,
    links: HashMap<(DistributionType, FormId), Vec<usize>>,
}

impl LinkedForms {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `entry` to run whenever `parent` is granted in `scope`.
    pub fn insert(
        &mut self,
        scope: DistributionType,
        parent: FormId,
        kind: RecordKind,
        entry: Distributable,
    ) {
        self.insert_with_parents(scope, [parent], kind, entry);
    }

    /// Registers `entry` to run whenever any of `parents` is granted.
    pub fn insert_with_parents(
        &mut self,
        scope: DistributionType,
        parents: impl IntoIterator<Item = FormId>,
        kind: RecordKind,
        entry: Distributable,
    ) {
        let index = self.entries.len();
        self.entries.push((kind, entry));
        for parent in parents {
            let slots = self.links.entry((scope, parent)).or_default();
            if !slots.contains(&index) {
                slots.push(index);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every linked entry, for statistics.
    pub fn iter(&self) -> impl Iterator<Item = (RecordKind, &Distributable)> {
        self.entries.iter().map(|(kind, entry)| (*kind, entry))
    }

    /// Entries linked to any of `granted` in `scope`, in registration order.
    ///
    /// An entry linked to several granted parents is included once.
    pub fn linked_set<'a>(
        &'a self,
        scope: DistributionType,
        granted: impl IntoIterator<Item = FormId>,
    ) -> DistributionSet<'a> {
        let selected: BTreeSet<usize> = granted
            .into_iter()
            .filter_map(|parent| self.links.get(&(scope, parent)))
            .flatten()
            .copied()
            .collect();

        let mut set = DistributionSet::default();
        for index in selected {
            let (kind, entry) = &self.entries[index];
            set.push(*kind, entry);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Filters;
    use crate::form::{Form, FormKind};

    fn entry(id: u32) -> Distributable {
        let form = Form::new(FormId(id), FormKind::Spell, "Linked").into_ref();
        Distributable::new(form, Filters::empty(), "Linked_DISTR.ini")
    }

    #[test]
    fn linked_set_is_scoped() {
        let mut linked = LinkedForms::new();
        linked.insert(DistributionType::Regular, FormId(1), RecordKind::Spell, entry(10));
        linked.insert(DistributionType::Death, FormId(1), RecordKind::Spell, entry(11));

        let regular = linked.linked_set(DistributionType::Regular, [FormId(1)]);
        assert_eq!(regular.get(RecordKind::Spell).len(), 1);
        assert_eq!(regular.get(RecordKind::Spell)[0].form.id, FormId(10));
        assert!(linked.linked_set(DistributionType::Death, [FormId(2)]).is_empty());
    }

    #[test]
    fn repeated_parents_do_not_duplicate_entries() {
        let mut linked = LinkedForms::new();
        linked.insert(DistributionType::Regular, FormId(1), RecordKind::Spell, entry(10));
        let set = linked.linked_set(DistributionType::Regular, [FormId(1), FormId(1)]);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn entry_with_several_parents_runs_once() {
        let mut linked = LinkedForms::new();
        linked.insert_with_parents(
            DistributionType::Regular,
            [FormId(1), FormId(2)],
            RecordKind::Spell,
            entry(10),
        );
        assert_eq!(linked.len(), 1);
        let set = linked.linked_set(DistributionType::Regular, [FormId(2), FormId(1)]);
        assert_eq!(set.len(), 1);
    }
}
