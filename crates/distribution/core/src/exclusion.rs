//! Named groups of mutually exclusive forms.

use std::collections::{BTreeMap, BTreeSet};

use crate::form::{FormId, FormRef};

/// Group name to members, with a reverse index from member to groups.
#[derive(Clone, Debug, Default)]
pub struct FormGroups {
    groups: BTreeMap<String, BTreeMap<FormId, FormRef>>,
    membership: BTreeMap<FormId, BTreeSet<String>>,
}

impl FormGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `forms` to the group `name`, creating it if needed.
    pub fn insert(&mut self, name: &str, forms: impl IntoIterator<Item = FormRef>) {
        let members = self.groups.entry(name.to_string()).or_default();
        for form in forms {
            self.membership
                .entry(form.id)
                .or_default()
                .insert(name.to_string());
            members.insert(form.id, form);
        }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Member ids of the group `name`.
    pub fn members(&self, name: &str) -> Option<impl Iterator<Item = FormId> + '_> {
        self.groups.get(name).map(|members| members.keys().copied())
    }

    /// Every other member of every group that contains `form`, ordered by id.
    pub fn mutually_exclusive_forms_for_form(&self, form: FormId) -> Vec<FormRef> {
        let Some(names) = self.membership.get(&form) else {
            return Vec::new();
        };
        let union: BTreeMap<FormId, &FormRef> = names
            .iter()
            .filter_map(|name| self.groups.get(name))
            .flatten()
            .filter(|(id, _)| **id != form)
            .map(|(id, member)| (*id, member))
            .collect();
        union.into_values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{Form, FormKind};

    fn armor(id: u32) -> FormRef {
        Form::new(FormId(id), FormKind::Armor, format!("Armor{id}")).into_ref()
    }

    fn ids(forms: Vec<FormRef>) -> Vec<FormId> {
        forms.iter().map(|f| f.id).collect()
    }

    #[test]
    fn union_of_all_groups_minus_self() {
        let mut groups = FormGroups::new();
        groups.insert("Helmets", [armor(1), armor(2), armor(3)]);
        groups.insert("Iron", [armor(1), armor(10)]);

        let excluded = groups.mutually_exclusive_forms_for_form(FormId(1));
        assert_eq!(ids(excluded), vec![FormId(2), FormId(3), FormId(10)]);
        assert!(groups.mutually_exclusive_forms_for_form(FormId(99)).is_empty());
    }

    #[test]
    fn inserting_twice_extends_group() {
        let mut groups = FormGroups::new();
        groups.insert("A", [armor(1)]);
        groups.insert("A", [armor(2)]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups.members("A").map(Iterator::count), Some(2));
        assert_eq!(ids(groups.mutually_exclusive_forms_for_form(FormId(2))), vec![FormId(1)]);
    }
}
