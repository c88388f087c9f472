//! Tokenized rule records.
//!
//! These mirror one line of a rule file after tokenizing: every form is
//! still a [`RawForm`] and every filter is still a flat list. Nothing here is
//! validated; [`lookup`](super::lookup) does that.

use crate::distribute::{DistributionType, IndexOrCount, RecordKind};
use crate::filter::LevelRange;
use crate::form::RawForm;
use crate::npc::{Sex, Skill};

/// String filters. Each text matches a name, an editor id or a keyword.
///
/// A leading `*` turns a text into a containment test.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StringFilters {
    /// Every text must match.
    pub all: Vec<String>,
    /// No text may match.
    pub not: Vec<String>,
    /// At least one text must match.
    pub matches: Vec<String>,
    /// At least one text must be contained.
    pub any: Vec<String>,
}

impl StringFilters {
    pub fn is_empty(&self) -> bool {
        self.all.is_empty() && self.not.is_empty() && self.matches.is_empty() && self.any.is_empty()
    }
}

/// Form filters, resolved at lookup.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FormFilters {
    pub all: Vec<RawForm>,
    pub not: Vec<RawForm>,
    pub matches: Vec<RawForm>,
}

impl FormFilters {
    pub fn is_empty(&self) -> bool {
        self.all.is_empty() && self.not.is_empty() && self.matches.is_empty()
    }
}

/// Level and skill ranges. Every range must hold.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LevelFilters {
    pub level: Option<LevelRange>,
    pub skills: Vec<(Skill, LevelRange)>,
    pub skill_weights: Vec<(Skill, LevelRange)>,
}

/// Trait requirements. `None` means "don't care".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TraitFilters {
    pub sex: Option<Sex>,
    pub unique: Option<bool>,
    pub summonable: Option<bool>,
    pub child: Option<bool>,
    pub leveled: Option<bool>,
    pub teammate: Option<bool>,
}

/// One distribution rule.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawRecord {
    pub kind: RecordKind,
    pub form: RawForm,
    /// Death rules run when the NPC dies instead of when it loads.
    #[cfg_attr(feature = "serde", serde(default))]
    pub scope: DistributionType,
    #[cfg_attr(feature = "serde", serde(default))]
    pub strings: StringFilters,
    #[cfg_attr(feature = "serde", serde(default))]
    pub forms: FormFilters,
    #[cfg_attr(feature = "serde", serde(default))]
    pub levels: LevelFilters,
    #[cfg_attr(feature = "serde", serde(default))]
    pub traits: TraitFilters,
    #[cfg_attr(feature = "serde", serde(default))]
    pub index_or_count: Option<IndexOrCount>,
    /// Percent chance in `[0, 100]`.
    #[cfg_attr(feature = "serde", serde(default = "full_chance"))]
    pub chance: f32,
    /// Outfits only: regular distribution cannot replace the outfit.
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_final: bool,
    /// Rule file the record came from. Set by the loader.
    #[cfg_attr(feature = "serde", serde(default))]
    pub path: String,
}

impl RawRecord {
    /// A record that matches every NPC.
    pub fn new(kind: RecordKind, form: RawForm) -> Self {
        Self {
            kind,
            form,
            scope: DistributionType::default(),
            strings: StringFilters::default(),
            forms: FormFilters::default(),
            levels: LevelFilters::default(),
            traits: TraitFilters::default(),
            index_or_count: None,
            chance: 100.0,
            is_final: false,
            path: String::new(),
        }
    }

    /// Table the record belongs to. Death items always run on death.
    pub fn effective_scope(&self) -> DistributionType {
        if self.kind == RecordKind::DeathItem {
            DistributionType::Death
        } else {
            self.scope
        }
    }
}

/// An entry granted whenever one of its parents is granted.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawLinkedRecord {
    pub kind: RecordKind,
    pub form: RawForm,
    #[cfg_attr(feature = "serde", serde(default))]
    pub scope: DistributionType,
    pub parents: Vec<RawForm>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub index_or_count: Option<IndexOrCount>,
    #[cfg_attr(feature = "serde", serde(default = "full_chance"))]
    pub chance: f32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub path: String,
}

/// Named set of forms an NPC may own at most one of.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawFormGroup {
    pub name: String,
    pub forms: Vec<RawForm>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub path: String,
}

/// Everything read from the rule files.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RuleSet {
    pub records: Vec<RawRecord>,
    pub linked: Vec<RawLinkedRecord>,
    /// Forms that exclude each other once distributed.
    pub exclusion_groups: Vec<RawFormGroup>,
    /// Forms that exclude each other regardless of origin.
    pub exclusive_groups: Vec<RawFormGroup>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `other`, keeping file order.
    pub fn merge(&mut self, other: RuleSet) {
        self.records.extend(other.records);
        self.linked.extend(other.linked);
        self.exclusion_groups.extend(other.exclusion_groups);
        self.exclusive_groups.extend(other.exclusive_groups);
    }

    /// Sets `path` on every record that has none.
    pub fn set_path(&mut self, path: &str) {
        let records = self.records.iter_mut().map(|r| &mut r.path);
        let linked = self.linked.iter_mut().map(|r| &mut r.path);
        let groups = self
            .exclusion_groups
            .iter_mut()
            .chain(self.exclusive_groups.iter_mut())
            .map(|g| &mut g.path);
        for slot in records.chain(linked).chain(groups) {
            if slot.is_empty() {
                *slot = path.to_string();
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
            && self.linked.is_empty()
            && self.exclusion_groups.is_empty()
            && self.exclusive_groups.is_empty()
    }
}

#[cfg(feature = "serde")]
fn full_chance() -> f32 {
    100.0
}
