//! Record kinds a rule can distribute.

use crate::form::FormKind;

/// Kind of object a distribution rule grants.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(ascii_case_insensitive)]
pub enum RecordKind {
    Keyword,
    Spell,
    Perk,
    Item,
    Shout,
    LevSpell,
    Package,
    Outfit,
    DeathItem,
    Faction,
    SleepOutfit,
    Skin,
}

impl RecordKind {
    /// Every kind, in distribution order.
    ///
    /// Keywords go first so that every other kind can filter on them.
    pub const ALL: [RecordKind; 12] = [
        RecordKind::Keyword,
        RecordKind::Spell,
        RecordKind::Perk,
        RecordKind::Item,
        RecordKind::Shout,
        RecordKind::LevSpell,
        RecordKind::Package,
        RecordKind::Outfit,
        RecordKind::DeathItem,
        RecordKind::Faction,
        RecordKind::SleepOutfit,
        RecordKind::Skin,
    ];

    /// Returns true if a form of `kind` can be distributed by this rule kind.
    pub const fn accepts(self, kind: FormKind) -> bool {
        match self {
            RecordKind::Keyword => matches!(kind, FormKind::Keyword),
            RecordKind::Spell => matches!(kind, FormKind::Spell),
            RecordKind::Perk => matches!(kind, FormKind::Perk),
            RecordKind::Item | RecordKind::DeathItem => kind.is_inventory_item(),
            RecordKind::Shout => matches!(kind, FormKind::Shout),
            RecordKind::LevSpell => matches!(kind, FormKind::LeveledSpell),
            RecordKind::Package => matches!(kind, FormKind::Package | FormKind::FormList),
            RecordKind::Outfit | RecordKind::SleepOutfit => matches!(kind, FormKind::Outfit),
            RecordKind::Faction => matches!(kind, FormKind::Faction),
            RecordKind::Skin => matches!(kind, FormKind::Armor),
        }
    }

    /// Human-readable name of the accepted form type, for diagnostics.
    pub const fn expected(self) -> &'static str {
        match self {
            RecordKind::Keyword => "a keyword",
            RecordKind::Spell => "a spell",
            RecordKind::Perk => "a perk",
            RecordKind::Item | RecordKind::DeathItem => "an inventory item",
            RecordKind::Shout => "a shout",
            RecordKind::LevSpell => "a leveled spell",
            RecordKind::Package => "a package or package list",
            RecordKind::Outfit | RecordKind::SleepOutfit => "an outfit",
            RecordKind::Faction => "a faction",
            RecordKind::Skin => "an armor",
        }
    }

    /// Only the first matching entry of these kinds is applied.
    pub const fn is_first_match(self) -> bool {
        matches!(
            self,
            RecordKind::Outfit | RecordKind::SleepOutfit | RecordKind::Skin
        )
    }

    /// Entries of these kinds carry a count rather than an index.
    pub const fn is_countable(self) -> bool {
        matches!(self, RecordKind::Item | RecordKind::DeathItem)
    }

    /// Entries of these kinds carry a placement index.
    pub const fn uses_index(self) -> bool {
        matches!(self, RecordKind::Package)
    }

    /// Kinds that are granted at most once per NPC.
    pub const fn is_unique_per_npc(self) -> bool {
        matches!(
            self,
            RecordKind::Keyword
                | RecordKind::Spell
                | RecordKind::Perk
                | RecordKind::Shout
                | RecordKind::LevSpell
                | RecordKind::Package
                | RecordKind::Faction
        )
    }
}
