//! Read-only NPC view evaluated by filters.
//!
//! An [`NpcSnapshot`] is built once per distribution pass from host data. Filter
//! predicates only ever borrow it; the engine itself updates the keyword set
//! between entries so that later keyword rules observe earlier grants.

use std::collections::HashSet;

use crate::config::DistributionConfig;
use crate::form::{Form, FormId};

/// Biological sex as reported by the host.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Sex {
    #[default]
    Male,
    Female,
}

/// Actor skill slots, in host order.
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
    strum::FromRepr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(ascii_case_insensitive)]
#[repr(u8)]
pub enum Skill {
    OneHanded,
    TwoHanded,
    Marksman,
    Block,
    Smithing,
    HeavyArmor,
    LightArmor,
    Pickpocket,
    Lockpicking,
    Sneak,
    Alchemy,
    Speechcraft,
    Alteration,
    Conjuration,
    Destruction,
    Illusion,
    Restoration,
    Enchanting,
}

impl Skill {
    pub const fn index(self) -> usize {
        self as usize
    }
}

bitflags::bitflags! {
    /// Boolean NPC traits.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct NpcFlags: u16 {
        const UNIQUE = 1 << 0;
        const SUMMONABLE = 1 << 1;
        const CHILD = 1 << 2;
        /// Spawned from a leveled template.
        const LEVELED = 1 << 3;
        const TEAMMATE = 1 << 4;
        /// Level follows the player's level.
        const PC_LEVEL_MULT = 1 << 5;
        const PLAYER = 1 << 6;
        /// This record is only a template for other NPCs.
        const TEMPLATE = 1 << 7;
    }
}

/// Life state of the actor at evaluation time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LifeState {
    #[default]
    Alive,
    Dying,
    Dead,
}

impl LifeState {
    pub const fn is_dead_or_dying(self) -> bool {
        matches!(self, LifeState::Dying | LifeState::Dead)
    }
}

/// Skill values indexed by [`Skill`].
pub type SkillTable = [u8; DistributionConfig::SKILL_COUNT];

/// Immutable-per-evaluation view of a character.
#[derive(Clone, Debug, Default)]
pub struct NpcSnapshot {
    /// Actor reference this snapshot was taken from.
    pub actor: FormId,
    /// NPC base record.
    pub npc: FormId,
    pub editor_id: String,
    pub name: String,
    /// Template/original base ids for leveled actors.
    pub original_ids: Vec<FormId>,
    pub original_editor_ids: Vec<String>,
    /// Keyword editor ids, ASCII lowercase.
    keywords: HashSet<String>,
    keyword_ids: HashSet<FormId>,
    pub race: Option<FormId>,
    pub class: Option<FormId>,
    pub combat_style: Option<FormId>,
    pub voice_type: Option<FormId>,
    pub default_outfit: Option<FormId>,
    pub skin: Option<FormId>,
    pub factions: HashSet<FormId>,
    pub spells: HashSet<FormId>,
    /// Current location followed by its parents.
    pub locations: Vec<FormId>,
    /// Plugins that define or override this NPC.
    pub files: Vec<String>,
    pub level: u16,
    /// Level the actor stops at when it follows the player, 0 if unbounded.
    pub level_cap: u16,
    pub skills: SkillTable,
    pub skill_weights: SkillTable,
    pub sex: Sex,
    pub flags: NpcFlags,
    pub life: LifeState,
}

impl NpcSnapshot {
    pub fn new(actor: FormId, npc: FormId, editor_id: impl Into<String>) -> Self {
        Self {
            actor,
            npc,
            editor_id: editor_id.into(),
            ..Self::default()
        }
    }

    /// Base id used to key per-template caches.
    pub fn template_id(&self) -> FormId {
        self.original_ids.first().copied().unwrap_or(self.npc)
    }

    pub fn has_flag(&self, flag: NpcFlags) -> bool {
        self.flags.contains(flag)
    }

    pub fn is_pc_level_mult(&self) -> bool {
        self.has_flag(NpcFlags::PC_LEVEL_MULT)
    }

    pub fn skill(&self, skill: Skill) -> u8 {
        self.skills[skill.index()]
    }

    pub fn skill_weight(&self, skill: Skill) -> u8 {
        self.skill_weights[skill.index()]
    }

    /// Records a keyword as present on the NPC.
    pub fn insert_keyword(&mut self, keyword: &Form) {
        self.keywords.insert(keyword.editor_id.to_ascii_lowercase());
        self.keyword_ids.insert(keyword.id);
    }

    /// Forgets a keyword, e.g. after it was revoked.
    pub fn remove_keyword(&mut self, keyword: &Form) {
        self.keywords.remove(&keyword.editor_id.to_ascii_lowercase());
        self.keyword_ids.remove(&keyword.id);
    }

    pub fn has_keyword_id(&self, id: FormId) -> bool {
        self.keyword_ids.contains(&id)
    }

    /// Case-insensitive keyword editor-id lookup.
    pub fn has_keyword_str(&self, editor_id: &str) -> bool {
        self.keywords.contains(&editor_id.to_ascii_lowercase())
    }

    /// Keyword editor ids (lowercase).
    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.keywords.iter().map(String::as_str)
    }

    /// Name and every editor id the NPC answers to.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        core::iter::once(self.name.as_str())
            .chain(core::iter::once(self.editor_id.as_str()))
            .chain(self.original_editor_ids.iter().map(String::as_str))
            .filter(|s| !s.is_empty())
    }

    /// Returns true if `id` is this NPC or one of its templates.
    pub fn is_identity(&self, id: FormId) -> bool {
        self.npc == id || self.original_ids.contains(&id)
    }
}

/// Builder for snapshots, mostly used by hosts and tests.
#[derive(Default)]
pub struct NpcSnapshotBuilder {
    snapshot: NpcSnapshot,
}

impl NpcSnapshotBuilder {
    pub fn new(actor: FormId, npc: FormId, editor_id: impl Into<String>) -> Self {
        Self {
            snapshot: NpcSnapshot::new(actor, npc, editor_id),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.snapshot.name = name.into();
        self
    }

    pub fn original(mut self, id: FormId, editor_id: impl Into<String>) -> Self {
        self.snapshot.original_ids.push(id);
        self.snapshot.original_editor_ids.push(editor_id.into());
        self
    }

    pub fn keyword(mut self, keyword: &Form) -> Self {
        self.snapshot.insert_keyword(keyword);
        self
    }

    pub fn race(mut self, race: FormId) -> Self {
        self.snapshot.race = Some(race);
        self
    }

    pub fn class(mut self, class: FormId) -> Self {
        self.snapshot.class = Some(class);
        self
    }

    pub fn combat_style(mut self, style: FormId) -> Self {
        self.snapshot.combat_style = Some(style);
        self
    }

    pub fn voice_type(mut self, voice: FormId) -> Self {
        self.snapshot.voice_type = Some(voice);
        self
    }

    pub fn outfit(mut self, outfit: FormId) -> Self {
        self.snapshot.default_outfit = Some(outfit);
        self
    }

    pub fn skin(mut self, skin: FormId) -> Self {
        self.snapshot.skin = Some(skin);
        self
    }

    pub fn faction(mut self, faction: FormId) -> Self {
        self.snapshot.factions.insert(faction);
        self
    }

    pub fn spell(mut self, spell: FormId) -> Self {
        self.snapshot.spells.insert(spell);
        self
    }

    pub fn location(mut self, location: FormId) -> Self {
        self.snapshot.locations.push(location);
        self
    }

    pub fn file(mut self, file: impl Into<String>) -> Self {
        self.snapshot.files.push(file.into());
        self
    }

    pub fn level(mut self, level: u16) -> Self {
        self.snapshot.level = level;
        self
    }

    pub fn level_cap(mut self, cap: u16) -> Self {
        self.snapshot.level_cap = cap;
        self
    }

    pub fn skill(mut self, skill: Skill, value: u8) -> Self {
        self.snapshot.skills[skill.index()] = value;
        self
    }

    pub fn skill_weight(mut self, skill: Skill, value: u8) -> Self {
        self.snapshot.skill_weights[skill.index()] = value;
        self
    }

    pub fn sex(mut self, sex: Sex) -> Self {
        self.snapshot.sex = sex;
        self
    }

    pub fn flags(mut self, flags: NpcFlags) -> Self {
        self.snapshot.flags |= flags;
        self
    }

    pub fn life(mut self, life: LifeState) -> Self {
        self.snapshot.life = life;
        self
    }

    pub fn build(self) -> NpcSnapshot {
        self.snapshot
    }
}
