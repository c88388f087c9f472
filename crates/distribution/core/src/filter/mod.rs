//! Filter primitives evaluated against an [`NpcSnapshot`].
//!
//! [`Filter`] is the closed set of leaf predicates a rule can use. Leaves are
//! composed into [`Filters`] trees by the lookup step and evaluated through a
//! [`FilterContext`], which carries the NPC, the shared random stream and the
//! level-scaling switch.
//!
//! # Outcomes
//!
//! Every predicate is deterministic except [`Filter::Chance`]. A failed chance
//! roll yields [`Outcome::Discard`] instead of [`Outcome::Fail`] so callers can
//! tell a permanent opt-out from an attribute mismatch.
mod forms;
mod levels;
mod strings;

pub use levels::LevelRange;

use expression_tree::{Expression, Outcome, Predicate};

use crate::env::RngOracle;
use crate::form::{FormRef, RawForm};
use crate::npc::{NpcFlags, NpcSnapshot, Sex, Skill};

/// Filter tree attached to a distributable entry.
pub type Filters = Expression<Filter>;

/// Evaluation context passed to every leaf.
#[derive(Clone, Copy)]
pub struct FilterContext<'a> {
    pub npc: &'a NpcSnapshot,
    pub rng: &'a dyn RngOracle,
    /// Evaluate level and skill ranges for NPCs whose level follows the
    /// player. When false those ranges fail for such NPCs, deferring them to
    /// the level-up pass.
    pub include_level_scaled: bool,
}

impl<'a> FilterContext<'a> {
    pub fn new(npc: &'a NpcSnapshot, rng: &'a dyn RngOracle) -> Self {
        Self {
            npc,
            rng,
            include_level_scaled: false,
        }
    }

    #[must_use]
    pub fn with_level_scaled(mut self, include: bool) -> Self {
        self.include_level_scaled = include;
        self
    }

    fn skips_level_ranges(&self) -> bool {
        !self.include_level_scaled && self.npc.is_pc_level_mult()
    }
}

/// Leaf predicate of a filter tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Filter {
    /// Case-insensitive equality with a name, editor id or keyword.
    Match(String),
    /// Case-insensitive containment in a name, editor id or keyword.
    Wildcard(String),
    /// Type-dependent membership of a resolved form.
    Form(FormRef),
    /// The NPC is defined or overridden by this plugin.
    Mod(String),
    /// Form reference awaiting lookup. Never valid.
    Unresolved(RawForm),
    Level(LevelRange),
    Skill(Skill, LevelRange),
    /// Class weight of a skill rather than its trained level.
    SkillWeight(Skill, LevelRange),
    Sex(Sex),
    Unique(bool),
    Summonable(bool),
    Child(bool),
    Leveled(bool),
    Teammate(bool),
    /// Percent chance in `[0, 100]`.
    Chance(f32),
}

impl Filter {
    /// Returns true for leaves whose result depends on the NPC's level.
    pub fn is_level_scaled(&self) -> bool {
        matches!(self, Filter::Level(_) | Filter::Skill(..))
    }

    /// Returns true for leaves that draw from the random stream.
    pub fn is_random(&self) -> bool {
        matches!(self, Filter::Chance(_))
    }

    /// Editor id named by a string leaf.
    pub fn string_value(&self) -> Option<&str> {
        match self {
            Filter::Match(text) | Filter::Wildcard(text) => Some(text),
            _ => None,
        }
    }

    fn flag(npc: &NpcSnapshot, flag: NpcFlags, expected: bool) -> Outcome {
        Outcome::from_bool(npc.has_flag(flag) == expected)
    }

    fn roll(rng: &dyn RngOracle, threshold: f32) -> Outcome {
        if threshold >= 100.0 {
            return Outcome::Pass;
        }
        if rng.percent() <= threshold {
            Outcome::Pass
        } else {
            Outcome::Discard
        }
    }
}

impl Predicate<FilterContext<'_>> for Filter {
    fn evaluate(&self, ctx: &FilterContext<'_>) -> Outcome {
        let npc = ctx.npc;
        match self {
            Filter::Match(text) => Outcome::from_bool(strings::matches(npc, text)),
            Filter::Wildcard(text) => Outcome::from_bool(strings::contains(npc, text)),
            Filter::Form(form) => Outcome::from_bool(forms::has_form(npc, form)),
            Filter::Mod(file) => {
                Outcome::from_bool(npc.files.iter().any(|f| f.eq_ignore_ascii_case(file)))
            }
            Filter::Unresolved(_) => Outcome::Fail,
            Filter::Level(range) => {
                if ctx.skips_level_ranges() {
                    return Outcome::Fail;
                }
                Outcome::from_bool(range.contains(npc.level))
            }
            Filter::Skill(skill, range) => {
                if ctx.skips_level_ranges() {
                    return Outcome::Fail;
                }
                Outcome::from_bool(range.contains(u16::from(npc.skill(*skill))))
            }
            Filter::SkillWeight(skill, range) => {
                Outcome::from_bool(range.contains(u16::from(npc.skill_weight(*skill))))
            }
            Filter::Sex(sex) => Outcome::from_bool(npc.sex == *sex),
            Filter::Unique(expected) => Self::flag(npc, NpcFlags::UNIQUE, *expected),
            Filter::Summonable(expected) => Self::flag(npc, NpcFlags::SUMMONABLE, *expected),
            Filter::Child(expected) => Self::flag(npc, NpcFlags::CHILD, *expected),
            Filter::Leveled(expected) => Self::flag(npc, NpcFlags::LEVELED, *expected),
            Filter::Teammate(expected) => Self::flag(npc, NpcFlags::TEAMMATE, *expected),
            Filter::Chance(threshold) => Self::roll(ctx.rng, *threshold),
        }
    }

    fn is_valid(&self) -> bool {
        !matches!(self, Filter::Unresolved(_))
    }
}

impl core::fmt::Display for Filter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Filter::Match(text) => f.write_str(text),
            Filter::Wildcard(text) => write!(f, "*{text}"),
            Filter::Form(form) => write!(f, "{form}"),
            Filter::Mod(file) => f.write_str(file),
            Filter::Unresolved(raw) => write!(f, "?{raw}"),
            Filter::Level(range) => write!(f, "level({range})"),
            Filter::Skill(skill, range) => write!(f, "{skill}({range})"),
            Filter::SkillWeight(skill, range) => write!(f, "{skill}.weight({range})"),
            Filter::Sex(sex) => write!(f, "{sex}"),
            Filter::Unique(expected) => write_flag(f, "U", *expected),
            Filter::Summonable(expected) => write_flag(f, "S", *expected),
            Filter::Child(expected) => write_flag(f, "C", *expected),
            Filter::Leveled(expected) => write_flag(f, "L", *expected),
            Filter::Teammate(expected) => write_flag(f, "T", *expected),
            Filter::Chance(threshold) => write!(f, "{threshold}%"),
        }
    }
}

fn write_flag(f: &mut core::fmt::Formatter<'_>, name: &str, expected: bool) -> core::fmt::Result {
    if expected {
        f.write_str(name)
    } else {
        write!(f, "-{name}")
    }
}
