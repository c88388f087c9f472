//! Host object handles.
//!
//! Every object the host exposes (NPC bases, actor references, items, spells,
//! keywords, ...) is identified by a [`FormId`]. Resolved objects are shared as
//! [`FormRef`]s; identity is the form id, never the pointer.

use std::sync::Arc;

/// Host form identifier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FormId(pub u32);

impl FormId {
    /// The null form id. Never refers to a live object.
    pub const NONE: FormId = FormId(0);

    pub const fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl core::fmt::Display for FormId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:#010X}", self.0)
    }
}

/// Shared handle to a resolved form.
pub type FormRef = Arc<Form>;

/// Form type, as classified by the host.
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
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum FormKind {
    Keyword,
    Spell,
    Perk,
    Shout,
    LeveledSpell,
    Package,
    Outfit,
    Faction,
    Armor,
    Weapon,
    Ammo,
    MiscItem,
    Ingredient,
    Potion,
    Book,
    Scroll,
    SoulGem,
    Key,
    Light,
    LeveledItem,
    Race,
    Class,
    CombatStyle,
    Npc,
    VoiceType,
    FormList,
    Location,
}

impl FormKind {
    /// Returns true for forms that live in an inventory.
    pub const fn is_inventory_item(self) -> bool {
        matches!(
            self,
            FormKind::Armor
                | FormKind::Weapon
                | FormKind::Ammo
                | FormKind::MiscItem
                | FormKind::Ingredient
                | FormKind::Potion
                | FormKind::Book
                | FormKind::Scroll
                | FormKind::SoulGem
                | FormKind::Key
                | FormKind::Light
                | FormKind::LeveledItem
        )
    }

    /// Returns true for forms a form filter may compare an NPC against.
    pub const fn is_filterable(self) -> bool {
        matches!(
            self,
            FormKind::Faction
                | FormKind::Class
                | FormKind::CombatStyle
                | FormKind::Race
                | FormKind::Outfit
                | FormKind::Npc
                | FormKind::VoiceType
                | FormKind::Spell
                | FormKind::FormList
                | FormKind::Armor
                | FormKind::Location
                | FormKind::Keyword
        )
    }
}

/// One row of a leveled list.
#[derive(Clone, Debug, PartialEq)]
pub struct LeveledEntry {
    /// Minimum NPC level for this row.
    pub level: u16,
    pub form: FormRef,
    pub count: u16,
}

/// Level-gated object list resolved against the NPC's level.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LeveledList {
    pub entries: Vec<LeveledEntry>,
    /// Grant every eligible row instead of one random row.
    pub use_all: bool,
    /// Pick among every eligible row instead of only those at the highest
    /// eligible level.
    pub from_all_levels: bool,
}

/// Kind-specific payload carried by a form.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum FormBody {
    #[default]
    Plain,
    /// Members of a form list.
    List(Vec<FormRef>),
    /// Rows of a leveled item or leveled spell.
    Leveled(LeveledList),
    /// Items an outfit equips.
    Outfit(Vec<FormRef>),
}

/// A resolved host object.
#[derive(Clone, Debug)]
pub struct Form {
    pub id: FormId,
    pub kind: FormKind,
    pub editor_id: String,
    /// Plugin file that defines this form, if known.
    pub file: Option<String>,
    pub body: FormBody,
}

impl Form {
    pub fn new(id: FormId, kind: FormKind, editor_id: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            editor_id: editor_id.into(),
            file: None,
            body: FormBody::Plain,
        }
    }

    #[must_use]
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: FormBody) -> Self {
        self.body = body;
        self
    }

    /// Wraps this form into a shared handle.
    pub fn into_ref(self) -> FormRef {
        Arc::new(self)
    }

    /// Members if this is a form list, empty otherwise.
    pub fn list_members(&self) -> &[FormRef] {
        match &self.body {
            FormBody::List(members) => members,
            _ => &[],
        }
    }

    /// Items if this is an outfit, empty otherwise.
    pub fn outfit_items(&self) -> &[FormRef] {
        match &self.body {
            FormBody::Outfit(items) => items,
            _ => &[],
        }
    }

    pub fn leveled(&self) -> Option<&LeveledList> {
        match &self.body {
            FormBody::Leveled(list) => Some(list),
            _ => None,
        }
    }
}

impl PartialEq for Form {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Form {}

impl core::hash::Hash for Form {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl core::fmt::Display for Form {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.editor_id.is_empty() {
            write!(f, "[{}:{}]", self.kind, self.id)
        } else {
            write!(f, "{} [{}:{}]", self.editor_id, self.kind, self.id)
        }
    }
}

/// An unresolved reference to a form, as written in a rule file.
///
/// Serialized as its rule text, see [`RawForm::parse`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "String", into = "String")
)]
pub enum RawForm {
    /// Local form id, optionally qualified by the defining plugin.
    Id { id: u32, file: Option<String> },
    /// Editor id.
    EditorId(String),
    /// A whole plugin file (only meaningful as a filter).
    File(String),
}

impl RawForm {
    const PLUGIN_EXTENSIONS: [&'static str; 3] = [".esp", ".esm", ".esl"];

    /// Classifies rule text: `0x800~Plugin.esp`, `0x800`, `Plugin.esp` or an
    /// editor id.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        let (id_part, file) = match text.split_once('~') {
            Some((id, file)) => (id.trim(), Some(file.trim().to_string())),
            None => (text, None),
        };

        if let Some(hex) = id_part
            .strip_prefix("0x")
            .or_else(|| id_part.strip_prefix("0X"))
            && let Ok(id) = u32::from_str_radix(hex, 16)
        {
            return RawForm::Id { id, file };
        }

        let lower = text.to_ascii_lowercase();
        if Self::PLUGIN_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
            return RawForm::File(text.to_string());
        }

        RawForm::EditorId(text.to_string())
    }
}

impl core::fmt::Display for RawForm {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            RawForm::Id { id, file: Some(file) } => write!(f, "{id:#X}~{file}"),
            RawForm::Id { id, file: None } => write!(f, "{id:#X}"),
            RawForm::EditorId(edid) => f.write_str(edid),
            RawForm::File(file) => f.write_str(file),
        }
    }
}

impl From<String> for RawForm {
    fn from(text: String) -> Self {
        RawForm::parse(&text)
    }
}

impl From<RawForm> for String {
    fn from(raw: RawForm) -> Self {
        raw.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_form_classification() {
        assert_eq!(
            RawForm::parse("0x12E49~Skyrim.esm"),
            RawForm::Id { id: 0x12E49, file: Some("Skyrim.esm".into()) }
        );
        assert_eq!(RawForm::parse("0x800"), RawForm::Id { id: 0x800, file: None });
        assert_eq!(RawForm::parse("Dawnguard.ESM"), RawForm::File("Dawnguard.ESM".into()));
        assert_eq!(RawForm::parse("ActorTypeNPC"), RawForm::EditorId("ActorTypeNPC".into()));
    }

    #[test]
    fn forms_compare_by_id() {
        let a = Form::new(FormId(1), FormKind::Spell, "A");
        let b = Form::new(FormId(1), FormKind::Spell, "Renamed");
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "A [SPELL:0x00000001]");
    }

    #[test]
    fn form_kind_parses_case_insensitively() {
        assert_eq!("faction".parse::<FormKind>().ok(), Some(FormKind::Faction));
        assert_eq!(FormKind::LeveledItem.as_ref(), "LEVELEDITEM");
    }
}
