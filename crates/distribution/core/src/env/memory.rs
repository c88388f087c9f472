//! In-memory host implementations.
//!
//! These back the test suites and offline tools. They model the host just
//! closely enough for the distribution and outfit logic: a load order of
//! plugin files, form lookup by id or editor id, per-NPC possessions and an
//! actor's worn outfit.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{PoisonError, RwLock};

use super::{FormOracle, LookupError, NpcHost, OutfitActor, validate_editor_id};
use crate::distribute::RecordKind;
use crate::form::{Form, FormId, FormKind, FormRef, RawForm};
use crate::npc::LifeState;

const LOCAL_ID_MASK: u32 = 0x00FF_FFFF;

#[derive(Debug, Default)]
struct FormIndex {
    by_id: HashMap<FormId, FormRef>,
    /// Lowercase editor id to form id.
    by_editor_id: HashMap<String, FormId>,
    next_dynamic: u32,
}

/// Form oracle backed by a hash map.
#[derive(Debug)]
pub struct MemoryForms {
    /// Lowercase plugin names in load order.
    files: Vec<String>,
    index: RwLock<FormIndex>,
}

impl MemoryForms {
    /// First id handed out to keywords created at runtime.
    pub const DYNAMIC_BASE: u32 = 0xFF00_0800;

    pub fn new() -> Self {
        Self {
            files: Vec::new(),
            index: RwLock::new(FormIndex {
                next_dynamic: Self::DYNAMIC_BASE,
                ..FormIndex::default()
            }),
        }
    }

    /// Registers a plugin file as loaded.
    #[must_use]
    pub fn with_file(mut self, file: &str) -> Self {
        self.files.push(file.to_ascii_lowercase());
        self
    }

    /// Registers a form and returns its shared handle.
    pub fn insert(&self, form: Form) -> FormRef {
        let form = form.into_ref();
        let mut index = self.index.write().unwrap_or_else(PoisonError::into_inner);
        if !form.editor_id.is_empty() {
            index
                .by_editor_id
                .insert(form.editor_id.to_ascii_lowercase(), form.id);
        }
        index.by_id.insert(form.id, form.clone());
        form
    }

    pub fn len(&self) -> usize {
        self.index
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .by_id
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn by_editor_id(&self, editor_id: &str) -> Option<FormRef> {
        let index = self.index.read().unwrap_or_else(PoisonError::into_inner);
        index
            .by_editor_id
            .get(&editor_id.to_ascii_lowercase())
            .and_then(|id| index.by_id.get(id))
            .cloned()
    }

    fn by_local_id(&self, local: u32, file: &str) -> Option<FormRef> {
        let index = self.index.read().unwrap_or_else(PoisonError::into_inner);
        index
            .by_id
            .values()
            .find(|form| {
                form.id.0 & LOCAL_ID_MASK == local & LOCAL_ID_MASK
                    && form
                        .file
                        .as_deref()
                        .is_some_and(|f| f.eq_ignore_ascii_case(file))
            })
            .cloned()
    }
}

impl Default for MemoryForms {
    fn default() -> Self {
        Self::new()
    }
}

impl FormOracle for MemoryForms {
    fn lookup(&self, raw: &RawForm) -> Result<FormRef, LookupError> {
        match raw {
            RawForm::Id { id, file: Some(file) } => {
                if !self.has_file(file) {
                    return Err(LookupError::UnknownMod(file.clone()));
                }
                self.by_local_id(*id, file)
                    .ok_or_else(|| LookupError::UnknownFormId { raw: raw.clone() })
            }
            RawForm::Id { id, file: None } => self
                .by_id(FormId(*id))
                .ok_or_else(|| LookupError::UnknownFormId { raw: raw.clone() }),
            RawForm::EditorId(editor_id) => {
                validate_editor_id(editor_id)?;
                self.by_editor_id(editor_id)
                    .ok_or_else(|| LookupError::UnknownEditorId(editor_id.clone()))
            }
            RawForm::File(file) => Err(LookupError::UnknownEditorId(file.clone())),
        }
    }

    fn by_id(&self, id: FormId) -> Option<FormRef> {
        self.index
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .by_id
            .get(&id)
            .cloned()
    }

    fn has_file(&self, file: &str) -> bool {
        let file = file.to_ascii_lowercase();
        self.files.iter().any(|f| *f == file)
    }

    fn create_keyword(&self, editor_id: &str) -> Result<FormRef, LookupError> {
        validate_editor_id(editor_id)
            .map_err(|_| LookupError::KeywordCreation(editor_id.to_string()))?;
        if let Some(existing) = self.by_editor_id(editor_id) {
            return Ok(existing);
        }

        let id = {
            let mut index = self.index.write().unwrap_or_else(PoisonError::into_inner);
            let id = FormId(index.next_dynamic);
            index.next_dynamic += 1;
            id
        };
        Ok(self.insert(Form::new(id, FormKind::Keyword, editor_id)))
    }
}

/// NPC whose possessions are tracked in memory.
#[derive(Clone, Debug, Default)]
pub struct MemoryNpc {
    /// Non-inventory forms attached to the NPC.
    possessions: HashSet<FormId>,
    inventory: BTreeMap<FormId, u32>,
    packages: Vec<(FormId, i32)>,
    skin: Option<FormId>,
    sleep_outfit: Option<FormId>,
    /// Every grant call, in order.
    history: Vec<(RecordKind, FormId)>,
}

impl MemoryNpc {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a form without recording it as a grant.
    #[must_use]
    pub fn with_possession(mut self, id: FormId) -> Self {
        self.possessions.insert(id);
        self
    }

    #[must_use]
    pub fn with_item(mut self, id: FormId, count: u32) -> Self {
        self.inventory.insert(id, count);
        self
    }

    pub fn has(&self, id: FormId) -> bool {
        self.possessions.contains(&id)
    }

    pub fn count(&self, id: FormId) -> u32 {
        self.inventory.get(&id).copied().unwrap_or(0)
    }

    pub fn packages(&self) -> &[(FormId, i32)] {
        &self.packages
    }

    pub fn skin(&self) -> Option<FormId> {
        self.skin
    }

    pub fn sleep_outfit(&self) -> Option<FormId> {
        self.sleep_outfit
    }

    pub fn history(&self) -> &[(RecordKind, FormId)] {
        &self.history
    }

    /// Number of times `id` was granted.
    pub fn grant_count(&self, id: FormId) -> usize {
        self.history.iter().filter(|(_, form)| *form == id).count()
    }
}

impl NpcHost for MemoryNpc {
    fn has_form(&self, form: &Form) -> bool {
        if form.kind.is_inventory_item() {
            self.count(form.id) > 0
        } else if form.kind == FormKind::Package {
            self.packages.iter().any(|(id, _)| *id == form.id)
        } else {
            self.possessions.contains(&form.id)
        }
    }

    fn grant(&mut self, kind: RecordKind, forms: &[FormRef]) {
        for form in forms {
            self.possessions.insert(form.id);
            self.history.push((kind, form.id));
        }
    }

    fn revoke(&mut self, _kind: RecordKind, forms: &[FormRef]) {
        for form in forms {
            self.possessions.remove(&form.id);
        }
    }

    fn add_items(&mut self, items: &[(FormRef, u32)]) {
        for (item, count) in items {
            *self.inventory.entry(item.id).or_default() += count;
            self.history.push((RecordKind::Item, item.id));
        }
    }

    fn remove_items(&mut self, items: &[(FormRef, u32)]) {
        for (item, count) in items {
            if let Some(current) = self.inventory.get_mut(&item.id) {
                *current = current.saturating_sub(*count);
                if *current == 0 {
                    self.inventory.remove(&item.id);
                }
            }
        }
    }

    fn insert_packages(&mut self, packages: &[(FormRef, i32)]) {
        for (package, index) in packages {
            let at = usize::try_from(*index)
                .map_or(self.packages.len(), |i| i.min(self.packages.len()));
            self.packages.insert(at, (package.id, *index));
            self.history.push((RecordKind::Package, package.id));
        }
    }

    fn set_skin(&mut self, skin: &FormRef) {
        self.skin = Some(skin.id);
        self.history.push((RecordKind::Skin, skin.id));
    }

    fn set_sleep_outfit(&mut self, outfit: &FormRef) {
        self.sleep_outfit = Some(outfit.id);
        self.history.push((RecordKind::SleepOutfit, outfit.id));
    }
}

/// Actor with a worn outfit and the outfit items it carries.
#[derive(Clone, Debug)]
pub struct MemoryActor {
    id: FormId,
    npc: FormId,
    life: LifeState,
    outfit: Option<FormRef>,
    /// Outfit items currently in the actor's inventory.
    carried: HashSet<FormId>,
    equips: Vec<FormId>,
}

impl MemoryActor {
    /// Creates a living actor wearing `outfit` with all of its items.
    pub fn new(id: FormId, npc: FormId, outfit: Option<FormRef>) -> Self {
        let carried = outfit
            .iter()
            .flat_map(|o| o.outfit_items().iter().map(|item| item.id))
            .collect();
        Self {
            id,
            npc,
            life: LifeState::Alive,
            outfit,
            carried,
            equips: Vec::new(),
        }
    }

    pub fn set_life_state(&mut self, life: LifeState) {
        self.life = life;
    }

    /// Removes every outfit item, as if the corpse was looted.
    pub fn loot(&mut self) {
        self.carried.clear();
    }

    pub fn outfit_id(&self) -> Option<FormId> {
        self.outfit.as_ref().map(|o| o.id)
    }

    /// Outfits equipped through [`OutfitActor::equip_outfit`], in order.
    pub fn equips(&self) -> &[FormId] {
        &self.equips
    }
}

impl OutfitActor for MemoryActor {
    fn actor_id(&self) -> FormId {
        self.id
    }

    fn npc_id(&self) -> FormId {
        self.npc
    }

    fn life_state(&self) -> LifeState {
        self.life
    }

    fn default_outfit(&self) -> Option<FormRef> {
        self.outfit.clone()
    }

    fn has_outfit_items(&self, outfit: &Form) -> bool {
        outfit
            .outfit_items()
            .iter()
            .all(|item| self.carried.contains(&item.id))
    }

    fn equip_outfit(&mut self, outfit: &FormRef) {
        self.carried = outfit.outfit_items().iter().map(|item| item.id).collect();
        self.outfit = Some(outfit.clone());
        self.equips.push(outfit.id);
    }
}
