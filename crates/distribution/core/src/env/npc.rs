//! NPC mutation interface.

use crate::distribute::RecordKind;
use crate::form::{Form, FormRef};

/// Host-side NPC that distributed objects are attached to.
///
/// Each method is a thin call into the host; the core only decides *what* to
/// attach.
pub trait NpcHost {
    /// Returns true if the NPC already has `form`: faction membership, spell,
    /// perk, shout or package presence, keyword, or a nonzero inventory count.
    fn has_form(&self, form: &Form) -> bool;

    /// Attaches non-inventory forms of one kind.
    fn grant(&mut self, kind: RecordKind, forms: &[FormRef]);

    /// Detaches non-inventory forms of one kind.
    fn revoke(&mut self, kind: RecordKind, forms: &[FormRef]);

    /// Adds inventory items with their counts.
    fn add_items(&mut self, items: &[(FormRef, u32)]);

    /// Removes inventory items with their counts.
    fn remove_items(&mut self, items: &[(FormRef, u32)]);

    /// Inserts AI packages at the given indices, in order.
    fn insert_packages(&mut self, packages: &[(FormRef, i32)]);

    fn set_skin(&mut self, skin: &FormRef);

    fn set_sleep_outfit(&mut self, outfit: &FormRef);
}
