//! Form membership predicates.

use crate::config::DistributionConfig;
use crate::form::{Form, FormKind};
use crate::npc::NpcSnapshot;

/// Returns true if `npc` has `form` in the slot its type refers to.
///
/// Form lists match if any member matches, following nested lists up to
/// [`DistributionConfig::MAX_FORM_LIST_DEPTH`] levels.
pub(super) fn has_form(npc: &NpcSnapshot, form: &Form) -> bool {
    has_form_at_depth(npc, form, 0)
}

fn has_form_at_depth(npc: &NpcSnapshot, form: &Form, depth: usize) -> bool {
    let id = form.id;
    match form.kind {
        FormKind::Faction => npc.factions.contains(&id),
        FormKind::Class => npc.class == Some(id),
        FormKind::CombatStyle => npc.combat_style == Some(id),
        FormKind::Race => npc.race == Some(id),
        FormKind::Outfit => npc.default_outfit == Some(id),
        FormKind::Npc => npc.is_identity(id),
        FormKind::VoiceType => npc.voice_type == Some(id),
        FormKind::Spell => npc.spells.contains(&id),
        FormKind::Armor => npc.skin == Some(id),
        FormKind::Location => npc.locations.contains(&id),
        FormKind::Keyword => npc.has_keyword_id(id),
        FormKind::FormList => {
            depth < DistributionConfig::MAX_FORM_LIST_DEPTH
                && form
                    .list_members()
                    .iter()
                    .any(|member| has_form_at_depth(npc, member, depth + 1))
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{FormBody, FormId};
    use crate::npc::NpcSnapshotBuilder;

    #[test]
    fn nested_form_lists_are_followed() {
        let nord = Form::new(FormId(0x13746), FormKind::Race, "NordRace").into_ref();
        let inner = Form::new(FormId(0x900), FormKind::FormList, "Inner")
            .with_body(FormBody::List(vec![nord]))
            .into_ref();
        let outer = Form::new(FormId(0x901), FormKind::FormList, "Outer")
            .with_body(FormBody::List(vec![inner]));

        let npc = NpcSnapshotBuilder::new(FormId(1), FormId(2), "Npc")
            .race(FormId(0x13746))
            .build();
        assert!(has_form(&npc, &outer));
    }

    #[test]
    fn list_nesting_is_depth_limited() {
        let mut current = Form::new(FormId(0x13746), FormKind::Race, "NordRace").into_ref();
        for depth in 0..=DistributionConfig::MAX_FORM_LIST_DEPTH as u32 {
            current = Form::new(FormId(0x900 + depth), FormKind::FormList, "Nested")
                .with_body(FormBody::List(vec![current]))
                .into_ref();
        }

        let npc = NpcSnapshotBuilder::new(FormId(1), FormId(2), "Npc")
            .race(FormId(0x13746))
            .build();
        assert!(!has_form(&npc, &current));
    }

    #[test]
    fn npc_form_matches_template() {
        let template = Form::new(FormId(3), FormKind::Npc, "Template");
        let npc = NpcSnapshotBuilder::new(FormId(1), FormId(2), "Npc")
            .original(FormId(3), "Template")
            .build();
        assert!(has_form(&npc, &template));
    }
}
