//! String predicates against names, editor ids and keywords.

use crate::npc::NpcSnapshot;

/// Case-insensitive equality against any identifier or keyword.
pub(super) fn matches(npc: &NpcSnapshot, text: &str) -> bool {
    npc.identifiers().any(|id| id.eq_ignore_ascii_case(text)) || npc.has_keyword_str(text)
}

/// Case-insensitive containment in any identifier or keyword.
pub(super) fn contains(npc: &NpcSnapshot, text: &str) -> bool {
    let needle = text.to_ascii_lowercase();
    npc.identifiers()
        .any(|id| id.to_ascii_lowercase().contains(&needle))
        || npc.keywords().any(|kw| kw.contains(&needle))
}
