/// Distribution configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DistributionConfig {
    /// Run the death-distribution tables when an NPC dies.
    pub death_distribution: bool,
    /// Let the outfit manager equip distributed outfits.
    ///
    /// When disabled, outfit entries are still evaluated but never applied.
    pub outfit_management: bool,
    /// Re-evaluate NPCs whose level follows the player on level-up.
    pub level_mult_redistribution: bool,
    /// Log per-entry grant counters after each distribution sweep.
    pub log_statistics: bool,
}

impl DistributionConfig {
    // ===== compile-time constants =====
    /// Number of actor skills tracked per NPC.
    pub const SKILL_COUNT: usize = 18;
    /// Maximum nesting followed when a form filter references a form list.
    pub const MAX_FORM_LIST_DEPTH: usize = 8;
    /// Maximum nesting followed when expanding leveled lists.
    pub const MAX_LEVELED_LIST_DEPTH: usize = 8;

    pub fn new() -> Self {
        Self {
            death_distribution: true,
            outfit_management: true,
            level_mult_redistribution: true,
            log_statistics: false,
        }
    }
}

impl Default for DistributionConfig {
    fn default() -> Self {
        Self::new()
    }
}
