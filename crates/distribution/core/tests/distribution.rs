//! End-to-end distribution: rules resolved by lookup, applied to in-memory NPCs.

use std::sync::Arc;

use distribution_core::distribute::RandomCount;
use distribution_core::env::FixedRng;
use distribution_core::lookup::{lookup, RawFormGroup, RawLinkedRecord};
use distribution_core::{
    ActorShadows, DistributeOptions, DistributionConfig, DistributionType, Distributor, Form,
    FormBody, FormId, FormKind, IndexOrCount, LeveledEntry, LeveledList, LevelMultCache,
    LevelRange, LifeState, MemoryForms, MemoryNpc, NpcFlags, NpcSnapshot, NpcSnapshotBuilder,
    RawForm, RawRecord, RecordKind, RuleSet,
};

const FLAMES: FormId = FormId(0x0001_2FCD);
const FROSTBITE: FormId = FormId(0x0002_B96B);
const ARMSMAN: FormId = FormId(0x0007_9342);
const IRON_SWORD: FormId = FormId(0x0001_2EB7);
const STEEL_SWORD: FormId = FormId(0x0001_3989);
const LEVELED_SWORD: FormId = FormId(0x0003_DF4A);
const LEVELED_PICK: FormId = FormId(0x0003_DF4B);
const BANDIT_FACTION: FormId = FormId(0x0001_BCC0);
const HUNTER_OUTFIT: FormId = FormId(0x0001_0E35);

fn forms() -> MemoryForms {
    let forms = MemoryForms::new().with_file("Skyrim.esm");
    let insert = |id: FormId, kind: FormKind, editor_id: &str| {
        forms.insert(Form::new(id, kind, editor_id).with_file("Skyrim.esm"))
    };
    insert(FLAMES, FormKind::Spell, "Flames");
    insert(FROSTBITE, FormKind::Spell, "Frostbite");
    insert(ARMSMAN, FormKind::Perk, "Armsman");
    let iron = insert(IRON_SWORD, FormKind::Weapon, "IronSword");
    let steel = insert(STEEL_SWORD, FormKind::Weapon, "SteelSword");
    insert(BANDIT_FACTION, FormKind::Faction, "BanditFaction");
    insert(HUNTER_OUTFIT, FormKind::Outfit, "HunterOutfit");
    forms.insert(
        Form::new(LEVELED_SWORD, FormKind::LeveledItem, "LItemSword")
            .with_file("Skyrim.esm")
            .with_body(FormBody::Leveled(LeveledList {
                entries: vec![
                    LeveledEntry { level: 1, form: iron.clone(), count: 1 },
                    LeveledEntry { level: 10, form: steel.clone(), count: 1 },
                ],
                use_all: true,
                from_all_levels: false,
            })),
    );
    forms.insert(
        Form::new(LEVELED_PICK, FormKind::LeveledItem, "LItemSwordPick")
            .with_file("Skyrim.esm")
            .with_body(FormBody::Leveled(LeveledList {
                entries: vec![
                    LeveledEntry { level: 1, form: iron.clone(), count: 1 },
                    LeveledEntry { level: 10, form: steel, count: 1 },
                    LeveledEntry { level: 30, form: iron, count: 5 },
                ],
                use_all: false,
                from_all_levels: false,
            })),
    );
    forms
}

fn record(kind: RecordKind, form: &str) -> RawRecord {
    let mut record = RawRecord::new(kind, RawForm::parse(form));
    record.path = "Test_DISTR.ron".into();
    record
}

fn distributor(rules: &RuleSet, forms: &MemoryForms) -> Distributor {
    Distributor::new(Arc::new(lookup(rules, forms)), Arc::new(FixedRng(0.0)))
}

fn bandit() -> NpcSnapshot {
    NpcSnapshotBuilder::new(FormId(0xFF00_0001), FormId(0x0003_9CFE), "EncBandit01Melee")
        .name("Bandit")
        .faction(BANDIT_FACTION)
        .level(12)
        .build()
}

#[test]
fn second_pass_never_regrants_unique_forms() {
    let forms = forms();
    let mut rules = RuleSet::new();
    rules.records.push(record(RecordKind::Spell, "Flames"));
    rules.records.push(record(RecordKind::Perk, "Armsman"));
    let mut faction = record(RecordKind::Faction, "BanditFaction");
    faction.strings.all.push("Bandit".into());
    rules.records.push(faction);
    let distributor = distributor(&rules, &forms);

    let mut npc = bandit();
    let mut host = MemoryNpc::new().with_possession(BANDIT_FACTION);
    let first = distributor.distribute(&mut npc, &mut host, &DistributeOptions::default());
    let second = distributor.distribute(&mut npc, &mut host, &DistributeOptions::default());

    assert!(first.contains(FLAMES) && first.contains(ARMSMAN));
    assert!(!first.contains(BANDIT_FACTION));
    assert!(second.is_empty());
    assert_eq!(host.grant_count(FLAMES), 1);
    assert_eq!(host.grant_count(ARMSMAN), 1);
}

#[test]
fn items_expand_leveled_lists_and_sum_counts() {
    let forms = forms();
    let mut rules = RuleSet::new();
    let mut leveled = record(RecordKind::Item, "LItemSword");
    leveled.index_or_count = Some(IndexOrCount::Count(RandomCount::fixed(2)));
    rules.records.push(leveled);
    rules.records.push(record(RecordKind::Item, "IronSword"));
    let distributor = distributor(&rules, &forms);

    let mut npc = bandit();
    let mut host = MemoryNpc::new();
    let report = distributor.distribute(&mut npc, &mut host, &DistributeOptions::default());

    assert_eq!(host.count(IRON_SWORD), 3);
    assert_eq!(host.count(STEEL_SWORD), 2);
    assert_eq!(report.granted.len(), 2);
    assert_eq!(report.granted[0].1, "Test_DISTR.ron");
}

#[test]
fn leveled_pick_uses_the_highest_eligible_level() {
    let forms = forms();
    let mut rules = RuleSet::new();
    rules.records.push(record(RecordKind::Item, "LItemSwordPick"));
    let distributor = distributor(&rules, &forms);

    let mut npc = bandit();
    let mut host = MemoryNpc::new();
    distributor.distribute(&mut npc, &mut host, &DistributeOptions::default());

    assert_eq!(host.count(STEEL_SWORD), 1);
    assert_eq!(host.count(IRON_SWORD), 0);
}

#[test]
fn failed_filters_and_chance_skip_entries() {
    let forms = forms();
    let mut rules = RuleSet::new();
    let mut flames = record(RecordKind::Spell, "Flames");
    flames.strings.not.push("*Bandit".into());
    rules.records.push(flames);
    let mut armsman = record(RecordKind::Perk, "Armsman");
    armsman.levels.level = Some(LevelRange::at_least(20));
    rules.records.push(armsman);
    let distributor = distributor(&rules, &forms);

    let mut npc = bandit();
    let mut host = MemoryNpc::new();
    let report = distributor.distribute(&mut npc, &mut host, &DistributeOptions::default());
    assert!(report.is_empty());
}

#[test]
fn failed_chance_roll_discards_entry() {
    let forms = forms();
    let mut rules = RuleSet::new();
    let mut frostbite = record(RecordKind::Spell, "Frostbite");
    frostbite.chance = 50.0;
    rules.records.push(frostbite);
    let tables = Arc::new(lookup(&rules, &forms));

    let unlucky = Distributor::new(tables.clone(), Arc::new(FixedRng(0.9)));
    let mut host = MemoryNpc::new();
    assert!(!unlucky.distribute(&mut bandit(), &mut host, &DistributeOptions::default()).contains(FROSTBITE));

    let lucky = Distributor::new(tables, Arc::new(FixedRng(0.2)));
    assert!(lucky.distribute(&mut bandit(), &mut host, &DistributeOptions::default()).contains(FROSTBITE));
}

#[test]
fn first_outfit_wins_and_is_reported() {
    let forms = forms();
    forms.insert(Form::new(FormId(0x0005_0000), FormKind::Outfit, "BanditOutfit"));
    let mut rules = RuleSet::new();
    let mut hunter = record(RecordKind::Outfit, "HunterOutfit");
    hunter.is_final = true;
    rules.records.push(hunter);
    rules.records.push(record(RecordKind::Outfit, "BanditOutfit"));
    let distributor = distributor(&rules, &forms);

    let mut npc = bandit();
    let mut host = MemoryNpc::new();
    let report = distributor.distribute(&mut npc, &mut host, &DistributeOptions::outfits_only());
    let outfit = report.outfit.unwrap();
    assert_eq!(outfit.outfit.id, HUNTER_OUTFIT);
    assert!(outfit.is_final);
    assert!(host.history().is_empty());
}

#[test]
fn exclusion_group_blocks_second_member() {
    let forms = forms();
    let mut rules = RuleSet::new();
    rules.records.push(record(RecordKind::Spell, "Flames"));
    rules.records.push(record(RecordKind::Spell, "Frostbite"));
    rules.exclusion_groups.push(RawFormGroup {
        name: "Destruction Novice".into(),
        forms: vec![RawForm::parse("Flames"), RawForm::parse("Frostbite")],
        path: "Test_DISTR.ron".into(),
    });
    let distributor = distributor(&rules, &forms);

    let mut npc = bandit();
    let mut host = MemoryNpc::new();
    let report = distributor.distribute(&mut npc, &mut host, &DistributeOptions::default());
    assert!(report.contains(FLAMES));
    assert!(!report.contains(FROSTBITE));

    let mut owner = bandit();
    let mut host = MemoryNpc::new().with_possession(FROSTBITE);
    let report = distributor.distribute(&mut owner, &mut host, &DistributeOptions::default());
    assert!(!report.contains(FLAMES));
}

#[test]
fn linked_entries_follow_their_parent_once() {
    let forms = forms();
    let mut rules = RuleSet::new();
    rules.records.push(record(RecordKind::Spell, "Flames"));
    rules.records.push(record(RecordKind::Spell, "Frostbite"));
    rules.linked.push(RawLinkedRecord {
        kind: RecordKind::Item,
        form: RawForm::parse("IronSword"),
        scope: DistributionType::Regular,
        parents: vec![RawForm::parse("Flames"), RawForm::parse("Frostbite")],
        index_or_count: None,
        chance: 100.0,
        path: "Test_DISTR.ron".into(),
    });
    let distributor = distributor(&rules, &forms);

    let mut npc = bandit();
    let mut host = MemoryNpc::new();
    let report = distributor.distribute(&mut npc, &mut host, &DistributeOptions::default());
    assert!(report.contains(IRON_SWORD));
    assert_eq!(host.count(IRON_SWORD), 1);
}

#[test]
fn created_keywords_are_ordered_by_dependency() {
    let forms = forms();
    let mut rules = RuleSet::new();
    let mut is_mage = record(RecordKind::Keyword, "IsMage");
    is_mage.strings.matches.push("SchoolFire".into());
    rules.records.push(is_mage);
    let mut school = record(RecordKind::Keyword, "SchoolFire");
    school.strings.all.push("Bandit".into());
    rules.records.push(school);
    let distributor = distributor(&rules, &forms);

    let keywords = distributor.tables().regular.get(RecordKind::Keyword);
    let order: Vec<_> = keywords.iter().map(|e| e.form.editor_id.as_str()).collect();
    assert_eq!(order, ["SchoolFire", "IsMage"]);

    let mut npc = bandit();
    let mut host = MemoryNpc::new();
    distributor.distribute(&mut npc, &mut host, &DistributeOptions::default());
    assert!(npc.has_keyword_str("ismage"));
}

#[test]
fn death_tables_apply_once_per_actor() {
    let forms = forms();
    let mut rules = RuleSet::new();
    rules.records.push(record(RecordKind::DeathItem, "IronSword"));
    let distributor = distributor(&rules, &forms);
    let shadows = ActorShadows::new();

    let mut npc = bandit();
    let mut host = MemoryNpc::new();
    assert!(distributor.distribute_on_death(&mut npc, &mut host, &shadows).is_none());

    npc.life = LifeState::Dying;
    let report = distributor.distribute_on_death(&mut npc, &mut host, &shadows).unwrap();
    assert!(report.contains(IRON_SWORD));
    npc.life = LifeState::Dead;
    assert!(distributor.distribute_on_death(&mut npc, &mut host, &shadows).is_none());
    assert_eq!(host.count(IRON_SWORD), 1);
    assert!(shadows.get(npc.actor).death_distribution_applied);
}

#[test]
fn death_distribution_can_be_disabled() {
    let forms = forms();
    let mut rules = RuleSet::new();
    rules.records.push(record(RecordKind::DeathItem, "IronSword"));
    let config = DistributionConfig {
        death_distribution: false,
        ..DistributionConfig::default()
    };
    let distributor = distributor(&rules, &forms).with_config(config);

    let mut npc = bandit();
    npc.life = LifeState::Dead;
    let mut host = MemoryNpc::new();
    assert!(distributor.distribute_on_death(&mut npc, &mut host, &ActorShadows::new()).is_none());
}

#[test]
fn level_up_grants_and_revokes_by_level() {
    let forms = forms();
    let mut rules = RuleSet::new();
    let mut armsman = record(RecordKind::Perk, "Armsman");
    armsman.levels.level = Some(LevelRange::at_least(10));
    rules.records.push(armsman);
    let distributor = distributor(&rules, &forms);
    let cache = LevelMultCache::new();

    let mut npc = NpcSnapshotBuilder::new(FormId(0xFF00_0002), FormId(0x0003_9CFF), "LvlDraugr")
        .flags(NpcFlags::PC_LEVEL_MULT)
        .level(8)
        .build();
    let mut host = MemoryNpc::new();

    let report = distributor.distribute(&mut npc, &mut host, &DistributeOptions::default());
    assert!(!report.contains(ARMSMAN));
    let report = distributor
        .redistribute_on_level_up(&mut npc, &mut host, &cache, "Player1")
        .unwrap();
    assert!(!report.contains(ARMSMAN));

    npc.level = 12;
    let report = distributor
        .redistribute_on_level_up(&mut npc, &mut host, &cache, "Player1")
        .unwrap();
    assert!(report.contains(ARMSMAN));
    assert!(host.has(ARMSMAN));
    assert!(distributor
        .redistribute_on_level_up(&mut npc, &mut host, &cache, "Player1")
        .is_none());

    npc.level = 9;
    distributor.redistribute_on_level_up(&mut npc, &mut host, &cache, "Player1");
    assert!(!host.has(ARMSMAN));

    npc.level = 12;
    assert!(distributor
        .redistribute_on_level_up(&mut npc, &mut host, &cache, "Player1")
        .is_none());
    assert!(host.has(ARMSMAN));
    assert_eq!(host.grant_count(ARMSMAN), 2);
}

#[test]
fn level_cap_stops_redistribution() {
    let forms = forms();
    let rules = RuleSet::new();
    let distributor = distributor(&rules, &forms);
    let cache = LevelMultCache::new();

    let mut npc = NpcSnapshotBuilder::new(FormId(0xFF00_0003), FormId(0x0003_9D00), "LvlWolf")
        .flags(NpcFlags::PC_LEVEL_MULT)
        .level(20)
        .level_cap(20)
        .build();
    let mut host = MemoryNpc::new();
    assert!(distributor.redistribute_on_level_up(&mut npc, &mut host, &cache, "P").is_some());
    npc.level = 21;
    assert!(distributor.redistribute_on_level_up(&mut npc, &mut host, &cache, "P").is_none());
}
