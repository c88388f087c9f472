use std::fs;

use distribution_content::{ContentFactory, RuleLoader};
use distribution_core::{
    DistributionType, IndexOrCount, LevelRange, RandomCount, RawForm, RecordKind, Sex, Skill,
};

const BANDITS: &str = r#"(
    records: [
        (
            kind: Spell,
            form: "0x12FCD~Skyrim.esm",
            strings: (all: ["Bandit"], not: ["*Boss"]),
            forms: (matches: ["BanditFaction", "Dawnguard.esm"]),
            levels: (level: Some((min: Some(5), max: None)), skills: [(Destruction, (min: Some(20)))]),
            traits: (sex: Some(Female), unique: Some(false)),
            chance: 50.0,
        ),
        (
            kind: Item,
            form: "IronSword",
            index_or_count: Some(Count((min: 1, max: 3))),
        ),
        (kind: DeathItem, form: "Lockpick"),
    ],
    linked: [
        (kind: Item, form: "Torch01", parents: ["0x12FCD~Skyrim.esm"], scope: Death),
    ],
    exclusion_groups: [
        (name: "Swords", forms: ["IronSword", "SteelSword"]),
    ],
)"#;

const GUARDS: &str = r#"(
    records: [
        (kind: Outfit, form: "GuardOutfit", is_final: true, path: "Custom.ron"),
    ],
)"#;

#[test]
fn rule_file_deserializes_every_section() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Bandits_DISTR.ron");
    fs::write(&path, BANDITS).unwrap();

    let rules = RuleLoader::load(&path).unwrap();
    assert_eq!(rules.records.len(), 3);

    let spell = &rules.records[0];
    assert_eq!(spell.kind, RecordKind::Spell);
    assert_eq!(spell.form, RawForm::Id { id: 0x12FCD, file: Some("Skyrim.esm".into()) });
    assert_eq!(spell.strings.not, ["*Boss"]);
    assert_eq!(spell.forms.matches[1], RawForm::File("Dawnguard.esm".into()));
    assert_eq!(spell.levels.level, Some(LevelRange::at_least(5)));
    assert_eq!(spell.levels.skills, [(Skill::Destruction, LevelRange::at_least(20))]);
    assert_eq!(spell.traits.sex, Some(Sex::Female));
    assert_eq!(spell.chance, 50.0);
    assert_eq!(spell.path, "Bandits_DISTR.ron");

    let item = &rules.records[1];
    assert_eq!(item.chance, 100.0);
    assert_eq!(item.index_or_count, Some(IndexOrCount::Count(RandomCount { min: 1, max: 3 })));
    assert_eq!(rules.records[2].effective_scope(), DistributionType::Death);

    assert_eq!(rules.linked[0].scope, DistributionType::Death);
    assert_eq!(rules.exclusion_groups[0].forms.len(), 2);
}

#[test]
fn directory_merges_rule_files_in_order() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("b_guards_DISTR.ron"), GUARDS).unwrap();
    fs::write(dir.path().join("a_bandits_distr.ron"), BANDITS).unwrap();
    fs::write(dir.path().join("broken_DISTR.ron"), "(records: [").unwrap();
    fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let rules = RuleLoader::load_dir(dir.path()).unwrap();
    assert_eq!(rules.records.len(), 4);
    assert_eq!(rules.records[0].path, "a_bandits_distr.ron");
    assert_eq!(rules.records[3].kind, RecordKind::Outfit);
    assert_eq!(rules.records[3].path, "Custom.ron");
    assert!(rules.records[3].is_final);
}

#[test]
fn factory_falls_back_to_default_config() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join(ContentFactory::RULES_DIR)).unwrap();
    let factory = ContentFactory::new(dir.path());

    assert_eq!(factory.load_config().unwrap(), Default::default());
    assert!(factory.load_rules().unwrap().is_empty());

    fs::write(dir.path().join(ContentFactory::CONFIG_FILE), "log_statistics = true\n").unwrap();
    assert!(factory.load_config().unwrap().log_statistics);
}
