//! Rule lookup: resolution, validation and dropping of bad records.

use distribution_core::distribute::DistributionType;
use distribution_core::lookup::{lookup, RawLinkedRecord};
use distribution_core::{
    Filter, Form, FormId, FormKind, FormOracle, IndexOrCount, MemoryForms, RawForm, RawRecord,
    RecordKind, RuleSet,
};
use expression_tree::Expression;

fn forms() -> MemoryForms {
    let forms = MemoryForms::new().with_file("Skyrim.esm").with_file("Dawnguard.esm");
    forms.insert(Form::new(FormId(0x0001_2FCD), FormKind::Spell, "Flames").with_file("Skyrim.esm"));
    forms.insert(Form::new(FormId(0x0001_3BBA), FormKind::Race, "NordRace").with_file("Skyrim.esm"));
    forms.insert(Form::new(FormId(0x0002_0E01), FormKind::MiscItem, "Lockpick").with_file("Skyrim.esm"));
    forms.insert(Form::new(FormId(0x0200_0800), FormKind::Package, "DLC1Patrol").with_file("Dawnguard.esm"));
    forms
}

fn record(kind: RecordKind, form: &str) -> RawRecord {
    RawRecord::new(kind, RawForm::parse(form))
}

#[test]
fn bad_targets_are_dropped_individually() {
    let forms = forms();
    let mut rules = RuleSet::new();
    rules.records.push(record(RecordKind::Spell, "Flames"));
    rules.records.push(record(RecordKind::Spell, "NoSuchSpell"));
    rules.records.push(record(RecordKind::Perk, "Flames"));
    rules.records.push(record(RecordKind::Spell, "0x800~Missing.esp"));
    let mut bad_filter = record(RecordKind::Spell, "Flames");
    bad_filter.forms.all.push(RawForm::parse("Lockpick"));
    rules.records.push(bad_filter);

    let tables = lookup(&rules, &forms);
    assert_eq!(tables.regular.len(), 2);
    let spells = tables.regular.get(RecordKind::Spell);
    assert!(spells.iter().all(|entry| entry.form.editor_id == "Flames"));
    assert_eq!(spells[1].filters.leaf_count(), 0);
}

#[test]
fn unresolved_filter_forms_are_omitted_from_the_tree() {
    let forms = forms();
    let mut rules = RuleSet::new();
    let mut flames = record(RecordKind::Spell, "Flames");
    flames.forms.matches.push(RawForm::parse("NordRace"));
    flames.forms.matches.push(RawForm::parse("NoSuchRace"));
    rules.records.push(flames);

    let tables = lookup(&rules, &forms);
    let spells = tables.regular.get(RecordKind::Spell);
    assert_eq!(spells.len(), 1);

    let mut leaves = Vec::new();
    spells[0].filters.for_each_leaf(&mut |leaf| leaves.push(leaf.clone()));
    assert_eq!(leaves.len(), 1);
    assert!(matches!(&leaves[0], Filter::Form(race) if race.editor_id == "NordRace"));
}

#[test]
fn form_filters_resolve_into_leaves() {
    let forms = forms();
    let mut rules = RuleSet::new();
    let mut flames = record(RecordKind::Spell, "Flames");
    flames.forms.all.push(RawForm::parse("NordRace"));
    flames.forms.not.push(RawForm::parse("Dawnguard.esm"));
    rules.records.push(flames);

    let tables = lookup(&rules, &forms);
    let entry = &tables.regular.get(RecordKind::Spell)[0];
    assert!(entry.is_valid());

    let mut leaves = Vec::new();
    entry.filters.for_each_leaf(&mut |leaf| leaves.push(leaf.clone()));
    assert!(matches!(&leaves[0], Filter::Form(race) if race.editor_id == "NordRace"));
    assert_eq!(leaves[1], Filter::Mod("Dawnguard.esm".into()));
}

#[test]
fn unfiltered_record_reduces_to_empty_tree() {
    let forms = forms();
    let mut rules = RuleSet::new();
    rules.records.push(record(RecordKind::Spell, "Flames"));

    let tables = lookup(&rules, &forms);
    let entry = &tables.regular.get(RecordKind::Spell)[0];
    assert_eq!(entry.filters, Expression::All(Vec::new()));
    assert_eq!(entry.index_or_count, IndexOrCount::default());
}

#[test]
fn packages_default_to_first_index() {
    let forms = forms();
    let mut rules = RuleSet::new();
    rules.records.push(record(RecordKind::Package, "0x800~Dawnguard.esm"));

    let tables = lookup(&rules, &forms);
    let entry = &tables.regular.get(RecordKind::Package)[0];
    assert_eq!(entry.form.id, FormId(0x0200_0800));
    assert_eq!(entry.index_or_count, IndexOrCount::Index(0));
}

#[test]
fn unknown_keywords_are_created() {
    let forms = forms();
    let before = forms.len();
    let mut rules = RuleSet::new();
    rules.records.push(record(RecordKind::Keyword, "SPID_Archer"));
    rules.records.push(record(RecordKind::Keyword, "Bad Keyword"));

    let tables = lookup(&rules, &forms);
    assert_eq!(tables.regular.get(RecordKind::Keyword).len(), 1);
    assert_eq!(forms.len(), before + 1);
    assert!(forms.lookup(&RawForm::parse("spid_archer")).is_ok());
}

#[test]
fn death_items_land_in_death_table() {
    let forms = forms();
    let mut rules = RuleSet::new();
    rules.records.push(record(RecordKind::DeathItem, "Lockpick"));
    let mut spell = record(RecordKind::Spell, "Flames");
    spell.scope = DistributionType::Death;
    rules.records.push(spell);

    let tables = lookup(&rules, &forms);
    assert!(tables.regular.is_empty());
    assert_eq!(tables.death.len(), 2);
}

#[test]
fn linked_record_needs_a_valid_parent() {
    let forms = forms();
    let mut rules = RuleSet::new();
    rules.linked.push(RawLinkedRecord {
        kind: RecordKind::Item,
        form: RawForm::parse("Lockpick"),
        scope: DistributionType::Regular,
        parents: vec![RawForm::parse("Missing")],
        index_or_count: None,
        chance: 100.0,
        path: String::new(),
    });
    rules.linked.push(RawLinkedRecord {
        kind: RecordKind::Item,
        form: RawForm::parse("Lockpick"),
        scope: DistributionType::Regular,
        parents: vec![RawForm::parse("Flames"), RawForm::parse("Missing")],
        index_or_count: None,
        chance: 100.0,
        path: String::new(),
    });

    let tables = lookup(&rules, &forms);
    assert_eq!(tables.linked.len(), 1);
}

#[test]
fn paths_are_filled_by_rule_set() {
    let mut rules = RuleSet::new();
    rules.records.push(record(RecordKind::Spell, "Flames"));
    let mut named = record(RecordKind::Spell, "Flames");
    named.path = "Other_DISTR.ron".into();
    rules.records.push(named);
    rules.set_path("Test_DISTR.ron");

    assert_eq!(rules.records[0].path, "Test_DISTR.ron");
    assert_eq!(rules.records[1].path, "Other_DISTR.ron");
}
