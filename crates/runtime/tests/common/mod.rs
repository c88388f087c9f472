#![allow(dead_code)]

use std::sync::Arc;

use distribution_core::{
    DistributionType, Form, FormBody, FormId, FormKind, FormRef, LevelRange,
    MemoryForms, NpcFlags, NpcSnapshotBuilder, RawForm, RawRecord, RecordKind, RuleSet,
};
use distribution_core::env::FixedRng;
use runtime::{MemoryHost, MemoryHostActor, Runtime, RuntimeConfig};

pub const BANDIT: FormId = FormId(0xFF00_0001);
pub const BANDIT_NPC: FormId = FormId(0x0003_9CFE);
pub const DRAUGR: FormId = FormId(0xFF00_0002);
pub const DRAUGR_NPC: FormId = FormId(0x0003_9CFF);

pub const FLAMES: FormId = FormId(0x0001_2FCD);
pub const ARMSMAN: FormId = FormId(0x0007_9342);
pub const PLAYER: &str = "Prisoner_1";

pub struct World {
    pub forms: Arc<MemoryForms>,
    pub guard: FormRef,
    pub hunter: FormRef,
    pub elven: FormRef,
    pub rags: FormRef,
}

impl World {
    pub fn new() -> Self {
        let forms = MemoryForms::new().with_file("Skyrim.esm");
        forms.insert(Form::new(FLAMES, FormKind::Spell, "Flames"));
        forms.insert(Form::new(ARMSMAN, FormKind::Perk, "Armsman"));

        let mut next = 0x0800;
        let mut outfit = |name: &str| {
            let item = forms.insert(Form::new(FormId(next), FormKind::Armor, format!("{name}Cuirass")));
            let outfit = Form::new(FormId(next + 1), FormKind::Outfit, format!("{name}Outfit"))
                .with_body(FormBody::Outfit(vec![item]));
            next += 2;
            forms.insert(outfit)
        };
        let guard = outfit("Guard");
        let hunter = outfit("Hunter");
        let elven = outfit("Elven");
        let rags = outfit("Rags");

        Self {
            forms: Arc::new(forms),
            guard,
            hunter,
            elven,
            rags,
        }
    }

    /// Flames and the hunter outfit for everyone, rags on death, Armsman
    /// from level 10.
    pub fn rules() -> RuleSet {
        let mut rules = RuleSet::new();
        rules.records.push(record(RecordKind::Spell, "Flames"));
        rules.records.push(record(RecordKind::Outfit, "HunterOutfit"));

        let mut rags = record(RecordKind::Outfit, "RagsOutfit");
        rags.scope = DistributionType::Death;
        rules.records.push(rags);

        let mut armsman = record(RecordKind::Perk, "Armsman");
        armsman.levels.level = Some(LevelRange::at_least(10));
        rules.records.push(armsman);
        rules
    }

    pub fn runtime(&self) -> Runtime {
        self.runtime_with(RuntimeConfig::default())
    }

    pub fn runtime_with(&self, config: RuntimeConfig) -> Runtime {
        Runtime::builder()
            .config(config)
            .forms(self.forms.clone())
            .rules(Self::rules())
            .rng(Arc::new(FixedRng(0.0)))
            .build()
            .unwrap()
    }

    pub fn host(&self) -> MemoryHost {
        let mut host = MemoryHost::new(PLAYER);
        let bandit = NpcSnapshotBuilder::new(BANDIT, BANDIT_NPC, "EncBandit01Melee")
            .name("Bandit")
            .level(12)
            .build();
        host.insert(MemoryHostActor::new(bandit, Some(self.guard.clone())));

        let draugr = NpcSnapshotBuilder::new(DRAUGR, DRAUGR_NPC, "LvlDraugr")
            .flags(NpcFlags::PC_LEVEL_MULT)
            .level(8)
            .build();
        host.insert(MemoryHostActor::new(draugr, Some(self.guard.clone())));
        host
    }
}

fn record(kind: RecordKind, form: &str) -> RawRecord {
    let mut record = RawRecord::new(kind, RawForm::parse(form));
    record.path = "Runtime_DISTR.ron".into();
    record
}
