//! Host events driven through the runtime against an in-memory session.

mod common;

use common::*;
use distribution_core::{FormId, LevelMultInput, LifeState, OutfitActor};
use runtime::{HostActor, HostEvent, RuntimeConfig};

#[test]
fn first_load_distributes_and_equips() {
    let world = World::new();
    let runtime = world.runtime();
    let mut host = world.host();

    runtime.handle(HostEvent::ActorLoaded { actor: BANDIT }, &mut host);

    let bandit = host.get(BANDIT).unwrap();
    assert!(bandit.npc().has(FLAMES));
    assert!(bandit.npc().has(ARMSMAN));
    assert_eq!(bandit.actor().outfit_id(), Some(world.hunter.id));
    assert_eq!(
        runtime.outfits().worn_replacement(BANDIT).map(|worn| worn.outfit_id()),
        Some(world.hunter.id)
    );
    assert_eq!(
        runtime.outfits().initial_outfit(BANDIT_NPC).map(|outfit| outfit.id),
        Some(world.guard.id)
    );
    assert!(runtime.shadows().get(BANDIT).distributed);
}

#[test]
fn reload_only_reevaluates_outfits() {
    let world = World::new();
    let runtime = world.runtime();
    let mut host = world.host();

    runtime.handle(HostEvent::ActorLoaded { actor: BANDIT }, &mut host);
    runtime.handle(HostEvent::ActorLoaded { actor: BANDIT }, &mut host);

    let bandit = host.get(BANDIT).unwrap();
    assert_eq!(bandit.npc().grant_count(FLAMES), 1);
    assert_eq!(bandit.actor().equips(), [world.hunter.id]);
}

#[test]
fn unknown_actor_is_ignored() {
    let world = World::new();
    let runtime = world.runtime();
    let mut host = world.host();

    runtime.handle(HostEvent::ActorLoaded { actor: FormId(0xFF00_0FFF) }, &mut host);
    assert!(runtime.shadows().is_empty());
}

#[test]
fn death_outfit_replaces_and_freezes() {
    let world = World::new();
    let runtime = world.runtime();
    let mut host = world.host();
    runtime.handle(HostEvent::ActorLoaded { actor: BANDIT }, &mut host);

    host.get_mut(BANDIT).unwrap().set_life_state(LifeState::Dying);
    runtime.handle(HostEvent::Dying { actor: BANDIT }, &mut host);
    let worn = runtime.outfits().worn_replacement(BANDIT).unwrap();
    assert_eq!(worn.outfit_id(), world.rags.id);
    assert!(worn.is_death_outfit);

    host.get_mut(BANDIT).unwrap().set_life_state(LifeState::Dead);
    runtime.handle(HostEvent::Died { actor: BANDIT }, &mut host);
    runtime.handle(HostEvent::ActorLoaded { actor: BANDIT }, &mut host);

    let bandit = host.get(BANDIT).unwrap();
    assert_eq!(bandit.actor().outfit_id(), Some(world.rags.id));
    assert_eq!(bandit.actor().equips(), [world.hunter.id, world.rags.id]);
    assert!(runtime.shadows().get(BANDIT).death_distribution_applied);
}

#[test]
fn resurrection_lifts_the_death_flag() {
    let world = World::new();
    let runtime = world.runtime();
    let mut host = world.host();
    runtime.handle(HostEvent::ActorLoaded { actor: BANDIT }, &mut host);
    host.get_mut(BANDIT).unwrap().set_life_state(LifeState::Dead);
    runtime.handle(HostEvent::Died { actor: BANDIT }, &mut host);

    host.get_mut(BANDIT).unwrap().set_life_state(LifeState::Alive);
    runtime.handle(HostEvent::Resurrected { actor: BANDIT }, &mut host);

    let worn = runtime.outfits().worn_replacement(BANDIT).unwrap();
    assert_eq!(worn.outfit_id(), world.rags.id);
    assert!(!worn.is_death_outfit);
}

#[test]
fn script_override_suspends_until_initial_outfit_returns() {
    let world = World::new();
    let runtime = world.runtime();
    let mut host = world.host();
    runtime.handle(HostEvent::ActorLoaded { actor: BANDIT }, &mut host);

    let event = HostEvent::OutfitSetByScript {
        npc: BANDIT_NPC,
        outfit: Some(world.elven.id),
    };
    runtime.handle(event, &mut host);
    assert!(runtime.outfits().is_suspended(BANDIT_NPC));
    host.get_mut(BANDIT)
        .unwrap()
        .outfit_actor()
        .equip_outfit(&world.elven);

    runtime.handle(HostEvent::ActorLoaded { actor: BANDIT }, &mut host);
    assert_eq!(host.get(BANDIT).unwrap().actor().outfit_id(), Some(world.elven.id));

    let event = HostEvent::OutfitSetByScript {
        npc: BANDIT_NPC,
        outfit: Some(world.guard.id),
    };
    runtime.handle(event, &mut host);
    assert!(!runtime.outfits().is_suspended(BANDIT_NPC));
    assert_eq!(
        host.get(BANDIT).unwrap().actor().equips(),
        [world.hunter.id, world.elven.id, world.hunter.id]
    );
}

#[test]
fn deletion_purges_every_record() {
    let world = World::new();
    let runtime = world.runtime();
    let mut host = world.host();
    runtime.handle(HostEvent::ActorLoaded { actor: BANDIT }, &mut host);

    runtime.handle(HostEvent::FormDeleted { form: BANDIT }, &mut host);
    assert!(runtime.outfits().worn_replacement(BANDIT).is_none());
    assert!(!runtime.shadows().get(BANDIT).distributed);
}

#[test]
fn reset_allows_a_fresh_distribution() {
    let world = World::new();
    let runtime = world.runtime();
    let mut host = world.host();
    runtime.handle(HostEvent::ActorLoaded { actor: BANDIT }, &mut host);

    runtime.handle(HostEvent::Reset { actor: BANDIT }, &mut host);
    assert!(runtime.outfits().worn_replacement(BANDIT).is_none());
    assert!(!runtime.shadows().get(BANDIT).distributed);
}

#[test]
fn level_up_grants_level_scaled_entries() {
    let world = World::new();
    let runtime = world.runtime();
    let mut host = world.host();

    runtime.handle(HostEvent::ActorLoaded { actor: DRAUGR }, &mut host);
    let draugr = host.get(DRAUGR).unwrap();
    assert!(draugr.npc().has(FLAMES));
    assert!(!draugr.npc().has(ARMSMAN));

    host.get_mut(DRAUGR).unwrap().set_level(12);
    runtime.handle(HostEvent::LevelUp, &mut host);
    assert!(host.get(DRAUGR).unwrap().npc().has(ARMSMAN));
    assert!(runtime
        .level_cache()
        .find_distributed_entry(&LevelMultInput::new(PLAYER, DRAUGR_NPC, 12)));
}

#[test]
fn player_identity_change_remaps_level_cache() {
    let world = World::new();
    let runtime = world.runtime();
    let mut host = world.host();
    runtime.handle(HostEvent::ActorLoaded { actor: DRAUGR }, &mut host);
    host.get_mut(DRAUGR).unwrap().set_level(12);
    runtime.handle(HostEvent::LevelUp, &mut host);

    host.set_player("Prisoner_Renamed");
    runtime.handle(HostEvent::MenuClosed, &mut host);

    let cache = runtime.level_cache();
    assert!(cache.find_distributed_entry(&LevelMultInput::new("Prisoner_Renamed", DRAUGR_NPC, 12)));
    assert!(!cache.find_distributed_entry(&LevelMultInput::new(PLAYER, DRAUGR_NPC, 12)));
    assert_eq!(cache.len(), 1);
}

#[test]
fn disabled_outfit_management_leaves_outfits_alone() {
    let world = World::new();
    let mut config = RuntimeConfig::default();
    config.distribution.outfit_management = false;
    let runtime = world.runtime_with(config);
    let mut host = world.host();

    runtime.handle(HostEvent::ActorLoaded { actor: BANDIT }, &mut host);
    let bandit = host.get(BANDIT).unwrap();
    assert!(bandit.npc().has(FLAMES));
    assert_eq!(bandit.actor().outfit_id(), Some(world.guard.id));
    assert_eq!(runtime.outfits().worn_count(), 0);
}

#[test]
fn event_actor_accessor() {
    assert_eq!(HostEvent::Died { actor: BANDIT }.actor(), Some(BANDIT));
    assert_eq!(HostEvent::LevelUp.actor(), None);
}
