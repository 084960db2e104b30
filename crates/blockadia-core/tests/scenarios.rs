//! End-to-end gameplay scenarios driven through the public command API.
//!
//! Every scenario starts from a world with no generated clusters, so the
//! only nodes are the ones a test seeds. With the default 80x60 grid the
//! village covers (39..=41, 29..=31), its drop point is (40, 32), and the
//! first villager stands at (38, 28).

#![allow(clippy::unwrap_used)]

use blockadia_core::{SimError, Simulation, SimulationConfig};
use blockadia_types::{
    BuildingId, BuildingTarget, Command, NodeKind, Notification, PointerTarget, ResourceWallet,
    TilePos, UnitActivity, UnitId, UnitKind,
};
use blockadia_world::WorldError;

const TICK_MS: u64 = 100;

fn bare() -> Simulation {
    let mut config = SimulationConfig::default();
    config.generation.clusters.clear();
    Simulation::new(config).unwrap()
}

fn first_villager(sim: &Simulation) -> UnitId {
    sim.villager_ids().first().copied().unwrap()
}

/// Tick until `done` holds or `max_ticks` have run. Returns whether `done`
/// held.
fn tick_until(sim: &mut Simulation, max_ticks: u32, done: impl Fn(&Simulation) -> bool) -> bool {
    for _ in 0..max_ticks {
        if done(sim) {
            return true;
        }
        sim.tick(TICK_MS).unwrap();
    }
    done(sim)
}

fn ticks(sim: &mut Simulation, count: u32) {
    for _ in 0..count {
        sim.tick(TICK_MS).unwrap();
    }
}

fn click(sim: &mut Simulation, x: i32, y: i32) -> Result<(), SimError> {
    sim.handle_command(Command::ClickTile(PointerTarget {
        tile: TilePos::new(x, y),
    }))
}

/// Pay for and place a building, then wait for construction to finish.
fn build(sim: &mut Simulation, key: &str, x: i32, y: i32) -> BuildingId {
    let kind = blockadia_types::BuildingKind::from_key(key).unwrap();
    let cost = blockadia_world::blueprint(kind).cost;
    sim.handle_command(Command::SpendResources(cost)).unwrap();
    sim.handle_command(Command::EnterBuildMode(key.to_owned()))
        .unwrap();
    click(sim, x, y).unwrap();
    let origin = TilePos::new(x, y);
    assert!(tick_until(sim, 200, |s| s.world().building_at(origin).is_some()));
    sim.world().building_at(origin).unwrap().id
}

fn target(building_id: BuildingId) -> BuildingTarget {
    BuildingTarget { building_id }
}

// ---------------------------------------------------------------------------
// Gathering
// ---------------------------------------------------------------------------

#[test]
fn ten_trips_bring_a_hundred_wood() {
    let mut sim = bare();
    let villager = first_villager(&sim);
    let tree = sim.seed_node(NodeKind::Tree, TilePos::new(40, 36), 1000).unwrap();
    sim.command_gather(villager, tree).unwrap();

    assert!(tick_until(&mut sim, 1_000, |s| s.wallet().wood >= 300));
    assert_eq!(sim.wallet().wood, 300);
    assert_eq!(sim.world().node(tree).map(|n| n.quantity), Some(900));

    let floating = sim
        .drain_notifications()
        .into_iter()
        .filter(|n| matches!(n, Notification::FloatingText(_)))
        .count();
    assert_eq!(floating, 10);
}

#[test]
fn depleted_node_disappears_and_villager_idles() {
    let mut sim = bare();
    let villager = first_villager(&sim);
    let tree = sim.seed_node(NodeKind::Tree, TilePos::new(40, 36), 20).unwrap();
    sim.command_gather(villager, tree).unwrap();

    assert!(tick_until(&mut sim, 1_000, |s| s.world().node(tree).is_none()));
    assert_eq!(sim.wallet().wood, 220);
    assert!(sim.world().is_static_free(TilePos::new(40, 36)));

    let depleted = sim
        .drain_notifications()
        .into_iter()
        .any(|n| matches!(n, Notification::NodeDepleted(d) if d.node_id == tree));
    assert!(depleted);

    ticks(&mut sim, 20);
    assert_eq!(
        sim.unit(villager).map(|u| u.activity()),
        Some(UnitActivity::Idle)
    );
}

#[test]
fn two_villagers_never_overdraw_a_node() {
    let mut sim = bare();
    sim.spawn_villager().unwrap();
    let tree = sim.seed_node(NodeKind::Tree, TilePos::new(40, 36), 10).unwrap();
    for id in sim.villager_ids() {
        sim.command_gather(id, tree).unwrap();
    }

    assert!(tick_until(&mut sim, 1_000, |s| s.world().node(tree).is_none()));
    ticks(&mut sim, 50);
    assert_eq!(sim.wallet().wood, 210);
    assert!(sim.units().all(|u| u.cargo().is_none()));
}

// ---------------------------------------------------------------------------
// Redirect safety
// ---------------------------------------------------------------------------

#[test]
fn redirected_cargo_is_dropped_and_recoverable() {
    let mut sim = bare();
    let villager = first_villager(&sim);
    let tree = sim.seed_node(NodeKind::Tree, TilePos::new(40, 36), 1000).unwrap();
    sim.command_gather(villager, tree).unwrap();

    assert!(tick_until(&mut sim, 200, |s| {
        s.unit(villager).and_then(|u| u.cargo()).is_some()
    }));
    sim.command_move(villager, TilePos::new(20, 20)).unwrap();

    assert_eq!(sim.wallet().wood, 200);
    assert_eq!(sim.world().drops().total_amount(), 10);
    let pile = sim.world().drops().iter().next().unwrap().id;

    sim.command_pickup(villager, pile).unwrap();
    assert!(tick_until(&mut sim, 500, |s| s.wallet().wood >= 210));
    assert_eq!(sim.wallet().wood, 210);
    assert_eq!(sim.world().drops().total_amount(), 0);
    assert_eq!(sim.world().node(tree).map(|n| n.quantity), Some(990));
}

#[test]
fn dropped_load_leaves_the_rest_of_the_node_gatherable() {
    let mut sim = bare();
    let first = first_villager(&sim);
    let tree = sim.seed_node(NodeKind::Tree, TilePos::new(40, 36), 20).unwrap();
    sim.command_gather(first, tree).unwrap();
    assert!(tick_until(&mut sim, 200, |s| {
        s.unit(first).and_then(|u| u.cargo()).is_some()
    }));
    sim.command_move(first, TilePos::new(20, 20)).unwrap();

    let node = sim.world().node(tree).unwrap();
    assert_eq!((node.quantity, node.reserved), (10, 0));

    let second = sim.spawn_villager().unwrap();
    sim.command_gather(second, tree).unwrap();
    assert!(tick_until(&mut sim, 1_000, |s| s.world().node(tree).is_none()));
    ticks(&mut sim, 50);
    assert_eq!(sim.wallet().wood, 210);
    assert_eq!(
        sim.unit(second).map(|u| u.activity()),
        Some(UnitActivity::Idle)
    );

    let pile = sim.world().drops().iter().next().unwrap().id;
    sim.command_pickup(first, pile).unwrap();
    assert!(tick_until(&mut sim, 500, |s| s.wallet().wood >= 220));
    assert_eq!(sim.wallet().wood, 220);
}

#[test]
fn dropping_the_last_load_depletes_the_node() {
    let mut sim = bare();
    let villager = first_villager(&sim);
    let tree = sim.seed_node(NodeKind::Tree, TilePos::new(40, 36), 10).unwrap();
    sim.command_gather(villager, tree).unwrap();
    assert!(tick_until(&mut sim, 200, |s| {
        s.unit(villager).and_then(|u| u.cargo()).is_some()
    }));
    sim.drain_notifications();

    sim.command_move(villager, TilePos::new(20, 20)).unwrap();
    assert!(sim.world().node(tree).is_none());
    assert_eq!(sim.world().drops().total_amount(), 10);
    let depleted = sim
        .drain_notifications()
        .into_iter()
        .any(|n| matches!(n, Notification::NodeDepleted(d) if d.node_id == tree));
    assert!(depleted);
}

#[test]
fn clicking_a_drop_with_a_villager_picks_it_up() {
    let mut sim = bare();
    let villager = first_villager(&sim);
    let tree = sim.seed_node(NodeKind::Tree, TilePos::new(40, 36), 1000).unwrap();
    sim.command_gather(villager, tree).unwrap();
    assert!(tick_until(&mut sim, 200, |s| {
        s.unit(villager).and_then(|u| u.cargo()).is_some()
    }));
    sim.command_move(villager, TilePos::new(20, 20)).unwrap();
    let drop_tile = sim.world().drops().iter().next().unwrap().tile;

    assert!(tick_until(&mut sim, 200, |s| {
        s.unit(villager).is_some_and(|u| u.movement.is_none())
    }));
    let here = sim.unit(villager).unwrap().tile(sim.grid());
    click(&mut sim, here.x, here.y).unwrap();
    click(&mut sim, drop_tile.x, drop_tile.y).unwrap();

    assert!(tick_until(&mut sim, 500, |s| s.wallet().wood >= 210));
    assert_eq!(sim.world().drops().len(), 0);
}

// ---------------------------------------------------------------------------
// Building
// ---------------------------------------------------------------------------

#[test]
fn farm_costs_resources_and_raises_the_cap() {
    let mut sim = bare();
    build(&mut sim, "farm", 5, 5);
    assert_eq!(sim.wallet(), ResourceWallet::new(150, 100, 50, 50));
    assert_eq!(sim.population().max, 10);

    let notes = sim.drain_notifications();
    assert!(notes.iter().any(|n| matches!(n, Notification::ConstructionStarted(_))));
    assert!(
        notes
            .iter()
            .any(|n| matches!(n, Notification::ConstructionCompleted(_)))
    );
}

#[test]
fn placement_on_the_village_is_refused() {
    let mut sim = bare();
    sim.handle_command(Command::EnterBuildMode("farm".to_owned()))
        .unwrap();
    let err = click(&mut sim, 40, 30).unwrap_err();
    assert!(matches!(err, SimError::Placement { .. }));
    assert!(sim.build_mode().is_some());
    assert!(sim.world().sites().next().is_none());
}

#[test]
fn fifth_worker_is_refused() {
    let mut sim = bare();
    sim.seed_node(NodeKind::Gold, TilePos::new(10, 10), 1000).unwrap();
    let mine = build(&mut sim, "gold_mine", 10, 10);
    for _ in 0..4 {
        sim.spawn_villager().unwrap();
    }

    for _ in 0..4 {
        sim.handle_command(Command::AssignVillager(target(mine)))
            .unwrap();
    }
    assert_eq!(sim.population().assigned, 4);

    let err = sim
        .handle_command(Command::AssignVillager(target(mine)))
        .unwrap_err();
    assert!(matches!(
        err,
        SimError::World {
            source: WorldError::WorkersFull { max: 4, .. }
        }
    ));
    assert_eq!(sim.population().assigned, 4);
    assert_eq!(sim.units().count(), 1);
}

#[test]
fn barracks_trains_a_soldier() {
    let mut sim = bare();
    let barracks = build(&mut sim, "barracks", 5, 5);
    let before = sim.wallet();
    sim.handle_command(Command::RequestRecruit(target(barracks)))
        .unwrap();
    assert_eq!(sim.wallet().gold, before.gold - 30);
    assert_eq!(sim.wallet().metal, before.metal - 20);

    ticks(&mut sim, 30);
    assert!(sim.units().any(|u| u.kind() == UnitKind::Soldier));
    assert!(!sim.world().building(barracks).unwrap().is_recruiting());
}

#[test]
fn upgrade_is_charged_once() {
    let mut sim = bare();
    let village = sim.village_id();
    let json = format!(r#"{{"type":"requestUpgrade","payload":{{"buildingId":"{village}"}}}}"#);
    assert!(sim.dispatch_json(&json));
    let after_first = sim.wallet();
    assert!(!sim.dispatch_json(&json));
    assert_eq!(sim.wallet(), after_first);
    assert_eq!(after_first, ResourceWallet::new(100, 0, 50, 50));
}

// ---------------------------------------------------------------------------
// Invariants
// ---------------------------------------------------------------------------

#[test]
fn ledger_stays_balanced() {
    let mut sim = bare();
    let villager = first_villager(&sim);
    let tree = sim.seed_node(NodeKind::Tree, TilePos::new(40, 36), 1000).unwrap();
    sim.command_gather(villager, tree).unwrap();
    build(&mut sim, "farm", 5, 5);
    assert!(!sim.dispatch(Command::SpendResources(ResourceWallet::new(0, 0, 0, 999))));
    ticks(&mut sim, 100);
    assert!(sim.ledger().audit().is_balanced());
}

#[test]
fn same_commands_same_notifications() {
    fn script(sim: &mut Simulation) -> Vec<Notification> {
        let villager = first_villager(sim);
        let tree = sim.seed_node(NodeKind::Tree, TilePos::new(40, 36), 1000).unwrap();
        sim.command_gather(villager, tree).unwrap();
        sim.dispatch(Command::SpawnVillager);
        ticks(sim, 100);
        sim.drain_notifications()
    }

    let a = script(&mut bare());
    let b = script(&mut bare());
    assert_eq!(a, b);
}
