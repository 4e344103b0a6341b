//! # Registry Scenario Tests
//!
//! End-to-end checks of the frame contract: deferred membership, id
//! recycling, tag/group indices and event dispatch.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

use kestrel_ecs::{
    Component, Components, EcsError, Entity, Event, EventBus, Registry, System, SystemState,
};

#[derive(Debug, Clone, Copy, PartialEq)]
struct Position {
    x: f32,
    y: f32,
}
impl Component for Position {}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Velocity {
    x: f32,
    y: f32,
}
impl Component for Velocity {}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Layer(i32);
impl Component for Layer {}

struct MovementSystem {
    state: SystemState,
}

impl MovementSystem {
    fn new() -> Self {
        Self {
            state: SystemState::new().require::<Position>().require::<Velocity>(),
        }
    }
}

impl System for MovementSystem {
    fn state(&self) -> &SystemState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut SystemState {
        &mut self.state
    }
}

/// Keeps its list sorted by `Layer`, ties in arrival order.
struct LayeredSystem {
    state: SystemState,
}

impl LayeredSystem {
    fn new() -> Self {
        Self {
            state: SystemState::new().require::<Layer>(),
        }
    }
}

impl System for LayeredSystem {
    fn state(&self) -> &SystemState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut SystemState {
        &mut self.state
    }

    fn insert_entity(&mut self, entity: Entity, components: &Components) {
        self.state.insert_sorted_by(entity, |e| {
            components.get::<Layer>(e).map_or(0, |layer| layer.0)
        });
    }
}

fn moving(registry: &mut Registry) -> Entity {
    registry
        .create_entity_mut()
        .add_component(Position { x: 0.0, y: 0.0 })
        .add_component(Velocity { x: 1.0, y: 0.0 })
        .entity()
}

fn matched<S: System>(registry: &Registry) -> Vec<Entity> {
    registry.get_system::<S>().unwrap().entities().to_vec()
}

#[test]
fn test_entity_joins_system_exactly_once() {
    let mut registry = Registry::new();
    let e = registry.create_entity();
    registry.add_component(e, Position { x: 0.0, y: 0.0 });
    registry.add_component(e, Velocity { x: 1.0, y: 0.0 });
    registry.add_system(MovementSystem::new());
    registry.update();

    assert_eq!(matched::<MovementSystem>(&registry), vec![e]);

    // Re-adding a component re-queues but never duplicates.
    registry.add_component(e, Velocity { x: 2.0, y: 0.0 });
    registry.update();
    assert_eq!(matched::<MovementSystem>(&registry), vec![e]);
}

#[test]
fn test_kill_second_of_three() {
    let mut registry = Registry::new();
    registry.add_system(MovementSystem::new());
    let first = moving(&mut registry);
    let second = moving(&mut registry);
    let third = moving(&mut registry);
    registry.update();

    registry.kill_entity(second);
    // Still visible until reconciled.
    assert_eq!(matched::<MovementSystem>(&registry).len(), 3);
    registry.update();

    assert_eq!(matched::<MovementSystem>(&registry), vec![first, third]);
    assert_eq!(registry.create_entity().id(), second.id());
}

#[test]
fn test_component_round_trip_is_immediate() {
    let mut registry = Registry::new();
    let e = registry.create_entity();
    let value = Position { x: 3.5, y: -2.0 };
    registry.add_component(e, value);

    assert_eq!(registry.get_component::<Position>(e), Ok(&value));
    assert!(registry.has_component::<Position>(e));
    assert!(matches!(
        registry.get_component::<Velocity>(e),
        Err(EcsError::MissingComponent { .. })
    ));
}

#[test]
fn test_double_kill_kills_once() {
    let mut registry = Registry::new();
    let e = registry.create_entity();
    let other = registry.create_entity();
    registry.update();

    registry.kill_entity(e);
    registry.kill_entity(e);
    let report = registry.update();

    assert_eq!(report.killed, 1);
    assert_eq!(registry.live_count(), 1);
    assert_eq!(registry.free_id_count(), 1);

    // A reconciled kill of the same handle is ignored until the id is reused.
    assert!(!registry.kill_entity(e));
    assert_eq!(registry.update().killed, 0);
    assert!(registry.is_alive(other));
}

#[test]
fn test_old_handle_addresses_the_recycled_id() {
    let mut registry = Registry::new();
    let old = registry.create_entity();
    registry.update();
    registry.kill_entity(old);
    registry.update();

    let fresh = registry.create_entity();
    registry.update();
    assert_eq!(fresh, old);
    assert!(registry.is_alive(old));

    // Identity is the id, so the old handle kills the new holder.
    assert!(registry.kill_entity(old));
    registry.update();
    assert!(!registry.is_alive(fresh));
    assert_eq!(registry.live_count(), 0);
}

#[test]
fn test_free_ids_are_fifo() {
    let mut registry = Registry::new();
    let ids: Vec<Entity> = (0..4).map(|_| registry.create_entity()).collect();
    registry.update();

    registry.kill_entity(ids[2]);
    registry.kill_entity(ids[0]);
    registry.update();

    // Kills reconcile in id order, so id 0 was released first.
    assert_eq!(registry.create_entity(), ids[0]);
    assert_eq!(registry.create_entity(), ids[2]);
    assert_eq!(registry.create_entity(), Entity::new(4));
    assert_eq!(registry.num_entities(), 5);
}

#[test]
fn test_no_two_live_entities_share_an_id() {
    let mut registry = Registry::new();
    let mut live: Vec<Entity> = Vec::new();

    for round in 0..20_u32 {
        for _ in 0..5 {
            live.push(registry.create_entity());
        }
        if round % 2 == 1 {
            for entity in live.drain(..3) {
                registry.kill_entity(entity);
            }
        }
        registry.update();

        let unique: HashSet<Entity> = live.iter().copied().collect();
        assert_eq!(unique.len(), live.len());
        assert_eq!(registry.live_count(), live.len());
        assert!(live.iter().all(|&e| registry.is_alive(e)));
        assert!(registry.live_count() <= registry.num_entities() as usize);
    }
}

#[test]
fn test_membership_matches_signature_for_every_system() {
    let mut registry = Registry::new();
    registry.add_system(LayeredSystem::new());

    let both = moving(&mut registry);
    registry.add_component(both, Layer(1));
    let only_position = registry.create_entity();
    registry.add_component(only_position, Position { x: 0.0, y: 0.0 });
    registry.add_component(only_position, Layer(0));
    registry.update();

    // Registered after the entities were reconciled.
    registry.add_system(MovementSystem::new());

    assert_eq!(matched::<MovementSystem>(&registry), vec![both]);
    assert_eq!(matched::<LayeredSystem>(&registry), vec![only_position, both]);

    registry.remove_component::<Velocity>(both);
    registry.add_component(only_position, Velocity { x: 0.0, y: 1.0 });
    registry.update();

    assert_eq!(matched::<MovementSystem>(&registry), vec![only_position]);
    for entity in [both, only_position] {
        let signature = registry.components().signature(entity);
        let movement = registry.get_system::<MovementSystem>().unwrap();
        assert_eq!(
            movement.state().contains(entity),
            signature.contains(movement.signature())
        );
    }
}

#[test]
fn test_sorted_insertion_is_stable() {
    let mut registry = Registry::new();
    registry.add_system(LayeredSystem::new());

    let mut created = Vec::new();
    for layer in [2, 0, 1, 0, 2] {
        let e = registry.create_entity();
        registry.add_component(e, Layer(layer));
        created.push(e);
    }
    registry.update();

    let layers: Vec<i32> = matched::<LayeredSystem>(&registry)
        .iter()
        .map(|&e| registry.get_component::<Layer>(e).map_or(-1, |l| l.0))
        .collect();
    assert_eq!(layers, vec![0, 0, 1, 2, 2]);
    assert_eq!(
        matched::<LayeredSystem>(&registry),
        vec![created[1], created[3], created[2], created[0], created[4]]
    );
}

#[test]
fn test_tag_last_write_wins() {
    let mut registry = Registry::new();
    let e1 = registry.create_entity();
    let e2 = registry.create_entity();

    registry.tag(e1, "x");
    registry.tag(e2, "x");

    assert_eq!(registry.get_entity_by_tag("x"), Ok(e2));
    assert!(!registry.has_tag(e1, "x"));
    assert_eq!(registry.tag_of(e1), Ok(None));
    assert_eq!(registry.tag_of(e2), Ok(Some("x")));
    assert_eq!(
        registry.get_entity_by_tag("y"),
        Err(EcsError::TagNotFound("y".to_owned()))
    );
}

#[test]
fn test_groups_are_immediate_and_cleaned_on_kill() {
    let mut registry = Registry::new();
    let a = registry.create_entity();
    let b = registry.create_entity();
    registry.entity_mut(a).group("enemies");
    registry.entity_mut(b).group("enemies").tag("boss");

    assert!(registry.belongs_to_group(a, "enemies"));
    assert_eq!(registry.get_entities_by_group("enemies"), vec![a, b]);
    assert_eq!(registry.group_of(b), Ok(Some("enemies")));

    assert!(registry.remove_entity_group(a));
    assert!(!registry.remove_entity_group(a));
    assert!(registry.get_entities_by_group("unknown").is_empty());

    registry.kill_entity(b);
    registry.update();
    assert!(registry.get_entities_by_group("enemies").is_empty());
    assert_eq!(registry.group_count(), 0);
    assert_eq!(registry.tag_count(), 0);
    assert_eq!(registry.group_of(b), Err(EcsError::EntityNotFound(b)));
}

#[test]
fn test_recycled_id_sees_no_stale_data() {
    let mut registry = Registry::new();
    let e = registry.create_entity();
    registry.add_component(e, Layer(9));
    registry.update();
    registry.kill_entity(e);
    registry.update();

    let reused = registry.create_entity();
    assert_eq!(reused, e);
    assert!(!registry.has_component::<Layer>(reused));
    assert!(registry.components().signature(reused).is_empty());
    assert_eq!(
        registry.components().pool::<Layer>().map(|pool| pool.size()),
        Some(0)
    );
}

struct Collision {
    damage: i32,
    log: Vec<&'static str>,
}
impl Event for Collision {}

#[derive(Default)]
struct Armor {
    absorbed: Cell<i32>,
}

impl Armor {
    fn on_collision(&self, event: &mut Collision) {
        self.absorbed.set(self.absorbed.get() + 2);
        event.damage -= 2;
        event.log.push("armor");
    }
}

#[test]
fn test_event_mutation_is_seen_downstream() {
    let bus = EventBus::new();
    let armor = Rc::new(Armor::default());
    let received = Rc::new(RefCell::new(Vec::new()));

    bus.subscribe(&armor, Armor::on_collision);
    let sink = Rc::clone(&received);
    bus.subscribe_fn(move |event: &mut Collision| {
        sink.borrow_mut().push(event.damage);
        event.log.push("health");
    });

    let event = bus.emit(Collision {
        damage: 10,
        log: Vec::new(),
    });

    assert_eq!(*received.borrow(), vec![8]);
    assert_eq!(event.log, vec!["armor", "health"]);
    assert_eq!(armor.absorbed.get(), 2);

    bus.reset();
    let untouched = bus.emit(Collision {
        damage: 10,
        log: Vec::new(),
    });
    assert_eq!(untouched.damage, 10);
}
