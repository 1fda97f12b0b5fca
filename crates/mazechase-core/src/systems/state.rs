//! State system - feeds signals to agent brains and applies the results
//!
//! Any change of state retunes the motor speed and asks for a fresh path so
//! the new behaviour takes effect at the next recomputation.

use hecs::{Entity, World};
use mazechase_logic::config::SpeedConfig;
use mazechase_logic::grid::GridModel;
use mazechase_logic::state::{AgentState, StateSignal, Transition};

use super::events::NotificationQueue;
use crate::components::{Brain, Motor, Position, Vec3};

/// Apply one signal to one agent. `None` if the entity is not an agent.
pub fn apply_signal(
    world: &mut World,
    entity: Entity,
    signal: StateSignal,
    speed: &SpeedConfig,
    notifications: &mut NotificationQueue,
) -> Option<Transition> {
    let (brain, motor) = world.query_one_mut::<(&mut Brain, &mut Motor)>(entity).ok()?;
    Some(apply(entity, brain, motor, signal, speed, notifications))
}

/// Apply a signal to every agent, returning how many changed state
pub fn broadcast_signal(
    world: &mut World,
    signal: StateSignal,
    speed: &SpeedConfig,
    notifications: &mut NotificationQueue,
) -> usize {
    let mut changed = 0;
    for (entity, (brain, motor)) in world.query_mut::<(&mut Brain, &mut Motor)>() {
        if apply(entity, brain, motor, signal, speed, notifications).changed() {
            changed += 1;
        }
    }
    changed
}

/// Distance-based contact, edge-triggered per agent.
///
/// An agent fires `ProtagonistContact` on the tick it comes within `radius`
/// and not again until it has left that radius.
pub fn contact_system(
    world: &mut World,
    protagonist: Vec3,
    radius: f32,
    speed: &SpeedConfig,
    notifications: &mut NotificationQueue,
) {
    for (entity, (pos, brain, motor)) in world.query_mut::<(&Position, &mut Brain, &mut Motor)>() {
        let touching = pos.world.planar_distance(&protagonist) <= radius;
        let entered = touching && !brain.in_contact;
        brain.in_contact = touching;
        if entered {
            apply(entity, brain, motor, StateSignal::ProtagonistContact, speed, notifications);
        }
    }
}

/// Eaten agents within `threshold` of their home cell respawn
pub fn home_arrival_system(
    world: &mut World,
    grid: &GridModel,
    threshold: f32,
    speed: &SpeedConfig,
    notifications: &mut NotificationQueue,
) {
    for (entity, (pos, brain, motor)) in world.query_mut::<(&Position, &mut Brain, &mut Motor)>() {
        if brain.state != AgentState::Eaten {
            continue;
        }
        let home = grid.cell_center(brain.home);
        if pos.world.planar_distance(&home) <= threshold {
            apply(entity, brain, motor, StateSignal::ReachedHome, speed, notifications);
        }
    }
}

fn apply(
    entity: Entity,
    brain: &mut Brain,
    motor: &mut Motor,
    signal: StateSignal,
    speed: &SpeedConfig,
    notifications: &mut NotificationQueue,
) -> Transition {
    let transition = brain.state.on_signal(signal);
    if transition.changed() {
        log::debug!(
            "Agent {:?}: {:?} -> {:?} on {:?}",
            entity,
            transition.previous,
            transition.next,
            signal
        );
        brain.state = transition.next;
        motor.speed = transition.next.speed(speed);
        motor.request_repath();
    }
    if let Some(kind) = transition.notification {
        notifications.push(kind, entity);
    }
    transition
}

#[cfg(test)]
mod tests {
    use super::*;
    use mazechase_logic::grid::GridCoord;
    use mazechase_logic::state::NotificationKind;
    use mazechase_logic::targeting::Personality;

    fn spawn(world: &mut World, grid: &GridModel, cell: GridCoord, home: GridCoord) -> Entity {
        let speed = SpeedConfig::default();
        world.spawn((
            Position::at_cell(grid, cell),
            Brain::new(Personality::Chaser, home),
            Motor::new(speed.base_speed),
        ))
    }

    fn state_of(world: &World, entity: Entity) -> AgentState {
        world.get::<&Brain>(entity).unwrap().state
    }

    #[test]
    fn test_power_mode_slows_and_requests_repath() {
        let grid = GridModel::new(5, 5, 1.0, Vec3::ZERO).unwrap();
        let mut world = World::new();
        let e = spawn(&mut world, &grid, GridCoord::new(0, 0), GridCoord::new(2, 2));
        world.get::<&mut Motor>(e).unwrap().repath_requested = false;

        let speed = SpeedConfig::default();
        let mut queue = NotificationQueue::new();
        let changed = broadcast_signal(&mut world, StateSignal::PowerModeStarted, &speed, &mut queue);

        assert_eq!(changed, 1);
        assert_eq!(state_of(&world, e), AgentState::Frightened);
        let motor = world.get::<&Motor>(e).unwrap();
        assert_eq!(motor.speed, speed.base_speed * speed.frightened_factor);
        assert!(motor.repath_requested);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_contact_is_edge_triggered() {
        let grid = GridModel::new(5, 5, 1.0, Vec3::ZERO).unwrap();
        let mut world = World::new();
        let e = spawn(&mut world, &grid, GridCoord::new(1, 1), GridCoord::new(2, 2));
        let at = grid.cell_center(GridCoord::new(1, 1));

        let speed = SpeedConfig::default();
        let mut queue = NotificationQueue::new();
        contact_system(&mut world, at, 0.5, &speed, &mut queue);
        contact_system(&mut world, at, 0.5, &speed, &mut queue);
        assert_eq!(queue.len(), 1);

        // Leave and come back.
        contact_system(&mut world, at + Vec3::new(3.0, 0.0, 0.0), 0.5, &speed, &mut queue);
        contact_system(&mut world, at, 0.5, &speed, &mut queue);
        let kinds: Vec<_> = queue.drain().into_iter().map(|n| n.kind).collect();
        assert_eq!(kinds, vec![NotificationKind::CaughtProtagonist; 2]);
        assert_eq!(state_of(&world, e), AgentState::Normal);
    }

    #[test]
    fn test_eaten_agent_respawns_at_home() {
        let grid = GridModel::new(5, 5, 1.0, Vec3::ZERO).unwrap();
        let mut world = World::new();
        let home = GridCoord::new(2, 2);
        let e = spawn(&mut world, &grid, GridCoord::new(0, 0), home);

        let speed = SpeedConfig::default();
        let mut queue = NotificationQueue::new();
        apply_signal(&mut world, e, StateSignal::PowerModeStarted, &speed, &mut queue);
        apply_signal(&mut world, e, StateSignal::ProtagonistContact, &speed, &mut queue);
        assert_eq!(state_of(&world, e), AgentState::Eaten);

        // Away from home: nothing happens.
        home_arrival_system(&mut world, &grid, 0.5, &speed, &mut queue);
        assert_eq!(state_of(&world, e), AgentState::Eaten);

        world.get::<&mut Position>(e).unwrap().set_world(&grid, grid.cell_center(home));
        home_arrival_system(&mut world, &grid, 0.5, &speed, &mut queue);
        assert_eq!(state_of(&world, e), AgentState::Normal);
        assert_eq!(world.get::<&Motor>(e).unwrap().speed, speed.base_speed);

        let kinds: Vec<_> = queue.drain().into_iter().map(|n| n.kind).collect();
        assert_eq!(kinds, vec![NotificationKind::AgentEaten, NotificationKind::AgentRespawned]);
    }

    #[test]
    fn test_signal_to_non_agent_is_ignored() {
        let mut world = World::new();
        let other = world.spawn((42u32,));
        let mut queue = NotificationQueue::new();
        let result = apply_signal(
            &mut world,
            other,
            StateSignal::ProtagonistContact,
            &SpeedConfig::default(),
            &mut queue,
        );
        assert!(result.is_none());
        assert!(queue.is_empty());
    }
}
