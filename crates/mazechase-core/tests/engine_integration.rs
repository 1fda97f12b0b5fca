//! End-to-end engine scenarios on small hand-drawn mazes.
//!
//! Exercises: scan → spawn → update loop → signals → notifications.

use mazechase_core::prelude::*;
use mazechase_logic::movement::MotorPhase;

// ── Helpers ────────────────────────────────────────────────────────────

/// Loop with a pillar block in the middle. Rows are north-up, so the
/// bottom corridor is z = 1 and the top corridor is z = 3.
const RING: &str = "\
    #######\n\
    #.....#\n\
    #.###.#\n\
    #.....#\n\
    #######";

const DT: f32 = 0.05;

fn engine_for(layout: &str, config: ChaseConfig) -> ChaseEngine {
    let grid = GridModel::from_ascii(layout, 1.0, Vec3::ZERO).unwrap();
    ChaseEngine::new(config, grid).unwrap()
}

fn without_auto_contact() -> ChaseConfig {
    let mut config = ChaseConfig::default();
    config.session.contact_radius = None;
    config
}

fn on_lattice(v: f32) -> bool {
    (v - v.round()).abs() < 1e-4
}

fn kinds(notifications: &[Notification]) -> Vec<NotificationKind> {
    notifications.iter().map(|n| n.kind).collect()
}

// ── Scenarios ──────────────────────────────────────────────────────────

#[test]
fn state_cycle_normal_frightened_eaten_normal() {
    let mut engine = engine_for(RING, without_auto_contact());
    let home = GridCoord::new(1, 1);
    let agent = engine.spawn_agent_at(Personality::Chaser, home, GridCoord::new(5, 3));
    let protagonist = ProtagonistState::at(engine.grid().cell_center(GridCoord::new(3, 3)));

    engine.update(DT, &protagonist);
    engine.power_mode_started();
    assert_eq!(engine.agent(agent).unwrap().state, AgentState::Frightened);

    for _ in 0..10 {
        engine.update(DT, &protagonist);
    }
    let transition = engine.report_contact(agent).unwrap();
    assert_eq!(transition.next, AgentState::Eaten);

    let speed = engine.config().speed.clone();
    assert_eq!(
        engine.agent(agent).unwrap().speed,
        speed.base_speed * speed.eaten_factor
    );

    let mut respawned_at = None;
    for _ in 0..400 {
        engine.update(DT, &protagonist);
        let view = engine.agent(agent).unwrap();
        if view.state == AgentState::Normal {
            respawned_at = Some(view.position);
            break;
        }
        assert_eq!(view.state, AgentState::Eaten);
    }

    let position = respawned_at.expect("agent never made it home");
    let threshold = engine.config().behavior.home_arrival_threshold;
    assert!(position.planar_distance(&engine.grid().cell_center(home)) <= threshold);
    assert_eq!(
        kinds(&engine.drain_notifications()),
        vec![NotificationKind::AgentEaten, NotificationKind::AgentRespawned]
    );
}

#[test]
fn contact_while_normal_reports_catch_without_state_change() {
    let mut engine = engine_for(RING, without_auto_contact());
    let agent = engine.spawn_agent(Personality::Patroller, GridCoord::new(1, 1));

    let transition = engine.report_contact(agent).unwrap();
    assert!(!transition.changed());
    let notifications = engine.drain_notifications();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].kind, NotificationKind::CaughtProtagonist);
    assert_eq!(notifications[0].entity, agent);
}

#[test]
fn agents_never_move_diagonally_or_leave_corridors() {
    let mut engine = engine_for(RING, ChaseConfig::default());
    for (i, &personality) in Personality::all().iter().enumerate() {
        let home = engine.grid().walkable_cells()[i * 2];
        engine.spawn_agent(personality, home);
    }

    // Protagonist circles the ring, one cell every 0.4 s.
    let ring: Vec<GridCoord> = [
        (1, 1), (2, 1), (3, 1), (4, 1), (5, 1), (5, 2), (5, 3),
        (4, 3), (3, 3), (2, 3), (1, 3), (1, 2),
    ]
    .iter()
    .map(|&(x, z)| GridCoord::new(x, z))
    .collect();

    let mut last = engine.agents();
    for tick in 0..1200 {
        if tick == 300 {
            engine.power_mode_started();
        }
        let step = (tick / 8) % ring.len();
        let here = engine.grid().cell_center(ring[step]);
        let next = engine.grid().cell_center(ring[(step + 1) % ring.len()]);
        let protagonist = ProtagonistState::new(here, (next - here) * 2.5);

        engine.update(DT, &protagonist);
        let now = engine.agents();

        for (before, after) in last.iter().zip(now.iter()) {
            assert_eq!(before.entity, after.entity);
            let dx = (after.position.x - before.position.x).abs();
            let dz = (after.position.z - before.position.z).abs();
            assert!(
                dx == 0.0 || dz == 0.0,
                "tick {}: {:?} moved diagonally {:?} -> {:?}",
                tick,
                after.personality,
                before.position,
                after.position
            );
            assert!(on_lattice(after.position.x) || on_lattice(after.position.z));
            assert!(engine.grid().is_walkable_at(after.cell), "{:?} in a wall", after);
        }
        last = now;
    }
}

#[test]
fn wall_dropped_ahead_forces_detour() {
    let mut engine = engine_for(RING, without_auto_contact());
    let agent = engine.spawn_agent(Personality::Chaser, GridCoord::new(1, 3));
    let goal = GridCoord::new(5, 3);
    let protagonist = ProtagonistState::at(engine.grid().cell_center(goal));

    engine.update(DT, &protagonist);
    let wall = GridCoord::new(3, 3);
    assert!(engine.agent(agent).unwrap().remaining.contains(&wall));
    assert!(engine.set_cell(wall, false));

    let mut reached = false;
    for _ in 0..600 {
        engine.update(DT, &protagonist);
        let view = engine.agent(agent).unwrap();
        assert_ne!(view.cell, wall, "walked into the new wall");
        if view.cell == goal && view.phase == MotorPhase::Idle {
            reached = true;
            break;
        }
    }
    assert!(reached, "agent never reached {} around the wall", goal);
}

#[test]
fn wall_dropped_on_half_crossed_cell_sends_agent_back() {
    let mut engine = engine_for(".....", without_auto_contact());
    let agent = engine.spawn_agent(Personality::Chaser, GridCoord::new(0, 0));
    let protagonist = ProtagonistState::at(engine.grid().cell_center(GridCoord::new(4, 0)));
    let wall = GridCoord::new(1, 0);

    // Walk until the rounded cell flips to the next one, short of arriving.
    for _ in 0..100 {
        engine.update(0.02, &protagonist);
        if engine.agent(agent).unwrap().cell == wall {
            break;
        }
    }
    let view = engine.agent(agent).unwrap();
    assert_eq!(view.cell, wall);
    assert_eq!(view.waypoint, Some(wall));

    assert!(engine.set_cell(wall, false));
    assert_eq!(engine.agent(agent).unwrap().cell, GridCoord::new(0, 0));

    let wall_x = engine.grid().cell_center(wall).x;
    for tick in 0..40 {
        engine.update(DT, &protagonist);
        let view = engine.agent(agent).unwrap();
        assert_ne!(view.cell, wall, "tick {}: reported inside the wall", tick);
        assert!(
            view.position.x < wall_x,
            "tick {}: crossed the wall at {:?}",
            tick,
            view.position
        );
        assert!(!view.remaining.contains(&GridCoord::new(2, 0)));
    }

    let view = engine.agent(agent).unwrap();
    assert_eq!(view.cell, GridCoord::new(0, 0));
    assert_eq!(view.position, engine.grid().cell_center(GridCoord::new(0, 0)));
    assert_eq!(view.phase, MotorPhase::Idle);
}

#[test]
fn sealed_agent_holds_position() {
    let layout = "\
        #####\n\
        #.#.#\n\
        #####";
    let mut engine = engine_for(layout, ChaseConfig::default());
    let agent = engine.spawn_agent(Personality::Chaser, GridCoord::new(1, 1));
    let start = engine.agent(agent).unwrap().position;
    let protagonist = ProtagonistState::at(engine.grid().cell_center(GridCoord::new(3, 1)));

    for _ in 0..100 {
        engine.update(DT, &protagonist);
    }

    let view = engine.agent(agent).unwrap();
    assert_eq!(view.position, start);
    assert_eq!(view.phase, MotorPhase::Idle);
    assert!(view.remaining.is_empty());
}

#[test]
fn scan_from_colliders_then_rescan() {
    let mut config = ChaseConfig::default();
    config.grid.width = 7;
    config.grid.height = 5;
    let oracle = ColliderSet::from_layout(RING, 1.0, Vec3::ZERO);

    let (mut engine, report) = ChaseEngine::from_scan(config, &oracle).unwrap();
    assert_eq!(report.warning, None);
    assert_eq!(report.walkable, 12);
    assert_eq!(
        engine.grid().to_ascii(),
        "#######\n#.....#\n#.###.#\n#.....#\n#######\n"
    );

    let agent = engine.spawn_agent(Personality::Chaser, GridCoord::new(1, 1));
    let protagonist = ProtagonistState::at(engine.grid().cell_center(GridCoord::new(5, 3)));
    engine.update(DT, &protagonist);
    assert!(!engine.agent(agent).unwrap().remaining.is_empty());

    let report = engine.rescan(&ColliderSet::new());
    assert_eq!(report.warning, Some(ScanWarning::NoBlockedCells));
    let view = engine.agent(agent).unwrap();
    assert_eq!(view.phase, MotorPhase::Idle);
    assert!(view.remaining.is_empty());
}
