//! Motor system - moves agents toward their current waypoint

use hecs::World;
use mazechase_logic::grid::GridModel;
use mazechase_logic::movement::step_toward;

use crate::components::{Motor, Position};

/// Step every following agent along one axis. Returns how many reached a waypoint.
pub fn motor_system(world: &mut World, grid: &GridModel, snap_threshold: f32, delta_seconds: f32) -> usize {
    let mut arrivals = 0;

    for (_entity, (pos, motor)) in world.query_mut::<(&mut Position, &mut Motor)>() {
        let Some(waypoint) = motor.waypoint else {
            continue;
        };

        let target = grid.cell_center(waypoint);
        let step = step_toward(pos.world, target, motor.speed, delta_seconds, snap_threshold);
        pos.set_world(grid, step.position);
        pos.settle(grid, motor.last_reached);

        if step.arrived {
            pos.cell = waypoint;
            motor.arrive();
            arrivals += 1;
        }
    }

    arrivals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Vec3;
    use mazechase_logic::grid::GridCoord;
    use mazechase_logic::movement::MotorPhase;

    #[test]
    fn test_walks_path_without_diagonals() {
        let grid = GridModel::new(4, 4, 1.0, Vec3::ZERO).unwrap();
        let mut world = World::new();
        let mut motor = Motor::new(2.0);
        motor.install(vec![GridCoord::new(1, 0), GridCoord::new(1, 1), GridCoord::new(2, 1)]);
        let e = world.spawn((Position::at_cell(&grid, GridCoord::new(0, 0)), motor));

        let mut last = world.get::<&Position>(e).unwrap().world;
        for _ in 0..100 {
            motor_system(&mut world, &grid, 0.05, 0.1);
            let now = world.get::<&Position>(e).unwrap().world;
            let moved_x = (now.x - last.x).abs() > 0.0;
            let moved_z = (now.z - last.z).abs() > 0.0;
            assert!(!(moved_x && moved_z), "diagonal step {:?} -> {:?}", last, now);
            last = now;
        }

        let pos = *world.get::<&Position>(e).unwrap();
        assert_eq!(pos.cell, GridCoord::new(2, 1));
        assert_eq!(pos.world, grid.cell_center(GridCoord::new(2, 1)));
        assert_eq!(world.get::<&Motor>(e).unwrap().phase, MotorPhase::Idle);
    }

    #[test]
    fn test_step_bounded_by_speed() {
        let grid = GridModel::new(4, 1, 1.0, Vec3::ZERO).unwrap();
        let mut world = World::new();
        let mut motor = Motor::new(1.0);
        motor.install(vec![GridCoord::new(1, 0)]);
        let start = grid.cell_center(GridCoord::new(0, 0));
        let e = world.spawn((Position::at_cell(&grid, GridCoord::new(0, 0)), motor));

        let arrivals = motor_system(&mut world, &grid, 0.05, 0.25);
        assert_eq!(arrivals, 0);
        let pos = world.get::<&Position>(e).unwrap().world;
        assert!((pos.x - start.x - 0.25).abs() < 1e-5);
        assert_eq!(pos.z, start.z);
    }

    #[test]
    fn test_idle_agent_stays_put() {
        let grid = GridModel::new(3, 3, 1.0, Vec3::ZERO).unwrap();
        let mut world = World::new();
        let here = Position::at_cell(&grid, GridCoord::new(1, 1));
        let e = world.spawn((here, Motor::new(4.0)));

        assert_eq!(motor_system(&mut world, &grid, 0.05, 1.0), 0);
        assert_eq!(*world.get::<&Position>(e).unwrap(), here);
    }
}
