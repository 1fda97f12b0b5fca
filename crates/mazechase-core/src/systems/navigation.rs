//! Navigation system - picks targets and (re)plans agent paths
//!
//! Each agent's repath timer accumulates every tick. A path is recomputed when
//! the timer passes `repath_interval`, when something requested it (state
//! change, exhausted path, dynamic wall) or when the next waypoint has become
//! blocked.
//!
//! An agent caught between two cells keeps walking to its current waypoint;
//! the new path is planned from that waypoint and takes over on arrival. If
//! that waypoint is blocked instead, the agent backs out to the last cell it
//! reached and plans from there.

use hecs::World;
use mazechase_logic::config::{BehaviorConfig, MotorConfig};
use mazechase_logic::grid::{GridCoord, GridModel};
use mazechase_logic::pathfinding::Pathfinder;
use mazechase_logic::targeting::{select_target, TargetInput};
use rand::Rng;

use crate::components::{Brain, Motor, Position, Vec3};

/// Read-only inputs shared by every agent this tick
pub struct NavigationContext<'a> {
    pub grid: &'a GridModel,
    pub pathfinder: &'a Pathfinder,
    pub behavior: &'a BehaviorConfig,
    pub motor: &'a MotorConfig,
    pub protagonist_position: Vec3,
    pub protagonist_velocity: Vec3,
}

/// Returns the number of agents that recomputed this tick
pub fn navigation_system<R: Rng + ?Sized>(
    world: &mut World,
    ctx: &NavigationContext<'_>,
    delta_seconds: f32,
    rng: &mut R,
) -> usize {
    let mut recomputed = 0;

    for (entity, (pos, brain, motor)) in world.query_mut::<(&Position, &Brain, &mut Motor)>() {
        motor.repath_timer += delta_seconds;

        let mut waypoint_blocked = false;
        if let Some(waypoint) = motor.waypoint {
            if !ctx.grid.is_walkable_at(waypoint) {
                log::debug!("Agent {:?}: waypoint {} blocked, replanning", entity, waypoint);
                motor.invalidate();
                waypoint_blocked = true;
            }
        }

        let due = motor.repath_requested || motor.repath_timer >= ctx.motor.repath_interval;
        if !due {
            continue;
        }

        let input = TargetInput {
            state: brain.state,
            personality: brain.personality,
            agent_position: pos.world,
            protagonist_position: ctx.protagonist_position,
            protagonist_velocity: ctx.protagonist_velocity,
            home: brain.home,
        };
        let target = select_target(&input, ctx.grid, ctx.behavior, &mut *rng);
        let goal = ctx.grid.clamp(ctx.grid.world_to_grid(target));

        match motor.waypoint.filter(|_| motor.is_mid_transit()) {
            Some(waypoint) => {
                let path = ctx.pathfinder.find_cell_path(ctx.grid, waypoint, goal);
                log::debug!(
                    "Agent {:?} ({:?}): repath {} -> {} from waypoint, {} cells deferred",
                    entity,
                    brain.state,
                    waypoint,
                    goal,
                    path.len()
                );
                motor.defer(path);
            }
            None => {
                let from = match motor.last_reached {
                    Some(cell) if waypoint_blocked || !ctx.grid.is_walkable_at(pos.cell) => cell,
                    _ => pos.cell,
                };
                let path = plan_from(ctx, pos, from, goal);
                log::debug!(
                    "Agent {:?} ({:?}): repath {} -> {}, {} cells",
                    entity,
                    brain.state,
                    from,
                    goal,
                    path.len()
                );
                motor.install(path);
            }
        }

        motor.goal = Some(goal);
        motor.repath_timer = 0.0;
        motor.repath_requested = false;
        recomputed += 1;
    }

    recomputed
}

/// Path from `from`. If the agent is not sitting on the cell the search
/// started from, that cell is walked to first so movement stays on the lattice.
fn plan_from(ctx: &NavigationContext<'_>, pos: &Position, from: GridCoord, goal: GridCoord) -> Vec<GridCoord> {
    let (mut path, stats) = ctx.pathfinder.find_cell_path_with_stats(ctx.grid, from, goal);
    let anchor = stats.start;
    let off_anchor = pos.world.planar_distance(&ctx.grid.cell_center(anchor)) > ctx.motor.snap_threshold;
    if off_anchor && ctx.grid.is_walkable_at(anchor) {
        path.insert(0, anchor);
    }
    path
}
