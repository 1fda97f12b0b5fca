//! Pure grid-aligned movement: one axis per tick, snap on arrival.
//!
//! Algorithm:
//! 1. If already within the snap threshold of the target, snap and report arrival
//! 2. Otherwise pick the axis (X or Z) with the larger remaining distance
//! 3. Move along that axis only, by `min(speed × dt, remaining on that axis)`
//! 4. Re-check the snap threshold so arrival lands on the same tick
//!
//! Because only one axis moves per tick, an agent never travels diagonally
//! even when it starts off a cell centre.

use serde::{Deserialize, Serialize};

use crate::geometry::{Axis, Vec3};

/// Lifecycle of an agent's path follower.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MotorPhase {
    /// No path to follow.
    #[default]
    Idle,
    /// Walking toward the current waypoint.
    Following,
    /// Snapped onto a waypoint; about to take the next one or go idle.
    Arrived,
}

/// Result of a single movement tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepResult {
    pub position: Vec3,
    /// Axis moved along this tick, if any.
    pub axis: Option<Axis>,
    pub arrived: bool,
}

/// Advance `position` toward `target` along a single axis.
pub fn step_toward(position: Vec3, target: Vec3, speed: f32, dt: f32, snap_threshold: f32) -> StepResult {
    if position.planar_distance(&target) <= snap_threshold {
        return StepResult {
            position: snap(position, target),
            axis: None,
            arrived: true,
        };
    }

    let dx = target.x - position.x;
    let dz = target.z - position.z;
    let budget = (speed * dt).max(0.0);
    let mut next = position;
    let axis = if dx.abs() >= dz.abs() {
        next.x += dx.signum() * budget.min(dx.abs());
        Axis::X
    } else {
        next.z += dz.signum() * budget.min(dz.abs());
        Axis::Z
    };

    if next.planar_distance(&target) <= snap_threshold {
        StepResult {
            position: snap(next, target),
            axis: Some(axis),
            arrived: true,
        }
    } else {
        StepResult {
            position: next,
            axis: Some(axis),
            arrived: false,
        }
    }
}

fn snap(position: Vec3, target: Vec3) -> Vec3 {
    Vec3::new(target.x, position.y, target.z)
}
