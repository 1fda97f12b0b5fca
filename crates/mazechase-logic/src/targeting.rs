//! Personality-driven target selection.
//!
//! Each agent has one of four fixed personalities governing where it aims
//! while Normal. Frightened and Eaten override personality entirely.
//!
//! | State | Personality | Target |
//! |-------|-------------|--------|
//! | Normal | Chaser | Protagonist position |
//! | Normal | Ambusher | Protagonist + heading (dominant axis) × lookahead |
//! | Normal | Patroller | Protagonist when farther than threshold, else a random corner |
//! | Normal | Random | Protagonist when nearer than threshold, else a random walkable cell |
//! | Frightened | any | Random walkable cell (with probability), else away from protagonist |
//! | Eaten | any | Home cell |
//!
//! Randomness comes from the caller's RNG so a seeded session is reproducible.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::BehaviorConfig;
use crate::geometry::Vec3;
use crate::grid::{GridCoord, GridModel};
use crate::state::AgentState;

/// Fixed pursuit strategy of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Personality {
    /// Heads straight for the protagonist.
    Chaser,
    /// Aims ahead of the protagonist's heading.
    Ambusher,
    /// Chases from afar, scatters to a corner when close.
    Patroller,
    /// Chases when close, otherwise roams.
    Random,
}

impl Personality {
    /// All personality variants for iteration.
    pub fn all() -> &'static [Personality] {
        &[
            Personality::Chaser,
            Personality::Ambusher,
            Personality::Patroller,
            Personality::Random,
        ]
    }
}

/// Everything target selection looks at for one agent.
#[derive(Debug, Clone, Copy)]
pub struct TargetInput {
    pub state: AgentState,
    pub personality: Personality,
    pub agent_position: Vec3,
    pub protagonist_position: Vec3,
    pub protagonist_velocity: Vec3,
    pub home: GridCoord,
}

/// World position the agent should path toward this recomputation.
pub fn select_target<R: Rng + ?Sized>(
    input: &TargetInput,
    grid: &GridModel,
    config: &BehaviorConfig,
    rng: &mut R,
) -> Vec3 {
    let cell = grid.cell_size();
    let protagonist = input.protagonist_position;

    match input.state {
        AgentState::Eaten => grid.cell_center(input.home),
        AgentState::Frightened => {
            if rng.gen_bool(config.frightened_random_chance) {
                return random_walkable_point(grid, rng).unwrap_or(protagonist);
            }
            flee_point(input.agent_position, protagonist, config.flee_distance * cell)
                .or_else(|| random_walkable_point(grid, rng))
                .unwrap_or(input.agent_position)
        }
        AgentState::Normal => {
            let distance = input.agent_position.planar_distance(&protagonist);
            match input.personality {
                Personality::Chaser => protagonist,
                Personality::Ambusher => {
                    let heading = input.protagonist_velocity.flatten().dominant_axis();
                    protagonist + heading * (config.ambush_lookahead * cell)
                }
                Personality::Patroller => {
                    if distance > config.patrol_threshold * cell {
                        protagonist
                    } else {
                        scatter_point(grid, rng)
                    }
                }
                Personality::Random => {
                    if distance < config.random_threshold * cell {
                        protagonist
                    } else {
                        random_walkable_point(grid, rng).unwrap_or(protagonist)
                    }
                }
            }
        }
    }
}

/// Uniformly random walkable cell, or `None` on a fully blocked grid.
pub fn random_walkable_cell<R: Rng + ?Sized>(grid: &GridModel, rng: &mut R) -> Option<GridCoord> {
    grid.walkable_cells().choose(rng).copied()
}

fn random_walkable_point<R: Rng + ?Sized>(grid: &GridModel, rng: &mut R) -> Option<Vec3> {
    random_walkable_cell(grid, rng).map(|c| grid.cell_center(c))
}

fn scatter_point<R: Rng + ?Sized>(grid: &GridModel, rng: &mut R) -> Vec3 {
    let corners = grid.corners();
    let corner = corners[rng.gen_range(0..corners.len())];
    grid.cell_center(corner)
}

/// Point `distance` away from `threat`, on the far side of `agent`.
fn flee_point(agent: Vec3, threat: Vec3, distance: f32) -> Option<Vec3> {
    let away = (agent - threat).flatten();
    if away.length() <= f32::EPSILON {
        return None;
    }
    Some(agent + away.normalize() * distance)
}
