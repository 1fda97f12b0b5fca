//! The player-controlled character, as seen by the agents.

use serde::{Deserialize, Serialize};

use crate::components::Vec3;

/// Source of the protagonist's kinematics, supplied to each update.
pub trait Protagonist {
    fn position(&self) -> Vec3;
    /// Instantaneous velocity; only the Ambusher reads it.
    fn velocity(&self) -> Vec3;
}

/// Plain snapshot of the protagonist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProtagonistState {
    pub position: Vec3,
    pub velocity: Vec3,
}

impl ProtagonistState {
    pub fn new(position: Vec3, velocity: Vec3) -> Self {
        Self { position, velocity }
    }

    /// Stationary at `position`.
    pub fn at(position: Vec3) -> Self {
        Self::new(position, Vec3::ZERO)
    }
}

impl Protagonist for ProtagonistState {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }
}
