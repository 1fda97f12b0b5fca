//! Agent components: the behavioural brain and the path-following motor.

use mazechase_logic::grid::GridCoord;
use mazechase_logic::movement::MotorPhase;
use mazechase_logic::state::AgentState;
use mazechase_logic::targeting::Personality;
use serde::{Deserialize, Serialize};

/// Decision-making state of a chasing agent
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Brain {
    pub personality: Personality,
    pub state: AgentState,
    /// Respawn cell the agent returns to when eaten
    pub home: GridCoord,
    /// Overlapping the protagonist as of the last contact check
    pub in_contact: bool,
}

impl Brain {
    pub fn new(personality: Personality, home: GridCoord) -> Self {
        Self {
            personality,
            state: AgentState::Normal,
            home,
            in_contact: false,
        }
    }
}

/// Walks a cell path one waypoint at a time.
///
/// `waypoint` is the cell currently being walked to; `path[cursor..]` are the
/// cells after it. A path computed while mid-transit is parked in `pending`
/// and adopted when the current waypoint is reached, so the agent never
/// turns around halfway between two cells.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Motor {
    pub phase: MotorPhase,
    pub waypoint: Option<GridCoord>,
    pub path: Vec<GridCoord>,
    pub cursor: usize,
    pub pending: Option<Vec<GridCoord>>,
    /// Last cell centre the agent stood on (spawn cell or last waypoint reached)
    pub last_reached: Option<GridCoord>,
    /// Cell the last recomputation aimed for
    pub goal: Option<GridCoord>,
    /// Seconds since the last recomputation
    pub repath_timer: f32,
    /// Recompute on the next navigation pass regardless of the timer
    pub repath_requested: bool,
    /// World units per second
    pub speed: f32,
}

impl Motor {
    pub fn new(speed: f32) -> Self {
        Self {
            phase: MotorPhase::Idle,
            waypoint: None,
            path: Vec::new(),
            cursor: 0,
            pending: None,
            last_reached: None,
            goal: None,
            repath_timer: 0.0,
            repath_requested: true,
            speed,
        }
    }

    /// Walking toward a waypoint that has not been reached yet
    pub fn is_mid_transit(&self) -> bool {
        self.phase == MotorPhase::Following && self.waypoint.is_some()
    }

    /// Replace the current path immediately
    pub fn install(&mut self, path: Vec<GridCoord>) {
        self.path = path;
        self.cursor = 0;
        self.pending = None;
        self.waypoint = None;
        self.advance();
    }

    /// Queue a path to take over at the next waypoint boundary
    pub fn defer(&mut self, path: Vec<GridCoord>) {
        self.pending = Some(path);
    }

    /// Called when the current waypoint has been reached
    pub fn arrive(&mut self) {
        self.phase = MotorPhase::Arrived;
        if let Some(reached) = self.waypoint.take() {
            self.last_reached = Some(reached);
        }
        if let Some(pending) = self.pending.take() {
            self.path = pending;
            self.cursor = 0;
        }
        self.advance();
    }

    /// Take the next waypoint, or go idle and ask for a fresh path
    fn advance(&mut self) {
        match self.path.get(self.cursor) {
            Some(&next) => {
                self.waypoint = Some(next);
                self.cursor += 1;
                self.phase = MotorPhase::Following;
            }
            None => {
                self.path.clear();
                self.cursor = 0;
                self.waypoint = None;
                self.phase = MotorPhase::Idle;
                self.repath_requested = true;
            }
        }
    }

    /// Drop everything and recompute on the next pass
    pub fn invalidate(&mut self) {
        self.path.clear();
        self.cursor = 0;
        self.pending = None;
        self.waypoint = None;
        self.phase = MotorPhase::Idle;
        self.repath_requested = true;
    }

    pub fn request_repath(&mut self) {
        self.repath_requested = true;
    }

    /// Current waypoint followed by the rest of the path
    pub fn remaining(&self) -> Vec<GridCoord> {
        self.waypoint
            .into_iter()
            .chain(self.path.iter().skip(self.cursor).copied())
            .collect()
    }

    /// Whether any planned cell (current, remaining or pending) is `cell`
    pub fn crosses(&self, cell: GridCoord) -> bool {
        self.waypoint == Some(cell)
            || self.path.iter().skip(self.cursor).any(|&c| c == cell)
            || self.pending.as_ref().map_or(false, |p| p.contains(&cell))
    }
}
