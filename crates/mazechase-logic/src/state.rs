//! Agent behavioural state: Normal / Frightened / Eaten.
//!
//! # Transitions
//!
//! | From | Signal | To | Reported |
//! |------|--------|----|----------|
//! | Normal | `PowerModeStarted` | Frightened | - |
//! | Normal | `ProtagonistContact` | Normal | `CaughtProtagonist` |
//! | Frightened | `PowerModeEnded` | Normal | - |
//! | Frightened | `ProtagonistContact` | Eaten | `AgentEaten` |
//! | Eaten | `ReachedHome` | Normal | `AgentRespawned` |
//!
//! Every other pair is a no-op. In particular Normal never jumps straight to
//! Eaten, and an Eaten agent ignores power mode until it is home.
//!
//! ```
//! use mazechase_logic::state::{AgentState, StateSignal};
//!
//! let t = AgentState::Normal.on_signal(StateSignal::PowerModeStarted);
//! assert_eq!(t.next, AgentState::Frightened);
//! assert!(t.changed());
//! ```

use serde::{Deserialize, Serialize};

use crate::config::SpeedConfig;

/// Behavioural mode of a chasing agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AgentState {
    /// Pursuing according to personality.
    #[default]
    Normal,
    /// Power mode is on: slow and evasive.
    Frightened,
    /// Caught while frightened: racing back home.
    Eaten,
}

/// Edge-triggered inputs to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateSignal {
    PowerModeStarted,
    PowerModeEnded,
    ProtagonistContact,
    ReachedHome,
}

/// Outcomes reported to the game layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotificationKind {
    CaughtProtagonist,
    AgentEaten,
    AgentRespawned,
}

/// Result of feeding one signal to a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub previous: AgentState,
    pub next: AgentState,
    pub notification: Option<NotificationKind>,
}

impl Transition {
    pub fn changed(&self) -> bool {
        self.previous != self.next
    }
}

impl AgentState {
    /// Apply a signal. Pure; the caller stores `next`.
    pub fn on_signal(self, signal: StateSignal) -> Transition {
        use AgentState::*;
        use StateSignal::*;

        let (next, notification) = match (self, signal) {
            (Normal, PowerModeStarted) => (Frightened, None),
            (Normal, ProtagonistContact) => (Normal, Some(NotificationKind::CaughtProtagonist)),
            (Frightened, PowerModeEnded) => (Normal, None),
            (Frightened, ProtagonistContact) => (Eaten, Some(NotificationKind::AgentEaten)),
            (Eaten, ReachedHome) => (Normal, Some(NotificationKind::AgentRespawned)),
            (state, _) => (state, None),
        };

        Transition {
            previous: self,
            next,
            notification,
        }
    }

    /// Movement speed for this state.
    pub fn speed(self, config: &SpeedConfig) -> f32 {
        match self {
            AgentState::Normal => config.base_speed,
            AgentState::Frightened => config.base_speed * config.frightened_factor,
            AgentState::Eaten => config.base_speed * config.eaten_factor,
        }
    }

    /// States reachable from this one in a single transition, including itself.
    pub fn successors(self) -> &'static [AgentState] {
        match self {
            AgentState::Normal => &[AgentState::Normal, AgentState::Frightened],
            AgentState::Frightened => &[AgentState::Frightened, AgentState::Eaten, AgentState::Normal],
            AgentState::Eaten => &[AgentState::Eaten, AgentState::Normal],
        }
    }
}
