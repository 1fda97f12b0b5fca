//! Notifications - outcomes reported to the game layer
//!
//! Scoring, lives and game-over live outside this crate. The engine queues a
//! notification per outcome and the caller drains them after each update.

use hecs::Entity;
pub use mazechase_logic::state::NotificationKind;

/// One outcome for one agent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub entity: Entity,
}

/// FIFO of pending notifications
#[derive(Debug, Default)]
pub struct NotificationQueue {
    pending: Vec<Notification>,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: NotificationKind, entity: Entity) {
        match kind {
            NotificationKind::CaughtProtagonist => log::info!("Agent {:?} caught the protagonist", entity),
            NotificationKind::AgentEaten => log::info!("Agent {:?} eaten", entity),
            NotificationKind::AgentRespawned => log::info!("Agent {:?} respawned", entity),
        }
        self.pending.push(Notification { kind, entity });
    }

    /// Take everything queued so far, oldest first
    pub fn drain(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.pending)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
