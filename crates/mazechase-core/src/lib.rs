//! MazeChase Core - grid-navigating chase agents
//!
//! An ECS runtime for maze-chasing agents: each agent picks a target from
//! its personality and state, plans a four-connected path over an occupancy
//! grid, and walks it one axis at a time.
//!
//! # Architecture
//!
//! The runtime uses an Entity Component System (ECS) architecture via `hecs`:
//! - **Entities**: Chasing agents
//! - **Components**: Pure data attached to entities (Position, Brain, Motor)
//! - **Systems**: Scanning, state, navigation and motor passes over the world
//!
//! Pure algorithms (A*, target selection, state transitions) live in
//! `mazechase_logic`; this crate wires them to entities and a tick loop.
//!
//! # Example
//!
//! ```rust,no_run
//! use mazechase_core::prelude::*;
//!
//! let layout = "\
//!     #####\n\
//!     #...#\n\
//!     #.#.#\n\
//!     #...#\n\
//!     #####";
//! let grid = GridModel::from_ascii(layout, 1.0, Vec3::ZERO).unwrap();
//! let mut engine = ChaseEngine::new(ChaseConfig::default(), grid).unwrap();
//! engine.spawn_agent(Personality::Chaser, GridCoord::new(1, 1));
//!
//! let protagonist = ProtagonistState::at(engine.grid().cell_center(GridCoord::new(3, 3)));
//! loop {
//!     engine.update(1.0 / 60.0, &protagonist);
//!     for notification in engine.drain_notifications() {
//!         println!("{:?}", notification);
//!     }
//! }
//! ```

pub mod components;
pub mod engine;
pub mod protagonist;
pub mod systems;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::engine::{AgentView, ChaseEngine};
    pub use crate::protagonist::{Protagonist, ProtagonistState};
    pub use crate::systems::{
        Classification, ColliderSet, Notification, NotificationKind, OccupancyOracle, ScanReport, ScanWarning,
    };
    pub use hecs::Entity;
    pub use mazechase_logic::config::ChaseConfig;
    pub use mazechase_logic::grid::{GridCoord, GridModel};
    pub use mazechase_logic::state::AgentState;
    pub use mazechase_logic::targeting::Personality;
}
