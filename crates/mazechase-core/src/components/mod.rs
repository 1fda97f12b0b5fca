//! Component definitions for the ECS runtime.
//!
//! Components are pure data structs attached to entities.
//! They have no behavior beyond small bookkeeping helpers - the logic lives
//! in systems and in `mazechase-logic`.

mod agent;
mod common;

pub use agent::*;
pub use common::*;
