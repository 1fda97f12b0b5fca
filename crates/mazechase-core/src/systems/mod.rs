//! Systems - logic that operates on components

mod events;
mod motor;
mod navigation;
mod scanning;
mod state;

pub use events::*;
pub use motor::*;
pub use navigation::*;
pub use scanning::*;
pub use state::*;
