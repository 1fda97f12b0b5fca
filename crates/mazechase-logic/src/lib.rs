//! Pure grid navigation logic for MazeChase.
//!
//! This crate contains the navigation and decision logic for maze-chasing
//! agents, independent of any ECS, engine, or physics runtime. Functions take
//! plain data (a [`grid::GridModel`], positions, a caller-supplied RNG) and
//! return results, making them unit-testable and portable.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | Tuning sections, JSON loading and validation |
//! | [`constants`] | Default thresholds, ratios and speeds |
//! | [`geometry`] | `Vec3` world math on the XZ plane |
//! | [`grid`] | Occupancy grid and world ↔ grid mapping |
//! | [`movement`] | One-axis-per-tick stepping and motor phases |
//! | [`pathfinding`] | Four-connected A* with BFS endpoint repair |
//! | [`smoothing`] | Opt-in line-of-sight path thinning |
//! | [`state`] | Normal / Frightened / Eaten transitions and speed |
//! | [`targeting`] | Personality-driven target selection |

pub mod config;
pub mod constants;
pub mod geometry;
pub mod grid;
pub mod movement;
pub mod pathfinding;
pub mod smoothing;
pub mod state;
pub mod targeting;
