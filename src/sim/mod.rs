//! Simulation layer: level data, world state and the per-tick step.

pub mod event;
pub mod level;
pub mod step;
pub mod world;
