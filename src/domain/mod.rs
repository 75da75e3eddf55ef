//! Game rules with no I/O: geometry, the player, physics and the vision timer.

pub mod entity;
pub mod physics;
pub mod rect;
pub mod vision;
