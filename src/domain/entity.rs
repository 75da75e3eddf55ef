/// Entities: the player and the per-tick input that drives it.

use super::rect::Rect;

pub const PLAYER_W: f32 = 30.0;
pub const PLAYER_H: f32 = 50.0;

/// Fixed spawn point (top-left of the player's box).
pub const SPAWN: (f32, f32) = (100.0, 400.0);

/// Held-key snapshot for one simulation tick.
/// Left and right may both be held; they cancel out.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct FrameInput {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub rect: Rect,
    pub velocity_y: f32,
    pub on_ground: bool,
}

impl Player {
    pub fn new(x: f32, y: f32) -> Self {
        Player {
            rect: Rect::new(x, y, PLAYER_W, PLAYER_H),
            velocity_y: 0.0,
            on_ground: false,
        }
    }

    /// A fresh player at the spawn point. Restart builds a new one
    /// rather than resetting fields in place.
    pub fn spawn() -> Self {
        Player::new(SPAWN.0, SPAWN.1)
    }
}
