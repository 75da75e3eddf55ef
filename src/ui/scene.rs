/// Scene drawing in world units.
///
/// Everything here draws through the `Canvas` trait, so the same code
/// feeds the terminal renderer and the recording canvas used in tests.
/// Coordinates are world units (800×600 field); the canvas owns the
/// mapping to its own pixels.
///
/// Two level modes:
///   - normal: visible platforms, traps, a static oracle
///   - vision: every platform, highlighted traps, a glowing oracle whose
///     inner circle pulses with the wall clock (period 1000 ms)

use crossterm::style::Color;

use crate::domain::entity::Player;
use crate::domain::physics::{FIELD_H, FIELD_W};
use crate::domain::rect::Rect;
use crate::sim::level::Level;
use crate::sim::world::WorldState;

pub trait Canvas {
    fn fill_rect(&mut self, r: Rect, color: Color);
    fn outline_rect(&mut self, r: Rect, color: Color);
    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Color);
}

// ── Palette ──

const fn rgb(r: u8, g: u8, b: u8) -> Color {
    Color::Rgb { r, g, b }
}

pub const BG_NORMAL: Color = rgb(30, 30, 50);
pub const BG_VISION: Color = rgb(20, 20, 40);
pub const PLATFORM: Color = rgb(120, 80, 160);
pub const PLATFORM_REVEALED: Color = rgb(80, 160, 240);
pub const TRAP: Color = rgb(220, 60, 60);
pub const TRAP_GLOW: Color = rgb(255, 100, 100);
pub const TRAP_EDGE: Color = rgb(255, 200, 200);
pub const ORACLE: Color = rgb(255, 215, 0);
pub const ORACLE_GLOW: Color = rgb(255, 255, 200);
pub const ORACLE_CORE: Color = rgb(255, 255, 0);
pub const WHITE: Color = rgb(255, 255, 255);
pub const KAHINA: Color = rgb(180, 100, 220);

/// Blue channel of the oracle's pulsing core: ramps 0 → 254 every second.
pub fn pulse_value(elapsed_ms: u64) -> u8 {
    ((elapsed_ms % 1000) * 255 / 1000) as u8
}

pub fn draw_level(canvas: &mut impl Canvas, level: &Level) {
    for p in level.visible_platforms() {
        canvas.fill_rect(*p, PLATFORM);
    }
    for t in level.traps() {
        canvas.fill_rect(*t, TRAP);
    }
    let goal = level.goal();
    let (cx, cy) = goal.center();
    canvas.fill_rect(goal, ORACLE);
    canvas.fill_circle(cx, cy, 15.0, WHITE);
}

pub fn draw_level_vision(canvas: &mut impl Canvas, level: &Level, elapsed_ms: u64) {
    for p in level.visible_platforms().iter().chain(level.hidden_platforms()) {
        canvas.fill_rect(*p, PLATFORM_REVEALED);
    }
    for t in level.traps() {
        canvas.fill_rect(*t, TRAP_GLOW);
        canvas.outline_rect(*t, TRAP_EDGE);
    }
    let goal = level.goal();
    let (cx, cy) = goal.center();
    canvas.fill_rect(goal, ORACLE_GLOW);
    canvas.fill_circle(cx, cy, 20.0, ORACLE_CORE);
    canvas.fill_circle(cx, cy, 10.0, rgb(255, 255, pulse_value(elapsed_ms)));
}

pub fn draw_player(canvas: &mut impl Canvas, player: &Player) {
    canvas.fill_rect(player.rect, KAHINA);
    let (cx, cy) = player.rect.center();
    canvas.fill_circle(cx, cy - 10.0, 8.0, WHITE);
}

/// Full play field for one frame. Mode follows the vision flag only,
/// never the game phase.
pub fn draw_world(canvas: &mut impl Canvas, world: &WorldState, elapsed_ms: u64) {
    let field = Rect::new(0.0, 0.0, FIELD_W, FIELD_H);
    if world.vision.active {
        canvas.fill_rect(field, BG_VISION);
        draw_level_vision(canvas, &world.level, elapsed_ms);
    } else {
        canvas.fill_rect(field, BG_NORMAL);
        draw_level(canvas, &world.level);
    }
    draw_player(canvas, &world.player);
}
