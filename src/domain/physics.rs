/// Player physics: motion integration and platform collision.
///
/// ## Tick order
///
///   1. Horizontal move (left / right held, no normalization)
///   2. Jump impulse (only when grounded)
///   3. Gravity → velocity
///   4. Velocity → position
///   5. Platform collision, in platform insertion order
///   6. Horizontal clamp to the play field
///
/// ## Collision rule
///
/// For each platform overlapping the player:
///   - falling, bottom crossed the platform top, top still above it
///       → land: bottom = platform top, velocity = 0, grounded
///   - rising, top crossed the platform bottom, bottom still below it
///       → bump: top = platform bottom, velocity = 0
///
/// Each overlap is resolved on its own; when two platforms disagree the
/// later one wins. The resolver is discrete: a fast enough fall can skip
/// a thin platform entirely.
///
/// There is no vertical clamp. Falling out of the field is the caller's
/// lose condition.

use super::entity::{FrameInput, Player};
use super::rect::Rect;
use crate::config::PhysicsConfig;

/// Logical play field size in world units.
pub const FIELD_W: f32 = 800.0;
pub const FIELD_H: f32 = 600.0;

/// What happened to the player during one tick.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Motion {
    pub jumped: bool,
    /// Grounded now, was not grounded before the tick.
    pub landed: bool,
}

/// Advance the player by one tick.
pub fn update_player(
    player: &mut Player,
    input: FrameInput,
    platforms: &[Rect],
    params: &PhysicsConfig,
) -> Motion {
    let was_grounded = player.on_ground;
    let mut motion = Motion::default();

    if input.left {
        player.rect.x -= params.speed;
    }
    if input.right {
        player.rect.x += params.speed;
    }

    if input.jump && player.on_ground {
        player.velocity_y = params.jump_power;
        player.on_ground = false;
        motion.jumped = true;
    }

    player.velocity_y += params.gravity;
    player.rect.y += player.velocity_y;

    resolve_platforms(player, platforms);
    clamp_to_field(player);

    motion.landed = player.on_ground && !was_grounded;
    motion
}

fn resolve_platforms(player: &mut Player, platforms: &[Rect]) {
    player.on_ground = false;
    for platform in platforms {
        if !player.rect.overlaps(platform) {
            continue;
        }
        let r = player.rect;
        if player.velocity_y > 0.0 && r.bottom() > platform.top() && r.top() < platform.top() {
            player.rect.set_bottom(platform.top());
            player.velocity_y = 0.0;
            player.on_ground = true;
        } else if player.velocity_y < 0.0
            && r.top() < platform.bottom()
            && r.bottom() > platform.bottom()
        {
            player.rect.set_top(platform.bottom());
            player.velocity_y = 0.0;
        }
    }
}

fn clamp_to_field(player: &mut Player) {
    if player.rect.left() < 0.0 {
        player.rect.set_left(0.0);
    }
    if player.rect.right() > FIELD_W {
        player.rect.set_right(FIELD_W);
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::Level;

    const EPS: f32 = 1e-4;

    fn params() -> PhysicsConfig {
        PhysicsConfig::default()
    }

    fn idle() -> FrameInput {
        FrameInput::default()
    }

    /// A player standing still on top of `platform`, horizontally at `x`.
    fn resting_on(platform: &Rect, x: f32) -> Player {
        let mut p = Player::new(x, 0.0);
        p.rect.set_bottom(platform.top());
        p.on_ground = true;
        p
    }

    // ── Resting ──

    #[test]
    fn resting_player_stays_put() {
        let floor = Rect::new(0.0, 500.0, 300.0, 20.0);
        let mut p = resting_on(&floor, 100.0);
        let m = update_player(&mut p, idle(), &[floor], &params());
        assert!((p.rect.bottom() - 500.0).abs() < EPS);
        assert!(p.on_ground);
        assert_eq!(p.velocity_y, 0.0);
        assert!(!m.landed);
    }

    #[test]
    fn resting_holds_on_every_builtin_platform() {
        let level = Level::builtin();
        for platform in level.platforms() {
            let x = platform.left() + (platform.w - 30.0).max(0.0) / 2.0;
            let mut p = resting_on(platform, x);
            let y_before = p.rect.y;
            for _ in 0..10 {
                update_player(&mut p, idle(), level.platforms(), &params());
            }
            assert!((p.rect.y - y_before).abs() < EPS, "drifted on {platform:?}");
            assert!(p.on_ground, "lost ground on {platform:?}");
        }
    }

    // ── Jumping ──

    #[test]
    fn jump_from_ground() {
        let floor = Rect::new(0.0, 500.0, 300.0, 20.0);
        let mut p = resting_on(&floor, 100.0);
        let jump = FrameInput { jump: true, ..idle() };
        let m = update_player(&mut p, jump, &[floor], &params());
        assert!(m.jumped);
        assert!(!p.on_ground);
        assert!((p.velocity_y - (-15.0 + 0.8)).abs() < EPS);
        assert!((p.rect.bottom() - (500.0 - 14.2)).abs() < EPS);
    }

    #[test]
    fn no_jump_in_midair() {
        let mut p = Player::new(100.0, 100.0);
        let jump = FrameInput { jump: true, ..idle() };
        let m = update_player(&mut p, jump, &[], &params());
        assert!(!m.jumped);
        assert!((p.velocity_y - 0.8).abs() < EPS);
    }

    // ── Landing / bumping ──

    #[test]
    fn falling_player_lands() {
        let floor = Rect::new(0.0, 500.0, 300.0, 20.0);
        let mut p = Player::new(100.0, 445.0); // bottom at 495
        p.velocity_y = 6.0;
        let m = update_player(&mut p, idle(), &[floor], &params());
        assert!(m.landed);
        assert!(p.on_ground);
        assert_eq!(p.velocity_y, 0.0);
        assert!((p.rect.bottom() - 500.0).abs() < EPS);
    }

    #[test]
    fn rising_player_bumps_head() {
        let ceiling = Rect::new(0.0, 100.0, 100.0, 20.0);
        let mut p = Player::new(10.0, 125.0);
        p.velocity_y = -10.0;
        update_player(&mut p, idle(), &[ceiling], &params());
        assert!((p.rect.top() - 120.0).abs() < EPS);
        assert_eq!(p.velocity_y, 0.0);
        assert!(!p.on_ground);
    }

    #[test]
    fn walking_off_a_ledge_starts_falling() {
        let floor = Rect::new(0.0, 500.0, 300.0, 20.0);
        let mut p = resting_on(&floor, 300.0); // just past the right edge
        update_player(&mut p, idle(), &[floor], &params());
        assert!(!p.on_ground);
        assert!(p.rect.bottom() > 500.0);
    }

    #[test]
    fn resolution_follows_platform_order() {
        let upper = Rect::new(0.0, 500.0, 100.0, 20.0);
        let lower = Rect::new(0.0, 503.0, 100.0, 20.0);

        let start = || {
            let mut p = Player::new(10.0, 450.0);
            p.velocity_y = 5.0;
            p
        };

        let mut a = start();
        update_player(&mut a, idle(), &[upper, lower], &params());
        assert!((a.rect.bottom() - 500.0).abs() < EPS);

        let mut b = start();
        update_player(&mut b, idle(), &[lower, upper], &params());
        assert!((b.rect.bottom() - 503.0).abs() < EPS);
    }

    #[test]
    fn fast_fall_tunnels_through_thin_platform() {
        let thin = Rect::new(0.0, 300.0, 100.0, 5.0);
        let mut p = Player::new(10.0, 240.0); // bottom 290
        p.velocity_y = 70.0;
        update_player(&mut p, idle(), &[thin], &params());
        assert!(!p.on_ground);
        assert!(p.rect.top() > thin.bottom());
    }

    // ── Horizontal ──

    #[test]
    fn left_and_right_cancel() {
        let mut p = Player::new(200.0, 100.0);
        let both = FrameInput { left: true, right: true, jump: false };
        update_player(&mut p, both, &[], &params());
        assert!((p.rect.x - 200.0).abs() < EPS);
    }

    #[test]
    fn clamped_at_left_edge() {
        let mut p = Player::new(-10.0, 100.0);
        update_player(&mut p, idle(), &[], &params());
        assert!(p.rect.left() >= 0.0);

        let mut q = Player::new(2.0, 100.0);
        update_player(&mut q, FrameInput { left: true, ..idle() }, &[], &params());
        assert_eq!(q.rect.left(), 0.0);
    }

    #[test]
    fn clamped_at_right_edge() {
        let mut p = Player::new(775.0, 100.0);
        update_player(&mut p, FrameInput { right: true, ..idle() }, &[], &params());
        assert!(p.rect.right() <= FIELD_W);
        assert_eq!(p.rect.right(), FIELD_W);
    }

    #[test]
    fn no_vertical_clamp() {
        let mut p = Player::new(100.0, 590.0);
        p.velocity_y = 20.0;
        update_player(&mut p, idle(), &[], &params());
        assert!(p.rect.y > FIELD_H);
    }
}
