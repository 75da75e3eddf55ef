/// The step function: advances the world by one tick.
///
/// Processing order:
///   1. Message timer
///   2. Player physics (move, jump, gravity, platform collision, clamp)
///   3. Vision timer
///   4. Win / lose check
///
/// Nothing advances unless the phase is `Playing` and the game is not
/// paused. Won and Lost freeze the world until `restart`.
///
/// Player commands that are not held-key input (vision toggle, restart,
/// pause) have their own entry points and are applied before the tick.

use crate::domain::entity::{FrameInput, Player};
use crate::domain::physics::{self, FIELD_H};
use crate::domain::vision::{VisionAbility, VisionChange};
use super::event::GameEvent;
use super::world::{Phase, WorldState};

const NOT_READY_MSG_TICKS: u32 = 45;
const RESTART_MSG_TICKS: u32 = 90;

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut WorldState, input: FrameInput) -> Vec<GameEvent> {
    world.tick_message();
    if world.phase != Phase::Playing || world.paused { return vec![]; }

    let mut events: Vec<GameEvent> = Vec::new();
    world.tick += 1;

    let motion = physics::update_player(
        &mut world.player,
        input,
        world.level.platforms(),
        &world.physics,
    );
    if motion.jumped { events.push(GameEvent::Jumped); }
    if motion.landed { events.push(GameEvent::Landed); }

    match world.vision.update() {
        VisionChange::Expired => events.push(GameEvent::VisionExpired),
        VisionChange::Ready => events.push(GameEvent::VisionReady),
        _ => {}
    }

    if let Some(ev) = resolve_outcome(world) {
        events.push(ev);
    }

    events
}

// ══════════════════════════════════════════════════════════════
// Win / lose
// ══════════════════════════════════════════════════════════════

/// Evaluate terminal conditions for a world that is still playing.
///
/// Reaching the oracle wins. Otherwise, a player whose top edge is below
/// the bottom of the field has fallen out and loses.
pub fn resolve_outcome(world: &mut WorldState) -> Option<GameEvent> {
    if world.phase != Phase::Playing { return None; }

    if world.player.rect.overlaps(&world.level.goal()) {
        world.phase = Phase::Won;
        log::info!("oracle reached on attempt {} after {} ticks", world.attempt, world.tick);
        Some(GameEvent::Won)
    } else if world.player.rect.y > FIELD_H {
        world.phase = Phase::Lost;
        log::info!("fell out of the field on attempt {} at x={:.0}", world.attempt, world.player.rect.x);
        Some(GameEvent::Lost)
    } else {
        None
    }
}

// ══════════════════════════════════════════════════════════════
// Commands
// ══════════════════════════════════════════════════════════════

/// Vision key. Honored in every phase except while paused. On the Won and
/// Lost screens the timer is frozen with the rest of the world, so the
/// mode simply stays as toggled until restart.
pub fn toggle_vision(world: &mut WorldState) -> Option<GameEvent> {
    if world.paused { return None; }

    match world.vision.toggle() {
        VisionChange::Activated => {
            log::debug!("vision on at tick {}", world.tick);
            Some(GameEvent::VisionActivated)
        }
        VisionChange::Cancelled => {
            log::debug!("vision cancelled at tick {}", world.tick);
            Some(GameEvent::VisionCancelled)
        }
        VisionChange::Unavailable => {
            let secs = world.vision.cooldown as f32 / world.tick_rate_hz.max(1) as f32;
            world.set_message(&format!("Vision recharging ({secs:.1}s)"), NOT_READY_MSG_TICKS);
            Some(GameEvent::VisionUnavailable)
        }
        _ => None,
    }
}

/// Restart key. Only honored once the game is won or lost: rebuilds the
/// player and the vision ability at their spawn state.
pub fn restart(world: &mut WorldState) -> Option<GameEvent> {
    if !world.phase.is_terminal() { return None; }

    world.player = Player::spawn();
    world.vision = VisionAbility::from_config(&world.vision_config);
    world.phase = Phase::Playing;
    world.paused = false;
    world.tick = 0;
    world.attempt += 1;
    world.set_message(&format!("Essai {}", world.attempt), RESTART_MSG_TICKS);
    log::info!("restart, attempt {}", world.attempt);
    Some(GameEvent::Restarted)
}

/// Pause key. Only meaningful while playing; returns the new pause state.
pub fn toggle_pause(world: &mut WorldState) -> bool {
    if world.phase != Phase::Playing { return world.paused; }

    world.paused = !world.paused;
    if world.paused {
        world.set_message("PAUSED  [P] Resume", 0);
    } else {
        world.clear_message();
    }
    world.paused
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rect::Rect;
    use crate::domain::vision::VisionState;

    fn idle() -> FrameInput {
        FrameInput::default()
    }

    fn run(world: &mut WorldState, ticks: usize, input: FrameInput) -> Vec<GameEvent> {
        let mut all = vec![];
        for _ in 0..ticks {
            all.extend(step(world, input));
        }
        all
    }

    // ── Outcomes ──

    #[test]
    fn touching_the_oracle_wins() {
        let mut w = WorldState::new();
        w.player.rect = Rect::new(700.0, 300.0, 30.0, 50.0);
        let events = step(&mut w, idle());
        assert_eq!(w.phase, Phase::Won);
        assert!(events.contains(&GameEvent::Won));
    }

    #[test]
    fn resolve_outcome_direct() {
        let mut w = WorldState::new();
        w.player.rect = Rect::new(700.0, 300.0, 30.0, 50.0);
        assert_eq!(resolve_outcome(&mut w), Some(GameEvent::Won));
        // Already terminal: nothing more to report
        assert_eq!(resolve_outcome(&mut w), None);
    }

    #[test]
    fn falling_below_field_loses() {
        let mut w = WorldState::new();
        w.player.rect.x = 310.0; // over the gap between the first two ground platforms
        w.player.rect.y = 601.0;
        let events = step(&mut w, idle());
        assert_eq!(w.phase, Phase::Lost);
        assert_eq!(events, vec![GameEvent::Lost]);
    }

    #[test]
    fn lose_needs_y_strictly_below_field() {
        let mut w = WorldState::new();
        w.player.rect.x = 310.0;
        w.player.rect.y = 600.0;
        w.player.velocity_y = -0.8; // gravity brings it to 0: y stays 600
        assert!(step(&mut w, idle()).is_empty());
        assert_eq!(w.player.rect.y, 600.0);
        assert_eq!(w.phase, Phase::Playing);

        w.player.rect.y = 600.5;
        w.player.velocity_y = -0.8;
        assert_eq!(step(&mut w, idle()), vec![GameEvent::Lost]);
        assert_eq!(w.phase, Phase::Lost);
    }

    #[test]
    fn falling_through_the_gap_eventually_loses() {
        let mut w = WorldState::new();
        w.player.rect.x = 305.0;
        w.player.rect.y = 520.0;
        let events = run(&mut w, 60, idle());
        assert_eq!(w.phase, Phase::Lost);
        assert_eq!(events.iter().filter(|e| **e == GameEvent::Lost).count(), 1);
    }

    #[test]
    fn spawn_drops_onto_ground_and_stays() {
        let mut w = WorldState::new();
        let events = run(&mut w, 120, idle());
        assert_eq!(w.phase, Phase::Playing);
        assert!(w.player.on_ground);
        assert!((w.player.rect.bottom() - 500.0).abs() < 1e-4);
        assert_eq!(events.iter().filter(|e| **e == GameEvent::Landed).count(), 1);
    }

    // ── Freeze ──

    #[test]
    fn terminal_state_freezes_world() {
        let mut w = WorldState::new();
        w.player.rect = Rect::new(700.0, 300.0, 30.0, 50.0);
        step(&mut w, idle());
        assert_eq!(w.phase, Phase::Won);

        assert_eq!(toggle_vision(&mut w), Some(GameEvent::VisionActivated));
        let player_before = w.player.clone();
        let vision_before = w.vision.clone();
        let tick_before = w.tick;
        let events = run(&mut w, 30, FrameInput { left: true, right: false, jump: true });
        assert!(events.is_empty());
        assert_eq!(w.player, player_before);
        assert_eq!(w.vision, vision_before);
        assert_eq!(w.tick, tick_before);
    }

    #[test]
    fn pause_freezes_world() {
        let mut w = WorldState::new();
        run(&mut w, 5, idle());
        assert!(toggle_pause(&mut w));
        let before = w.player.clone();
        assert!(run(&mut w, 20, idle()).is_empty());
        assert_eq!(w.player, before);
        assert_eq!(w.message, "PAUSED  [P] Resume");
        assert!(!toggle_pause(&mut w));
        assert!(w.message.is_empty());
    }

    #[test]
    fn pause_ignored_when_terminal() {
        let mut w = WorldState::new();
        w.phase = Phase::Lost;
        assert!(!toggle_pause(&mut w));
        assert!(!w.paused);
    }

    // ── Vision through the controller ──

    #[test]
    fn vision_runs_its_course_during_play() {
        let mut w = WorldState::new();
        assert_eq!(toggle_vision(&mut w), Some(GameEvent::VisionActivated));
        let events = run(&mut w, 120, idle());
        assert!(events.contains(&GameEvent::VisionExpired));
        assert!(!w.vision.active);
        assert_eq!(w.vision.cooldown, 180);

        let events = run(&mut w, 180, idle());
        assert!(events.contains(&GameEvent::VisionReady));
        assert_eq!(w.vision.state(), VisionState::Idle);
    }

    #[test]
    fn vision_refused_during_cooldown_sets_message() {
        let mut w = WorldState::new();
        toggle_vision(&mut w);
        assert_eq!(toggle_vision(&mut w), Some(GameEvent::VisionCancelled));
        let before = w.vision.clone();
        assert_eq!(toggle_vision(&mut w), Some(GameEvent::VisionUnavailable));
        assert_eq!(w.vision, before);
        assert!(w.message.starts_with("Vision recharging"));
    }

    #[test]
    fn vision_toggles_on_the_win_screen() {
        let mut w = WorldState::new();
        w.player.rect = Rect::new(700.0, 300.0, 30.0, 50.0);
        step(&mut w, idle());
        assert_eq!(w.phase, Phase::Won);

        assert_eq!(toggle_vision(&mut w), Some(GameEvent::VisionActivated));
        assert!(w.vision.active);
        // Frozen world: the timer does not run down.
        run(&mut w, 200, idle());
        assert!(w.vision.active);
        assert_eq!(w.vision.duration, 120);

        assert_eq!(toggle_vision(&mut w), Some(GameEvent::VisionCancelled));
        assert!(!w.vision.active);
    }

    #[test]
    fn vision_toggles_on_the_lose_screen() {
        let mut w = WorldState::new();
        w.phase = Phase::Lost;
        assert_eq!(toggle_vision(&mut w), Some(GameEvent::VisionActivated));
        assert!(w.vision.active);
    }

    #[test]
    fn vision_ignored_while_paused() {
        let mut w = WorldState::new();
        toggle_pause(&mut w);
        assert_eq!(toggle_vision(&mut w), None);
        assert!(!w.vision.active);
    }

    #[test]
    fn recharge_message_follows_tick_rate() {
        let mut w = WorldState::new();
        w.tick_rate_hz = 30;
        toggle_vision(&mut w);
        toggle_vision(&mut w); // cooldown 180 ticks = 6 s at 30 Hz
        toggle_vision(&mut w);
        assert_eq!(w.message, "Vision recharging (6.0s)");

        let mut w = WorldState::new();
        toggle_vision(&mut w);
        toggle_vision(&mut w);
        toggle_vision(&mut w);
        assert_eq!(w.message, "Vision recharging (3.0s)");
    }

    // ── Restart ──

    #[test]
    fn restart_only_from_terminal_state() {
        let mut w = WorldState::new();
        w.player.rect.x = 250.0;
        assert_eq!(restart(&mut w), None);
        assert_eq!(w.player.rect.x, 250.0);
        assert_eq!(w.attempt, 1);
    }

    #[test]
    fn restart_from_won_resets_everything() {
        let mut w = WorldState::new();
        toggle_vision(&mut w);
        run(&mut w, 10, idle());
        w.player.rect = Rect::new(700.0, 300.0, 30.0, 50.0);
        step(&mut w, idle());
        assert_eq!(w.phase, Phase::Won);

        assert_eq!(restart(&mut w), Some(GameEvent::Restarted));
        assert_eq!(w.phase, Phase::Playing);
        assert_eq!(w.player, Player::spawn());
        assert_eq!((w.player.rect.x, w.player.rect.y), (100.0, 400.0));
        assert!(!w.vision.active);
        assert_eq!(w.vision.cooldown, 0);
        assert_eq!(w.vision.duration, 0);
        assert_eq!(w.attempt, 2);
        assert_eq!(w.message, "Essai 2");
    }

    #[test]
    fn restart_from_lost_resets_everything() {
        let mut w = WorldState::new();
        toggle_vision(&mut w);
        toggle_vision(&mut w); // cooling down
        w.player.rect.y = 700.0;
        step(&mut w, idle());
        assert_eq!(w.phase, Phase::Lost);

        restart(&mut w);
        assert_eq!(w.phase, Phase::Playing);
        assert_eq!(w.player, Player::spawn());
        assert_eq!(w.vision.state(), VisionState::Idle);
        assert_eq!(w.tick, 0);
    }

    #[test]
    fn restart_keeps_configured_vision_timings() {
        let mut w = WorldState::with_config(
            crate::config::PhysicsConfig::default(),
            crate::config::VisionConfig { max_duration: 10, max_cooldown: 5 },
        );
        w.phase = Phase::Lost;
        restart(&mut w);
        toggle_vision(&mut w);
        assert_eq!(w.vision.duration, 10);
    }

    // ── Movement through the controller ──

    #[test]
    fn jump_event_from_ground() {
        let mut w = WorldState::new();
        run(&mut w, 60, idle());
        assert!(w.player.on_ground);
        let events = step(&mut w, FrameInput { jump: true, ..idle() });
        assert_eq!(events, vec![GameEvent::Jumped]);
        assert!(w.player.velocity_y < 0.0);
    }
}
