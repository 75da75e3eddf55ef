/// WorldState: the single owner of everything a running game needs.
///
/// One level, one player, one vision ability, the phase, and the tuning
/// they run with. There are no globals; the main loop holds the only
/// `WorldState` and passes it by reference to `step` and the renderer.

use crate::config::{PhysicsConfig, VisionConfig};
use crate::domain::entity::Player;
use crate::domain::vision::VisionAbility;
use crate::sim::level::Level;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Playing,
    Won,
    Lost,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        self != Phase::Playing
    }
}

pub struct WorldState {
    pub level: Level,
    pub player: Player,
    pub vision: VisionAbility,

    // ── Tuning ──
    pub physics: PhysicsConfig,
    pub vision_config: VisionConfig,

    // ── Meta ──
    pub phase: Phase,
    pub paused: bool,
    pub tick: u64,
    /// Simulation rate, for converting tick counts to seconds.
    pub tick_rate_hz: u32,
    /// Attempts started this session, including the first.
    pub attempt: u32,

    // ── UI ──
    pub message: String,
    pub message_timer: u32,
}

impl WorldState {
    pub fn new() -> Self {
        WorldState::with_config(PhysicsConfig::default(), VisionConfig::default())
    }

    pub fn with_config(physics: PhysicsConfig, vision_config: VisionConfig) -> Self {
        WorldState {
            level: Level::builtin(),
            player: Player::spawn(),
            vision: VisionAbility::from_config(&vision_config),
            physics,
            vision_config,
            phase: Phase::Playing,
            paused: false,
            tick: 0,
            tick_rate_hz: 60,
            attempt: 1,
            message: String::new(),
            message_timer: 0,
        }
    }

    /// Show `msg` for `duration` ticks. Zero keeps it until replaced.
    pub fn set_message(&mut self, msg: &str, duration: u32) {
        self.message = msg.to_string();
        self.message_timer = duration;
    }

    pub fn clear_message(&mut self) {
        self.message.clear();
        self.message_timer = 0;
    }

    /// Count down the message timer; clears the message when it runs out.
    pub fn tick_message(&mut self) {
        if self.message_timer > 0 {
            self.message_timer -= 1;
            if self.message_timer == 0 {
                self.message.clear();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_world_is_playing_at_spawn() {
        let w = WorldState::new();
        assert_eq!(w.phase, Phase::Playing);
        assert_eq!(w.player, Player::spawn());
        assert!(w.vision.is_ready());
        assert!(!w.paused);
        assert_eq!(w.attempt, 1);
    }

    #[test]
    fn message_expires() {
        let mut w = WorldState::new();
        w.set_message("hello", 2);
        w.tick_message();
        assert_eq!(w.message, "hello");
        w.tick_message();
        assert!(w.message.is_empty());
    }

    #[test]
    fn sticky_message_stays() {
        let mut w = WorldState::new();
        w.set_message("PAUSED", 0);
        for _ in 0..10 { w.tick_message(); }
        assert_eq!(w.message, "PAUSED");
        w.clear_message();
        assert!(w.message.is_empty());
    }

    #[test]
    fn terminal_phases() {
        assert!(!Phase::Playing.is_terminal());
        assert!(Phase::Won.is_terminal());
        assert!(Phase::Lost.is_terminal());
    }
}
