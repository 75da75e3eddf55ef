/// Vision ability: a tick-counted duration/cooldown timer.
///
/// ```text
///   Idle ──toggle──▶ Active ──toggle / duration hits 0──▶ CoolingDown
///    ▲                                                        │
///    └──────────────────── cooldown hits 0 ───────────────────┘
/// ```
///
/// Toggling while cooling down does nothing. `update` runs once per tick
/// in every state and only touches the counter that is live.

use crate::config::VisionConfig;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum VisionState {
    Idle,
    Active,
    CoolingDown,
}

/// Outcome of a `toggle` or `update` call.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum VisionChange {
    Activated,
    /// Turned off by the player before the duration ran out.
    Cancelled,
    /// Duration ran out.
    Expired,
    /// Cooldown finished; the ability can be used again.
    Ready,
    /// Toggle refused while cooling down.
    Unavailable,
    Unchanged,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VisionAbility {
    pub active: bool,
    /// Ticks left before the ability can be activated again.
    pub cooldown: u32,
    /// Ticks left while active. Meaningless when inactive.
    pub duration: u32,
    max_duration: u32,
    max_cooldown: u32,
}

impl Default for VisionAbility {
    fn default() -> Self {
        VisionAbility::from_config(&VisionConfig::default())
    }
}

impl VisionAbility {
    pub fn new(max_duration: u32, max_cooldown: u32) -> Self {
        VisionAbility { active: false, cooldown: 0, duration: 0, max_duration, max_cooldown }
    }

    pub fn from_config(cfg: &VisionConfig) -> Self {
        VisionAbility::new(cfg.max_duration, cfg.max_cooldown)
    }

    pub fn state(&self) -> VisionState {
        // Cooldown only starts once vision has ended.
        debug_assert!(!(self.active && self.cooldown > 0), "active vision with a running cooldown");
        if self.active {
            VisionState::Active
        } else if self.cooldown > 0 {
            VisionState::CoolingDown
        } else {
            VisionState::Idle
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state() == VisionState::Idle
    }

    pub fn toggle(&mut self) -> VisionChange {
        match self.state() {
            VisionState::Idle => {
                self.active = true;
                self.duration = self.max_duration;
                VisionChange::Activated
            }
            VisionState::Active => {
                self.end();
                VisionChange::Cancelled
            }
            VisionState::CoolingDown => VisionChange::Unavailable,
        }
    }

    pub fn update(&mut self) -> VisionChange {
        if self.active {
            self.duration = self.duration.saturating_sub(1);
            if self.duration == 0 {
                self.end();
                return VisionChange::Expired;
            }
        } else if self.cooldown > 0 {
            self.cooldown -= 1;
            if self.cooldown == 0 {
                return VisionChange::Ready;
            }
        }
        VisionChange::Unchanged
    }

    /// Remaining share of the active period, 1.0 → 0.0.
    pub fn duration_fraction(&self) -> f32 {
        if !self.active || self.max_duration == 0 { return 0.0; }
        self.duration as f32 / self.max_duration as f32
    }

    /// Remaining share of the cooldown, 1.0 → 0.0.
    pub fn cooldown_fraction(&self) -> f32 {
        if self.max_cooldown == 0 { return 0.0; }
        self.cooldown as f32 / self.max_cooldown as f32
    }

    fn end(&mut self) {
        self.active = false;
        self.cooldown = self.max_cooldown;
    }
}
