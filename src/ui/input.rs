/// Keyboard input tracker.
///
/// Movement and jump are held keys, sampled once per tick into a
/// `FrameInput`. Vision, restart, pause and quit are one-shot commands
/// that fire on the press edge only.
///
/// Terminals that report key releases (keyboard enhancement) give exact
/// hold state. Everywhere else a key counts as held until it has gone
/// `HOLD_TIMEOUT` without a Press/Repeat event; auto-repeat keeps it alive.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::entity::FrameInput;

const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

// ── Key tables ──

pub const LEFT_KEYS: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
pub const RIGHT_KEYS: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
pub const JUMP_KEYS: &[KeyCode] = &[
    KeyCode::Char(' '),
    KeyCode::Up,
    KeyCode::Char('w'),
    KeyCode::Char('W'),
];
pub const VISION_KEYS: &[KeyCode] = &[KeyCode::Char('v'), KeyCode::Char('V')];
pub const RESTART_KEYS: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];
pub const PAUSE_KEYS: &[KeyCode] = &[KeyCode::Char('p'), KeyCode::Char('P')];
pub const QUIT_KEYS: &[KeyCode] = &[KeyCode::Esc, KeyCode::Char('q'), KeyCode::Char('Q')];

pub struct InputState {
    /// Last Press/Repeat per key.
    last_active: HashMap<KeyCode, Instant>,
    /// Keys that went from released to held during the last drain.
    fresh_presses: Vec<KeyCode>,
    /// Every key event of the last drain, modifiers included.
    raw_events: Vec<KeyEvent>,
    /// Trust Release events. Only set once enhancement is confirmed.
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            honor_release: false,
        }
    }

    /// Read every pending terminal event without blocking. Call once per
    /// loop iteration, before commands and the tick.
    pub fn drain_events(&mut self) {
        self.begin_frame();
        while event::poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.apply_key(key, Instant::now());
            }
        }
        self.expire(Instant::now());
    }

    fn begin_frame(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();
    }

    fn apply_key(&mut self, key: KeyEvent, now: Instant) {
        self.raw_events.push(key);
        match key.kind {
            KeyEventKind::Release if self.honor_release => {
                self.last_active.remove(&key.code);
            }
            // Unconfirmed releases are noise; the timeout handles them.
            KeyEventKind::Release => {}
            _ => {
                let was_held = self.held_at(key.code, now);
                self.last_active.insert(key.code, now);
                if !was_held {
                    self.fresh_presses.push(key.code);
                }
            }
        }
    }

    fn expire(&mut self, now: Instant) {
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    fn held_at(&self, code: KeyCode, now: Instant) -> bool {
        self.last_active
            .get(&code)
            .is_some_and(|t| now.duration_since(*t) < HOLD_TIMEOUT)
    }

    pub fn any_held(&self, codes: &[KeyCode]) -> bool {
        let now = Instant::now();
        codes.iter().any(|c| self.held_at(*c, now))
    }

    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.fresh_presses.contains(c))
    }

    /// Held movement and jump for this tick.
    pub fn frame_input(&self) -> FrameInput {
        FrameInput {
            left: self.any_held(LEFT_KEYS),
            right: self.any_held(RIGHT_KEYS),
            jump: self.any_held(JUMP_KEYS),
        }
    }

    pub fn vision_pressed(&self) -> bool {
        self.any_pressed(VISION_KEYS)
    }

    pub fn restart_pressed(&self) -> bool {
        self.any_pressed(RESTART_KEYS)
    }

    pub fn pause_pressed(&self) -> bool {
        self.any_pressed(PAUSE_KEYS)
    }

    /// Esc, Q, or Ctrl+C.
    pub fn quit_requested(&self) -> bool {
        self.any_pressed(QUIT_KEYS) || self.ctrl_c_pressed()
    }

    fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && matches!(k.code, KeyCode::Char('c') | KeyCode::Char('C'))
        })
    }
}
