/// Gamepad input via gilrs.
///
/// D-pad and left stick move; buttons are mapped to actions from the
/// `[gamepad]` section of config.toml. Default mapping:
///   A           →  Jump (held)
///   Y / X       →  Vision
///   B           →  Restart
///   Start       →  Pause
///   Select      →  Quit
///
/// Without the "gamepad" feature nothing is ever connected and every
/// query returns false.

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::config::GamepadConfig;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.25;

const BUTTON_COUNT: usize = 10;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,      // South
    B,      // East
    X,      // West
    Y,      // North
    L1,
    R1,
    L2,
    R2,
    Start,
    Select,
}

impl Btn {
    /// Config names, case-insensitive. Positional aliases are accepted.
    pub fn from_name(s: &str) -> Option<Btn> {
        match s.trim().to_uppercase().as_str() {
            "A" | "SOUTH" => Some(Btn::A),
            "B" | "EAST" => Some(Btn::B),
            "X" | "WEST" => Some(Btn::X),
            "Y" | "NORTH" => Some(Btn::Y),
            "L1" | "LB" => Some(Btn::L1),
            "R1" | "RB" => Some(Btn::R1),
            "L2" | "LT" => Some(Btn::L2),
            "R2" | "RT" => Some(Btn::R2),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        Some(match btn {
            Button::South => Btn::A,
            Button::East => Btn::B,
            Button::West => Btn::X,
            Button::North => Btn::Y,
            Button::LeftTrigger => Btn::L1,
            Button::RightTrigger => Btn::R1,
            Button::LeftTrigger2 => Btn::L2,
            Button::RightTrigger2 => Btn::R2,
            Button::Start => Btn::Start,
            Button::Select => Btn::Select,
            _ => return None,
        })
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct BtnState {
    held: bool,
    just_pressed: bool,
}

impl BtnState {
    fn set(&mut self, held: bool) {
        if held && !self.held {
            self.just_pressed = true;
        }
        self.held = held;
    }
}

#[derive(Clone, Debug, PartialEq)]
struct ActionMap {
    jump: Vec<Btn>,
    vision: Vec<Btn>,
    restart: Vec<Btn>,
    pause: Vec<Btn>,
    quit: Vec<Btn>,
}

impl ActionMap {
    /// Unknown names are dropped with a warning. A list that ends up empty
    /// keeps the built-in binding so no action becomes unreachable.
    fn from_config(cfg: &GamepadConfig) -> Self {
        let defaults = GamepadConfig::default();
        let pick = |action: &str, names: &[String], fallback: &[String]| -> Vec<Btn> {
            let parsed: Vec<Btn> = names
                .iter()
                .filter_map(|n| {
                    let b = Btn::from_name(n);
                    if b.is_none() {
                        log::warn!("gamepad.{action}: unknown button {n:?}");
                    }
                    b
                })
                .collect();
            if parsed.is_empty() {
                fallback.iter().filter_map(|n| Btn::from_name(n)).collect()
            } else {
                parsed
            }
        };
        ActionMap {
            jump: pick("jump", &cfg.jump, &defaults.jump),
            vision: pick("vision", &cfg.vision, &defaults.vision),
            restart: pick("restart", &cfg.restart, &defaults.restart),
            pause: pick("pause", &cfg.pause, &defaults.pause),
            quit: pick("quit", &cfg.quit, &defaults.quit),
        }
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    buttons: [BtnState; BUTTON_COUNT],
    dpad_left: BtnState,
    dpad_right: BtnState,
    stick_x: f32,

    action_map: ActionMap,
}

impl GamepadState {
    pub fn new(cfg: &GamepadConfig) -> Self {
        #[cfg(feature = "gamepad")]
        let gilrs = match Gilrs::new() {
            Ok(g) => {
                match g.gamepads().next() {
                    Some((id, pad)) => log::info!("gamepad {id:?} found: {}", pad.name()),
                    None => log::debug!("no gamepad connected"),
                }
                Some(g)
            }
            Err(e) => {
                log::warn!("gamepad support unavailable: {e}");
                None
            }
        };

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs,
            buttons: [BtnState::default(); BUTTON_COUNT],
            dpad_left: BtnState::default(),
            dpad_right: BtnState::default(),
            stick_x: 0.0,
            action_map: ActionMap::from_config(cfg),
        }
    }

    /// Poll pending gamepad events. Call once per loop iteration.
    pub fn update(&mut self) {
        self.clear_just_pressed();

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let Some(gilrs) = &mut self.gilrs else { return };
        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for ev in events {
            match ev.event {
                EventType::ButtonPressed(btn, _) => self.set_gilrs_button(btn, true),
                EventType::ButtonReleased(btn, _) => self.set_gilrs_button(btn, false),
                EventType::AxisChanged(Axis::LeftStickX, value, _) => self.stick_x = value,
                EventType::Connected => log::info!("gamepad {:?} connected", ev.id),
                EventType::Disconnected => {
                    log::info!("gamepad {:?} disconnected", ev.id);
                    self.release_all();
                }
                _ => {}
            }
        }
    }

    #[cfg(feature = "gamepad")]
    fn set_gilrs_button(&mut self, btn: Button, held: bool) {
        match btn {
            Button::DPadLeft => self.dpad_left.set(held),
            Button::DPadRight => self.dpad_right.set(held),
            other => {
                if let Some(b) = Btn::from_gilrs(other) {
                    self.set_button(b, held);
                }
            }
        }
    }

    fn set_button(&mut self, btn: Btn, held: bool) {
        self.buttons[btn as usize].set(held);
    }

    fn any_held(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.buttons[b as usize].held)
    }

    fn any_just_pressed(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.buttons[b as usize].just_pressed)
    }

    // ── Held ──

    pub fn left_held(&self) -> bool {
        self.dpad_left.held || self.stick_x < -STICK_DEADZONE
    }

    pub fn right_held(&self) -> bool {
        self.dpad_right.held || self.stick_x > STICK_DEADZONE
    }

    pub fn jump_held(&self) -> bool {
        self.any_held(&self.action_map.jump)
    }

    // ── Edge-triggered commands ──

    pub fn vision_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.vision)
    }

    pub fn restart_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.restart)
    }

    pub fn pause_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.pause)
    }

    pub fn quit_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.quit)
    }

    // ── Internal ──

    fn clear_just_pressed(&mut self) {
        for b in &mut self.buttons {
            b.just_pressed = false;
        }
        self.dpad_left.just_pressed = false;
        self.dpad_right.just_pressed = false;
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn release_all(&mut self) {
        self.buttons = [BtnState::default(); BUTTON_COUNT];
        self.dpad_left = BtnState::default();
        self.dpad_right = BtnState::default();
        self.stick_x = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn button_names() {
        assert_eq!(Btn::from_name("a"), Some(Btn::A));
        assert_eq!(Btn::from_name("North"), Some(Btn::Y));
        assert_eq!(Btn::from_name(" back "), Some(Btn::Select));
        assert_eq!(Btn::from_name("rt"), Some(Btn::R2));
        assert_eq!(Btn::from_name("Z"), None);
    }

    #[test]
    fn default_map() {
        let map = ActionMap::from_config(&GamepadConfig::default());
        assert_eq!(map.jump, vec![Btn::A]);
        assert_eq!(map.vision, vec![Btn::Y, Btn::X]);
        assert_eq!(map.restart, vec![Btn::B]);
        assert_eq!(map.pause, vec![Btn::Start]);
        assert_eq!(map.quit, vec![Btn::Select]);
    }

    #[test]
    fn custom_map_drops_unknown_and_keeps_fallback() {
        let cfg = GamepadConfig {
            jump: names(&["B", "bogus"]),
            vision: names(&[]),
            restart: names(&["nothing"]),
            ..GamepadConfig::default()
        };
        let map = ActionMap::from_config(&cfg);
        assert_eq!(map.jump, vec![Btn::B]);
        assert_eq!(map.vision, vec![Btn::Y, Btn::X]);
        assert_eq!(map.restart, vec![Btn::B]);
    }

    #[test]
    fn press_edges_and_holds() {
        let mut pad = GamepadState::new(&GamepadConfig::default());
        pad.set_button(Btn::A, true);
        pad.set_button(Btn::Y, true);
        assert!(pad.jump_held());
        assert!(pad.vision_pressed());

        pad.clear_just_pressed();
        pad.set_button(Btn::Y, true);
        assert!(!pad.vision_pressed());
        assert!(pad.jump_held());

        pad.set_button(Btn::A, false);
        assert!(!pad.jump_held());
    }

    #[test]
    fn stick_deadzone() {
        let mut pad = GamepadState::new(&GamepadConfig::default());
        pad.stick_x = -0.2;
        assert!(!pad.left_held());
        pad.stick_x = -0.6;
        assert!(pad.left_held());
        assert!(!pad.right_held());
        pad.release_all();
        assert!(!pad.left_held());
    }
}
