//! Presentation and device layer: terminal, keyboard, gamepad, audio.

pub mod gamepad;
pub mod input;
pub mod renderer;
pub mod scene;
pub mod sound;
