/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::fs::OpenOptions;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use env_logger::{Builder, Env, Target};

use config::GameConfig;
use domain::entity::FrameInput;
use sim::event::GameEvent;
use sim::step;
use sim::world::WorldState;
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::renderer::{Renderer, TITLE};
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

fn main() {
    let config = GameConfig::load();

    if let Err(e) = init_logging(&config) {
        eprintln!("Logging disabled: {e:#}");
    }
    for d in &config.diagnostics {
        log::warn!("{d}");
    }
    log::info!(
        "starting: speed={} jump_power={} gravity={} vision={}/{} ticks, {} Hz",
        config.physics.speed,
        config.physics.jump_power,
        config.physics.gravity,
        config.vision.max_duration,
        config.vision.max_cooldown,
        config.general.tick_rate_hz,
    );

    let mut world = WorldState::with_config(config.physics.clone(), config.vision.clone());
    world.tick_rate_hz = config.general.tick_rate_hz;
    let mut renderer = Renderer::new();

    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        let _ = renderer.cleanup();
        return;
    }

    let sound = SoundEngine::new();

    let result = game_loop(&mut world, &mut renderer, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        log::error!("game loop failed: {e:#}");
        eprintln!("Game error: {e:#}");
    }

    println!("Thanks for playing {TITLE}!");
}

/// Logs go to `general.log_file` when one is configured: the terminal
/// itself is the game screen. Without a file, logging stays off unless
/// RUST_LOG asks for it.
fn init_logging(config: &GameConfig) -> Result<()> {
    let Some(path) = &config.general.log_file else {
        Builder::from_env(Env::default().default_filter_or("off"))
            .target(Target::Stderr)
            .try_init()?;
        return Ok(());
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .try_init()
        .context("installing logger")?;
    Ok(())
}

fn game_loop(
    world: &mut WorldState,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> Result<()> {
    let mut kb = InputState::new();
    kb.honor_release = renderer.keyboard_enhanced();
    let mut gp = GamepadState::new(&config.gamepad);

    let tick_period = config.general.tick_period();
    let started = Instant::now();
    let mut last_tick = Instant::now();

    loop {
        kb.drain_events();
        gp.update();

        if kb.quit_requested() || gp.quit_pressed() {
            log::info!("quit after {} attempt(s)", world.attempt);
            break;
        }

        // ── Commands: applied as soon as they are read ──
        let mut events: Vec<GameEvent> = Vec::new();

        if kb.pause_pressed() || gp.pause_pressed() {
            let paused = step::toggle_pause(world);
            log::debug!("paused={paused}");
        }
        if kb.vision_pressed() || gp.vision_pressed() {
            events.extend(step::toggle_vision(world));
        }
        if kb.restart_pressed() || gp.restart_pressed() {
            events.extend(step::restart(world));
        }

        // ── Fixed-rate simulation tick ──
        if last_tick.elapsed() >= tick_period {
            events.extend(step::step(world, frame_input(&kb, &gp)));
            last_tick = Instant::now();
        }

        process_events(sound, &events);

        let elapsed_ms = started.elapsed().as_millis() as u64;
        renderer.render(world, elapsed_ms).context("rendering frame")?;

        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

/// Keyboard and gamepad merged: either source holding a direction counts.
fn frame_input(kb: &InputState, gp: &GamepadState) -> FrameInput {
    let keys = kb.frame_input();
    FrameInput {
        left: keys.left || gp.left_held(),
        right: keys.right || gp.right_held(),
        jump: keys.jump || gp.jump_held(),
    }
}

fn process_events(sound: Option<&SoundEngine>, events: &[GameEvent]) {
    for &ev in events {
        log::trace!("event {ev:?}");
        if let Some(s) = sound {
            s.play_event(ev);
        }
    }
}
