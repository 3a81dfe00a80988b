/// Entry point and host loop.
///
/// The host owns the terminal, the input devices, and the audio device. It
/// wires them into the simulation as services, then drives `Game::on_tick`
/// with real elapsed time and answers the game's scene requests.

mod ui;

use std::fs::File;
use std::sync::mpsc::{self, Receiver};
use std::time::Instant;

use crossterm::event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags};
use crossterm::{execute, terminal};

use scavenger::config::GameConfig;
use scavenger::sim::game::Game;
use scavenger::sim::services::{AudioService, SceneRequest, Services, Silent};
use scavenger::TurnState;
use ui::effects::Effects;
use ui::gamepad::GamepadState;
use ui::input::{InputState, KEYS_PAUSE, KEYS_QUIT, KEYS_RESTART};
use ui::renderer::Renderer;
use ui::sound::SoundEngine;

fn main() {
    let loaded = GameConfig::load();
    // Still in cooked mode: warnings go to stderr as well as the log.
    for warning in loaded.warnings() {
        eprintln!("{warning}");
    }
    init_logging(&loaded.config);
    for (level, text) in &loaded.notes {
        log::log!(*level, "{text}");
    }
    let config = loaded.config;

    let (scene_tx, scene_rx) = mpsc::channel::<SceneRequest>();
    let effects = Effects::new();
    let audio: Box<dyn AudioService> = match SoundEngine::new() {
        Some(engine) => Box::new(engine),
        None => {
            log::warn!("no audio device; running silent");
            Box::new(Silent)
        }
    };
    let services = Services::new(Box::new(effects.clone()), audio, Box::new(scene_tx));

    let started = match config.seed {
        Some(seed) => Game::seeded(config.level.clone(), seed, services),
        None => Game::new(config.level.clone(), services),
    };
    let mut game = match started {
        Ok(game) => game,
        Err(e) => {
            eprintln!("Level generation failed: {e}");
            return;
        }
    };

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }
    let honor_release = enable_key_release();

    let result = game_loop(&mut game, &scene_rx, &effects, &mut renderer, &config, honor_release);

    if honor_release {
        let _ = execute!(std::io::stdout(), PopKeyboardEnhancementFlags);
    }
    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }
    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    println!();
    println!("You survived {} days. Seed: {}", game.level(), game.seed());
}

/// `RUST_LOG` always wins. Otherwise log at info to `log_file` when one is
/// configured, and stay silent when not: the terminal is in raw mode.
fn init_logging(config: &GameConfig) {
    let default_filter = if config.log_file.is_some() { "info" } else { "off" };
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_filter),
    );
    if let Some(path) = &config.log_file {
        match File::create(path) {
            Ok(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            Err(e) => eprintln!("Cannot open log file {}: {e}", path.display()),
        }
    }
    builder.init();
}

/// Ask the terminal to report key releases. True when it agreed.
fn enable_key_release() -> bool {
    if !terminal::supports_keyboard_enhancement().unwrap_or(false) {
        return false;
    }
    execute!(
        std::io::stdout(),
        PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
    )
    .is_ok()
}

fn game_loop(
    game: &mut Game,
    scenes: &Receiver<SceneRequest>,
    effects: &Effects,
    renderer: &mut Renderer,
    config: &GameConfig,
    honor_release: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    kb.honor_release = honor_release;
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    if gp.connected {
        log::info!("gamepad connected");
    }
    let mut last_frame = Instant::now();

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() || kb.any_pressed(KEYS_QUIT) || gp.cancel_pressed() {
            break;
        }
        handle_meta(game, &kb, &gp);

        let now = Instant::now();
        let dt = now - last_frame;
        last_frame = now;

        let mut intent = kb.direction().or_else(|| gp.direction());
        game.on_tick(dt, &mut intent);
        if !game.is_paused() {
            effects.advance(dt);
        }

        for request in scenes.try_iter() {
            match request {
                SceneRequest::NextLevel => game.advance_level()?,
                SceneRequest::Restart => game.restart()?,
            }
        }

        renderer.render(game, &effects.state())?;
        std::thread::sleep(config.frame);
    }

    Ok(())
}

/// Pause toggling while playing; restart once the game is over.
fn handle_meta(game: &mut Game, kb: &InputState, gp: &GamepadState) {
    if game.state() == TurnState::GameOver {
        if kb.any_pressed(KEYS_RESTART) || gp.restart_pressed() {
            game.request_restart();
        }
        return;
    }
    if kb.any_pressed(KEYS_PAUSE) || gp.pause_pressed() {
        let paused = !game.is_paused();
        game.set_paused(paused);
        log::debug!("paused: {paused}");
    }
}
