//! Headless Bomber Runner
//!
//! Loads the game configuration and a level, then plays a scripted input
//! loop against the world and logs the HUD once per second.
//!
//! Run with: cargo run -p bomber_runtime
//!       or: cargo run --bin bomber -- levels/arena.txt

use bomber_math::Vec2;
use bomber_runtime::prelude::*;

const FRAME: f64 = 1.0 / 60.0;

/// Script loop: from `start` seconds into the cycle, feed `input`
const SCRIPT: &[(f64, Step)] = &[
    (0.0, Step::Attack),
    (0.1, Step::Move(0.0, -1.0)),
    (0.6, Step::Idle),
    (3.0, Step::Move(0.0, 1.0)),
    (3.5, Step::Move(1.0, 0.0)),
    (4.0, Step::Switch),
    (4.1, Step::Attack),
    (4.2, Step::Move(-1.0, 0.0)),
    (4.7, Step::Idle),
];
const CYCLE: f64 = 8.0;

#[derive(Debug, Clone, Copy)]
enum Step {
    Idle,
    Move(f32, f32),
    Attack,
    Switch,
}

/// Input for the frame covering `[t, t + dt)`. Button steps only fire on
/// the frame they start in.
fn scripted_input(t: f64, dt: f64) -> InputFrame {
    let phase = t % CYCLE;
    let Some(&(start, step)) = SCRIPT.iter().rev().find(|(start, _)| *start <= phase) else {
        return InputFrame::idle();
    };
    let first_frame = phase - start < dt;
    match step {
        Step::Idle => InputFrame::idle(),
        Step::Move(x, y) => InputFrame::moving(Vec2::new(x, y)),
        Step::Attack if first_frame => InputFrame::attack_pressed(),
        Step::Switch if first_frame => InputFrame::switch(),
        Step::Attack | Step::Switch => InputFrame::idle(),
    }
}

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = GameConfig::load();
    config.print_summary();

    // First non-flag argument is a level file
    let level_path = std::env::args().skip(1).find(|arg| !arg.starts_with("--"));
    let layout = match &level_path {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(layout) => {
                log::info!("Level from {}", path);
                layout
            }
            Err(e) => {
                log::error!("Failed to read level {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => DEMO_LEVEL.to_string(),
    };

    let seconds: f64 = std::env::var("BOMBER_DEMO_SECONDS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(20.0);

    if let Err(e) = run(config, &layout, seconds) {
        log::error!("Runner failed: {}", e);
        std::process::exit(1);
    }
}

fn run(config: GameConfig, layout: &str, seconds: f64) -> RuntimeResult<()> {
    let level = Level::parse(layout)?;
    let mut world = GameWorld::from_level(config, &level, HeadlessSpawner::new(), LogPresentation)?;

    let mut next_report = 1.0;
    while world.now() < seconds && !world.status().is_over() {
        let input = scripted_input(world.now(), FRAME);
        world.update(FRAME, &input);

        if world.now() >= next_report {
            log::info!("[{:5.1}s] {}", world.now(), world.hud().summary());
            next_report += 1.0;
        }
    }

    let hud = world.hud();
    println!("Finished after {:.1}s: {:?}", world.now(), hud.status);
    println!("{}", hud.summary());
    Ok(())
}
